use anyhow::Result;
use mop_api::{create_app, AppState, Config};
use mop_orchestrator::HttpWorkspaceService;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("mop_api=debug,mop_orchestrator=debug,tower_http=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting mop-api service...");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: bind_addr={}, api_root={}, access_policy={:?}, max_concurrency={}, dry_run={}",
        config.bind_addr,
        config.api_root,
        config.access_policy,
        config.max_concurrency,
        config.dry_run
    );

    if config.access_token.is_none() {
        warn!("MOP_ACCESS_TOKEN is not set; remote calls will be unauthenticated");
    }

    // Remote workspace service
    let service = HttpWorkspaceService::new(config.http_client_config())?;

    let state = AppState::new(
        Arc::new(service),
        config.orchestrator_settings(),
        config.required_group.clone(),
    );

    // Create app
    let app = create_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
