//! HttpWorkspaceService against an in-process fake of the remote API.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use mop_orchestrator::client::{
    HttpClientConfig, HttpWorkspaceService, MethodConfig, MethodIdentity, SubmissionOptions,
};
use mop_orchestrator::{AccessLevel, ServiceError, WorkspaceRef, WorkspaceService};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
struct FakeRemote {
    requests: Arc<Mutex<Vec<(String, Option<String>, Value)>>>,
}

impl FakeRemote {
    fn log(&self, what: String, headers: &HeaderMap, body: Value) {
        let auth = headers
            .get("authorization")
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);
        self.requests.lock().unwrap().push((what, auth, body));
    }

    fn requests(&self) -> Vec<(String, Option<String>, Value)> {
        self.requests.lock().unwrap().clone()
    }
}

async fn list_workspaces(State(fake): State<FakeRemote>, headers: HeaderMap) -> Json<Value> {
    fake.log("list".to_string(), &headers, Value::Null);
    Json(json!([
        {"accessLevel": "OWNER", "workspace": {"namespace": "ns", "name": "mine"}},
        {"accessLevel": "READER", "workspace": {"namespace": "ns", "name": "theirs"}}
    ]))
}

async fn storage_cost(Path((ns, name)): Path<(String, String)>) -> (StatusCode, Json<Value>) {
    match name.as_str() {
        "mine" => (
            StatusCode::OK,
            Json(json!({"estimate": "$3.21", "lastUpdated": "2026-01-01"})),
        ),
        "slow" => {
            tokio::time::sleep(Duration::from_millis(500)).await;
            (StatusCode::OK, Json(json!({"estimate": "$1.00"})))
        }
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": format!("{ns}/{name} does not exist"), "statusCode": 404})),
        ),
    }
}

async fn create_config(
    State(fake): State<FakeRemote>,
    Path((ns, name)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    fake.log(format!("config {ns}/{name}"), &headers, body);
    StatusCode::CREATED
}

async fn create_submission(
    State(fake): State<FakeRemote>,
    Path((ns, name)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    fake.log(format!("submit {ns}/{name}"), &headers, body);
    if name == "locked" {
        return (
            StatusCode::CONFLICT,
            Json(json!({"message": "Workspace is locked"})),
        );
    }
    (
        StatusCode::CREATED,
        Json(json!({"submissionId": "abc-123", "status": "Submitted"})),
    )
}

async fn delete_config(
    State(fake): State<FakeRemote>,
    Path((ns, name, method_ns, method_name)): Path<(String, String, String, String)>,
    headers: HeaderMap,
) -> StatusCode {
    fake.log(
        format!("delete {ns}/{name} {method_ns}/{method_name}"),
        &headers,
        Value::Null,
    );
    StatusCode::NO_CONTENT
}

async fn me() -> Json<Value> {
    Json(json!({"userInfo": {"userEmail": "alice@example.org", "userSubjectId": "1"}}))
}

async fn groups() -> (StatusCode, String) {
    (StatusCode::UNAUTHORIZED, "token expired".to_string())
}

async fn start_fake() -> (String, FakeRemote) {
    let fake = FakeRemote::default();
    let app = Router::new()
        .route("/api/workspaces", get(list_workspaces))
        .route(
            "/api/workspaces/{ns}/{name}/storageCostEstimate",
            get(storage_cost),
        )
        .route("/api/workspaces/{ns}/{name}/methodconfigs", post(create_config))
        .route(
            "/api/workspaces/{ns}/{name}/submissions",
            post(create_submission),
        )
        .route(
            "/api/workspaces/{ns}/{name}/method_configs/{method_ns}/{method_name}",
            delete(delete_config),
        )
        .route("/api/me", get(me))
        .route("/api/groups", get(groups))
        .route("/api/health", get(|| async { StatusCode::OK }))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/api"), fake)
}

fn client(root: &str, timeout: Duration) -> HttpWorkspaceService {
    HttpWorkspaceService::new(HttpClientConfig {
        api_root: root.to_string(),
        access_token: Some("secret-token".to_string()),
        timeout,
    })
    .expect("client should build")
}

#[tokio::test]
async fn test_list_workspaces_and_costs() {
    let (root, fake) = start_fake().await;
    let client = client(&root, Duration::from_secs(5));

    let rows = client.list_workspaces().await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].access_level, AccessLevel::Owner);
    assert_eq!(rows[1].workspace, WorkspaceRef::new("ns", "theirs"));

    let cost = client
        .get_storage_cost(&WorkspaceRef::new("ns", "mine"))
        .await
        .unwrap();
    assert_eq!(cost.estimate, "$3.21");

    let err = client
        .get_storage_cost(&WorkspaceRef::new("ns", "gone"))
        .await
        .unwrap_err();
    assert_eq!(err, ServiceError::rejected(404, "ns/gone does not exist"));

    let requests = fake.requests();
    assert_eq!(requests[0].1.as_deref(), Some("Bearer secret-token"));
}

#[tokio::test]
async fn test_mop_sequence_requests() {
    let (root, fake) = start_fake().await;
    let client = client(&root, Duration::from_secs(5));
    let workspace = WorkspaceRef::new("ns", "mine");
    let method = MethodIdentity::default();

    let config = MethodConfig::mop(&method, &workspace, "alice@example.org", true);
    client
        .create_workspace_config(&workspace, &config)
        .await
        .unwrap();

    let submission = client
        .create_submission(&workspace, &method.namespace, &method.name, SubmissionOptions::mop())
        .await
        .unwrap();
    assert_eq!(submission.submission_id, "abc-123");

    client
        .delete_workspace_config(&workspace, &method.namespace, &method.name)
        .await
        .unwrap();

    let requests = fake.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].0, "config ns/mine");
    assert_eq!(requests[0].2["inputs"]["Mop.dry_run"], "true");
    assert_eq!(requests[1].0, "submit ns/mine");
    assert_eq!(
        requests[1].2,
        json!({
            "methodConfigurationNamespace": "DSPMethods_mgatzen",
            "methodConfigurationName": "Automop",
            "useCallCache": false,
            "deleteIntermediateOutputFiles": true
        })
    );
    assert_eq!(requests[2].0, "delete ns/mine DSPMethods_mgatzen/Automop");
}

#[tokio::test]
async fn test_submission_rejection_carries_remote_message() {
    let (root, _fake) = start_fake().await;
    let client = client(&root, Duration::from_secs(5));

    let err = client
        .create_submission(
            &WorkspaceRef::new("ns", "locked"),
            "DSPMethods_mgatzen",
            "Automop",
            SubmissionOptions::mop(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.message(), "Workspace is locked");
    assert!(!err.is_unauthorized());
}

#[tokio::test]
async fn test_unauthorized_and_identity() {
    let (root, _fake) = start_fake().await;
    let client = client(&root, Duration::from_secs(5));

    assert_eq!(client.current_user().await.unwrap(), "alice@example.org");
    client.health().await.unwrap();

    let err = client.list_groups().await.unwrap_err();
    assert_eq!(
        err,
        ServiceError::Unauthorized {
            status: 401,
            message: "token expired".to_string()
        }
    );
}

#[tokio::test]
async fn test_hung_call_times_out() {
    let (root, _fake) = start_fake().await;
    let client = client(&root, Duration::from_millis(100));

    let err = client
        .get_storage_cost(&WorkspaceRef::new("ns", "slow"))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Transport(_)), "got {err:?}");
}
