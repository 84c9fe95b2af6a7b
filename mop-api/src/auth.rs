use axum::{extract::Request, middleware::Next, response::Response};
use mop_orchestrator::RequestContext;

/// Identity middleware - builds the per-request [`RequestContext`]
///
/// An authenticating proxy in front of mop-api sets `x-mop-user` (or the
/// oauth2-proxy `x-forwarded-email`). For local use without a proxy, `x-user`
/// is accepted as a fallback.
///
/// Requests without an identity are not rejected here: reads work
/// anonymously and the mop endpoint rejects them itself before any remote call.
pub async fn identity_middleware(mut req: Request, next: Next) -> Response {
    let user = req
        .headers()
        .get("x-mop-user")
        .or_else(|| req.headers().get("x-forwarded-email")) // oauth2-proxy format
        .or_else(|| req.headers().get("x-user")) // fallback for dev
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    req.extensions_mut().insert(RequestContext { user });

    next.run(req).await
}
