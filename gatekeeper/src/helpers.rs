use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

/// middleware that logs every poll with its outcome.
///
/// rejected requests are logged at warn so misconfigured workers show up
/// without turning on debug output.
pub async fn trace(request: Request, next: Next) -> Response {
    let span = tracing::debug_span!(
        "poll",
        method = %request.method(),
        path = request.uri().path(),
        query = request.uri().query().unwrap_or_default(),
    );

    let start = Instant::now();
    let resp = next.run(request).await;
    let latency = start.elapsed();

    let _enter = span.enter();
    let status = resp.status();
    if status.is_client_error() || status.is_server_error() {
        tracing::warn!(status = status.as_u16(), ?latency, "request failed");
    } else {
        tracing::debug!(status = status.as_u16(), ?latency, "answered");
    }

    resp
}
