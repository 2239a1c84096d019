//! Access logging stage.
//!
//! Wraps everything inside it, so the logged duration and status cover the
//! remaining stages and the handler. Runs after request identification and
//! client resolution, so both are available.

use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};

use crate::http::request::RequestContextExt;
use crate::observability::metrics;

pub async fn access_log_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();

    let request_id = request
        .request_id()
        .map(|id| id.to_string())
        .unwrap_or_default();
    let client_ip = request
        .client_key()
        .map(|key| key.to_string())
        .unwrap_or_default();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status().as_u16();

    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        status,
        duration_ms = duration.as_secs_f64() * 1000.0,
        client_ip = %client_ip,
        "HTTP request"
    );
    metrics::record_request(method.as_str(), status, duration);

    response
}
