//! Liveness and store connectivity.
//!
//! `GET /health` pings the document store with a bounded wait. It has no
//! route limiter of its own, but it is not exempt from the global limiter:
//! the global stage runs for every route, health included, so a client
//! over its global quota gets 429 here too.

pub mod version;

use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::Response};
use serde::Serialize;

use crate::http::response::json;
use crate::http::server::AppState;
use crate::store::DocumentStore;

pub use version::VersionInfo;

/// Longest the store ping may take before the store counts as down.
pub const PING_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub version: VersionInfo,
}

pub async fn health_handler(State(state): State<AppState>) -> Response {
    if store_reachable(&*state.store, PING_TIMEOUT).await {
        json(
            StatusCode::OK,
            HealthResponse {
                status: "ok",
                database: "connected",
                version: version::current(),
            },
        )
    } else {
        json(
            StatusCode::SERVICE_UNAVAILABLE,
            HealthResponse {
                status: "unhealthy",
                database: "disconnected",
                version: version::current(),
            },
        )
    }
}

async fn store_reachable(store: &dyn DocumentStore, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, store.ping()).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Store ping failed");
            false
        }
        Err(_) => {
            tracing::warn!(timeout_ms = timeout.as_millis() as u64, "Store ping timed out");
            false
        }
    }
}
