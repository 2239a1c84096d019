//! Request pipeline composition.
//!
//! Stages, outermost first:
//!
//! ```text
//! 1. panic containment     CatchPanicLayer → 500 INTERNAL_ERROR
//! 2. request id            X-Request-ID propagated or generated
//! 3. client identity       ClientKey attached once
//! 4. access log            duration and final status
//! 5. security headers      fixed set, on every response below this point
//! 6. body cap              POST/PUT/PATCH bodies fail past the ceiling
//! 7. global rate limit     429 before any further work
//! 8. CORS                  origin policy and preflight
//! ```
//!
//! Route-specific limiters sit inside all of these (see `routing`).

use std::any::Any;
use std::sync::Arc;

use axum::{
    middleware,
    response::{IntoResponse, Response},
    Router,
};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;

use crate::http::request::request_id_middleware;
use crate::http::response::ApiError;
use crate::observability::access_log::access_log_middleware;
use crate::security::client_ip::client_ip_middleware;
use crate::security::cors::cors_layer;
use crate::security::headers::security_headers_middleware;
use crate::security::limits::{body_limit_middleware, BodyLimit};
use crate::security::rate_limit::{rate_limit_middleware, RateLimiter};

/// Everything the global stages need.
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub global_limiter: Arc<RateLimiter>,
    pub body_limit: BodyLimit,
    pub allowed_origins: Vec<String>,
}

impl Pipeline {
    /// Wrap `router` (routes and fallback alike) in the global stages.
    pub fn wrap(self, router: Router) -> Router {
        let stages = ServiceBuilder::new()
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(middleware::from_fn(request_id_middleware))
            .layer(middleware::from_fn(client_ip_middleware))
            .layer(middleware::from_fn(access_log_middleware))
            .layer(middleware::from_fn(security_headers_middleware))
            .layer(middleware::from_fn_with_state(
                self.body_limit,
                body_limit_middleware,
            ))
            .layer(middleware::from_fn_with_state(
                self.global_limiter,
                rate_limit_middleware,
            ))
            .layer(cors_layer(&self.allowed_origins));

        router.layer(stages)
    }
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "non-string panic payload"
    };
    tracing::error!(panic = %detail, "Request handler panicked");
    ApiError::internal().into_response()
}
