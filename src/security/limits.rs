//! Request body size ceiling.
//!
//! For methods that carry a body (POST, PUT, PATCH) the body is wrapped so
//! that reading past the ceiling yields a [`BodyTooLarge`] error. Nothing is
//! buffered here; the limit only trips when a handler actually reads. Other
//! methods pass through untouched.

use std::error::Error as StdError;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    middleware::Next,
    response::Response,
    BoxError,
};
use futures_util::StreamExt;

/// Default ceiling: 1 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1 << 20;

/// Ceiling in bytes, used as middleware state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyLimit(pub usize);

impl Default for BodyLimit {
    fn default() -> Self {
        Self(DEFAULT_MAX_BODY_BYTES)
    }
}

/// Raised while reading a capped body once the ceiling is crossed.
#[derive(Debug, thiserror::Error)]
#[error("request body exceeds {limit} bytes")]
pub struct BodyTooLarge {
    pub limit: usize,
}

/// Methods whose bodies are capped.
pub fn expects_body(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
}

/// Wrap `body` so that reading more than `limit` bytes fails.
pub fn cap_body(body: Body, limit: usize) -> Body {
    let mut seen = 0usize;
    let capped = body.into_data_stream().map(move |chunk| {
        let chunk = chunk.map_err(BoxError::from)?;
        seen = seen.saturating_add(chunk.len());
        if seen > limit {
            return Err(BoxError::from(BodyTooLarge { limit }));
        }
        Ok(chunk)
    });
    Body::from_stream(capped)
}

/// True when `err` or anything in its source chain is a [`BodyTooLarge`].
pub fn is_body_too_large(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<BodyTooLarge>() {
            return true;
        }
        current = e.source();
    }
    false
}

pub async fn body_limit_middleware(
    State(limit): State<BodyLimit>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !expects_body(request.method()) {
        return next.run(request).await;
    }

    let (parts, body) = request.into_parts();
    next.run(Request::from_parts(parts, cap_body(body, limit.0)))
        .await
}
