//! Request identification and request-scoped context.
//!
//! Two values ride in the request extensions for the lifetime of a request:
//! the [`RequestId`] and the [`ClientKey`]. Both are written once by their
//! stage and only read afterwards.

use std::fmt;

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::security::client_ip::ClientKey;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Correlation id for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_header(value: &HeaderValue) -> Option<Self> {
        value
            .to_str()
            .ok()
            .filter(|v| !v.is_empty())
            .map(|v| Self(v.to_string()))
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read access to the request-scoped context.
pub trait RequestContextExt {
    fn request_id(&self) -> Option<&RequestId>;
    fn client_key(&self) -> Option<&ClientKey>;
}

impl<B> RequestContextExt for Request<B> {
    fn request_id(&self) -> Option<&RequestId> {
        self.extensions().get::<RequestId>()
    }

    fn client_key(&self) -> Option<&ClientKey> {
        self.extensions().get::<ClientKey>()
    }
}

/// Propagate the inbound `X-Request-ID` or generate one, attach it to the
/// request and echo it on the response.
pub async fn request_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let request_id = match request.request_id() {
        Some(existing) => existing.clone(),
        None => {
            let id = request
                .headers()
                .get(X_REQUEST_ID)
                .and_then(RequestId::from_header)
                .unwrap_or_else(RequestId::generate);
            request.extensions_mut().insert(id.clone());
            id
        }
    };

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }
    response
}
