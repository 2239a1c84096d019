//! Security response headers.
//!
//! Every response leaving the inner chain carries the same fixed set. Values
//! already set by an inner stage or handler are overwritten.

use axum::{
    body::Body,
    http::{
        header::{self, HeaderName},
        HeaderValue, Request,
    },
    middleware::Next,
    response::Response,
};

/// The fixed header set, in the order it is applied.
pub const SECURITY_HEADERS: [(HeaderName, &str); 7] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "DENY"),
    (header::X_XSS_PROTECTION, "1; mode=block"),
    (header::REFERRER_POLICY, "strict-origin-when-cross-origin"),
    (
        header::CONTENT_SECURITY_POLICY,
        "default-src 'none'; frame-ancestors 'none'",
    ),
    (
        HeaderName::from_static("permissions-policy"),
        "geolocation=(), microphone=(), camera=()",
    ),
    // Public portfolio data, cacheable by intermediaries.
    (header::CACHE_CONTROL, "public, max-age=3000"),
];

pub async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    for (name, value) in SECURITY_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }

    response
}
