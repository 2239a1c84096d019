//! Client identity resolution.
//!
//! # Resolution order
//! 1. `X-Forwarded-For`, verbatim (the whole proxy chain, unparsed)
//! 2. `X-Real-IP`, verbatim
//! 3. Transport peer address, including its port
//!
//! No normalization happens across branches: a header-derived key has no
//! port, a peer-derived key does. Two requests from the same host can land
//! in different limiter buckets depending on which branch fired.

use std::convert::Infallible;
use std::fmt;
use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, Extensions, HeaderMap, Request},
    middleware::Next,
    response::Response,
};

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_REAL_IP: &str = "x-real-ip";

/// Key used when neither headers nor the transport expose a peer address.
const UNKNOWN_PEER: &str = "unknown";

/// Apparent origin of a request. Only ever used as a map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientKey(String);

impl ClientKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ClientKey> for String {
    fn from(key: ClientKey) -> Self {
        key.0
    }
}

/// Derive the client key from headers and the peer address.
pub fn resolve_client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> ClientKey {
    if let Some(forwarded) = non_empty_header(headers, X_FORWARDED_FOR) {
        return ClientKey::new(forwarded);
    }
    if let Some(real_ip) = non_empty_header(headers, X_REAL_IP) {
        return ClientKey::new(real_ip);
    }
    match peer {
        Some(addr) => ClientKey::new(addr.to_string()),
        None => ClientKey::new(UNKNOWN_PEER),
    }
}

fn non_empty_header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// Resolve the client key for a request that may not have passed through
/// [`client_ip_middleware`] yet.
pub fn client_key_of(req: &Request<Body>) -> ClientKey {
    attached_or_resolved(req.extensions(), req.headers())
}

fn attached_or_resolved(extensions: &Extensions, headers: &HeaderMap) -> ClientKey {
    if let Some(key) = extensions.get::<ClientKey>() {
        return key.clone();
    }
    let peer = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    resolve_client_key(headers, peer)
}

/// Handlers read the attached key; outside the pipeline it is resolved on
/// the spot.
impl<S> FromRequestParts<S> for ClientKey
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(attached_or_resolved(&parts.extensions, &parts.headers))
    }
}

/// Attach the [`ClientKey`] to the request once for every inner stage.
pub async fn client_ip_middleware(mut req: Request<Body>, next: Next) -> Response {
    if req.extensions().get::<ClientKey>().is_none() {
        let key = client_key_of(&req);
        req.extensions_mut().insert(key);
    }
    next.run(req).await
}
