//! Extractors that reject with the API error envelope.

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::http::response::ApiError;
use crate::security::limits::is_body_too_large;

/// `{id}` path segment, validated as a UUID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileId(pub String);

impl ProfileId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for ProfileId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::bad_request("Profile ID is required"))?;

        if id.is_empty() {
            return Err(ApiError::bad_request("Profile ID is required"));
        }
        if Uuid::parse_str(&id).is_err() {
            return Err(ApiError::bad_request("Invalid profile ID format"));
        }
        Ok(ProfileId(id))
    }
}

/// JSON body that reports an oversized body as `PAYLOAD_TOO_LARGE` and any
/// other read or decode failure as `BAD_REQUEST`.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let bytes = axum::body::to_bytes(req.into_body(), usize::MAX)
            .await
            .map_err(|e| {
                if is_body_too_large(&e) {
                    ApiError::payload_too_large()
                } else {
                    ApiError::bad_request("Invalid request body")
                }
            })?;

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|_| ApiError::bad_request("Invalid request body"))
    }
}
