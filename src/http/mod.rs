//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, peer address attached)
//!     → pipeline.rs (global stages in fixed order)
//!     → request.rs (request id), security::* (identity, limits, headers)
//!     → routing (route limiter, then handler)
//!     → extract.rs (path + body extraction)
//!     → response.rs (JSON payloads, error envelope)
//! ```

pub mod extract;
pub mod pipeline;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestContextExt, RequestId, X_REQUEST_ID};
pub use response::{ApiError, ErrorCode, ErrorDetails, FieldError};
pub use server::{AppServer, AppState, Limiters};
