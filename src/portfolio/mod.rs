//! Portfolio domain.
//!
//! # Data Flow
//! ```text
//! handlers.rs (extract path + body, sanitise, validate)
//!     → service.rs (profile existence, reads, inserts)
//!     → store::DocumentStore
//! ```

pub mod handlers;
pub mod models;
pub mod sanitize;
pub mod service;

pub use service::{PortfolioService, ServiceError};
