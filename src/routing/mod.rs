//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Request (already through the global pipeline)
//!     → router.rs (fixed method + path table)
//!     → route limiter (contacts / questions only)
//!     → handler
//! ```
//!
//! # Design Decisions
//! - The table is fixed at startup; there is no dynamic registration
//! - Unmatched paths fall through to axum's 404
//! - A route limiter never replaces the global one; both must admit

pub mod router;

pub use router::{build_routes, RouteLimiters};
