//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → client_ip.rs  (resolve ClientKey once, attach to extensions)
//!     → headers.rs    (fixed security response headers)
//!     → limits.rs     (cap body size for POST/PUT/PATCH)
//!     → rate_limit.rs (global sliding-window limiter)
//!     → cors.rs       (origin policy, preflight)
//!     → route-level rate_limit.rs (stricter per-endpoint limiter)
//! ```
//!
//! Every rejecting stage writes its own terminal response and does not call
//! the next one.

pub mod client_ip;
pub mod clock;
pub mod cors;
pub mod headers;
pub mod limits;
pub mod rate_limit;

pub use client_ip::ClientKey;
pub use rate_limit::{RateLimiter, RateLimiterConfig};
