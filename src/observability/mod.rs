//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every request:
//!     → access_log.rs (one structured line per request, after the response)
//!     → metrics.rs    (request counter and latency histogram)
//!
//! Process start:
//!     → logging.rs (tracing subscriber, JSON in production)
//!     → metrics.rs (optional Prometheus scrape endpoint)
//! ```

pub mod access_log;
pub mod logging;
pub mod metrics;
