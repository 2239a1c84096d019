//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM / Ctrl-C → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → server stops accepting → in-flight requests drain
//!             → limiter compaction tasks stop
//! ```
//!
//! # Design Decisions
//! - Shutdown has a timeout: the drain is abandoned after the deadline
//! - Compaction tasks also end on their own when their limiter is dropped

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::shutdown_signal;
