//! Portfolio API library.
//!
//! Serves a portfolio's profile, skills, projects and certificates, and
//! accepts contact messages and questions, behind a fixed pipeline of
//! cross-cutting stages with per-client sliding-window rate limiting.

// Core subsystems
pub mod config;
pub mod http;
pub mod routing;
pub mod store;

// Domain
pub mod health;
pub mod portfolio;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::AppConfig;
pub use http::{AppServer, AppState, Limiters};
pub use lifecycle::Shutdown;
