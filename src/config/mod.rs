//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! .env + config file (TOML) + environment
//!     → loader.rs (parse, deserialize, apply overrides)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load, ConfigError};
pub use schema::{
    AppConfig, CorsConfig, Environment, LimiterSettings, LimitsConfig, ObservabilityConfig,
    RateLimitConfig, ServerConfig, StoreConfig,
};
