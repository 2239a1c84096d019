//! Configuration schema definitions.
//!
//! Every section is defaulted, so an empty file (or no file) is a complete
//! configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::security::limits::DEFAULT_MAX_BODY_BYTES;
use crate::security::rate_limit::{RateLimiterConfig, RateLimiterConfigError};

/// Root configuration for the API server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Deployment environment.
    pub environment: Environment,

    /// Listener settings.
    pub server: ServerConfig,

    /// Cross-origin policy.
    pub cors: CorsConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Global and per-route rate limits.
    pub rate_limit: RateLimitConfig,

    /// Document store settings.
    pub store: StoreConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Test,
    Production,
}

impl Environment {
    /// Lenient parse of `APP_ENV` values such as `prod`, `production-eu`
    /// or `testing`. Anything unrecognised is local.
    pub fn parse(value: &str) -> Self {
        let value = value.trim().to_ascii_lowercase();
        if value.contains("prod") {
            Environment::Production
        } else if value.contains("test") {
            Environment::Test
        } else {
            Environment::Local
        }
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Upper bound on the graceful drain after a shutdown signal.
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            shutdown_timeout_secs: 10,
        }
    }
}

impl ServerConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins. `*` allows any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Request body ceiling in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// One limiter's limit and window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct LimiterSettings {
    /// Maximum admitted requests per window, per client.
    pub limit: usize,

    /// Window length in seconds.
    pub window_secs: u64,
}

impl LimiterSettings {
    pub const fn new(limit: usize, window_secs: u64) -> Self {
        Self { limit, window_secs }
    }

    pub fn to_limiter_config(self) -> Result<RateLimiterConfig, RateLimiterConfigError> {
        RateLimiterConfig::new(self.limit, Duration::from_secs(self.window_secs))
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Applied to every request.
    pub global: LimiterSettings,

    /// Contact submissions.
    pub contacts: LimiterSettings,

    /// Question submissions.
    pub questions: LimiterSettings,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            global: LimiterSettings::new(100, 60),
            contacts: LimiterSettings::new(5, 60),
            questions: LimiterSettings::new(10, 60),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON file loaded into the in-memory store at startup.
    pub seed_path: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.environment, Environment::Local);
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.rate_limit.global, LimiterSettings::new(100, 60));
        assert_eq!(config.rate_limit.contacts, LimiterSettings::new(5, 60));
        assert_eq!(config.rate_limit.questions, LimiterSettings::new(10, 60));
        assert_eq!(config.limits.max_body_bytes, 1 << 20);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            environment = "production"

            [rate_limit.contacts]
            limit = 3
            window_secs = 30
            "#,
        )
        .unwrap();

        assert!(config.environment.is_production());
        assert_eq!(config.rate_limit.contacts, LimiterSettings::new(3, 30));
        assert_eq!(config.rate_limit.global, LimiterSettings::new(100, 60));
    }

    #[test]
    fn test_environment_parse_is_lenient() {
        assert_eq!(Environment::parse("PROD"), Environment::Production);
        assert_eq!(Environment::parse("production-eu"), Environment::Production);
        assert_eq!(Environment::parse("testing"), Environment::Test);
        assert_eq!(Environment::parse("dev"), Environment::Local);
        assert_eq!(Environment::parse(""), Environment::Local);
    }
}
