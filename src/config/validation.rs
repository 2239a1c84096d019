//! Configuration validation.
//!
//! Returns every problem at once, not just the first. Runs before the
//! config is accepted into the system.

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::{AppConfig, LimiterSettings};

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "server.bind_address",
            format!("'{}' is not a socket address", config.server.bind_address),
        ));
    }

    if config.cors.allowed_origins.iter().all(|o| o.trim().is_empty()) {
        errors.push(ValidationError::new(
            "cors.allowed_origins",
            "at least one origin is required",
        ));
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::new(
            "limits.max_body_bytes",
            "must be positive",
        ));
    }

    let limiters = [
        ("rate_limit.global", config.rate_limit.global),
        ("rate_limit.contacts", config.rate_limit.contacts),
        ("rate_limit.questions", config.rate_limit.questions),
    ];
    for (field, settings) in limiters {
        check_limiter(field, settings, &mut errors);
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_limiter(field: &str, settings: LimiterSettings, errors: &mut Vec<ValidationError>) {
    if settings.limit == 0 {
        errors.push(ValidationError::new(
            format!("{field}.limit"),
            "must be positive",
        ));
    }
    if settings.window_secs == 0 {
        errors.push(ValidationError::new(
            format!("{field}.window_secs"),
            "must be positive",
        ));
    }
}
