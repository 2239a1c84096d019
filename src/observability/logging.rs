//! Structured logging setup.
//!
//! `RUST_LOG` takes precedence over the configured level. Production emits
//! one JSON object per line; every other environment gets the human format.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Environment, ObservabilityConfig};

/// Default directives when neither `RUST_LOG` nor a config level is usable.
pub const DEFAULT_DIRECTIVES: &str = "portfolio_api=info,tower_http=info";

pub fn init(config: &ObservabilityConfig, environment: Environment) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directives(&config.log_level)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    let registry = tracing_subscriber::registry().with(filter);

    let result = if environment.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    if let Err(e) = result {
        // A subscriber is already installed, e.g. by a test harness.
        tracing::debug!(error = %e, "Logging already initialized");
    }
}

fn directives(level: &str) -> String {
    let level = level.trim();
    if level.is_empty() {
        return DEFAULT_DIRECTIVES.to_string();
    }
    format!("portfolio_api={level},tower_http={level}")
}
