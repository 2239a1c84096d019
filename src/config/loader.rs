//! Configuration loading.
//!
//! ```text
//! .env (optional, dotenvy)
//!     → TOML file (optional)
//!     → environment overrides (PORT, ALLOWED_ORIGINS, APP_ENV, SEED_PATH, LOG_LEVEL)
//!     → validation
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::{AppConfig, Environment};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming the TOML file when no CLI flag is given.
pub const CONFIG_PATH_ENV: &str = "PORTFOLIO_CONFIG";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load `.env`, the optional TOML file and environment overrides, then
/// validate. `cli_path` wins over [`CONFIG_PATH_ENV`].
pub fn load(cli_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), ".env loaded"),
        Err(e) => tracing::debug!(error = %e, "No .env file, using process environment only"),
    }

    let path = cli_path
        .map(Path::to_path_buf)
        .or_else(|| env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

    let mut config = match path {
        Some(path) => parse_file(&path)?,
        None => AppConfig::default(),
    };
    apply_env_overrides(&mut config, |key| env::var(key).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file, without overrides.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = parse_file(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn parse_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Apply environment overrides. Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(port) = get("PORT") {
        config.server.bind_address = format!("0.0.0.0:{}", port.trim());
    }
    if let Some(origins) = get("ALLOWED_ORIGINS") {
        config.cors.allowed_origins = origins
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
    }
    if let Some(app_env) = get("APP_ENV") {
        config.environment = Environment::parse(&app_env);
    }
    if let Some(seed) = get("SEED_PATH") {
        config.store.seed_path = Some(seed);
    }
    if let Some(level) = get("LOG_LEVEL") {
        config.observability.log_level = level;
    }
}
