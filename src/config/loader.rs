//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::BffConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value for {var}: '{value}'")]
    Env { var: &'static str, value: String },
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read a TOML file without validating it.
pub fn read_config(path: &Path) -> Result<BffConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<BffConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay environment variables on top of `config`.
///
/// `lookup` returns the value of a variable, if set. Empty values count as unset.
pub fn apply_env<F>(mut config: BffConfig, lookup: F) -> Result<BffConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

    if let Some(url) = get("BACKEND_URL") {
        config.upstream.base_url = url;
    }
    if let Some(addr) = get("BIND_ADDRESS") {
        config.listener.bind_address = addr;
    }
    if let Some(level) = get("LOG_LEVEL") {
        config.observability.log_level = level;
    }
    if let Some(dsn) = get("SENTRY_DSN") {
        config.monitoring.dsn = Some(dsn);
    }
    if let Some(environment) = get("SENTRY_ENVIRONMENT") {
        config.monitoring.environment = environment;
    }
    if let Some(release) = get("SENTRY_RELEASE") {
        config.monitoring.release = Some(release);
    }
    if let Some(rate) = get("SENTRY_TRACES_SAMPLE_RATE") {
        config.monitoring.traces_sample_rate = rate.trim().parse().map_err(|_| ConfigError::Env {
            var: "SENTRY_TRACES_SAMPLE_RATE",
            value: rate.clone(),
        })?;
    }

    Ok(config)
}

/// Build the runtime configuration: optional file, then process environment, then validation.
pub fn resolve(path: Option<&Path>) -> Result<BffConfig, ConfigError> {
    let base = match path {
        Some(p) => read_config(p)?,
        None => BffConfig::default(),
    };
    let config = apply_env(base, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
