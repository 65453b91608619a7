//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the upstream override for every mount.
pub const API_BASE_URL_ENV: &str = "API_BASE_URL";

/// Environment variable holding a base for [`FASTAPI_MOUNT`] only. It is
/// consulted after `API_BASE_URL`; the `_proxy` mount never reads it.
pub const FASTAPI_BASE_URL_ENV: &str = "FASTAPI_BASE_URL";

/// Mount that honours [`FASTAPI_BASE_URL_ENV`].
pub const FASTAPI_MOUNT: &str = "api";

/// Environment variable overriding the listener bind address.
pub const BIND_ADDRESS_ENV: &str = "GATEWAY_BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[source] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[source] toml::de::Error),

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

/// Parse a TOML file without validating it.
pub fn read_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Apply environment overrides through `lookup`.
///
/// Taking a lookup function instead of reading `std::env` directly lets tests
/// substitute values without touching the process environment.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(base) = non_empty(API_BASE_URL_ENV) {
        config.upstream.base_url = Some(base);
    }
    if let Some(base) = non_empty(FASTAPI_BASE_URL_ENV) {
        for mount in config.mounts.iter_mut().filter(|m| m.prefix == FASTAPI_MOUNT) {
            mount.base_url = Some(base.clone());
        }
    }
    if let Some(addr) = non_empty(BIND_ADDRESS_ENV) {
        config.listener.bind_address = addr;
    }
}

/// Build the startup configuration: defaults, then the optional file, then
/// environment overrides from the real process environment.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// Same as [`load_config`] with an explicit environment lookup.
pub fn load_config_with<F>(path: Option<&Path>, lookup: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => GatewayConfig::default(),
    };
    apply_env_overrides(&mut config, lookup);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
