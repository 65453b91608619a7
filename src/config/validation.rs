//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that upstream bases are absolute http(s) URLs
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Detect conflicting mounts
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::{FallbackConfig, GatewayConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
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

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if let Some(base) = &config.upstream.base_url {
        if let Err(msg) = check_base_url(base) {
            errors.push(ValidationError::new("upstream.base_url", msg));
        }
    }

    if config.mounts.is_empty() {
        errors.push(ValidationError::new("mounts", "at least one mount is required"));
    }

    let mut seen = HashSet::new();
    for (i, mount) in config.mounts.iter().enumerate() {
        let field = |name: &str| format!("mounts[{}].{}", i, name);

        if let Err(msg) = check_segment(&mount.prefix) {
            errors.push(ValidationError::new(field("prefix"), msg));
        } else if !seen.insert(mount.prefix.as_str()) {
            errors.push(ValidationError::new(
                field("prefix"),
                format!("duplicate mount '{}'", mount.prefix),
            ));
        }

        if let Some(prefix) = &mount.upstream_prefix {
            let trimmed = prefix.trim_matches('/');
            if trimmed.is_empty() || trimmed.contains(&['?', '#'][..]) {
                errors.push(ValidationError::new(
                    field("upstream_prefix"),
                    format!("'{}' is not a usable path element", prefix),
                ));
            }
        }

        if let Some(base) = &mount.base_url {
            if let Err(msg) = check_base_url(base) {
                errors.push(ValidationError::new(field("base_url"), msg));
            }
        }

        match &mount.fallback {
            FallbackConfig::SameOrigin(suffix) => {
                if !suffix.starts_with('/') || suffix.contains(&['?', '#'][..]) {
                    errors.push(ValidationError::new(
                        field("fallback.same_origin"),
                        format!("'{}' must be an absolute path", suffix),
                    ));
                }
            }
            FallbackConfig::Fixed(base) => {
                if let Err(msg) = check_base_url(base) {
                    errors.push(ValidationError::new(field("fallback.fixed"), msg));
                }
            }
        }
    }

    let timeouts = &config.timeouts;
    for (name, value) in [
        ("timeouts.connect_secs", timeouts.connect_secs),
        ("timeouts.upstream_secs", timeouts.upstream_secs),
        ("timeouts.idle_secs", timeouts.idle_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::new(name, "must be greater than zero"));
        }
    }

    let obs = &config.observability;
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", obs.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_base_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| format!("'{}' is not a URL: {}", raw, e))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("'{}' must use http or https", raw));
    }
    if url.host_str().is_none() {
        return Err(format!("'{}' has no host", raw));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(format!("'{}' must not carry a query or fragment", raw));
    }
    Ok(())
}

fn check_segment(prefix: &str) -> Result<(), String> {
    if prefix.is_empty() {
        return Err("must not be empty".to_string());
    }
    if prefix.contains(&['/', '?', '#', '{', '}'][..]) || prefix == "." || prefix == ".." {
        return Err(format!("'{}' must be a single path segment", prefix));
    }
    Ok(())
}
