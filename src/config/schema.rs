//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Process-wide upstream settings.
    pub upstream: UpstreamConfig,

    /// Wildcard mounts forwarded to the upstream.
    pub mounts: Vec<MountConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Header hardening switches.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            upstream: UpstreamConfig::default(),
            mounts: MountConfig::defaults(),
            timeouts: TimeoutConfig::default(),
            security: SecurityConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Upstream selection shared by every mount.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Explicit upstream base URL. When set it wins over every mount's
    /// fallback, e.g. `http://127.0.0.1:8000` for a local backend process.
    pub base_url: Option<String>,
}

/// A wildcard route `/<prefix>/*` forwarded upstream.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MountConfig {
    /// Mount segment, without slashes.
    pub prefix: String,

    /// Path element inserted between the base and the forwarded path.
    #[serde(default)]
    pub upstream_prefix: Option<String>,

    /// Strip one leading segment equal to `prefix` (`/api/api/x` → `/api/x`).
    #[serde(default)]
    pub strip_duplicate_prefix: bool,

    /// Base for this mount only. `upstream.base_url` still wins over it.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Base used when no explicit override is configured.
    pub fallback: FallbackConfig,
}

impl MountConfig {
    /// The two route variants the game UI calls: `/api/*` (unified deployment,
    /// same-origin backend) and `/_proxy/*` (local development).
    pub fn defaults() -> Vec<Self> {
        vec![
            Self {
                prefix: "api".to_string(),
                upstream_prefix: Some("api".to_string()),
                strip_duplicate_prefix: true,
                base_url: None,
                fallback: FallbackConfig::SameOrigin("/backend".to_string()),
            },
            Self {
                prefix: "_proxy".to_string(),
                upstream_prefix: None,
                strip_duplicate_prefix: false,
                base_url: None,
                fallback: FallbackConfig::Fixed("http://127.0.0.1:8000".to_string()),
            },
        ]
    }
}

/// Where a mount sends traffic when there is no override.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackConfig {
    /// The inbound request's own origin plus this path suffix.
    SameOrigin(String),
    /// A fixed absolute base URL.
    Fixed(String),
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Time allowed until the upstream response head arrives, in seconds.
    /// Body streaming is not bounded by this.
    pub upstream_secs: u64,

    /// Idle pooled connection timeout in seconds.
    pub idle_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 30,
            idle_secs: 90,
        }
    }
}

/// Header hardening configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Remove hop-by-hop headers from upstream responses before relaying.
    pub strip_response_hop_by_hop: bool,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
