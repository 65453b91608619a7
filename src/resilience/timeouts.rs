//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound the time until an upstream response head arrives
//! - Turn an elapsed deadline into a distinct error
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; the inner future is dropped on expiry,
//!   which aborts the outbound request
//! - Only the response head is bounded; streamed bodies may run longer
//! - Timed-out requests return 504 Gateway Timeout

use std::future::Future;
use std::time::Duration;

use crate::config::TimeoutConfig;
use crate::error::{GatewayError, GatewayResult};

/// Upstream deadlines derived from configuration.
#[derive(Debug, Clone, Copy)]
pub struct UpstreamTimeouts {
    pub connect: Duration,
    pub response: Duration,
    pub idle: Duration,
}

impl From<&TimeoutConfig> for UpstreamTimeouts {
    fn from(config: &TimeoutConfig) -> Self {
        Self {
            connect: Duration::from_secs(config.connect_secs),
            response: Duration::from_secs(config.upstream_secs),
            idle: Duration::from_secs(config.idle_secs),
        }
    }
}

/// Run `fut` under `limit`, mapping expiry to [`GatewayError::UpstreamTimeout`].
pub async fn with_deadline<F, T>(limit: Duration, fut: F) -> GatewayResult<T>
where
    F: Future<Output = GatewayResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(GatewayError::UpstreamTimeout(limit)),
    }
}
