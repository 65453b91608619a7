//! Gateway error taxonomy.
//!
//! Every failure inside `forward` is one of these variants. They are turned
//! into HTTP responses at the handler boundary (see `http::response`), so a
//! failing request never takes a worker down with it.

use std::time::Duration;

use axum::http::StatusCode;
use thiserror::Error;

/// Errors produced while forwarding a single request.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The upstream connection could not be established.
    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    /// The upstream did not produce a response head in time.
    #[error("upstream did not respond within {}s", .0.as_secs_f64())]
    UpstreamTimeout(Duration),

    /// The upstream answered with something the client could not parse.
    #[error("upstream protocol error: {0}")]
    UpstreamProtocol(String),

    /// Path segments could not be turned into a valid upstream URL.
    #[error("malformed path: {0}")]
    MalformedPath(String),

    /// Same-origin fallback requested but the request carries no host.
    #[error("cannot derive request origin: no host in request")]
    MissingOrigin,

    /// Anything else that is our fault.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Status code surfaced to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::UpstreamUnreachable(_) | GatewayError::UpstreamProtocol(_) => {
                StatusCode::BAD_GATEWAY
            }
            GatewayError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::MalformedPath(_) | GatewayError::MissingOrigin => StatusCode::BAD_REQUEST,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Classify a client error from the outbound connection pool.
    pub fn from_client(err: &hyper_util::client::legacy::Error) -> Self {
        if err.is_connect() {
            GatewayError::UpstreamUnreachable(error_chain(err))
        } else {
            GatewayError::UpstreamProtocol(error_chain(err))
        }
    }
}

/// Convenience alias used across the crate.
pub type GatewayResult<T> = Result<T, GatewayError>;

// hyper-util's top-level message is terse ("client error (Connect)"); the
// useful part is in the source chain.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
