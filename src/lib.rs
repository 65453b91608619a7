//! Forwarding gateway for the AI Lab – Day Zero game backend.
//!
//! The game UI calls `/api/*` (or `/_proxy/*` during local development);
//! the gateway relays those calls to the upstream API server with
//! sanitized request headers and streamed bodies.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod security;

pub use config::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
