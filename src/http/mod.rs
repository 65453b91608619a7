//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, one route per mount, method table)
//!     → forward.rs (resolve target, filter headers, stream to upstream)
//!     → response.rs (gateway errors → JSON error responses)
//!     → Send to client
//! ```

pub mod forward;
pub mod response;
pub mod server;

pub use forward::{forward, AppState, ForwardState, UpstreamClient};
pub use server::{HttpServer, FORWARDED_METHODS};
