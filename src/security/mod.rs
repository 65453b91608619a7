//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request headers
//!     → headers.rs (strip host/connection/content-length)
//!     → forwarded upstream
//!
//! Upstream response headers
//!     → headers.rs (optional hop-by-hop strip)
//!     → relayed to caller
//! ```

pub mod headers;

pub use headers::{filter_request_headers, strip_hop_by_hop};
