//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (path, query, headers)
//!     → mount.rs (capture segments below /<prefix>/, decode, dedupe prefix)
//!     → target.rs (resolve upstream base, encode segments, append query)
//!     → Return: absolute upstream URI or a gateway error
//!
//! Mount compilation (at startup):
//!     MountConfig[]
//!     → Mount (trimmed, immutable)
//!     → one axum route per mount
//! ```
//!
//! # Design Decisions
//! - Mounts compiled at startup, immutable at runtime
//! - Deterministic: same request and config always yield the same URI
//! - No hidden state; the only per-request input besides the path is the
//!   inbound origin for same-origin mounts

pub mod mount;
pub mod target;

pub use mount::{Fallback, Mount};
pub use target::{build_upstream_uri, request_origin, resolve_base, upstream_uri};
