//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (connect timeout on the connector, response-head deadline)
//!     → On expiry: 504 to the caller, outbound request dropped
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream call has a deadline
//! - No retries: each inbound request maps to exactly one outbound request

pub mod timeouts;

pub use timeouts::{with_deadline, UpstreamTimeouts};
