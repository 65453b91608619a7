//! Header manipulation for the forwarding path.
//!
//! # Responsibilities
//! - Strip the headers that must not cross the gateway on requests
//! - Optionally strip hop-by-hop headers from upstream responses
//!
//! # Design Decisions
//! - Request filtering is identical for every method and path
//! - `host` is regenerated by the outbound client from the target URI
//! - `content-length` is recomputed by the outbound transport, since the
//!   body is re-framed while streaming
//! - Response headers are relayed verbatim unless hardening is enabled

use axum::http::header::{self, HeaderMap, HeaderName};

/// Request headers removed before forwarding.
pub const STRIPPED_REQUEST_HEADERS: [HeaderName; 3] =
    [header::HOST, header::CONNECTION, header::CONTENT_LENGTH];

/// Hop-by-hop response headers removed when hardening is on.
const HOP_BY_HOP: [&str; 7] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "transfer-encoding",
    "te",
    "trailer",
    "upgrade",
];

/// Outbound request headers: the inbound set minus `host`, `connection` and
/// `content-length`. Multi-valued headers keep every value in order.
pub fn filter_request_headers(mut headers: HeaderMap) -> HeaderMap {
    for name in &STRIPPED_REQUEST_HEADERS {
        headers.remove(name);
    }
    headers
}

/// Remove hop-by-hop headers from an upstream response, including any header
/// the upstream listed in its own `Connection` header.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|token| HeaderName::from_bytes(token.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}
