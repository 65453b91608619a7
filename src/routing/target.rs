//! Upstream target resolution.
//!
//! The inbound path → upstream URL mapping is a pure function of the static
//! configuration, the inbound path and query, and (for same-origin mounts)
//! the inbound origin. Nothing here caches or mutates state.

use std::str::FromStr;

use axum::http::uri::Authority;
use axum::http::{header, HeaderMap, Uri};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use crate::error::{GatewayError, GatewayResult};
use crate::routing::mount::{Fallback, Mount};

/// Characters left unescaped inside a path segment: the URI-component
/// unreserved set. Everything else, notably `/ ? # %`, is escaped.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Origin (`scheme://host[:port]`) of an inbound request.
///
/// HTTP/2 requests carry the authority in the URI; HTTP/1.1 requests carry it
/// in `Host`. The gateway terminates plain HTTP, so a relative URI means `http`.
pub fn request_origin(uri: &Uri, headers: &HeaderMap) -> Option<String> {
    let authority = match uri.authority() {
        Some(authority) => authority.clone(),
        None => {
            let host = headers.get(header::HOST)?.to_str().ok()?;
            Authority::from_str(host.trim()).ok()?
        }
    };
    if authority.as_str().contains('@') {
        return None;
    }
    let scheme = uri.scheme_str().unwrap_or("http");
    Some(format!("{}://{}", scheme, authority))
}

/// Pick the upstream base: explicit override first, else the mount fallback.
/// Trailing slashes are stripped.
pub fn resolve_base(
    override_base: Option<&str>,
    fallback: &Fallback,
    origin: Option<String>,
) -> GatewayResult<String> {
    let base = match (override_base, fallback) {
        (Some(base), _) => base.to_string(),
        (None, Fallback::Fixed(base)) => base.clone(),
        (None, Fallback::SameOrigin(suffix)) => {
            let origin = origin.ok_or(GatewayError::MissingOrigin)?;
            format!("{}{}", origin.trim_end_matches('/'), suffix)
        }
    };
    Ok(base.trim_end_matches('/').to_string())
}

/// Join base, optional intermediate element, and encoded segments, then
/// append the inbound query string untouched.
pub fn build_upstream_uri(
    base: &str,
    upstream_prefix: Option<&str>,
    segments: &[String],
    query: Option<&str>,
) -> GatewayResult<Uri> {
    let mut raw = base.trim_end_matches('/').to_string();
    if let Some(prefix) = upstream_prefix {
        raw.push('/');
        raw.push_str(prefix);
    }
    raw.push('/');
    let encoded: Vec<String> = segments
        .iter()
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect();
    raw.push_str(&encoded.join("/"));

    let mut url = Url::parse(&raw)
        .map_err(|e| GatewayError::MalformedPath(format!("'{}' is not a valid URL: {}", raw, e)))?;

    // Raw query, byte for byte.
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.set_query(Some(query));
    }

    Uri::from_str(url.as_str())
        .map_err(|e| GatewayError::MalformedPath(format!("'{}' is not a valid URI: {}", url, e)))
}

/// Full resolution for one inbound request on `mount`. The process-wide
/// override beats the mount's own base, which beats its fallback.
pub fn upstream_uri(
    override_base: Option<&str>,
    mount: &Mount,
    uri: &Uri,
    headers: &HeaderMap,
) -> GatewayResult<Uri> {
    let segments = mount.segments(uri.path())?;
    let override_base = override_base.or(mount.base_url());
    let origin = match mount.fallback() {
        Fallback::SameOrigin(_) if override_base.is_none() => request_origin(uri, headers),
        _ => None,
    };
    let base = resolve_base(override_base, mount.fallback(), origin)?;
    build_upstream_uri(&base, mount.upstream_prefix(), &segments, uri.query())
}
