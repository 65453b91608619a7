//! Wildcard mounts and inbound path normalization.
//!
//! # Responsibilities
//! - Compile `MountConfig` into an immutable `Mount`
//! - Capture the path remainder below `/<prefix>/` as decoded segments
//! - Strip one accidental duplicate of the mount segment
//!
//! # Design Decisions
//! - Segments are split on the raw path before decoding, so an encoded `%2F`
//!   stays inside its segment instead of becoming a separator
//! - `.` and `..` segments are refused outright; they would otherwise be
//!   resolved away by the upstream URL parser
//! - Empty segments (`a//b`, trailing `/`) are dropped

use percent_encoding::percent_decode_str;

use crate::config::{FallbackConfig, MountConfig};
use crate::error::{GatewayError, GatewayResult};

/// Base used for a mount when no explicit override is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fallback {
    /// Inbound origin + suffix (suffix has no trailing slash).
    SameOrigin(String),
    /// Fixed absolute base URL (no trailing slash).
    Fixed(String),
}

/// A compiled wildcard route.
#[derive(Debug, Clone)]
pub struct Mount {
    prefix: String,
    upstream_prefix: Option<String>,
    strip_duplicate_prefix: bool,
    base_url: Option<String>,
    fallback: Fallback,
}

impl Mount {
    pub fn from_config(config: &MountConfig) -> Self {
        let fallback = match &config.fallback {
            FallbackConfig::SameOrigin(suffix) => {
                Fallback::SameOrigin(suffix.trim_end_matches('/').to_string())
            }
            FallbackConfig::Fixed(base) => Fallback::Fixed(base.trim_end_matches('/').to_string()),
        };
        Self {
            prefix: config.prefix.clone(),
            upstream_prefix: config
                .upstream_prefix
                .as_deref()
                .map(|p| p.trim_matches('/').to_string())
                .filter(|p| !p.is_empty()),
            strip_duplicate_prefix: config.strip_duplicate_prefix,
            base_url: config
                .base_url
                .as_deref()
                .map(|base| base.trim_end_matches('/').to_string()),
            fallback,
        }
    }

    /// Mount segment, e.g. `api`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Fixed path element inserted before the forwarded segments.
    pub fn upstream_prefix(&self) -> Option<&str> {
        self.upstream_prefix.as_deref()
    }

    /// Mount-specific base, below the process-wide override.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn fallback(&self) -> &Fallback {
        &self.fallback
    }

    /// axum route pattern for this mount.
    pub fn route_pattern(&self) -> String {
        format!("/{}/{{*path}}", self.prefix)
    }

    /// Decode the segments below this mount from a raw (still encoded)
    /// request path such as `/api/agent/ml%20engineer`.
    pub fn capture(&self, raw_path: &str) -> GatewayResult<Vec<String>> {
        let remainder = raw_path
            .strip_prefix('/')
            .and_then(|p| p.strip_prefix(self.prefix.as_str()))
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
            .ok_or_else(|| {
                GatewayError::Internal(format!(
                    "path '{}' is not below mount '{}'",
                    raw_path, self.prefix
                ))
            })?;

        remainder
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(decode_segment)
            .collect()
    }

    /// Strip exactly one leading duplicate of the mount segment, if enabled.
    pub fn normalize(&self, mut segments: Vec<String>) -> Vec<String> {
        if self.strip_duplicate_prefix
            && segments.first().is_some_and(|first| *first == self.prefix)
        {
            segments.remove(0);
        }
        segments
    }

    /// `capture` followed by `normalize`.
    pub fn segments(&self, raw_path: &str) -> GatewayResult<Vec<String>> {
        self.capture(raw_path).map(|segments| self.normalize(segments))
    }
}

fn decode_segment(raw: &str) -> GatewayResult<String> {
    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .map_err(|_| GatewayError::MalformedPath(format!("segment '{}' is not valid UTF-8", raw)))?;
    if decoded == "." || decoded == ".." {
        return Err(GatewayError::MalformedPath(format!(
            "dot segment '{}' is not allowed",
            raw
        )));
    }
    Ok(decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_mount() -> Mount {
        Mount::from_config(&MountConfig::defaults()[0])
    }

    fn proxy_mount() -> Mount {
        Mount::from_config(&MountConfig::defaults()[1])
    }

    #[test]
    fn compiles_defaults() {
        let api = api_mount();
        assert_eq!(api.prefix(), "api");
        assert_eq!(api.upstream_prefix(), Some("api"));
        assert_eq!(api.fallback(), &Fallback::SameOrigin("/backend".into()));
        assert_eq!(api.route_pattern(), "/api/{*path}");

        let proxy = proxy_mount();
        assert_eq!(proxy.upstream_prefix(), None);
        assert_eq!(
            proxy.fallback(),
            &Fallback::Fixed("http://127.0.0.1:8000".into())
        );
    }

    #[test]
    fn trailing_slashes_trimmed_from_fallback() {
        let mount = Mount::from_config(&MountConfig {
            prefix: "api".into(),
            upstream_prefix: Some("/api/".into()),
            strip_duplicate_prefix: false,
            base_url: Some("http://10.0.0.1:9000/".into()),
            fallback: FallbackConfig::Fixed("http://backend:8000///".into()),
        });
        assert_eq!(mount.fallback(), &Fallback::Fixed("http://backend:8000".into()));
        assert_eq!(mount.upstream_prefix(), Some("api"));
        assert_eq!(mount.base_url(), Some("http://10.0.0.1:9000"));
    }

    #[test]
    fn captures_decoded_segments() {
        let segments = api_mount().capture("/api/agent/ml%20engineer").unwrap();
        assert_eq!(segments, vec!["agent", "ml engineer"]);
    }

    #[test]
    fn encoded_slash_stays_in_segment() {
        let segments = api_mount().capture("/api/files/a%2Fb").unwrap();
        assert_eq!(segments, vec!["files", "a/b"]);
    }

    #[test]
    fn drops_empty_segments() {
        let segments = api_mount().capture("/api//state/").unwrap();
        assert_eq!(segments, vec!["state"]);
    }

    #[test]
    fn strips_duplicate_prefix_exactly_once() {
        let api = api_mount();
        assert_eq!(api.segments("/api/api/foo").unwrap(), vec!["foo"]);
        assert_eq!(api.segments("/api/api/api/foo").unwrap(), vec!["api", "foo"]);
        // Only a leading duplicate is stripped.
        assert_eq!(api.segments("/api/foo/api").unwrap(), vec!["foo", "api"]);
        // Segments that merely start with the prefix are kept.
        assert_eq!(api.segments("/api/apis").unwrap(), vec!["apis"]);
    }

    #[test]
    fn duplicate_kept_when_stripping_disabled() {
        let proxy = proxy_mount();
        assert_eq!(
            proxy.segments("/_proxy/_proxy/health").unwrap(),
            vec!["_proxy", "health"]
        );
    }

    #[test]
    fn rejects_dot_segments() {
        let api = api_mount();
        assert!(matches!(
            api.capture("/api/../admin"),
            Err(GatewayError::MalformedPath(_))
        ));
        assert!(matches!(
            api.capture("/api/%2e%2E/admin"),
            Err(GatewayError::MalformedPath(_))
        ));
        assert!(matches!(api.capture("/api/./x"), Err(GatewayError::MalformedPath(_))));
        assert_eq!(api.capture("/api/a..b").unwrap(), vec!["a..b"]);
    }

    #[test]
    fn rejects_invalid_utf8() {
        assert!(matches!(
            api_mount().capture("/api/%FF%FE"),
            Err(GatewayError::MalformedPath(_))
        ));
    }

    #[test]
    fn refuses_paths_outside_mount() {
        assert!(matches!(
            api_mount().capture("/apiary/x"),
            Err(GatewayError::Internal(_))
        ));
    }
}
