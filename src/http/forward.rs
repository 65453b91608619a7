//! The forwarding handler.
//!
//! One handler serves every mount and every supported method:
//! resolve target → filter headers → attach body (non-GET/HEAD only)
//! → one outbound request → relay status, headers and body.
//!
//! Bodies are never buffered. The inbound `Body` is handed to the client as
//! the outbound body, and the upstream `Incoming` becomes the response body.
//! Dropping this future (caller gone) drops the outbound request with it.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    response::{IntoResponse, Response},
};
use hyper::body::Incoming;
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::{TokioExecutor, TokioTimer},
};

use crate::error::{GatewayError, GatewayResult};
use crate::observability::metrics;
use crate::resilience::{with_deadline, UpstreamTimeouts};
use crate::routing::{target::upstream_uri, Mount};
use crate::security::{filter_request_headers, strip_hop_by_hop};

/// Outbound client: plain HTTP or TLS, HTTP/1.1 or HTTP/2 by ALPN.
pub type UpstreamClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Process-wide, read-only state shared by every mount.
pub struct AppState {
    pub client: UpstreamClient,
    /// Explicit upstream base, trailing slash already stripped.
    pub override_base: Option<String>,
    pub timeouts: UpstreamTimeouts,
    pub strip_response_hop_by_hop: bool,
}

/// Handler state for one mount.
#[derive(Clone)]
pub struct ForwardState {
    pub app: Arc<AppState>,
    pub mount: Arc<Mount>,
}

/// Build the outbound client.
///
/// The client never follows redirects and has no cache, so a 3xx from the
/// upstream reaches the caller as-is and every request hits the upstream.
pub fn build_client(timeouts: &UpstreamTimeouts) -> GatewayResult<UpstreamClient> {
    let mut http = HttpConnector::new();
    http.enforce_http(false);
    http.set_nodelay(true);
    http.set_connect_timeout(Some(timeouts.connect));

    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_provider_and_webpki_roots(rustls::crypto::ring::default_provider())
        .map_err(|e| GatewayError::Internal(format!("TLS setup failed: {}", e)))?
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .wrap_connector(http);

    Ok(Client::builder(TokioExecutor::new())
        .pool_timer(TokioTimer::new())
        .pool_idle_timeout(timeouts.idle)
        .build(https))
}

/// Forward one inbound request on the state's mount.
pub async fn forward(State(state): State<ForwardState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let mount = state.mount.prefix();

    match forward_request(&state, request).await {
        Ok(response) => {
            let status = response.status();
            tracing::debug!(
                mount = %mount,
                method = %method,
                path = %path,
                status = status.as_u16(),
                "Upstream responded"
            );
            metrics::record_request(mount, method.as_str(), status.as_u16(), start);
            response
        }
        Err(e) => {
            let status = e.status();
            if status.is_server_error() {
                tracing::warn!(mount = %mount, method = %method, path = %path, error = %e, "Forwarding failed");
            } else {
                tracing::debug!(mount = %mount, method = %method, path = %path, error = %e, "Rejected request");
            }
            metrics::record_request(mount, method.as_str(), status.as_u16(), start);
            e.into_response()
        }
    }
}

async fn forward_request(state: &ForwardState, request: Request<Body>) -> GatewayResult<Response> {
    let app = &state.app;
    let (parts, body) = request.into_parts();

    let target = upstream_uri(
        app.override_base.as_deref(),
        &state.mount,
        &parts.uri,
        &parts.headers,
    )?;

    // Some stacks reject or mishandle a body on GET/HEAD.
    let body = if carries_body(&parts.method) {
        body
    } else {
        Body::empty()
    };

    let mut outbound = Request::new(body);
    *outbound.method_mut() = parts.method;
    *outbound.uri_mut() = target;
    *outbound.headers_mut() = filter_request_headers(parts.headers);

    tracing::trace!(upstream = %outbound.uri(), "Forwarding request");

    let response = with_deadline(app.timeouts.response, async {
        app.client
            .request(outbound)
            .await
            .map_err(|e| GatewayError::from_client(&e))
    })
    .await?;

    let (mut parts, body): (_, Incoming) = response.into_parts();
    if app.strip_response_hop_by_hop {
        strip_hop_by_hop(&mut parts.headers);
    }
    Ok(Response::from_parts(parts, Body::new(body)))
}

/// Whether the inbound body is forwarded for `method`.
pub fn carries_body(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD)
}
