//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with one wildcard route per mount
//! - Register the shared forward handler for every supported method
//! - Wire up middleware (tracing)
//! - Bind server to listener and shut down gracefully

use std::sync::Arc;

use axum::{
    routing::{MethodFilter, MethodRouter},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::error::GatewayResult;
use crate::http::forward::{build_client, forward, AppState, ForwardState};
use crate::http::response::not_mounted;
use crate::lifecycle::ShutdownSignal;
use crate::resilience::UpstreamTimeouts;
use crate::routing::Mount;

/// Methods forwarded on every mount. Anything else gets 405 from the router.
pub const FORWARDED_METHODS: [MethodFilter; 7] = [
    MethodFilter::GET,
    MethodFilter::HEAD,
    MethodFilter::POST,
    MethodFilter::PUT,
    MethodFilter::PATCH,
    MethodFilter::DELETE,
    MethodFilter::OPTIONS,
];

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    mount_count: usize,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let timeouts = UpstreamTimeouts::from(&config.timeouts);
        let client = build_client(&timeouts)?;

        let state = Arc::new(AppState {
            client,
            override_base: config
                .upstream
                .base_url
                .as_deref()
                .map(|base| base.trim_end_matches('/').to_string()),
            timeouts,
            strip_response_hop_by_hop: config.security.strip_response_hop_by_hop,
        });

        let mounts: Vec<Mount> = config.mounts.iter().map(Mount::from_config).collect();
        let mount_count = mounts.len();
        let router = Self::build_router(state, mounts);

        Ok(Self { router, mount_count })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: Arc<AppState>, mounts: Vec<Mount>) -> Router {
        let mut router = Router::new();
        for mount in mounts {
            tracing::debug!(
                route = %mount.route_pattern(),
                upstream_prefix = ?mount.upstream_prefix(),
                fallback = ?mount.fallback(),
                "Registering mount"
            );
            let pattern = mount.route_pattern();
            let mount_state = ForwardState {
                app: Arc::clone(&state),
                mount: Arc::new(mount),
            };
            router = router.merge(
                Router::new()
                    .route(&pattern, forward_methods())
                    .with_state(mount_state),
            );
        }

        router
            .fallback(not_mounted)
            .layer(TraceLayer::new_for_http())
    }

    /// A clone of the fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mounts = self.mount_count,
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// The single method table shared by every mount.
fn forward_methods() -> MethodRouter<ForwardState> {
    FORWARDED_METHODS
        .iter()
        .fold(MethodRouter::new(), |methods, filter| methods.on(*filter, forward))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn server() -> HttpServer {
        let mut config = GatewayConfig::default();
        // Nothing listens here; these tests never reach an upstream.
        config.upstream.base_url = Some("http://127.0.0.1:9".into());
        HttpServer::new(config).unwrap()
    }

    #[tokio::test]
    async fn run_stops_when_shutdown_already_triggered() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let shutdown = crate::lifecycle::Shutdown::new();
        let signal = shutdown.subscribe();
        shutdown.trigger();

        tokio::time::timeout(
            std::time::Duration::from_secs(5),
            server().run(listener, signal),
        )
        .await
        .expect("server ignored an earlier shutdown")
        .unwrap();
    }

    #[tokio::test]
    async fn unsupported_method_is_405() {
        let response = server()
            .router()
            .oneshot(
                Request::builder()
                    .method("TRACE")
                    .uri("/api/state")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn unknown_prefix_is_404() {
        let response = server()
            .router()
            .oneshot(Request::builder().uri("/static/app.js").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn dot_segments_are_bad_requests() {
        let response = server()
            .router()
            .oneshot(
                Request::builder()
                    .uri("/api/%2e%2e/admin")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn same_origin_without_host_is_bad_request() {
        let server = HttpServer::new(GatewayConfig::default()).unwrap();
        let response = server
            .router()
            .oneshot(Request::builder().uri("/api/state").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
