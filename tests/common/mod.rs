//! Shared utilities for gateway integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use lab_gateway::{GatewayConfig, HttpServer, Shutdown};

/// What a mock upstream saw for one request.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    /// Path and query exactly as received.
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// An upstream that records every request and answers with a fixed response.
pub struct RecordingUpstream {
    pub addr: SocketAddr,
    captured: Arc<Mutex<Vec<Captured>>>,
}

impl RecordingUpstream {
    pub async fn start(status: StatusCode, body: &'static str) -> Self {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&captured);

        let app = Router::new().fallback(move |request: Request<Body>| {
            let sink = Arc::clone(&sink);
            async move {
                let (parts, inbound) = request.into_parts();
                let bytes = to_bytes(inbound, usize::MAX).await.unwrap_or_default();
                sink.lock().unwrap().push(Captured {
                    method: parts.method,
                    path_and_query: parts
                        .uri
                        .path_and_query()
                        .map(|pq| pq.as_str().to_string())
                        .unwrap_or_default(),
                    headers: parts.headers,
                    body: bytes.to_vec(),
                });
                (
                    status,
                    [
                        ("content-type", "application/json"),
                        ("x-upstream", "recorded"),
                    ],
                    body,
                )
                    .into_response()
            }
        });

        let addr = spawn_upstream(app).await;
        Self { addr, captured }
    }

    /// Requests seen so far.
    pub fn requests(&self) -> Vec<Captured> {
        self.captured.lock().unwrap().clone()
    }

    /// The single request seen so far.
    pub fn only_request(&self) -> Captured {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one upstream request");
        requests.into_iter().next().unwrap()
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Serve `app` on an ephemeral port.
pub async fn spawn_upstream(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Start a raw TCP backend that writes `response` verbatim to every connection.
pub async fn start_raw_backend(response: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                // Read the request head before answering.
                let mut buf = vec![0u8; 8192];
                let mut seen = Vec::new();
                while !seen.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => seen.extend_from_slice(&buf[..n]),
                    }
                }
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Send `request` verbatim to `addr` and return the response status line.
///
/// Used for request targets an HTTP client would normalize before sending,
/// such as encoded dot segments.
pub async fn raw_status_line(addr: SocketAddr, request: &str) -> String {
    let mut socket = TcpStream::connect(addr).await.unwrap();
    socket.write_all(request.as_bytes()).await.unwrap();

    let mut buf = vec![0u8; 8192];
    let mut seen = Vec::new();
    while !seen.windows(2).any(|w| w == b"\r\n") {
        match socket.read(&mut buf).await.unwrap() {
            0 => break,
            n => seen.extend_from_slice(&buf[..n]),
        }
    }
    let head = String::from_utf8_lossy(&seen);
    head.lines().next().unwrap_or_default().to_string()
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Default config with the upstream override pointing at `base`.
pub fn config_with_override(base: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.upstream.base_url = Some(base.to_string());
    config
}

/// A running gateway.
pub struct Gateway {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl Gateway {
    pub async fn start(config: GatewayConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = HttpServer::new(config).unwrap();
        let shutdown = Shutdown::new();
        let server_shutdown = shutdown.subscribe();

        tokio::spawn(async move {
            let _ = server.run(listener, server_shutdown).await;
        });

        Self { addr, shutdown }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Calling client: no system proxy, no redirect following.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// Always-500 handler used to prove gateway errors are not confused with
/// upstream application errors.
pub async fn failing_handler() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
}
