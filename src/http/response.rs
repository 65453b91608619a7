//! Response handling.
//!
//! # Responsibilities
//! - Map gateway errors to HTTP responses with a JSON body
//! - Answer requests that hit no mount
//!
//! # Design Decisions
//! - Upstream responses (including upstream 4xx/5xx) are never rewritten here
//! - Gateway-generated errors carry `{"error": "..."}` so the game UI can show them

use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::GatewayError;

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Fallback for paths outside every mount.
pub async fn not_mounted(uri: Uri) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("no mount serves '{}'", uri.path()) })),
    )
        .into_response()
}
