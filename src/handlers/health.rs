use axum::http::Uri;
use serde_json::json;

use crate::api::Envelope;
use crate::error::ApiError;
use crate::middleware::EnvelopeResponse;

/// GET /health - liveness probe, no token required
pub async fn health() -> EnvelopeResponse {
    Envelope::success(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
    .into()
}

/// Anything outside the mock endpoint still answers with an envelope
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}
