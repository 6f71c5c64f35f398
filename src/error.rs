// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::Value;

use crate::api::{Envelope, ParamsError};

/// HTTP API error rendered as an `ok=false` envelope
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Unauthorized(_) => 401,
            ApiError::NotFound(_) => 404,
            ApiError::InternalServerError(_) => 500,
        }
    }

    /// Get client-facing error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
        }
    }

    pub fn to_envelope(&self) -> Envelope {
        Envelope::failure(self.message(), self.status_code())
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self.to_envelope()).unwrap_or(Value::Null)
    }
}

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    /// Wraps a fault's text the way every 500 is reported: `Internal server error: <fault>`
    pub fn internal_server_error(fault: impl std::fmt::Display) -> Self {
        ApiError::InternalServerError(format!("Internal server error: {}", fault))
    }
}

impl From<ParamsError> for ApiError {
    fn from(err: ParamsError) -> Self {
        tracing::error!("Request parameter extraction failed: {}", err);
        ApiError::internal_server_error(err)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_envelope())).into_response()
    }
}
