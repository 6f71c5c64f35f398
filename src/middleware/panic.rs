use std::any::Any;

use axum::response::{IntoResponse, Response};

use crate::error::ApiError;

/// Turns a handler panic into a 500 envelope carrying the panic text.
/// Installed through `CatchPanicLayer::custom`.
pub fn panic_to_envelope(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    tracing::error!("handler panicked: {}", details);
    ApiError::internal_server_error(details).into_response()
}
