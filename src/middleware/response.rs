use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use crate::api::Envelope;

/// Wrapper that renders an envelope with an HTTP status matching its `status` field
#[derive(Debug)]
pub struct EnvelopeResponse(pub Envelope);

impl EnvelopeResponse {
    pub fn status_code(&self) -> StatusCode {
        match (self.0.ok, self.0.status) {
            (true, _) => StatusCode::OK,
            (false, Some(code)) => StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            (false, None) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Envelope> for EnvelopeResponse {
    fn from(envelope: Envelope) -> Self {
        Self(envelope)
    }
}

impl IntoResponse for EnvelopeResponse {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self.0)).into_response()
    }
}
