use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Uniform response body for every mock endpoint call
///
/// Success: `{ "ok": true, "data": ..., "timestamp": ... }`
/// Failure: `{ "ok": false, "message": ..., "status": 401, "timestamp": ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default)]
    pub timestamp: String,
}

impl Envelope {
    pub fn success(data: Value) -> Self {
        Self {
            ok: true,
            data: Some(data),
            message: None,
            status: None,
            timestamp: now_timestamp(),
        }
    }

    pub fn failure(message: impl Into<String>, status: u16) -> Self {
        Self {
            ok: false,
            data: None,
            message: Some(message.into()),
            status: Some(status),
            timestamp: now_timestamp(),
        }
    }

    /// Checks the shape invariant: `ok=true` carries data, `ok=false` carries message and status
    pub fn is_well_formed(&self) -> bool {
        if self.ok {
            self.data.is_some()
        } else {
            self.message.is_some() && self.status.is_some()
        }
    }
}

/// ISO-8601 UTC with millisecond precision, e.g. `2024-05-01T12:00:00.000Z`
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
