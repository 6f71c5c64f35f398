use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a single diagnostic request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// 2xx, JSON, envelope `ok=true`
    Success,
    /// JSON envelope with `ok=false`
    ApplicationError,
    /// Non-2xx without a JSON body
    HttpError,
    /// 2xx but not `application/json`
    ContentTypeMismatch,
    /// Declared JSON that failed to parse, or an envelope missing its required members
    MalformedJson,
    Timeout,
    /// Connection refused, DNS failure, reset, abort
    Transport,
    /// Not sent because prerequisites were missing
    Skipped,
}

impl Outcome {
    /// Faults below the application layer; the handler never saw or never answered the request
    pub fn is_transport_fault(&self) -> bool {
        matches!(
            self,
            Outcome::Timeout | Outcome::Transport | Outcome::ContentTypeMismatch | Outcome::MalformedJson
        )
    }
}

/// One request/response exchange as reported to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub outcome: Outcome,
    pub url: String,
}

impl DiagnosticResult {
    pub fn fault(outcome: Outcome, error: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            success: false,
            status: None,
            response_time_ms: None,
            data: None,
            error: Some(error.into()),
            outcome,
            url: url.into(),
        }
    }

    /// The `data` member of a successful envelope
    pub fn payload(&self) -> Option<&Value> {
        self.data.as_ref().and_then(|d| d.get("data"))
    }
}
