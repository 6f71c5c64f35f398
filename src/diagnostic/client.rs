use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

use super::result::{DiagnosticResult, Outcome};
use crate::api::Envelope;
use crate::config::{ClientConfig, ConfigError};

/// Longest body excerpt kept when a response is not JSON
const BODY_SNIPPET_CHARS: usize = 200;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Transport(#[source] reqwest::Error),
}

/// How parameters travel to the endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Transport {
    /// Query string
    #[default]
    Get,
    /// `application/json` body
    Json,
    /// `application/x-www-form-urlencoded` body
    Form,
    /// `multipart/form-data` body
    Multipart,
}

impl Transport {
    pub const ALL: [Transport; 4] = [Transport::Get, Transport::Form, Transport::Multipart, Transport::Json];

    pub fn label(&self) -> &'static str {
        match self {
            Transport::Get => "GET query",
            Transport::Json => "POST json",
            Transport::Form => "POST form",
            Transport::Multipart => "POST multipart",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenChoice {
    Configured,
    Override(String),
    Omit,
}

/// A request to the mock endpoint, built up before sending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    action: Option<String>,
    params: Vec<(String, String)>,
    token: TokenChoice,
    transport: Transport,
}

impl ApiRequest {
    pub fn action(action: impl Into<String>) -> Self {
        Self {
            action: Some(action.into()),
            params: Vec::new(),
            token: TokenChoice::Configured,
            transport: Transport::Get,
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params.extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Send this token instead of the configured one
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = TokenChoice::Override(token.into());
        self
    }

    pub fn without_token(mut self) -> Self {
        self.token = TokenChoice::Omit;
        self
    }

    pub fn via(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    pub fn action_name(&self) -> &str {
        self.action.as_deref().unwrap_or("")
    }
}

struct Reply {
    status: StatusCode,
    content_type: Option<String>,
    body: String,
}

/// Sends one request at a time to the mock endpoint and classifies the reply.
/// Never returns an error from `send`; every failure becomes a `DiagnosticResult`.
#[derive(Debug, Clone)]
pub struct DiagnosticClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
    timeout: Duration,
}

impl DiagnosticClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let base_url = config.validate()?;
        let http = reqwest::Client::builder().build().map_err(ClientError::Build)?;

        Ok(Self {
            http,
            base_url,
            token: config.token.clone(),
            timeout: config.timeout(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn send(&self, request: &ApiRequest) -> DiagnosticResult {
        let params = self.assemble(request);
        let url = self.display_url(request.transport, &params);
        tracing::debug!(%url, transport = request.transport.label(), "sending diagnostic request");

        let started = Instant::now();
        // Dropping the exchange future on expiry aborts the in-flight request
        let reply = match tokio::time::timeout(self.timeout, self.exchange(request.transport, &params)).await {
            Ok(reply) => reply,
            Err(_) => Err(ClientError::Timeout(self.timeout)),
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match reply {
            Ok(reply) => classify(reply, elapsed_ms, url),
            Err(err) => {
                tracing::debug!(%url, "diagnostic request failed: {}", err);
                let outcome = match err {
                    ClientError::Timeout(_) => Outcome::Timeout,
                    _ => Outcome::Transport,
                };
                DiagnosticResult::fault(outcome, err.to_string(), url)
            }
        }
    }

    fn assemble(&self, request: &ApiRequest) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(request.params.len() + 2);
        match &request.token {
            TokenChoice::Configured => params.push(("token".to_string(), self.token.clone())),
            TokenChoice::Override(token) => params.push(("token".to_string(), token.clone())),
            TokenChoice::Omit => {}
        }
        if let Some(action) = &request.action {
            params.push(("action".to_string(), action.clone()));
        }
        params.extend(request.params.iter().cloned());
        params
    }

    fn display_url(&self, transport: Transport, params: &[(String, String)]) -> String {
        match transport {
            Transport::Get => {
                let mut url = self.base_url.clone();
                url.query_pairs_mut().extend_pairs(params);
                url.to_string()
            }
            _ => self.base_url.to_string(),
        }
    }

    async fn exchange(&self, transport: Transport, params: &[(String, String)]) -> Result<Reply, ClientError> {
        let url = self.base_url.clone();
        let builder = match transport {
            Transport::Get => self.http.get(url).query(params),
            Transport::Json => {
                let body: Map<String, Value> = params
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect();
                self.http.post(url).json(&body)
            }
            Transport::Form => self.http.post(url).form(params),
            Transport::Multipart => {
                let form = params
                    .iter()
                    .fold(reqwest::multipart::Form::new(), |form, (k, v)| form.text(k.clone(), v.clone()));
                self.http.post(url).multipart(form)
            }
        };

        let response = builder
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(ClientError::Transport)?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.text().await.map_err(ClientError::Transport)?;

        Ok(Reply { status, content_type, body })
    }
}

fn classify(reply: Reply, elapsed_ms: u64, url: String) -> DiagnosticResult {
    let http_ok = reply.status.is_success();
    let is_json = reply
        .content_type
        .as_deref()
        .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false);

    let mut result = DiagnosticResult {
        success: false,
        status: Some(reply.status.as_u16()),
        response_time_ms: Some(elapsed_ms),
        data: None,
        error: None,
        outcome: Outcome::Success,
        url,
    };

    if !is_json {
        let snippet: String = reply.body.chars().take(BODY_SNIPPET_CHARS).collect();
        let content_type = reply.content_type.as_deref().unwrap_or("none");
        tracing::debug!(content_type, "non-JSON response received");

        result.data = Some(Value::String(snippet));
        if http_ok {
            result.outcome = Outcome::ContentTypeMismatch;
            result.error = Some(format!("Non-JSON response (content-type: {})", content_type));
        } else {
            result.outcome = Outcome::HttpError;
            result.error = Some(format!("HTTP {}", reply.status));
        }
        return result;
    }

    let value = match serde_json::from_str::<Value>(&reply.body) {
        Ok(value) => value,
        Err(e) => {
            result.outcome = Outcome::MalformedJson;
            result.error = Some(format!("Invalid JSON response: {}", e));
            result.data = Some(Value::String(reply.body.chars().take(BODY_SNIPPET_CHARS).collect()));
            return result;
        }
    };

    match serde_json::from_value::<Envelope>(value.clone()) {
        Ok(envelope) if !envelope.is_well_formed() => {
            result.outcome = Outcome::MalformedJson;
            result.error = Some("Incomplete response envelope".to_string());
        }
        Ok(envelope) => {
            result.success = http_ok && envelope.ok;
            if let Some(status) = envelope.status {
                result.status = Some(status);
            }
            if !result.success {
                result.outcome = Outcome::ApplicationError;
                result.error = Some(
                    envelope
                        .message
                        .unwrap_or_else(|| format!("HTTP {}", reply.status)),
                );
            }
        }
        // JSON that is not an envelope: trust the HTTP status alone
        Err(_) => {
            result.success = http_ok;
            if !http_ok {
                result.outcome = Outcome::HttpError;
                result.error = Some(format!("HTTP {}", reply.status));
            }
        }
    }

    result.data = Some(value);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> DiagnosticClient {
        DiagnosticClient::new(&ClientConfig::new(
            "http://127.0.0.1:9/exec",
            "demo-token-2024",
            Duration::from_millis(50),
        ))
        .unwrap()
    }

    fn reply(status: u16, content_type: Option<&str>, body: &str) -> Reply {
        Reply {
            status: StatusCode::from_u16(status).unwrap(),
            content_type: content_type.map(str::to_owned),
            body: body.to_string(),
        }
    }

    #[test]
    fn rejects_invalid_base_url() {
        let err = DiagnosticClient::new(&ClientConfig::new("not a url", "t", Duration::from_secs(1))).unwrap_err();
        assert!(matches!(err, ClientError::Config(ConfigError::InvalidUrl { .. })));

        let err = DiagnosticClient::new(&ClientConfig::new("http://127.0.0.1:9/exec", "t", Duration::ZERO)).unwrap_err();
        assert!(matches!(err, ClientError::Config(ConfigError::ZeroTimeout)));
    }

    #[test]
    fn assembles_token_and_action_first() {
        let c = client();
        let params = c.assemble(&ApiRequest::action("auth").param("email", "a@b.c"));
        assert_eq!(params[0], ("token".to_string(), "demo-token-2024".to_string()));
        assert_eq!(params[1], ("action".to_string(), "auth".to_string()));
        assert_eq!(params[2], ("email".to_string(), "a@b.c".to_string()));

        let params = c.assemble(&ApiRequest::action("whoami").without_token());
        assert_eq!(params.len(), 1);

        let params = c.assemble(&ApiRequest::action("whoami").with_token("invalid-token"));
        assert_eq!(params[0].1, "invalid-token");
    }

    #[test]
    fn get_url_carries_query() {
        let c = client();
        let params = c.assemble(&ApiRequest::action("whoami"));
        let url = c.display_url(Transport::Get, &params);
        assert_eq!(url, "http://127.0.0.1:9/exec?token=demo-token-2024&action=whoami");
        assert_eq!(c.display_url(Transport::Form, &params), "http://127.0.0.1:9/exec");
    }

    #[test]
    fn classifies_success_envelope() {
        let r = classify(
            reply(200, Some("application/json; charset=utf-8"), r#"{"ok":true,"data":[],"timestamp":"t"}"#),
            5,
            "u".into(),
        );
        assert!(r.success);
        assert_eq!(r.outcome, Outcome::Success);
        assert_eq!(r.status, Some(200));
        assert_eq!(r.response_time_ms, Some(5));
    }

    #[test]
    fn classifies_error_envelope_with_envelope_status() {
        let r = classify(
            reply(200, Some("application/json"), r#"{"ok":false,"message":"Invalid credentials","status":401,"timestamp":"t"}"#),
            5,
            "u".into(),
        );
        assert!(!r.success);
        assert_eq!(r.outcome, Outcome::ApplicationError);
        assert_eq!(r.status, Some(401));
        assert_eq!(r.error.as_deref(), Some("Invalid credentials"));
    }

    #[test]
    fn classifies_content_type_mismatch() {
        let body = "<html>".repeat(100);
        let r = classify(reply(200, Some("text/html"), &body), 5, "u".into());
        assert_eq!(r.outcome, Outcome::ContentTypeMismatch);
        assert!(!r.success);
        assert_eq!(r.data.as_ref().unwrap().as_str().unwrap().chars().count(), BODY_SNIPPET_CHARS);

        let r = classify(reply(502, None, "bad gateway"), 5, "u".into());
        assert_eq!(r.outcome, Outcome::HttpError);
    }

    #[test]
    fn classifies_malformed_json() {
        let r = classify(reply(200, Some("application/json"), "{nope"), 5, "u".into());
        assert_eq!(r.outcome, Outcome::MalformedJson);
        assert!(!r.success);
    }

    #[test]
    fn incomplete_envelope_is_malformed() {
        let r = classify(reply(200, Some("application/json"), r#"{"ok":false}"#), 5, "u".into());
        assert!(!r.success);
        assert_eq!(r.outcome, Outcome::MalformedJson);
        assert_eq!(r.error.as_deref(), Some("Incomplete response envelope"));

        let r = classify(reply(200, Some("application/json"), r#"{"ok":true,"data":null}"#), 5, "u".into());
        assert_eq!(r.outcome, Outcome::MalformedJson);
    }

    #[test]
    fn non_envelope_json_uses_http_status() {
        let r = classify(reply(200, Some("application/json"), r#"{"hello":"world"}"#), 5, "u".into());
        assert!(r.success);
        let r = classify(reply(404, Some("application/json"), r#"[]"#), 5, "u".into());
        assert_eq!(r.outcome, Outcome::HttpError);
    }
}
