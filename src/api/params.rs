use serde_json::{Map, Value};
use thiserror::Error;

/// Parameters exactly as they arrived, after merging query string and body
pub type RawParams = Map<String, Value>;

#[derive(Error, Debug)]
pub enum ParamsError {
    #[error("Invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("JSON body must be an object, got {0}")]
    NotAnObject(&'static str),

    #[error("Invalid multipart body: {0}")]
    Multipart(String),

    #[error("Failed to read request body: {0}")]
    Body(String),
}

/// Values accepted in the `action` parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Crud,
    Auth,
    Whoami,
    Other(String),
}

impl Action {
    pub fn parse(value: &str) -> Self {
        match value {
            "crud" => Action::Crud,
            "auth" => Action::Auth,
            "whoami" => Action::Whoami,
            other => Action::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Action::Crud => "crud",
            Action::Auth => "auth",
            Action::Whoami => "whoami",
            Action::Other(s) => s,
        }
    }
}

/// Typed view of a request. Known keys are pulled out field by field,
/// everything else is kept in `fields` as record data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParams {
    pub token: Option<String>,
    pub action: Option<Action>,
    pub table: Option<String>,
    pub operation: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub id: Option<String>,
    /// Record payload for create/update; JSON text is decoded when it parses
    pub data: Option<Value>,
    pub fields: Map<String, Value>,
}

impl RequestParams {
    pub fn from_raw(mut raw: RawParams) -> Self {
        let mut take = |key: &str| raw.remove(key).and_then(scalar);

        let token = take("token");
        let action = take("action").map(|a| Action::parse(&a));
        let table = take("table");
        let operation = take("operation");
        let email = take("email");
        let password = take("password");
        let id = take("id");
        let data = raw.remove("data").map(decode_structured);

        Self {
            token,
            action,
            table,
            operation,
            email,
            password,
            id,
            data,
            fields: raw,
        }
    }

    pub fn action_name(&self) -> &str {
        self.action.as_ref().map(Action::as_str).unwrap_or("")
    }
}

/// Builds raw parameters from string pairs (query strings, form bodies, multipart text fields).
/// Later pairs overwrite earlier ones with the same key.
pub fn from_pairs<I, K, V>(pairs: I) -> RawParams
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), Value::String(v.into())))
        .collect()
}

/// Merges body parameters over query parameters; body keys win
pub fn merge(mut query: RawParams, body: RawParams) -> RawParams {
    query.extend(body);
    query
}

fn scalar(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn decode_structured(value: Value) -> Value {
    match value {
        Value::String(s) if s.starts_with('{') || s.starts_with('[') => {
            serde_json::from_str(&s).unwrap_or(Value::String(s))
        }
        other => other,
    }
}
