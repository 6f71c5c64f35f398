// handlers/exec.rs - GET|POST /exec (and /) mock endpoint
//
// Both methods end up in MockApi::respond with one merged parameter map.
// POST bodies may be JSON, urlencoded or multipart; all are read the same way.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, RawQuery, Request, State},
    http::header::CONTENT_TYPE,
};
use serde_json::Value;

use crate::api::params::{from_pairs, merge};
use crate::api::{ParamsError, RawParams, RequestParams};
use crate::error::ApiError;
use crate::middleware::EnvelopeResponse;
use crate::services::MockApi;

/// GET /exec?token=...&action=...
pub async fn exec_get(State(api): State<Arc<MockApi>>, RawQuery(query): RawQuery) -> EnvelopeResponse {
    let params = RequestParams::from_raw(parse_query(query.as_deref()));
    api.respond(&params).into()
}

/// POST /exec with parameters in the body, the query string, or both
pub async fn exec_post(
    State(api): State<Arc<MockApi>>,
    RawQuery(query): RawQuery,
    request: Request,
) -> EnvelopeResponse {
    let body = match read_body(request).await {
        Ok(body) => body,
        Err(err) => return ApiError::from(err).to_envelope().into(),
    };

    let params = RequestParams::from_raw(merge(parse_query(query.as_deref()), body));
    api.respond(&params).into()
}

fn parse_query(query: Option<&str>) -> RawParams {
    match query {
        Some(q) => from_pairs(url::form_urlencoded::parse(q.as_bytes()).into_owned()),
        None => RawParams::new(),
    }
}

async fn read_body(request: Request) -> Result<RawParams, ParamsError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        return read_multipart(request).await;
    }

    let bytes = Bytes::from_request(request, &())
        .await
        .map_err(|e| ParamsError::Body(e.to_string()))?;
    parse_body(&content_type, &bytes)
}

async fn read_multipart(request: Request) -> Result<RawParams, ParamsError> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| ParamsError::Multipart(e.to_string()))?;

    let mut raw = RawParams::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ParamsError::Multipart(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let value = field.text().await.map_err(|e| ParamsError::Multipart(e.to_string()))?;
        raw.insert(name, Value::String(value));
    }
    Ok(raw)
}

/// Decode a non-multipart body. JSON when declared (or when an undeclared body
/// starts with `{`), urlencoded otherwise.
pub fn parse_body(content_type: &str, bytes: &[u8]) -> Result<RawParams, ParamsError> {
    let first = bytes.iter().find(|b| !b.is_ascii_whitespace());
    let Some(first) = first else {
        return Ok(RawParams::new());
    };

    let is_json = content_type.starts_with("application/json") || (content_type.is_empty() && *first == b'{');
    if !is_json {
        return Ok(from_pairs(url::form_urlencoded::parse(bytes).into_owned()));
    }

    match serde_json::from_slice::<Value>(bytes)? {
        Value::Object(map) => Ok(map),
        Value::Array(_) => Err(ParamsError::NotAnObject("array")),
        Value::String(_) => Err(ParamsError::NotAnObject("string")),
        Value::Number(_) => Err(ParamsError::NotAnObject("number")),
        Value::Bool(_) => Err(ParamsError::NotAnObject("boolean")),
        Value::Null => Err(ParamsError::NotAnObject("null")),
    }
}
