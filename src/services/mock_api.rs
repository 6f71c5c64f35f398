use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde_json::{json, Value};

use crate::api::{Action, Envelope, RequestParams};
use crate::config::{AppConfig, AuthConfig};
use crate::error::ApiError;
use crate::models::{sample_materials, LoginResponse, User, MATERIALS_TABLE};

/// Which canned behavior a request resolves to. First match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    ListMaterials,
    Auth,
    Whoami,
    Fallback,
}

impl Route {
    pub fn resolve(params: &RequestParams) -> Self {
        match params.action.as_ref() {
            Some(Action::Crud)
                if params.table.as_deref() == Some(MATERIALS_TABLE)
                    && params.operation.as_deref() == Some("list") =>
            {
                Route::ListMaterials
            }
            Some(Action::Auth) => Route::Auth,
            Some(Action::Whoami) => Route::Whoami,
            // create/update/delete and every other table land here on purpose
            _ => Route::Fallback,
        }
    }
}

/// Stateless mock backend. The only mutable state is the last issued token
/// timestamp, kept so successive logins never hand out the same token.
#[derive(Debug)]
pub struct MockApi {
    shared_secret: String,
    auth: AuthConfig,
    echo_token_in_errors: bool,
    last_token_ms: AtomicI64,
}

impl MockApi {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            shared_secret: config.server.shared_secret.clone(),
            auth: config.auth.clone(),
            echo_token_in_errors: config.security.echo_token_in_errors,
            last_token_ms: AtomicI64::new(0),
        }
    }

    /// Handle a request and always produce an envelope
    pub fn respond(&self, params: &RequestParams) -> Envelope {
        match self.handle(params) {
            Ok(data) => Envelope::success(data),
            Err(err) => err.to_envelope(),
        }
    }

    /// Validate the token, then dispatch to the matching canned behavior
    pub fn handle(&self, params: &RequestParams) -> Result<Value, ApiError> {
        self.authorize(params)?;

        let route = Route::resolve(params);
        tracing::info!(action = params.action_name(), ?route, "handling mock request");

        match route {
            Route::ListMaterials => to_data(sample_materials(Utc::now())),
            Route::Auth => to_data(self.login(params)?),
            Route::Whoami => to_data(self.admin()),
            Route::Fallback => {
                tracing::debug!(
                    table = params.table.as_deref().unwrap_or(""),
                    operation = params.operation.as_deref().unwrap_or(""),
                    "no handler for request, returning empty list"
                );
                Ok(json!([]))
            }
        }
    }

    fn authorize(&self, params: &RequestParams) -> Result<(), ApiError> {
        match params.token.as_deref() {
            Some(token) if token == self.shared_secret => Ok(()),
            other => {
                tracing::warn!(action = params.action_name(), "rejected request with invalid token");
                if self.echo_token_in_errors {
                    Err(ApiError::unauthorized(format!(
                        "Invalid token. Expected: {}, Got: {}",
                        self.shared_secret,
                        other.unwrap_or("none")
                    )))
                } else {
                    Err(ApiError::unauthorized("Invalid token"))
                }
            }
        }
    }

    fn login(&self, params: &RequestParams) -> Result<LoginResponse, ApiError> {
        let email_matches = params.email.as_deref() == Some(self.auth.admin_email.as_str());
        let password_matches = params.password.as_deref() == Some(self.auth.admin_password.as_str());

        if !(email_matches && password_matches) {
            tracing::warn!(email = params.email.as_deref().unwrap_or(""), "login failed");
            return Err(ApiError::unauthorized("Invalid credentials"));
        }

        Ok(LoginResponse {
            user: self.admin(),
            token: self.issue_token(),
            message: "Login successful".to_string(),
        })
    }

    fn admin(&self) -> User {
        User::admin(&self.auth.admin_email)
    }

    /// `<prefix><epoch millis>`, strictly increasing within this process
    fn issue_token(&self) -> String {
        let now = Utc::now().timestamp_millis();
        let previous = self
            .last_token_ms
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |prev| Some(now.max(prev + 1)))
            .unwrap_or_else(|prev| prev);
        format!("{}{}", self.auth.token_prefix, now.max(previous + 1))
    }
}

fn to_data<T: serde::Serialize>(value: T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(ApiError::internal_server_error)
}
