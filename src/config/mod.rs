use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub security: SecurityConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Static token every request must carry in its `token` parameter
    pub shared_secret: String,
}

/// The single identity the mock endpoint knows about
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub admin_email: String,
    pub admin_password: String,
    pub token_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    /// Include the expected and received token in 401 messages
    pub echo_token_in_errors: bool,
}

/// Settings consumed by the diagnostic client, never by the handler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: String,
    pub timeout_ms: u64,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid base URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Base URL '{0}' must be http(s) with a host")]
    UnsupportedUrl(String),

    #[error("Timeout must be greater than zero")]
    ZeroTimeout,
}

pub const DEFAULT_SHARED_SECRET: &str = "demo-token-2024";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@servesplatform.com";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
pub const DEFAULT_TOKEN_PREFIX: &str = "mock-jwt-token-";

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("SERVES_API_HOST") {
            self.server.host = v;
        }
        if let Some(port) = env::var("SERVES_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }
        if let Ok(v) = env::var("SERVES_API_TOKEN") {
            self.server.shared_secret = v;
        }

        // Auth overrides
        if let Ok(v) = env::var("SERVES_ADMIN_EMAIL") {
            self.auth.admin_email = v;
        }
        if let Ok(v) = env::var("SERVES_ADMIN_PASSWORD") {
            self.auth.admin_password = v;
        }
        if let Ok(v) = env::var("SERVES_TOKEN_PREFIX") {
            self.auth.token_prefix = v;
        }

        // Security overrides
        if let Ok(v) = env::var("SERVES_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SERVES_ECHO_TOKEN") {
            self.security.echo_token_in_errors = v.parse().unwrap_or(self.security.echo_token_in_errors);
        }

        // Client overrides
        if let Ok(v) = env::var("NEXT_PUBLIC_API_URL") {
            self.client.base_url = v;
        }
        if let Ok(v) = env::var("NEXT_PUBLIC_API_TOKEN") {
            self.client.token = v;
        }
        if let Ok(v) = env::var("API_TIMEOUT_MS") {
            self.client.timeout_ms = v.parse().unwrap_or(self.client.timeout_ms);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                shared_secret: DEFAULT_SHARED_SECRET.to_string(),
            },
            auth: AuthConfig::default(),
            security: SecurityConfig {
                enable_cors: true,
                echo_token_in_errors: true,
            },
            client: ClientConfig::default(),
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                shared_secret: DEFAULT_SHARED_SECRET.to_string(),
            },
            auth: AuthConfig::default(),
            security: SecurityConfig {
                enable_cors: true,
                echo_token_in_errors: false,
            },
            client: ClientConfig {
                timeout_ms: 5_000,
                ..ClientConfig::default()
            },
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
            token_prefix: DEFAULT_TOKEN_PREFIX.to_string(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000/exec".to_string(),
            token: DEFAULT_SHARED_SECRET.to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The base URL, parsed and restricted to http(s) endpoints
    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.base_url).map_err(|source| ConfigError::InvalidUrl {
            url: self.base_url.clone(),
            source,
        })?;
        if !matches!(url.scheme(), "http" | "https") || url.host().is_none() {
            return Err(ConfigError::UnsupportedUrl(self.base_url.clone()));
        }
        Ok(url)
    }

    /// Everything a client needs before its first request
    pub fn validate(&self) -> Result<Url, ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        self.endpoint_url()
    }
}
