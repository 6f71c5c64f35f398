#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::Router;
use reqwest::StatusCode;
use serves_api_rust::config::{AppConfig, ClientConfig};
use tokio::net::TcpListener;

pub const TOKEN: &str = "demo-token-2024";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
}

impl TestServer {
    /// The mock endpoint URL the diagnostic client should target
    pub fn exec_url(&self) -> String {
        format!("{}/exec", self.base_url)
    }

    pub fn client_config(&self, timeout: Duration) -> ClientConfig {
        ClientConfig::new(self.exec_url(), TOKEN, timeout)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                // Custom routers have no /health; any answer means the listener is up
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::NOT_FOUND {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

/// Serve `router` on a free local port inside the current test runtime
pub async fn spawn_router(router: Router) -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    let server = TestServer {
        port,
        base_url: format!("http://127.0.0.1:{}", port),
    };
    server.wait_ready(Duration::from_secs(5)).await?;
    Ok(server)
}

/// The real mock endpoint with development defaults
pub async fn spawn_mock() -> Result<TestServer> {
    spawn_router(serves_api_rust::app(&AppConfig::development())).await
}

/// A local port with nothing listening on it
pub fn closed_port_url() -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    Ok(format!("http://127.0.0.1:{}/exec", port))
}
