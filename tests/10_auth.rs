mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn get(server: &common::TestServer, params: &[(&str, &str)]) -> Result<(StatusCode, Value)> {
    let res = reqwest::Client::new()
        .get(server.exec_url())
        .query(params)
        .send()
        .await?;
    let status = res.status();
    Ok((status, res.json::<Value>().await?))
}

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::spawn_mock().await?;

    let res = reqwest::get(format!("{}/health", server.base_url)).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["ok"], true);
    assert_eq!(body["data"]["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn missing_or_wrong_token_is_rejected() -> Result<()> {
    let server = common::spawn_mock().await?;

    for params in [vec![("action", "whoami")], vec![("token", "invalid-token"), ("action", "whoami")]] {
        let (status, body) = get(&server, &params).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["ok"], false);
        assert_eq!(body["status"], 401);
        assert!(body["message"].as_str().unwrap().starts_with("Invalid token. Expected: demo-token-2024"));
        assert!(body["timestamp"].is_string());
    }
    Ok(())
}

#[tokio::test]
async fn login_with_fixed_credentials() -> Result<()> {
    let server = common::spawn_mock().await?;
    let params = [
        ("token", common::TOKEN),
        ("action", "auth"),
        ("email", "admin@servesplatform.com"),
        ("password", "admin123"),
    ];

    let (status, first) = get(&server, &params).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["ok"], true);
    assert_eq!(first["data"]["user"]["rol"], "admin");
    assert_eq!(first["data"]["user"]["email"], "admin@servesplatform.com");
    assert_eq!(first["data"]["message"], "Login successful");

    let token = first["data"]["token"].as_str().unwrap();
    let digits = token.strip_prefix("mock-jwt-token-").expect("token prefix");
    assert!(!digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()));

    let (_, second) = get(&server, &params).await?;
    assert_ne!(second["data"]["token"], first["data"]["token"]);
    Ok(())
}

#[tokio::test]
async fn login_with_json_body() -> Result<()> {
    let server = common::spawn_mock().await?;

    let res = reqwest::Client::new()
        .post(server.exec_url())
        .json(&json!({
            "token": common::TOKEN,
            "action": "auth",
            "email": "admin@servesplatform.com",
            "password": "admin123",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["ok"], true);
    assert_eq!(body["data"]["user"]["rol"], "admin");

    let token = body["data"]["token"].as_str().unwrap();
    let digits = token.strip_prefix("mock-jwt-token-").expect("token prefix");
    assert!(!digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()));
    Ok(())
}

#[tokio::test]
async fn login_with_other_credentials_fails() -> Result<()> {
    let server = common::spawn_mock().await?;

    let (status, body) = get(
        &server,
        &[
            ("token", common::TOKEN),
            ("action", "auth"),
            ("email", "someone@example.com"),
            ("password", "admin123"),
        ],
    )
    .await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["ok"], false);
    assert_eq!(body["status"], 401);
    assert_eq!(body["message"], "Invalid credentials");
    Ok(())
}

#[tokio::test]
async fn whoami_returns_same_admin_every_time() -> Result<()> {
    let server = common::spawn_mock().await?;
    let params = [("token", common::TOKEN), ("action", "whoami")];

    let (_, a) = get(&server, &params).await?;
    let (_, b) = get(&server, &params).await?;
    assert_eq!(a["ok"], true);
    assert_eq!(a["data"], b["data"]);
    assert_eq!(a["data"]["rol"], "admin");
    assert_eq!(a["data"]["nombre"], "Administrador");
    Ok(())
}
