mod common;

use anyhow::Result;
use axum::{routing::get, Router};
use reqwest::StatusCode;
use serde_json::{json, Value};
use serves_api_rust::app::with_common_layers;
use serves_api_rust::config::AppConfig;

const WHOAMI: [(&str, &str); 2] = [("token", common::TOKEN), ("action", "whoami")];

#[tokio::test]
async fn every_post_encoding_matches_get() -> Result<()> {
    let server = common::spawn_mock().await?;
    let client = reqwest::Client::new();
    let url = server.exec_url();

    let via_get: Value = client.get(&url).query(&WHOAMI).send().await?.json().await?;
    let via_form: Value = client.post(&url).form(&WHOAMI).send().await?.json().await?;
    let via_json: Value = client
        .post(&url)
        .json(&json!({ "token": common::TOKEN, "action": "whoami" }))
        .send()
        .await?
        .json()
        .await?;
    let multipart = reqwest::multipart::Form::new()
        .text("token", common::TOKEN)
        .text("action", "whoami");
    let via_multipart: Value = client.post(&url).multipart(multipart).send().await?.json().await?;

    for body in [&via_form, &via_json, &via_multipart] {
        assert_eq!(body["ok"], true);
        assert_eq!(body["data"], via_get["data"]);
    }
    Ok(())
}

#[tokio::test]
async fn post_body_overrides_query_string() -> Result<()> {
    let server = common::spawn_mock().await?;

    let res = reqwest::Client::new()
        .post(format!("{}?token=wrong&action=whoami", server.exec_url()))
        .form(&[("token", common::TOKEN)])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["data"]["rol"], "admin");
    Ok(())
}

#[tokio::test]
async fn root_path_serves_the_endpoint_too() -> Result<()> {
    let server = common::spawn_mock().await?;

    let body: Value = reqwest::Client::new()
        .get(format!("{}/", server.base_url))
        .query(&WHOAMI)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["data"]["rol"], "admin");
    Ok(())
}

#[tokio::test]
async fn malformed_json_body_is_a_500_envelope() -> Result<()> {
    let server = common::spawn_mock().await?;

    let res = reqwest::Client::new()
        .post(server.exec_url())
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = res.json::<Value>().await?;
    assert_eq!(body["ok"], false);
    assert_eq!(body["status"], 500);
    assert!(body["message"].as_str().unwrap().starts_with("Internal server error: Invalid JSON body"));
    Ok(())
}

#[tokio::test]
async fn unknown_route_is_an_envelope() -> Result<()> {
    let server = common::spawn_mock().await?;

    let res = reqwest::get(format!("{}/nope", server.base_url)).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<Value>().await?;
    assert_eq!(body["ok"], false);
    assert_eq!(body["status"], 404);
    Ok(())
}

async fn explode() -> &'static str {
    panic!("sheet not found")
}

#[tokio::test]
async fn handler_panic_becomes_500_envelope() -> Result<()> {
    let router = with_common_layers(Router::new().route("/exec", get(explode)), &AppConfig::development());
    let server = common::spawn_router(router).await?;

    let res = reqwest::get(server.exec_url()).await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = res.json::<Value>().await?;
    assert_eq!(body["ok"], false);
    assert_eq!(body["status"], 500);
    assert_eq!(body["message"], "Internal server error: sheet not found");
    Ok(())
}
