mod common;

use std::collections::HashSet;

use anyhow::Result;
use serde_json::{json, Value};

async fn call(server: &common::TestServer, params: &[(&str, &str)]) -> Result<Value> {
    let mut query = vec![("token", common::TOKEN)];
    query.extend_from_slice(params);
    Ok(reqwest::Client::new()
        .get(server.exec_url())
        .query(&query)
        .send()
        .await?
        .json::<Value>()
        .await?)
}

#[tokio::test]
async fn list_returns_five_active_materials() -> Result<()> {
    let server = common::spawn_mock().await?;

    let body = call(&server, &[("action", "crud"), ("table", "Materiales"), ("operation", "list")]).await?;
    assert_eq!(body["ok"], true);

    let records = body["data"].as_array().expect("data array");
    assert_eq!(records.len(), 5);

    let skus: HashSet<_> = records.iter().map(|r| r["sku"].as_str().unwrap()).collect();
    assert_eq!(skus.len(), 5);
    assert!(records.iter().all(|r| r["activo"] == true));

    assert_eq!(records[0]["sku"], "MAT001");
    assert_eq!(records[0]["costo_ref"], 25.5);
    assert_eq!(records[3]["unidad"], "m³");
    assert!(records[0]["fecha_creacion"].is_string());
    Ok(())
}

#[tokio::test]
async fn mutations_fall_through_to_empty_list() -> Result<()> {
    let server = common::spawn_mock().await?;

    for operation in ["create", "update", "delete", "get"] {
        let body = call(
            &server,
            &[("action", "crud"), ("table", "Materiales"), ("operation", operation), ("id", "MAT001")],
        )
        .await?;
        assert_eq!(body["ok"], true, "operation {}", operation);
        assert_eq!(body["data"], json!([]), "operation {}", operation);
    }

    // Still the full catalog afterwards: nothing was mutated
    let body = call(&server, &[("action", "crud"), ("table", "Materiales"), ("operation", "list")]).await?;
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
    Ok(())
}

#[tokio::test]
async fn other_tables_and_actions_are_empty() -> Result<()> {
    let server = common::spawn_mock().await?;

    for params in [
        vec![("action", "crud"), ("table", "Proyectos"), ("operation", "list")],
        vec![("action", "crud"), ("table", "materials"), ("operation", "list")],
        vec![("action", "health")],
        vec![("action", "getDashboardStats")],
        vec![],
    ] {
        let body = call(&server, &params).await?;
        assert_eq!(body["ok"], true);
        assert_eq!(body["data"], json!([]));
    }
    Ok(())
}
