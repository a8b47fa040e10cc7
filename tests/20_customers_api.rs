mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn full_customer_lifecycle() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let client = reqwest::Client::new();
    let base = format!("{}/customers", server.base_url);

    // Create
    let res = client.post(&base).json(&json!({ "name": "Alice" })).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let location = res
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("201 must carry a Location header");
    let created = res.json::<Value>().await?;

    let id = created["id"].as_str().expect("generated id").to_string();
    assert_eq!(location, format!("/customers/{}", id));
    assert_eq!(created["createdAt"], created["updatedAt"]);
    assert_ne!(id, "00000000-0000-0000-0000-000000000000");

    // Stale replace: claimed updatedAt equals the stored value
    let res = client
        .put(format!("{}/{}", base, id))
        .json(&json!({ "name": "Alicia", "updatedAt": created["updatedAt"] }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = res.json::<Value>().await?;
    assert_eq!(body["code"], "UNPROCESSABLE_ENTITY");
    assert!(body["field_errors"]["updatedAt"].is_string());

    // Entity is untouched
    let res = client.get(format!("{}/{}", base, id)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let current = res.json::<Value>().await?;
    assert_eq!(current["name"], "Alice");
    assert_eq!(current["updatedAt"], created["updatedAt"]);

    // Fresh replace: claimed updatedAt strictly newer than stored
    let claimed = chrono::DateTime::parse_from_rfc3339(created["updatedAt"].as_str().unwrap())?
        + chrono::Duration::seconds(1);
    let res = client
        .put(format!("{}/{}", base, id))
        .json(&json!({
            "name": "Alicia",
            "updatedAt": claimed.to_rfc3339(),
            "addresses": [{ "street": "1 Main St", "postCode": "12345", "country": "US" }]
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let updated = client
        .get(format!("{}/{}", base, id))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(updated["name"], "Alicia");
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["createdAt"], created["createdAt"]);
    assert_eq!(updated["addresses"][0]["postCode"], "12345");
    let before = chrono::DateTime::parse_from_rfc3339(created["updatedAt"].as_str().unwrap())?;
    let after = chrono::DateTime::parse_from_rfc3339(updated["updatedAt"].as_str().unwrap())?;
    assert!(after > before);

    // Delete is terminal; repeating it reports not-found
    let res = client.delete(format!("{}/{}", base, id)).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let res = client.get(format!("{}/{}", base, id)).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(res.bytes().await?.is_empty(), "404 must carry no body");
    let res = client.delete(format!("{}/{}", base, id)).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn create_ignores_caller_supplied_identity_and_timestamps() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let client = reqwest::Client::new();
    let base = format!("{}/customers", server.base_url);

    let supplied_id = "11111111-1111-1111-1111-111111111111";
    let res = client
        .post(&base)
        .json(&json!({
            "id": supplied_id,
            "createdAt": "2000-01-01T00:00:00Z",
            "updatedAt": "2000-01-01T00:00:00Z",
            "name": "Bob"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = res.json::<Value>().await?;

    assert_ne!(created["id"], supplied_id);
    assert_ne!(created["createdAt"], "2000-01-01T00:00:00Z");
    assert_eq!(created["createdAt"], created["updatedAt"]);

    Ok(())
}

#[tokio::test]
async fn validation_failures_report_field_errors() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let client = reqwest::Client::new();
    let base = format!("{}/customers", server.base_url);

    // Missing name
    let res = client.post(&base).json(&json!({})).send().await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = res.json::<Value>().await?;
    assert_eq!(body["field_errors"]["name"], "is required");

    // Nested address failures carry indexed paths
    let res = client
        .post(&base)
        .json(&json!({ "name": "Carol", "addresses": [{ "street": "nowhere" }] }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = res.json::<Value>().await?;
    assert!(body["field_errors"]["addresses[0].postCode"].is_string());
    assert!(body["field_errors"]["addresses[0].country"].is_string());

    // Nothing was stored
    let listing = client.get(&base).send().await?.json::<Value>().await?;
    assert_eq!(listing["totalCount"], 0);

    Ok(())
}

#[tokio::test]
async fn mutations_on_missing_ids_return_not_found() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let client = reqwest::Client::new();
    let base = format!("{}/customers", server.base_url);
    let missing = format!("{}/8f9f1dba-5bb3-4a0f-b6c3-0a2bb9e87f30", base);

    let res = client
        .put(&missing)
        .json(&json!({ "name": "Nobody", "updatedAt": "2030-01-01T00:00:00Z" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .patch(&missing)
        .json(&json!([{ "op": "replace", "path": "/name", "value": "Nobody" }]))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.get(&missing).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}
