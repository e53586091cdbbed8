use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use warrantree::config::Config;

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.server.secure_cookies = false;

    let state = warrantree::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    warrantree::api::router(state).await
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    api_key: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = api_key {
        builder = builder.header("X-Api-Key", key);
    }

    let request = match body {
        Some(body) => builder
            .header("Content-Type", mime::APPLICATION_JSON.as_ref())
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

async fn register(app: &Router, name: &str) -> (i64, String) {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "name": name,
            "email": format!("{name}@example.com"),
            "password": "correct-horse",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "register failed: {body}");
    let id = body["data"]["user"]["id"].as_i64().unwrap();
    let key = body["data"]["api_key"].as_str().unwrap().to_string();
    (id, key)
}

#[tokio::test]
async fn test_auth_endpoints() {
    let app = spawn_app().await;

    let (status, _) = send(&app, "GET", "/api/vaults", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, "GET", "/api/vaults", Some("wrong-key"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (_, api_key) = register(&app, "alice").await;
    assert_eq!(api_key.len(), 64);

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&api_key), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert_eq!(body["data"]["role"], "USER");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/vaults")
                .header("Authorization", format!("Bearer {api_key}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "nope-nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Alice",
            "email": "alice@example.com",
            "password": "correct-horse",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/api-key/regenerate",
        Some(&api_key),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let new_key = body["data"]["api_key"].as_str().unwrap().to_string();
    assert_ne!(new_key, api_key);

    let (status, _) = send(&app, "GET", "/api/auth/me", Some(&api_key), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, "GET", "/api/auth/me", Some(&new_key), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_health_is_public() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body_json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body_json["data"]["status"], "ok");
}

#[tokio::test]
async fn test_vault_and_item_flow() {
    let app = spawn_app().await;
    let (_, alice) = register(&app, "alice").await;
    let (bob_id, bob) = register(&app, "bob").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/vaults",
        Some(&alice),
        Some(json!({ "name": "Family", "description": "Shared appliances" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let vault_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["members"][0]["role"], "OWNER");

    let (status, _) = send(
        &app,
        "POST",
        "/api/vaults",
        Some(&alice),
        Some(json!({ "name": "Family" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "POST",
        "/api/vaults",
        Some(&alice),
        Some(json!({ "name": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        "/api/items",
        Some(&alice),
        Some(json!({
            "title": "Fridge",
            "vault_id": vault_id,
            "purchase_date": "2023-01-01",
            "warranty_months": 24,
            "price": 899.99,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let item_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["expiry_date"], "2025-01-01");
    assert_eq!(body["data"]["status"], "ACTIVE");
    assert_eq!(body["data"]["price"], 899.99);

    let item_uri = format!("/api/items/{item_id}");
    let vault_uri = format!("/api/vaults/{vault_id}");

    let (status, _) = send(&app, "GET", &item_uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, foreign) = send(&app, "GET", &vault_uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, missing) = send(&app, "GET", "/api/vaults/9999", Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(foreign["success"], missing["success"]);

    let (status, body) = send(
        &app,
        "POST",
        &format!("{vault_uri}/members"),
        Some(&alice),
        Some(json!({ "email": "bob@example.com", "role": "VIEWER" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["id"], bob_id);

    let (status, body) = send(&app, "GET", &item_uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["vault_name"], "Family");
    assert_eq!(body["data"]["price"], 899.99);

    let update = json!({
        "title": "Kitchen fridge",
        "purchase_date": "2023-01-01",
        "warranty_months": 36,
    });
    let (status, _) = send(&app, "PUT", &item_uri, Some(&bob), Some(update.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "DELETE", &vault_uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("{vault_uri}/members/{bob_id}"),
        Some(&alice),
        Some(json!({ "role": "EDITOR" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "PUT", &item_uri, Some(&bob), Some(update)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Kitchen fridge");
    assert_eq!(body["data"]["expiry_date"], "2026-01-01");

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/items?vault_id={vault_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "DELETE", &vault_uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", &item_uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_item_validation_and_children() {
    let app = spawn_app().await;
    let (_, alice) = register(&app, "alice").await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/vaults",
        Some(&alice),
        Some(json!({ "name": "Gadgets" })),
    )
    .await;
    let vault_id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        "/api/items",
        Some(&alice),
        Some(json!({
            "title": "x".repeat(201),
            "vault_id": vault_id,
            "purchase_date": "2024-01-01",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/items",
        Some(&alice),
        Some(json!({
            "title": "Headphones",
            "vault_id": vault_id,
            "purchase_date": "2024-01-01",
            "price": -5.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/items",
        Some(&alice),
        Some(json!({
            "title": "Headphones",
            "vault_id": 4242,
            "purchase_date": "2024-01-01",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        "POST",
        "/api/items",
        Some(&alice),
        Some(json!({
            "title": "Cable",
            "vault_id": vault_id,
            "purchase_date": "2024-01-01",
            "warranty_months": -3,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["warranty_months"], -3);
    assert!(body["data"]["expiry_date"].is_null());
    assert_eq!(body["data"]["is_expired"], false);

    let (status, body) = send(
        &app,
        "POST",
        "/api/items",
        Some(&alice),
        Some(json!({
            "title": "Headphones",
            "vault_id": vault_id,
            "purchase_date": "2024-01-01",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["expiry_date"].is_null());
    let item_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/items/{item_id}/attachments"),
        Some(&alice),
        Some(json!({
            "file_url": "https://files.example.com/receipt.pdf",
            "file_name": "receipt.pdf",
            "file_type": "application/pdf",
            "kind": "RECEIPT",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["uploaded_by_name"], "alice");
    let attachment_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/items/{item_id}/reminders"),
        Some(&alice),
        Some(json!({ "reminder_days": 14, "channel": "SMS" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["is_active"].as_bool().unwrap());
    assert!(body["data"]["due_date"].is_null());
    let reminder_id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/items/{item_id}/reminders"),
        Some(&alice),
        Some(json!({ "reminder_days": -1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "GET", &format!("/api/items/{item_id}"), Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["attachments"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["reminders"].as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/items/{item_id}/attachments/{attachment_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/items/{item_id}/attachments/{attachment_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/items/{item_id}/reminders/{reminder_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/items/{item_id}/status"),
        Some(&alice),
        Some(json!({ "status": "RENEWED" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "RENEWED");

    let (status, _) = send(&app, "GET", "/api/items/expiring?days=0", Some(&alice), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "GET", "/api/items/expiring", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, body) = send(&app, "GET", "/api/items/reminders/due", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].is_array());
}

#[tokio::test]
async fn test_categories() {
    let app = spawn_app().await;
    let (_, alice) = register(&app, "alice").await;

    let (status, body) = send(&app, "GET", "/api/categories", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert_eq!(names.len(), 8);
    assert!(names.contains(&"Electronics"));
    assert!(names.contains(&"Home & Garden"));

    let (status, body) = send(&app, "GET", "/api/categories/with-items", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, _) = send(
        &app,
        "POST",
        "/api/categories",
        Some(&alice),
        Some(json!({ "name": "Tools" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
