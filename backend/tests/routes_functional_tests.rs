//! Functional tests for the HTTP routes.
//!
//! These tests build the real router over an in-memory store and drive it
//! with `tower::ServiceExt::oneshot`, covering the full stack from request
//! parsing to status codes.

#![cfg(feature = "http-server")]

mod support;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use property_api::db::{FullRepository, LocalRepository};
use property_api::http::{create_router, AppState};
use property_api::services::StoreEnvironment;

fn app(repo: &LocalRepository) -> Router {
    let repository: Arc<dyn FullRepository> = Arc::new(repo.clone());
    create_router(AppState::with_store_environment(
        repository,
        StoreEnvironment::default(),
    ))
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

async fn seeded() -> (LocalRepository, Vec<Value>) {
    let repo = LocalRepository::new();
    let (status, body) = send(app(&repo), Method::POST, "/seed", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    let (_, listings) = get(app(&repo), "/properties").await;
    (repo, listings.as_array().unwrap().clone())
}

// =========================================================
// Health & Introspection
// =========================================================

#[tokio::test]
async fn test_root_message() {
    let repo = LocalRepository::new();
    let (status, body) = get(app(&repo), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Property Sale API is running"}));
}

#[tokio::test]
async fn test_health_reports_store() {
    let repo = LocalRepository::new();
    let (status, body) = get(app(&repo), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");

    repo.set_healthy(false);
    let (status, body) = get(app(&repo), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "disconnected");
}

#[tokio::test]
async fn test_schema_endpoint() {
    let repo = LocalRepository::new();
    let (status, body) = get(app(&repo), "/schema").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["collections"],
        json!(["property", "offer", "adminsettings"])
    );
    assert!(body["models"]["Property"]["properties"]["price"].is_object());
    assert!(body["models"]["AdminSettings"].is_object());
}

// =========================================================
// Properties
// =========================================================

#[tokio::test]
async fn test_list_properties_empty() {
    let repo = LocalRepository::new();
    let (status, body) = get(app(&repo), "/properties").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_seeded_properties_listing_and_filters() {
    let (repo, listings) = seeded().await;
    assert_eq!(listings.len(), 3);
    for listing in &listings {
        assert!(listing["_id"].is_string());
    }
    assert_eq!(listings[0]["title"], "Sunny Modern Loft");

    let (_, austin) = get(app(&repo), "/properties?city=Austin").await;
    assert_eq!(austin.as_array().unwrap().len(), 1);
    assert_eq!(austin[0]["title"], "Cozy Suburban Home");

    let (_, under_offer) = get(app(&repo), "/properties?status=under_offer").await;
    assert_eq!(under_offer.as_array().unwrap().len(), 1);
    assert_eq!(under_offer[0]["city"], "Seattle");

    let (status, nowhere) = get(app(&repo), "/properties?city=Nowhere").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(nowhere, json!([]));
}

#[tokio::test]
async fn test_get_property_statuses() {
    let (repo, listings) = seeded().await;
    let id = listings[1]["_id"].as_str().unwrap();

    let (status, body) = get(app(&repo), &format!("/properties/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, listings[1]);

    let (status, body) = get(app(&repo), "/properties/not-an-id").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid id");

    let missing = property_api::db::DocumentId::generate();
    let (status, body) = get(app(&repo), &format!("/properties/{}", missing)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Property not found");
}

// =========================================================
// Offers
// =========================================================

#[tokio::test]
async fn test_submit_offer_and_list() {
    let (repo, listings) = seeded().await;
    let property_id = listings[0]["_id"].as_str().unwrap();

    let (status, receipt) = send(
        app(&repo),
        Method::POST,
        "/offers",
        Some(support::offer_json(property_id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["status"], "submitted");
    let offer_id = receipt["id"].as_str().unwrap();

    let (status, offers) =
        get(app(&repo), &format!("/offers?property_id={}", property_id)).await;
    assert_eq!(status, StatusCode::OK);
    let offers = offers.as_array().unwrap();
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0]["_id"], offer_id);
    assert_eq!(offers[0]["status"], "pending");
    assert_eq!(offers[0]["email"], "jane@example.com");

    let other_id = listings[1]["_id"].as_str().unwrap();
    let (_, none) = get(app(&repo), &format!("/offers?property_id={}", other_id)).await;
    assert_eq!(none, json!([]));
}

#[tokio::test]
async fn test_submit_offer_error_statuses() {
    let (repo, listings) = seeded().await;
    let property_id = listings[0]["_id"].as_str().unwrap();

    // Field validation
    let mut bad_email = support::offer_json(property_id);
    bad_email["email"] = json!("not-an-email");
    let (status, body) = send(app(&repo), Method::POST, "/offers", Some(bad_email)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["details"]["email"].is_array());

    // Unknown enum value fails deserialization
    let mut bad_status = support::offer_json(property_id);
    bad_status["status"] = json!("maybe");
    let (status, _) = send(app(&repo), Method::POST, "/offers", Some(bad_status)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Malformed property reference
    let (status, _) = send(
        app(&repo),
        Method::POST,
        "/offers",
        Some(support::offer_json("xyz")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Well-formed but unknown property
    let missing = property_api::db::DocumentId::generate().to_string();
    let (status, body) = send(
        app(&repo),
        Method::POST,
        "/offers",
        Some(support::offer_json(&missing)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Property not found for this offer");

    let (_, offers) = get(app(&repo), "/offers").await;
    assert_eq!(offers, json!([]));
}

// =========================================================
// Admin settings
// =========================================================

#[tokio::test]
async fn test_settings_defaults_then_update() {
    let repo = LocalRepository::new();

    let (status, defaults) = get(app(&repo), "/admin/settings").await;
    assert_eq!(status, StatusCode::OK);
    assert!(defaults.get("_id").is_none());
    assert_eq!(defaults["primary_color"], "#f97316");
    assert_eq!(
        defaults["announcement"],
        "New listings dropping weekly — submit an offer in minutes!"
    );

    let (status, updated) = send(
        app(&repo),
        Method::PUT,
        "/admin/settings",
        Some(json!({"announcement": "Open house Saturday", "hero_heading": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(updated["_id"].is_string());
    assert_eq!(updated["announcement"], "Open house Saturday");
    assert_eq!(updated["hero_heading"], "Find your next place");

    let (_, reread) = get(app(&repo), "/admin/settings").await;
    assert_eq!(reread, updated);
}

#[tokio::test]
async fn test_settings_update_rejects_wrong_types() {
    let repo = LocalRepository::new();
    let (status, body) = send(
        app(&repo),
        Method::PUT,
        "/admin/settings",
        Some(json!({"primary_color": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INVALID_BODY");
}

// =========================================================
// Seeding & diagnostics
// =========================================================

#[tokio::test]
async fn test_seed_is_idempotent_over_http() {
    let (repo, listings) = seeded().await;
    assert_eq!(listings.len(), 3);

    let (status, _) = send(app(&repo), Method::POST, "/seed", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, listings) = get(app(&repo), "/properties").await;
    assert_eq!(listings.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_seed_on_unavailable_store_is_503() {
    let repo = LocalRepository::new();
    repo.set_healthy(false);

    let (status, body) = send(app(&repo), Method::POST, "/seed", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "UNAVAILABLE");
}

#[tokio::test]
async fn test_diagnostics_always_ok() {
    let repo = LocalRepository::new();
    let (status, body) = get(app(&repo), "/test").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "✅ Connected & Working");
    assert_eq!(body["database_url"], "❌ Not Set");

    repo.set_healthy(false);
    let (status, body) = get(app(&repo), "/test").await;
    assert_eq!(status, StatusCode::OK);
    let database = body["database"].as_str().unwrap();
    assert!(database.starts_with("❌ Error: "));
    assert!(database.chars().count() <= "❌ Error: ".chars().count() + 80);
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let repo = LocalRepository::new();
    let response = app(&repo)
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::ORIGIN, "https://example.org")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}
