use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use backend_application::{AppState, Metrics};
use backend_domain::{AuthConfig, RuntimeConfig};
use backend_infrastructure::{JwtCredentialService, MemoryRepository};
use backend_interfaces_http::build_router;

fn test_app() -> Router {
    let repo = Arc::new(MemoryRepository::new());
    let state = AppState {
        config: RuntimeConfig::default(),
        asset_repo: repo.clone(),
        event_repo: repo.clone(),
        user_repo: repo,
        credentials: Arc::new(JwtCredentialService::new(&AuthConfig {
            jwt_secret: "integration-secret".to_string(),
            token_ttl_days: 1,
        })),
        metrics: Arc::new(Metrics::default()),
    };
    build_router(state)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn register(app: &Router, username: &str, role: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "username": username, "password": "password123", "role": role })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register {}: {}", username, body);
    body["token"].as_str().expect("token").to_string()
}

#[tokio::test]
async fn sync_routes_require_a_bearer_token() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/api/sync/assets", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].is_string());

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/sync/events",
        Some("not-a-token"),
        Some(json!({ "events": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn sync_batch_reports_processed_and_errors() {
    let app = test_app();
    let token = register(&app, "operator1", "operator").await;

    let batch = json!({
        "events": [
            {
                "eventId": "evt-1",
                "assetId": "AS-1000-0001",
                "userId": "operator1",
                "actionType": "SCAN",
                "occurredAt": "2026-04-02T09:15:00Z",
                "payload": { "location": "Dock 3", "gps": { "lat": 52.5, "lng": 13.4 } }
            },
            { "eventId": "evt-bad" },
            {
                "eventId": "evt-3",
                "assetId": "AS-1000-0001",
                "userId": "operator1",
                "actionType": "STATUS_CHANGE",
                "occurredAt": "2026-04-02T09:30:00Z",
                "payload": { "status": "maintenance" }
            }
        ]
    });

    let (status, body) = send(&app, Method::POST, "/api/sync/events", Some(&token), Some(batch.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Sync complete");
    assert_eq!(body["results"], json!({ "processed": 2, "errors": 1 }));

    let (_, replay) = send(&app, Method::POST, "/api/sync/events", Some(&token), Some(batch)).await;
    assert_eq!(replay["results"], json!({ "processed": 0, "errors": 1 }));

    let (status, assets) = send(&app, Method::GET, "/api/sync/assets", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let assets = assets.as_array().expect("array");
    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0]["assetId"], "AS-1000-0001");
    assert_eq!(assets[0]["status"], "maintenance");
    assert_eq!(assets[0]["location"], "Dock 3");
    assert_eq!(assets[0]["metadata"]["lastGps"], json!({ "lat": 52.5, "lng": 13.4 }));

    let (_, later) = send(
        &app,
        Method::GET,
        "/api/sync/assets?lastSync=2999-01-01T00:00:00Z",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(later, json!([]));

    let (status, events) = send(&app, Method::GET, "/api/assets/AS-1000-0001/events", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<_> = events
        .as_array()
        .expect("array")
        .iter()
        .map(|event| event["eventId"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(ids, vec!["evt-3", "evt-1"]);
}

#[tokio::test]
async fn batch_without_events_array_is_rejected() {
    let app = test_app();
    let token = register(&app, "operator1", "operator").await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/sync/events",
        Some(&token),
        Some(json!({ "events": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::POST, "/api/sync/events", Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_and_me_flow() {
    let app = test_app();
    register(&app, "manager1", "manager").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "manager1", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid username or password");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "manager1", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().expect("token").to_string();

    let (status, me) = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "manager1");
    assert_eq!(me["role"], "manager");
    assert_eq!(me["_id"], body["_id"]);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "username": "manager1", "password": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User already exists");
}

#[tokio::test]
async fn asset_crud_and_dashboard() {
    let app = test_app();
    let token = register(&app, "admin1", "admin").await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/assets",
        Some(&token),
        Some(json!({ "name": "Pallet Jack", "assetId": "AS-7" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["location"], "Warehouse");
    assert_eq!(created["status"], "operational");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/assets",
        Some(&token),
        Some(json!({ "name": "Copy", "assetId": "AS-7" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Asset ID already exists");

    let (status, body) = send(&app, Method::GET, "/api/assets/AS-404", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Asset not found");

    let (status, page) = send(&app, Method::GET, "/api/assets?search=pallet", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["page"], 1);
    assert_eq!(page["pages"], 1);

    let (status, stats) = send(&app, Method::GET, "/api/dashboard/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalAssets"], 1);
    assert_eq!(stats["maintenanceAssets"], 0);
    assert_eq!(stats["totalEvents"], 0);
}

#[tokio::test]
async fn user_listing_is_role_gated() {
    let app = test_app();
    let operator = register(&app, "operator1", "operator").await;
    let manager = register(&app, "manager1", "manager").await;

    let (status, _) = send(&app, Method::GET, "/api/users", Some(&operator), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, users) = send(&app, Method::GET, "/api/users", Some(&manager), None).await;
    assert_eq!(status, StatusCode::OK);
    let users = users.as_array().expect("array");
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|user| user.get("password_hash").is_none()));
}

#[tokio::test]
async fn health_and_metrics() {
    let app = test_app();
    let (status, _) = send(&app, Method::GET, "/api/health/live", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, "/api/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, "/api/metrics/prometheus", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = register(&app, "admin1", "admin").await;
    let request = Request::builder()
        .uri("/api/metrics/prometheus")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let text = String::from_utf8(bytes.to_vec()).expect("utf8");
    assert!(text.contains("asset_sync_requests_total 0"));
}
