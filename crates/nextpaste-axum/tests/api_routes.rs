//! Route wiring tests for the control API.
//!
//! Each test composes a context over an in-memory clipboard and a
//! temporary settings file, then drives the router with `oneshot`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use nextpaste_axum::bootstrap::{AxumContext, CorsConfig};
use nextpaste_axum::routes::{create_router, create_spa_router};
use nextpaste_axum::sse::SseBroadcaster;
use nextpaste_core::{AppEvent, AppEventEmitter, Settings, load_settings_from};
use nextpaste_runtime::{MemoryClipboard, SyncService};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

struct Harness {
    app: Router,
    service: Arc<SyncService>,
    sse: Arc<SseBroadcaster>,
    settings_path: PathBuf,
    _dir: TempDir,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let settings_path = dir.path().join("settings.json");
    let ctx = AxumContext::build(
        Arc::new(MemoryClipboard::new()),
        Settings::default(),
        settings_path.clone(),
    );
    let service = Arc::clone(&ctx.service);
    let sse = Arc::clone(&ctx.sse);
    Harness {
        app: create_router(ctx, &CorsConfig::AllowAll),
        service,
        sse,
        settings_path,
        _dir: dir,
    }
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, json)
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let h = harness();
    let (status, body) = call(&h.app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".into()));
}

#[tokio::test]
async fn status_reports_stopped_server() {
    let h = harness();
    let (status, body) = call(&h.app, Method::GET, "/api/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "isRunning": false, "clientCount": 0 }));
}

#[tokio::test]
async fn server_start_and_stop() {
    let h = harness();
    let config = json!({ "address": "127.0.0.1", "port": 0 });

    let (status, body) = call(
        &h.app,
        Method::POST,
        "/api/server/start",
        Some(config.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let address = body["address"].as_str().unwrap();
    assert!(address.starts_with("127.0.0.1:"));
    assert!(!address.ends_with(":0"));

    let (_, body) = call(&h.app, Method::GET, "/api/status", None).await;
    assert_eq!(body["isRunning"], true);

    let (status, body) = call(&h.app, Method::POST, "/api/server/start", Some(config)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], 409);
    assert!(body["error"].as_str().unwrap().contains("already running"));

    let (status, body) = call(&h.app, Method::POST, "/api/server/stop", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isRunning"], false);

    // Stopping again is not an error.
    let (status, _) = call(&h.app, Method::POST, "/api/server/stop", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn port_in_use_is_service_unavailable() {
    let h = harness();
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = taken.local_addr().unwrap().port();

    let (status, body) = call(
        &h.app,
        Method::POST,
        "/api/server/start",
        Some(json!({ "address": "127.0.0.1", "port": port })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], 503);
    assert!(!h.service.server_status().await.is_running);
}

#[tokio::test]
async fn malformed_start_body_is_rejected() {
    let h = harness();
    let (status, body) = call(
        &h.app,
        Method::POST,
        "/api/server/start",
        Some(json!({ "address": "127.0.0.1", "port": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], 422);
    assert!(body["error"].as_str().unwrap().contains("port"));

    let response = h
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::PUT)
                .uri("/api/settings")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], 400);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn logs_can_be_listed_and_cleared() {
    let h = harness();
    h.service
        .start_server(&nextpaste_core::ServerConfig::new("127.0.0.1", 0))
        .await
        .unwrap();
    h.service.stop_server().await.unwrap();

    let (status, body) = call(&h.app, Method::GET, "/api/logs", None).await;
    assert_eq!(status, StatusCode::OK);
    let logs = body.as_array().unwrap();
    assert!(!logs.is_empty());
    assert!(logs[0].get("message").is_some());

    let (status, _) = call(&h.app, Method::DELETE, "/api/logs", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = call(&h.app, Method::GET, "/api/logs", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn clients_and_ips_are_arrays() {
    let h = harness();
    let (status, body) = call(&h.app, Method::GET, "/api/clients", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = call(&h.app, Method::GET, "/api/network/ips", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_array());
}

#[tokio::test]
async fn settings_update_is_validated_and_saved() {
    let h = harness();

    let (status, body) = call(&h.app, Method::GET, "/api/settings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["port"].is_null());

    let (status, body) = call(
        &h.app,
        Method::PUT,
        "/api/settings",
        Some(json!({ "port": 9100, "deviceName": "desk" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["port"], 9100);
    assert_eq!(body["deviceName"], "desk");

    let saved = load_settings_from(&h.settings_path).unwrap();
    assert_eq!(saved.port, Some(9100));

    let (status, body) = call(
        &h.app,
        Method::PUT,
        "/api/settings",
        Some(json!({ "maxLogs": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Max logs"));

    // A null resets the field.
    let (_, body) = call(
        &h.app,
        Method::PUT,
        "/api/settings",
        Some(json!({ "port": null })),
    )
    .await;
    assert!(body["port"].is_null());
    assert_eq!(body["deviceName"], "desk");
}

#[tokio::test]
async fn events_endpoint_is_an_event_stream() {
    let h = harness();
    let response = h
        .app
        .clone()
        .oneshot(Request::builder().uri("/api/events").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/event-stream"));

    h.sse.emit(AppEvent::ServerStopped);

    let mut body = response.into_body();
    let frame = tokio::time::timeout(Duration::from_secs(5), body.frame())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let text = String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap();
    assert!(text.contains("event: server:stopped\n"), "{text}");
    let data = text
        .lines()
        .find_map(|line| line.strip_prefix("data: "))
        .unwrap();
    assert_eq!(
        serde_json::from_str::<Value>(data).unwrap(),
        json!({ "type": "server_stopped" })
    );
}

#[tokio::test]
async fn spa_router_falls_back_to_index() {
    let assets = tempfile::tempdir().unwrap();
    std::fs::write(assets.path().join("index.html"), "<html>nextpaste</html>").unwrap();
    let settings_dir = tempfile::tempdir().unwrap();
    let ctx = AxumContext::build(
        Arc::new(MemoryClipboard::new()),
        Settings::default(),
        settings_dir.path().join("settings.json"),
    );
    let app = create_spa_router(ctx, assets.path(), &CorsConfig::AllowAll);

    let (status, body) = call(&app, Method::GET, "/devices/history", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_str().unwrap().contains("nextpaste"));

    let (status, body) = call(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".into()));
}
