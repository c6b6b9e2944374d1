//! HttpSource against a throwaway upstream bound to 127.0.0.1:0.

use axum::Router;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::get;
use serde_json::json;
use ummon_core::ExporterError;
use ummon_core::config::UpstreamConfig;
use ummon_translator::{Endpoint, FetchOutcome, HttpSource, SnapshotSource};

// base64("exporter:secret")
const EXPECTED_AUTH: &str = "Basic ZXhwb3J0ZXI6c2VjcmV0";

// ── Helpers ──────────────────────────────────────────────────────────────────

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(EXPECTED_AUTH)
}

async fn spawn_upstream() -> String {
    let app = Router::new()
        .route(
            "/",
            get(|headers: HeaderMap| async move {
                if !authorized(&headers) {
                    return (StatusCode::UNAUTHORIZED, String::new());
                }
                (StatusCode::OK, json!({"version": "3.1.0", "ok": 1}).to_string())
            }),
        )
        .route(
            "/status",
            get(|headers: HeaderMap| async move {
                if !authorized(&headers) {
                    return (StatusCode::UNAUTHORIZED, String::new());
                }
                (
                    StatusCode::OK,
                    json!({"workers": [], "maxWorkers": 3, "queue": [], "isPaused": false})
                        .to_string(),
                )
            }),
        )
        .route("/tasks", get(|| async { "this is not json" }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr.to_string()
}

fn config(host: String, password: &str) -> UpstreamConfig {
    UpstreamConfig {
        host,
        user: "exporter".into(),
        password: password.into(),
        scheme: "http".into(),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn fetch_returns_document_with_basic_auth() {
    let host = spawn_upstream().await;
    let source = HttpSource::new(&config(host, "secret")).unwrap();

    let outcome = source.fetch(Endpoint::Instance).await.unwrap();
    assert_eq!(
        outcome,
        FetchOutcome::Document(json!({"version": "3.1.0", "ok": 1}))
    );

    let outcome = source.fetch(Endpoint::Status).await.unwrap();
    match outcome {
        FetchOutcome::Document(doc) => assert_eq!(doc["maxWorkers"], 3),
        other => panic!("expected document, got {other:?}"),
    }
}

#[tokio::test]
async fn rejected_credentials_surface_as_status_error() {
    let host = spawn_upstream().await;
    let source = HttpSource::new(&config(host, "wrong")).unwrap();
    let err = source.fetch(Endpoint::Status).await.unwrap_err();
    assert!(
        matches!(err, ExporterError::UpstreamStatus { status: 401, .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn non_json_body_is_payload_error() {
    let host = spawn_upstream().await;
    let source = HttpSource::new(&config(host, "secret")).unwrap();
    let err = source.fetch(Endpoint::Tasks).await.unwrap_err();
    assert!(matches!(err, ExporterError::Payload { .. }), "got {err:?}");
}

#[tokio::test]
async fn closed_port_is_unreachable_not_error() {
    // Bind and drop to get a port nobody listens on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let source = HttpSource::new(&config(format!("127.0.0.1:{port}"), "secret")).unwrap();
    let outcome = source.fetch(Endpoint::Status).await.unwrap();
    assert!(matches!(outcome, FetchOutcome::Unreachable { .. }));
}
