//! Router tests for the HTTP entry point.

mod common;

use std::time::{Duration, Instant};

use axum::http::StatusCode;
use common::TestFixture;

#[tokio::test]
async fn test_index_returns_banner() {
    let fixture = TestFixture::with_script("true");
    let response = fixture.get("/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text.contains("/generate"));
}

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::with_script("true");
    let response = fixture.get("/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_is_sanitized() {
    let fixture = TestFixture::with_script("true");
    let response = fixture.get("/config").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["spreadsheet"], "Quote_Access");
    assert_eq!(response.body["render"]["fps"], 24);
    assert_eq!(response.body["image_api_key_configured"], false);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let fixture = TestFixture::with_script("true");
    let response = fixture.get("/videos/latest").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_generate_success_returns_stdout() {
    let fixture = TestFixture::with_script("echo 'Marked row 2 as Complete'");
    let response = fixture.get("/generate").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "success");
    assert_eq!(response.body["output"], "Marked row 2 as Complete\n");
}

#[tokio::test]
async fn test_generate_failure_returns_stderr() {
    let fixture = TestFixture::with_script("echo progress; echo 'image URL missing' >&2; exit 1");
    let response = fixture.get("/generate").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["status"], "error");
    assert_eq!(response.body["output"], "image URL missing\n");
}

#[tokio::test]
async fn test_generate_spawn_failure_is_500() {
    let fixture = TestFixture::with_command(vec!["/nonexistent/quotereel".to_string()]);
    let response = fixture.get("/generate").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["status"], "error");
    assert!(response.body["output"]
        .as_str()
        .unwrap()
        .contains("Failed to start pipeline"));
}

#[tokio::test]
async fn test_generate_calls_are_serialized() {
    // Each run fails if another one is still inside the critical section.
    let dir = tempfile::tempdir().unwrap();
    let lock = dir.path().join("running");
    let script = format!(
        "if [ -e {lock} ]; then echo overlap >&2; exit 1; fi; \
         touch {lock}; sleep 0.3; rm {lock}; echo done",
        lock = lock.display()
    );
    let fixture = TestFixture::with_script(&script);

    let start = Instant::now();
    let (first, second) = tokio::join!(fixture.get("/generate"), fixture.get("/generate"));

    assert_eq!(first.status, StatusCode::OK, "{:?}", first.body);
    assert_eq!(second.status, StatusCode::OK, "{:?}", second.body);
    assert!(start.elapsed() >= Duration::from_millis(600));
}

#[tokio::test]
async fn test_metrics_exposes_generate_counter() {
    let fixture = TestFixture::with_script("true");
    fixture.get("/generate").await;
    let response = fixture.get("/metrics").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text.contains("quotereel_generate_invocations_total"));
    assert!(response.text.contains("quotereel_http_requests_total"));
}
