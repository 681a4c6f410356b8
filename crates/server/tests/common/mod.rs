//! Common test utilities for router tests.
//!
//! The fixture builds the real router in-process with a configurable
//! pipeline command, so `/generate` can be driven by small shell scripts
//! instead of the real pipeline binary.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use quotereel_core::Config;
use quotereel_server::{create_router, AppState};

/// In-process server with a chosen pipeline command.
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    /// Parsed JSON, or `Value::Null` when the body is not JSON.
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Fixture whose pipeline command is `sh -c <script>`.
    pub fn with_script(script: &str) -> Self {
        Self::with_command(vec!["sh".to_string(), "-c".to_string(), script.to_string()])
    }

    /// Fixture running `command` for each `/generate`.
    pub fn with_command(command: Vec<String>) -> Self {
        let mut config = Config::default();
        config.server.host = std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST);
        config.server.pipeline_command = command;

        let state = Arc::new(AppState::new(config));
        Self {
            router: create_router(state),
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}
