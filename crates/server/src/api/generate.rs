//! `GET /generate`: one pipeline run in a child process.

use std::io;
use std::process::{Output, Stdio};
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{error, info, warn};

use crate::metrics::{GENERATE_DURATION, GENERATE_INVOCATIONS};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerateStatus {
    Success,
    Error,
}

/// Body of every `/generate` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub status: GenerateStatus,
    /// Captured stdout on success, stderr on failure.
    pub output: String,
}

pub async fn generate(State(state): State<Arc<AppState>>) -> (StatusCode, Json<GenerateResponse>) {
    // The run lives in its own task so a dropped request neither kills the
    // child nor releases the lock while it is still running.
    let task = tokio::spawn(async move {
        let _guard = state.generate_lock().lock().await;
        let _timer = GENERATE_DURATION.start_timer();
        info!("Starting pipeline: {:?}", state.pipeline_command());
        run_pipeline_command(state.pipeline_command()).await
    });

    let result = match task.await {
        Ok(result) => result,
        Err(e) => Err(io::Error::other(e.to_string())),
    };

    match result {
        Ok(output) if output.status.success() => {
            GENERATE_INVOCATIONS.with_label_values(&["success"]).inc();
            info!("Pipeline finished successfully");
            (
                StatusCode::OK,
                Json(GenerateResponse {
                    status: GenerateStatus::Success,
                    output: String::from_utf8_lossy(&output.stdout).into_owned(),
                }),
            )
        }
        Ok(output) => {
            GENERATE_INVOCATIONS.with_label_values(&["error"]).inc();
            warn!("Pipeline exited with {}", output.status);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(GenerateResponse {
                    status: GenerateStatus::Error,
                    output: String::from_utf8_lossy(&output.stderr).into_owned(),
                }),
            )
        }
        Err(e) => {
            GENERATE_INVOCATIONS.with_label_values(&["spawn_failed"]).inc();
            error!("Failed to start pipeline: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(GenerateResponse {
                    status: GenerateStatus::Error,
                    output: format!("Failed to start pipeline: {}", e),
                }),
            )
        }
    }
}

/// Run `command` to completion, capturing both output streams.
pub async fn run_pipeline_command(command: &[String]) -> io::Result<Output> {
    let (program, args) = command.split_first().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "pipeline command is empty")
    })?;

    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await
}
