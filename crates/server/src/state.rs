use std::path::PathBuf;

use quotereel_core::{Config, SanitizedConfig};
use tokio::sync::Mutex;

/// Binary started by `GET /generate` when no command is configured.
pub const PIPELINE_BINARY: &str = "quotereel";

/// Shared application state
pub struct AppState {
    config: Config,
    pipeline_command: Vec<String>,
    generate_lock: Mutex<()>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let pipeline_command = resolve_pipeline_command(&config.server.pipeline_command);
        Self {
            config,
            pipeline_command,
            generate_lock: Mutex::new(()),
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    /// Program and arguments for one pipeline run.
    pub fn pipeline_command(&self) -> &[String] {
        &self.pipeline_command
    }

    /// Held for the whole of a `/generate` call.
    pub fn generate_lock(&self) -> &Mutex<()> {
        &self.generate_lock
    }
}

/// Use the configured command, or the pipeline binary installed next to
/// this executable, or finally whatever `quotereel` is on `PATH`.
fn resolve_pipeline_command(configured: &[String]) -> Vec<String> {
    if !configured.is_empty() {
        return configured.to_vec();
    }

    let sibling = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(PIPELINE_BINARY)))
        .filter(|path| path.exists())
        .unwrap_or_else(|| PathBuf::from(PIPELINE_BINARY));

    vec![sibling.to_string_lossy().into_owned()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_command_wins() {
        let mut config = Config::default();
        config.server.pipeline_command = vec!["sh".to_string(), "-c".to_string(), "true".to_string()];
        let state = AppState::new(config);
        assert_eq!(state.pipeline_command(), ["sh", "-c", "true"]);
    }

    #[test]
    fn test_default_command_is_pipeline_binary() {
        let state = AppState::new(Config::default());
        assert_eq!(state.pipeline_command().len(), 1);
        assert!(state.pipeline_command()[0].ends_with(PIPELINE_BINARY));
    }

    #[test]
    fn test_sanitized_config_has_no_secrets() {
        let mut config = Config::default();
        config.image.api_key = Some("secret-key".to_string());
        let state = AppState::new(config);
        let json = serde_json::to_string(&state.sanitized_config()).unwrap();
        assert!(!json.contains("secret-key"));
    }
}
