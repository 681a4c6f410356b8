//! Secret material resolved at startup.

use std::fmt;

use super::{Config, ConfigError, CredentialSource};

/// Environment variable holding the image-API key.
pub const IMAGE_API_KEY_VAR: &str = "IMAGEROUTER_API_KEY";

/// Secrets needed by a pipeline run.
///
/// The image key and queue credentials are mandatory. Upload credentials
/// are optional: without them publishing is skipped.
#[derive(Clone)]
pub struct Credentials {
    pub image_api_key: String,
    /// Service-account JSON for the spreadsheet.
    pub queue_service_account: String,
    /// OAuth client-secret JSON for the upload API.
    pub upload_client_secret: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("image_api_key", &"<redacted>")
            .field("queue_service_account", &"<redacted>")
            .field(
                "upload_client_secret",
                &self.upload_client_secret.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl Credentials {
    /// Resolve credentials from the process environment and filesystem.
    pub fn resolve(config: &Config) -> Result<Self, ConfigError> {
        Self::resolve_with(config, |name| std::env::var(name).ok())
    }

    /// Resolve credentials using `lookup` for environment variables.
    pub fn resolve_with<F>(config: &Config, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let image_api_key = config
            .image
            .api_key
            .clone()
            .or_else(|| lookup(IMAGE_API_KEY_VAR))
            .map(|k| strip_wrapping_quotes(k.trim()).to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                ConfigError::MissingCredential(format!(
                    "image API key ({} or image.api_key)",
                    IMAGE_API_KEY_VAR
                ))
            })?;

        let queue_service_account = read_source(&config.queue.credentials, &lookup)?
            .ok_or_else(|| {
                ConfigError::MissingCredential(format!(
                    "queue credentials ({})",
                    config.queue.credentials.describe()
                ))
            })?;
        serde_json::from_str::<serde_json::Value>(&queue_service_account).map_err(|e| {
            ConfigError::InvalidCredential {
                name: config.queue.credentials.describe(),
                reason: e.to_string(),
            }
        })?;

        let upload_client_secret = read_source(&config.publish.credentials, &lookup)?;

        Ok(Self {
            image_api_key,
            queue_service_account,
            upload_client_secret,
        })
    }
}

/// Read a credential blob; `None` when the variable or file is absent.
fn read_source<F>(source: &CredentialSource, lookup: &F) -> Result<Option<String>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = match source {
        CredentialSource::Env { var } => lookup(var),
        CredentialSource::File { path } => {
            if !path.exists() {
                return Ok(None);
            }
            let content =
                std::fs::read_to_string(path).map_err(|e| ConfigError::InvalidCredential {
                    name: source.describe(),
                    reason: e.to_string(),
                })?;
            Some(content)
        }
    };

    Ok(value.filter(|v| !v.trim().is_empty()))
}

/// Remove one pair of single quotes around a value, as left by some `.env` writers.
pub fn strip_wrapping_quotes(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
