use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Token unavailable: {0}")]
    TokenUnavailable(String),
}

/// Something that hands out bearer tokens.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Return a currently valid access token.
    async fn access_token(&self) -> Result<String, AuthError>;

    /// Name of this token source
    fn method_name(&self) -> &'static str;
}

/// Fixed token, for tests and pre-issued tokens.
#[derive(Debug, Clone)]
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String, AuthError> {
        Ok(self.token.clone())
    }

    fn method_name(&self) -> &'static str {
        "static"
    }
}
