//! Installed-app OAuth tokens via `yup-oauth2`.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::info;
use yup_oauth2::authenticator::DefaultAuthenticator;
use yup_oauth2::{ApplicationSecret, InstalledFlowAuthenticator, InstalledFlowReturnMethod};

use crate::config::OAuthFlow;

use super::{AuthError, TokenSource};

/// Token source for a user-consented OAuth client.
///
/// The authenticator is built on first use, so runs that never publish
/// never prompt. Tokens are persisted to `token_cache` and refreshed from
/// there on later runs.
pub struct InstalledAppTokens {
    secret: ApplicationSecret,
    token_cache: PathBuf,
    flow: OAuthFlow,
    scopes: &'static [&'static str],
    authenticator: OnceCell<DefaultAuthenticator>,
}

impl InstalledAppTokens {
    /// Parse an OAuth client-secret JSON blob (`installed` or `web` form).
    pub fn from_json(
        json: &str,
        token_cache: PathBuf,
        flow: OAuthFlow,
        scopes: &'static [&'static str],
    ) -> Result<Self, AuthError> {
        let secret = yup_oauth2::parse_application_secret(json)
            .map_err(|e| AuthError::InvalidCredentials(e.to_string()))?;
        Ok(Self {
            secret,
            token_cache,
            flow,
            scopes,
            authenticator: OnceCell::new(),
        })
    }

    async fn authenticator(&self) -> Result<&DefaultAuthenticator, AuthError> {
        self.authenticator
            .get_or_try_init(|| async {
                let method = match self.flow {
                    OAuthFlow::Console => InstalledFlowReturnMethod::Interactive,
                    OAuthFlow::LocalCallback => InstalledFlowReturnMethod::HTTPRedirect,
                };
                info!(
                    "Initializing OAuth flow ({:?}), token cache {:?}",
                    self.flow, self.token_cache
                );
                InstalledFlowAuthenticator::builder(self.secret.clone(), method)
                    .persist_tokens_to_disk(self.token_cache.clone())
                    .build()
                    .await
                    .map_err(|e| AuthError::TokenUnavailable(e.to_string()))
            })
            .await
    }
}

#[async_trait]
impl TokenSource for InstalledAppTokens {
    async fn access_token(&self) -> Result<String, AuthError> {
        let authenticator = self.authenticator().await?;
        let token = authenticator
            .token(self.scopes)
            .await
            .map_err(|e| AuthError::TokenUnavailable(e.to_string()))?;
        token
            .token()
            .map(str::to_string)
            .ok_or_else(|| AuthError::TokenUnavailable("empty access token".to_string()))
    }

    fn method_name(&self) -> &'static str {
        "installed_app"
    }
}
