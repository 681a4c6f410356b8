//! Service-account tokens via `gcp_auth`.

use async_trait::async_trait;
use gcp_auth::{CustomServiceAccount, TokenProvider};

use super::{AuthError, TokenSource, SHEETS_SCOPES};

/// Token source backed by a service-account key.
///
/// `gcp_auth` caches the token internally and refreshes it before expiry.
pub struct ServiceAccountTokens {
    account: CustomServiceAccount,
    scopes: &'static [&'static str],
}

impl ServiceAccountTokens {
    /// Build from the JSON key blob, with the spreadsheet scopes.
    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        let account = CustomServiceAccount::from_json(json)
            .map_err(|e| AuthError::InvalidCredentials(e.to_string()))?;
        Ok(Self {
            account,
            scopes: SHEETS_SCOPES,
        })
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokens {
    async fn access_token(&self) -> Result<String, AuthError> {
        let token = self
            .account
            .token(self.scopes)
            .await
            .map_err(|e| AuthError::TokenUnavailable(e.to_string()))?;
        Ok(token.as_str().to_string())
    }

    fn method_name(&self) -> &'static str {
        "service_account"
    }
}
