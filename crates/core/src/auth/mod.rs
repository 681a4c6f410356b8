//! Access-token sources for Google APIs.
//!
//! The spreadsheet queue authenticates with a service account (`gcp_auth`);
//! the upload API uses an installed-app OAuth flow (`yup-oauth2`) whose
//! tokens are cached on disk so consent is only asked once.

mod installed_app;
mod service_account;
mod traits;

pub use installed_app::InstalledAppTokens;
pub use service_account::ServiceAccountTokens;
pub use traits::*;

/// Scopes needed to read and update the queue spreadsheet.
pub const SHEETS_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive",
];

/// Scope needed to upload videos.
pub const YOUTUBE_UPLOAD_SCOPES: &[&str] = &["https://www.googleapis.com/auth/youtube.upload"];

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_token() {
        let source = StaticToken::new("abc");
        assert_eq!(source.access_token().await.unwrap(), "abc");
    }

    #[test]
    fn test_scopes() {
        assert!(SHEETS_SCOPES.iter().any(|s| s.ends_with("/spreadsheets")));
        assert!(YOUTUBE_UPLOAD_SCOPES[0].contains("youtube.upload"));
    }
}
