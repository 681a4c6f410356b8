use serde::{Deserialize, Serialize};

use crate::config::{PrivacyStatus, PublishConfig};

/// Title, description and classification sent with the upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category_id: u32,
    pub privacy: PrivacyStatus,
}

impl VideoMetadata {
    /// Metadata for `quote`; `{quote}` in the description is substituted.
    pub fn for_quote(config: &PublishConfig, quote: &str) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.replace("{quote}", quote),
            tags: config.tags.clone(),
            category_id: config.category_id,
            privacy: config.privacy,
        }
    }
}

/// An uploaded video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedVideo {
    pub id: String,
    pub watch_url: String,
}

impl PublishedVideo {
    pub fn youtube(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            watch_url: format!("https://www.youtube.com/watch?v={}", id),
            id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_metadata() {
        let meta = VideoMetadata::for_quote(&PublishConfig::default(), "Memento mori");
        assert_eq!(meta.title, "Stoic Quote of the Day");
        assert!(meta.description.starts_with("\"Memento mori\"\n\n"));
        assert_eq!(meta.tags.len(), 5);
        assert_eq!(meta.category_id, 22);
        assert_eq!(meta.privacy, PrivacyStatus::Public);
    }

    #[test]
    fn test_watch_url() {
        let video = PublishedVideo::youtube("dQw4w9WgXcQ");
        assert_eq!(video.watch_url, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }
}
