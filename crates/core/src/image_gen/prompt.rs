//! Prompt construction.

use crate::config::PromptTemplate;

const VINTAGE: &str = "Create a highly detailed stoic image style of 18th-century. \
The scene should match the emotional tone and theme of the following quote: '{quote}'. \
Ensure the characters, setting, and composition reflect the story or sentiment in the quote, \
using historically inspired outfits and soft natural lighting. \
Maintain a heartwarming and vintage atmosphere throughout.";

const WARRIOR: &str = "A stoic scene featuring a lone warrior in a misty mountain pass. \
The atmosphere is tranquil yet powerful. The style is classical realism. \
Focus on subtle expressions of resolve and dramatic lighting. \
Evoke timeless resilience and quiet intensity.";

impl PromptTemplate {
    /// Build the image prompt for `quote`.
    pub fn render(&self, quote: &str) -> String {
        match self {
            Self::Vintage => VINTAGE.replace("{quote}", quote),
            Self::Warrior => WARRIOR.to_string(),
            Self::Custom { template } => template.replace("{quote}", quote),
        }
    }
}
