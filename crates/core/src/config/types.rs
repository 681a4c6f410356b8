use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub compositor: CompositorConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub publish: PublishConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Where a credential blob comes from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum CredentialSource {
    /// Inline JSON held in an environment variable.
    Env { var: String },
    /// JSON file on disk.
    File { path: PathBuf },
}

impl CredentialSource {
    pub fn env(var: &str) -> Self {
        Self::Env {
            var: var.to_string(),
        }
    }

    /// Human readable location, used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Env { var } => format!("environment variable {}", var),
            Self::File { path } => format!("file {}", path.display()),
        }
    }
}

// ============================================================================
// Queue
// ============================================================================

/// Spreadsheet queue configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueueConfig {
    /// Spreadsheet title, resolved through the Drive API.
    #[serde(default = "default_spreadsheet_name")]
    pub spreadsheet_name: String,
    /// Spreadsheet id; skips the name lookup when set.
    #[serde(default)]
    pub spreadsheet_id: Option<String>,
    #[serde(default = "default_status_column")]
    pub status_column: String,
    #[serde(default = "default_quote_column")]
    pub quote_column: String,
    #[serde(default = "default_queue_credentials")]
    pub credentials: CredentialSource,
    #[serde(default = "default_sheets_api_base")]
    pub sheets_api_base: String,
    #[serde(default = "default_drive_api_base")]
    pub drive_api_base: String,
    #[serde(default)]
    pub claim: ClaimConfig,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            spreadsheet_name: default_spreadsheet_name(),
            spreadsheet_id: None,
            status_column: default_status_column(),
            quote_column: default_quote_column(),
            credentials: default_queue_credentials(),
            sheets_api_base: default_sheets_api_base(),
            drive_api_base: default_drive_api_base(),
            claim: ClaimConfig::default(),
        }
    }
}

fn default_spreadsheet_name() -> String {
    "Quote_Access".to_string()
}

fn default_status_column() -> String {
    "Status".to_string()
}

fn default_quote_column() -> String {
    "Quote".to_string()
}

fn default_queue_credentials() -> CredentialSource {
    CredentialSource::env("GOOGLE_CREDENTIALS")
}

fn default_sheets_api_base() -> String {
    "https://sheets.googleapis.com".to_string()
}

fn default_drive_api_base() -> String {
    "https://www.googleapis.com".to_string()
}

/// Row claim (lease) settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClaimConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// A claim older than this is considered abandoned.
    #[serde(default = "default_lease_secs")]
    pub lease_secs: u64,
}

impl Default for ClaimConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            lease_secs: default_lease_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_lease_secs() -> u64 {
    1800
}

// ============================================================================
// Image generation
// ============================================================================

/// Prompt template used to ask for the background image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PromptTemplate {
    /// Eighteenth-century scene matching the quote.
    #[default]
    Vintage,
    /// Fixed lone-warrior scene; ignores the quote.
    Warrior,
    /// Free text; `{quote}` is replaced with the quote.
    Custom { template: String },
}

/// Image generation API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImageConfig {
    #[serde(default = "default_image_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_image_model")]
    pub model: String,
    /// Bearer key. Falls back to `IMAGEROUTER_API_KEY` when unset.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub prompt: PromptTemplate,
    #[serde(default = "default_images_dir")]
    pub images_dir: PathBuf,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            endpoint: default_image_endpoint(),
            model: default_image_model(),
            api_key: None,
            prompt: PromptTemplate::default(),
            images_dir: default_images_dir(),
        }
    }
}

fn default_image_endpoint() -> String {
    "https://api.imagerouter.io/v1/openai/images/generations".to_string()
}

fn default_image_model() -> String {
    "stabilityai/sdxl-turbo:free".to_string()
}

fn default_images_dir() -> PathBuf {
    PathBuf::from("images")
}

// ============================================================================
// Compositor
// ============================================================================

/// Text overlay configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompositorConfig {
    #[serde(default = "default_font_path")]
    pub font_path: PathBuf,
    /// Tried in order when the primary font cannot be loaded.
    #[serde(default = "default_fallback_fonts")]
    pub fallback_fonts: Vec<PathBuf>,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    /// Extra pixels between wrapped lines.
    #[serde(default = "default_line_spacing")]
    pub line_spacing: u32,
    /// Characters per line.
    #[serde(default = "default_wrap_width")]
    pub wrap_width: usize,
    #[serde(default = "default_shadow_offset")]
    pub shadow_offset: i32,
    /// Top of the text block as a fraction of image height.
    #[serde(default = "default_vertical_ratio")]
    pub vertical_ratio: f32,
    #[serde(default = "default_frame_path")]
    pub output_path: PathBuf,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            font_path: default_font_path(),
            fallback_fonts: default_fallback_fonts(),
            font_size: default_font_size(),
            line_spacing: default_line_spacing(),
            wrap_width: default_wrap_width(),
            shadow_offset: default_shadow_offset(),
            vertical_ratio: default_vertical_ratio(),
            output_path: default_frame_path(),
        }
    }
}

fn default_font_path() -> PathBuf {
    PathBuf::from("resources/Roboto-Italic-VariableFont_wdth,wght.ttf")
}

fn default_fallback_fonts() -> Vec<PathBuf> {
    vec![
        PathBuf::from("arial.ttf"),
        PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
        PathBuf::from("/Library/Fonts/Arial.ttf"),
        PathBuf::from("C:\\Windows\\Fonts\\arial.ttf"),
    ]
}

fn default_font_size() -> f32 {
    50.0
}

fn default_line_spacing() -> u32 {
    4
}

fn default_wrap_width() -> usize {
    30
}

fn default_shadow_offset() -> i32 {
    2
}

fn default_vertical_ratio() -> f32 {
    0.4
}

fn default_frame_path() -> PathBuf {
    PathBuf::from("quote_image.jpg")
}

// ============================================================================
// Render
// ============================================================================

/// Video render configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RenderConfig {
    #[serde(default = "default_audio_path")]
    pub audio_path: PathBuf,
    #[serde(default = "default_duration")]
    pub duration_secs: f64,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_fade_in")]
    pub fade_in_secs: Option<f64>,
    #[serde(default = "default_fade_out")]
    pub fade_out_secs: Option<f64>,
    #[serde(default = "default_video_path")]
    pub output_path: PathBuf,
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,
    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[serde(default = "default_log_level")]
    pub ffmpeg_log_level: String,
    #[serde(default = "default_render_timeout")]
    pub timeout_secs: u64,
    /// Probe the output and check duration, fps and height.
    #[serde(default = "default_true")]
    pub verify_output: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            audio_path: default_audio_path(),
            duration_secs: default_duration(),
            fps: default_fps(),
            height: default_height(),
            fade_in_secs: default_fade_in(),
            fade_out_secs: default_fade_out(),
            output_path: default_video_path(),
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            ffmpeg_log_level: default_log_level(),
            timeout_secs: default_render_timeout(),
            verify_output: true,
        }
    }
}

fn default_audio_path() -> PathBuf {
    PathBuf::from("resources/stoic.mp3")
}

fn default_duration() -> f64 {
    7.0
}

fn default_fps() -> u32 {
    24
}

fn default_height() -> u32 {
    1080
}

fn default_fade_in() -> Option<f64> {
    Some(0.5)
}

fn default_fade_out() -> Option<f64> {
    Some(0.2)
}

fn default_video_path() -> PathBuf {
    PathBuf::from("quote_video_with_audio.mp4")
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_log_level() -> String {
    "warning".to_string()
}

fn default_render_timeout() -> u64 {
    600
}

// ============================================================================
// Publish
// ============================================================================

/// How the OAuth consent is completed on first use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OAuthFlow {
    /// Print the consent URL and read the code from stdin.
    #[default]
    Console,
    /// Spin up a local callback listener.
    LocalCallback,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivacyStatus {
    #[default]
    Public,
    Unlisted,
    Private,
}

impl PrivacyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Unlisted => "unlisted",
            Self::Private => "private",
        }
    }
}

/// Video platform upload configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PublishConfig {
    #[serde(default = "default_publish_credentials")]
    pub credentials: CredentialSource,
    #[serde(default = "default_token_cache")]
    pub token_cache: PathBuf,
    #[serde(default)]
    pub flow: OAuthFlow,
    #[serde(default = "default_upload_api_base")]
    pub api_base: String,
    #[serde(default = "default_title")]
    pub title: String,
    /// `{quote}` is replaced with the selected quote.
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default = "default_tags")]
    pub tags: Vec<String>,
    #[serde(default = "default_category")]
    pub category_id: u32,
    #[serde(default)]
    pub privacy: PrivacyStatus,
    /// Upload chunk size in bytes; rounded down to a multiple of 256 KiB.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            credentials: default_publish_credentials(),
            token_cache: default_token_cache(),
            flow: OAuthFlow::default(),
            api_base: default_upload_api_base(),
            title: default_title(),
            description: default_description(),
            tags: default_tags(),
            category_id: default_category(),
            privacy: PrivacyStatus::default(),
            chunk_size: default_chunk_size(),
        }
    }
}

fn default_publish_credentials() -> CredentialSource {
    CredentialSource::env("YOUTUBE_CREDENTIALS")
}

fn default_token_cache() -> PathBuf {
    PathBuf::from("youtube_token.json")
}

fn default_upload_api_base() -> String {
    "https://www.googleapis.com".to_string()
}

fn default_title() -> String {
    "Stoic Quote of the Day".to_string()
}

fn default_description() -> String {
    "\"{quote}\"\n\nGenerated automatically with AI.".to_string()
}

fn default_tags() -> Vec<String> {
    ["stoicism", "motivation", "quotes", "AI video", "Marcus Aurelius"]
        .iter()
        .map(|t| t.to_string())
        .collect()
}

fn default_category() -> u32 {
    22
}

fn default_chunk_size() -> usize {
    8 * 1024 * 1024
}

// ============================================================================
// Network
// ============================================================================

/// Timeouts and retry budget shared by every HTTP client
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Extra attempts after the first failure.
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            retries: default_retries(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

fn default_request_timeout() -> u64 {
    120
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_retries() -> u32 {
    1
}

fn default_backoff_ms() -> u64 {
    1000
}

// ============================================================================
// Server
// ============================================================================

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Program and arguments run by `GET /generate`. Empty means the
    /// `quotereel` binary next to the server executable.
    #[serde(default)]
    pub pipeline_command: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            pipeline_command: Vec::new(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    10000
}

// ============================================================================
// Sanitized view
// ============================================================================

/// Sanitized config for logs and API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub spreadsheet: String,
    pub queue_credentials: String,
    pub claim_enabled: bool,
    pub image_endpoint: String,
    pub image_model: String,
    pub image_api_key_configured: bool,
    pub prompt: String,
    pub render: RenderConfig,
    pub publish_credentials: String,
    pub server: ServerConfig,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            spreadsheet: config
                .queue
                .spreadsheet_id
                .clone()
                .unwrap_or_else(|| config.queue.spreadsheet_name.clone()),
            queue_credentials: config.queue.credentials.describe(),
            claim_enabled: config.queue.claim.enabled,
            image_endpoint: config.image.endpoint.clone(),
            image_model: config.image.model.clone(),
            image_api_key_configured: config
                .image
                .api_key
                .as_ref()
                .is_some_and(|k| !k.is_empty()),
            prompt: match &config.image.prompt {
                PromptTemplate::Vintage => "vintage".to_string(),
                PromptTemplate::Warrior => "warrior".to_string(),
                PromptTemplate::Custom { .. } => "custom".to_string(),
            },
            render: config.render.clone(),
            publish_credentials: config.publish.credentials.describe(),
            server: config.server.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.queue.spreadsheet_name, "Quote_Access");
        assert_eq!(config.queue.status_column, "Status");
        assert_eq!(config.queue.quote_column, "Quote");
        assert_eq!(config.image.model, "stabilityai/sdxl-turbo:free");
        assert_eq!(config.compositor.wrap_width, 30);
        assert_eq!(config.render.duration_secs, 7.0);
        assert_eq!(config.render.fps, 24);
        assert_eq!(config.render.height, 1080);
        assert_eq!(config.publish.category_id, 22);
        assert_eq!(config.server.port, 10000);
    }

    #[test]
    fn test_credential_source_file() {
        let toml = r#"
[queue.credentials]
source = "file"
path = "resources/credentials.json"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.queue.credentials,
            CredentialSource::File {
                path: PathBuf::from("resources/credentials.json")
            }
        );
    }

    #[test]
    fn test_custom_prompt_template() {
        let toml = r#"
[image.prompt]
kind = "custom"
template = "A calm sea at dawn. {quote}"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(matches!(config.image.prompt, PromptTemplate::Custom { .. }));
    }

    #[test]
    fn test_fades_can_be_disabled() {
        let toml = r#"
[render]
fade_in_secs = 0.0
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.render.fade_in_secs, Some(0.0));
        assert_eq!(config.render.fade_out_secs, Some(0.2));
    }

    #[test]
    fn test_sanitized_config_hides_api_key() {
        let mut config = Config::default();
        config.image.api_key = Some("secret".to_string());
        let sanitized = SanitizedConfig::from(&config);
        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret"));
        assert!(sanitized.image_api_key_configured);
    }
}
