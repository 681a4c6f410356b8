use super::{types::Config, ConfigError};

/// Validate configuration
///
/// Checks the values serde cannot: column names, render contract numbers,
/// compositor geometry and the server port.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let queue = &config.queue;
    if queue.status_column.trim().is_empty() || queue.quote_column.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "queue column names cannot be empty".to_string(),
        ));
    }
    if queue.status_column == queue.quote_column {
        return Err(ConfigError::ValidationError(
            "queue.status_column and queue.quote_column must differ".to_string(),
        ));
    }
    if queue.spreadsheet_id.is_none() && queue.spreadsheet_name.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "queue.spreadsheet_name cannot be empty".to_string(),
        ));
    }

    let render = &config.render;
    if render.duration_secs <= 0.0 {
        return Err(ConfigError::ValidationError(
            "render.duration_secs must be positive".to_string(),
        ));
    }
    if render.fps == 0 {
        return Err(ConfigError::ValidationError(
            "render.fps cannot be 0".to_string(),
        ));
    }
    if render.height == 0 {
        return Err(ConfigError::ValidationError(
            "render.height cannot be 0".to_string(),
        ));
    }
    let fades = render.fade_in_secs.unwrap_or(0.0) + render.fade_out_secs.unwrap_or(0.0);
    if render.fade_in_secs.unwrap_or(0.0) < 0.0 || render.fade_out_secs.unwrap_or(0.0) < 0.0 {
        return Err(ConfigError::ValidationError(
            "render fades cannot be negative".to_string(),
        ));
    }
    if fades > render.duration_secs {
        return Err(ConfigError::ValidationError(format!(
            "render fades ({}s) exceed clip duration ({}s)",
            fades, render.duration_secs
        )));
    }

    let compositor = &config.compositor;
    if compositor.wrap_width == 0 {
        return Err(ConfigError::ValidationError(
            "compositor.wrap_width cannot be 0".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&compositor.vertical_ratio) {
        return Err(ConfigError::ValidationError(
            "compositor.vertical_ratio must be within [0, 1]".to_string(),
        ));
    }
    if compositor.font_size <= 0.0 {
        return Err(ConfigError::ValidationError(
            "compositor.font_size must be positive".to_string(),
        ));
    }

    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    Ok(())
}
