//! Raster compositor built on `image` + `imageproc`.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::io::Reader as ImageReader;
use image::{ColorType, Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use rusttype::Scale;
use tracing::{debug, info};

use super::font::load_font;
use super::layout::layout_block;
use super::wrap::wrap_text;
use super::{CompositeError, Compositor};
use crate::config::CompositorConfig;

const JPEG_QUALITY: u8 = 95;
const SHADOW: Rgb<u8> = Rgb([0, 0, 0]);
const TEXT: Rgb<u8> = Rgb([255, 255, 255]);

/// Compositor drawing wrapped, shadowed text with a TrueType font.
pub struct TextCompositor {
    config: CompositorConfig,
}

impl TextCompositor {
    pub fn new(config: CompositorConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(CompositorConfig::default())
    }
}

fn open_image(path: &Path) -> Result<RgbImage, CompositeError> {
    let load_err = |reason: String| CompositeError::ImageLoad {
        path: path.display().to_string(),
        reason,
    };
    let image = ImageReader::open(path)
        .map_err(|e| load_err(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| load_err(e.to_string()))?
        .decode()
        .map_err(|e| load_err(e.to_string()))?;
    Ok(image.to_rgb8())
}

fn save_jpeg(image: &RgbImage, path: &Path) -> Result<(), CompositeError> {
    let save_err = |reason: String| CompositeError::Save {
        path: path.display().to_string(),
        reason,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY)
        .encode(image.as_raw(), image.width(), image.height(), ColorType::Rgb8)
        .map_err(|e| save_err(e.to_string()))
}

/// Blocking body of [`TextCompositor::composite`].
fn render_frame(config: &CompositorConfig, source: &Path, quote: &str) -> Result<PathBuf, CompositeError> {
    let mut image = open_image(source)?;
    let loaded = load_font(&config.font_path, &config.fallback_fonts)?;
    let scale = Scale::uniform(config.font_size);

    let lines = wrap_text(quote, config.wrap_width);
    let block = layout_block(
        &lines,
        image.width(),
        image.height(),
        config.font_size.round() as u32,
        config.line_spacing,
        config.vertical_ratio,
        |line| text_size(scale, &loaded.font, line).0.max(0) as u32,
    );
    debug!(
        lines = lines.len(),
        x = block.x,
        y = block.y,
        width = block.width,
        height = block.height,
        font = %loaded.path.display(),
        "Laid out quote"
    );

    let offset = config.shadow_offset;
    for line in &block.lines {
        draw_text_mut(
            &mut image,
            SHADOW,
            line.x + offset,
            line.y + offset,
            scale,
            &loaded.font,
            &line.text,
        );
    }
    for line in &block.lines {
        draw_text_mut(&mut image, TEXT, line.x, line.y, scale, &loaded.font, &line.text);
    }

    save_jpeg(&image, &config.output_path)?;
    Ok(config.output_path.clone())
}

#[async_trait]
impl Compositor for TextCompositor {
    fn name(&self) -> &str {
        "text"
    }

    async fn composite(&self, image: &Path, quote: &str) -> Result<PathBuf, CompositeError> {
        let config = self.config.clone();
        let source = image.to_path_buf();
        let quote = quote.to_string();

        let output = tokio::task::spawn_blocking(move || render_frame(&config, &source, &quote))
            .await
            .map_err(|e| CompositeError::Task(e.to_string()))??;

        info!("Final image saved as {}", output.display());
        Ok(output)
    }
}
