//! Font loading with fallbacks.

use std::path::{Path, PathBuf};

use rusttype::Font;
use tracing::{debug, warn};

use super::CompositeError;

/// A parsed font and the file it came from.
pub struct LoadedFont {
    pub font: Font<'static>,
    pub path: PathBuf,
}

impl std::fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedFont").field("path", &self.path).finish()
    }
}

fn try_load(path: &Path) -> Result<Font<'static>, String> {
    let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
    Font::try_from_vec(bytes).ok_or_else(|| "not a TrueType/OpenType font".to_string())
}

/// Load `primary`, falling back to each entry of `fallbacks` in order.
///
/// A missing or unreadable primary font only logs a warning.
pub fn load_font(primary: &Path, fallbacks: &[PathBuf]) -> Result<LoadedFont, CompositeError> {
    let mut tried = Vec::new();

    for (i, path) in std::iter::once(primary)
        .chain(fallbacks.iter().map(PathBuf::as_path))
        .enumerate()
    {
        match try_load(path) {
            Ok(font) => {
                if i > 0 {
                    warn!(
                        primary = %primary.display(),
                        "Primary font unavailable, using fallback {}",
                        path.display()
                    );
                } else {
                    debug!("Loaded font {}", path.display());
                }
                return Ok(LoadedFont {
                    font,
                    path: path.to_path_buf(),
                });
            }
            Err(reason) => {
                debug!("Font {} not usable: {}", path.display(), reason);
                tried.push(path.display().to_string());
            }
        }
    }

    Err(CompositeError::FontUnavailable { tried })
}
