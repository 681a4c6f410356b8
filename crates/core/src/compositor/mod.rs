//! Quote text overlay.
//!
//! The quote is word-wrapped to a fixed character budget, laid out as a
//! centered block starting at a fixed fraction of the image height, and
//! drawn twice: a black drop shadow, then white text on top.

mod error;
mod font;
mod layout;
mod text;
mod traits;
mod wrap;

pub use error::CompositeError;
pub use font::{load_font, LoadedFont};
pub use layout::{layout_block, PlacedLine, TextBlock};
pub use text::TextCompositor;
pub use traits::Compositor;
pub use wrap::wrap_text;
