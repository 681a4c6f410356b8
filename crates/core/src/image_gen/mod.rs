//! Background image generation.
//!
//! A prompt built from the quote is sent to an OpenAI-compatible image
//! endpoint; the first result URL is then downloaded into the images
//! directory under a fresh UUID filename.

mod error;
mod imagerouter;
mod prompt;
mod traits;

pub use error::ImageGenError;
pub use imagerouter::{extract_image_url, ImageRouterClient};
pub use traits::ImageGenerator;
