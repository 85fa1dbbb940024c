//! Thumbnail module
//!
//! Validates crop and quality settings, picks a container format from the
//! destination path, and hands an 8-bit RGBA grid to an encoder.

mod encoder;
mod pipeline;
mod standard_encoder;
pub mod types;


pub use encoder::ThumbnailEncoder;
pub use pipeline::ThumbnailPipeline;
pub use standard_encoder::StandardThumbnailEncoder;
pub use types::{CropRect, DEFAULT_QUALITY, ThumbnailConfig, ThumbnailConfigBuilder, ThumbnailFormat};
