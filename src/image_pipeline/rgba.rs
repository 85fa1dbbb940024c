//! 16-bit to 8-bit RGBA conversion

use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::raw::types::{Channels, DecodedImage};

/// Builds an opaque, non-premultiplied 8-bit RGBA grid from a demosaiced image.
///
/// Each channel keeps the high byte of its 16-bit sample. Single-channel CFA
/// data has no color to render and is rejected with
/// [`ConversionError::UnsupportedChannels`].
pub fn to_rgba(image: &DecodedImage) -> Result<RgbaImage> {
    if image.channels() != Channels::Rgb {
        return Err(ConversionError::UnsupportedChannels(image.channels().count()));
    }

    debug!("Converting {}x{} image to RGBA8", image.width(), image.height());

    let width = image.width() as usize;
    let samples = image.samples();
    Ok(RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        let offset = (y as usize * width + x as usize) * 3;
        Rgba([
            (samples[offset] >> 8) as u8,
            (samples[offset + 1] >> 8) as u8,
            (samples[offset + 2] >> 8) as u8,
            u8::MAX,
        ])
    }))
}

impl DecodedImage {
    /// Shorthand for [`to_rgba`].
    pub fn to_rgba(&self) -> Result<RgbaImage> {
        to_rgba(self)
    }
}
