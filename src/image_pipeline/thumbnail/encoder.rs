use std::io::Write;

use image::RgbaImage;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::thumbnail::types::ThumbnailFormat;

pub trait ThumbnailEncoder {
    /// Encodes `image` as `format`. `quality` only affects lossy formats.
    fn encode(
        &self,
        image: &RgbaImage,
        format: ThumbnailFormat,
        quality: u8,
        output: &mut dyn Write,
    ) -> Result<()>;
}
