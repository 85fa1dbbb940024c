use std::io::Write;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use tiff::encoder::{Compression, TiffEncoder, colortype};
use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::thumbnail::encoder::ThumbnailEncoder;
use crate::image_pipeline::thumbnail::types::ThumbnailFormat;

/// JPEG and PNG through the `image` codecs, TIFF through the `tiff` encoder.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardThumbnailEncoder;

fn encode_error(e: impl std::fmt::Display) -> ConversionError {
    ConversionError::EncodeError(e.to_string())
}

impl StandardThumbnailEncoder {
    fn write_jpeg(&self, image: &RgbaImage, quality: u8, output: &mut dyn Write) -> Result<()> {
        // JPEG has no alpha channel; every pixel is opaque anyway
        let rgb: Vec<u8> = image
            .pixels()
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();

        JpegEncoder::new_with_quality(output, quality)
            .write_image(&rgb, image.width(), image.height(), ExtendedColorType::Rgb8)
            .map_err(encode_error)
    }

    fn write_png(&self, image: &RgbaImage, output: &mut dyn Write) -> Result<()> {
        PngEncoder::new(output)
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(encode_error)
    }

    fn write_tiff(&self, image: &RgbaImage, output: &mut dyn Write) -> Result<()> {
        // TiffEncoder needs Seek, so encode into memory first
        let mut buffer = Vec::new();

        TiffEncoder::new(std::io::Cursor::new(&mut buffer))
            .map_err(encode_error)?
            .with_compression(Compression::Lzw)
            .write_image::<colortype::RGBA8>(image.width(), image.height(), image.as_raw())
            .map_err(encode_error)?;

        output.write_all(&buffer).map_err(encode_error)
    }
}

impl ThumbnailEncoder for StandardThumbnailEncoder {
    fn encode(
        &self,
        image: &RgbaImage,
        format: ThumbnailFormat,
        quality: u8,
        output: &mut dyn Write,
    ) -> Result<()> {
        debug!(
            "Encoding {:?} thumbnail: {}x{}",
            format,
            image.width(),
            image.height()
        );

        match format {
            ThumbnailFormat::Jpeg => self.write_jpeg(image, quality, output)?,
            ThumbnailFormat::Png => self.write_png(image, output)?,
            ThumbnailFormat::Tiff => self.write_tiff(image, output)?,
        }

        debug!("Thumbnail encoding complete");
        Ok(())
    }
}
