use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::{RgbaImage, imageops};
use tracing::{info, instrument};

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::raw::types::DecodedImage;
use crate::image_pipeline::rgba::to_rgba;
use crate::image_pipeline::thumbnail::encoder::ThumbnailEncoder;
use crate::image_pipeline::thumbnail::standard_encoder::StandardThumbnailEncoder;
use crate::image_pipeline::thumbnail::types::{CropRect, ThumbnailConfig, ThumbnailFormat};

pub struct ThumbnailPipeline<E: ThumbnailEncoder> {
    encoder: E,
}

impl ThumbnailPipeline<StandardThumbnailEncoder> {
    pub fn new() -> Self {
        Self {
            encoder: StandardThumbnailEncoder,
        }
    }
}

impl Default for ThumbnailPipeline<StandardThumbnailEncoder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ThumbnailEncoder> ThumbnailPipeline<E> {
    pub fn with_encoder(encoder: E) -> Self {
        Self { encoder }
    }

    fn prepare(&self, image: &DecodedImage, crop: CropRect) -> Result<RgbaImage> {
        let rgba = {
            let _span = tracing::info_span!("convert_rgba").entered();
            to_rgba(image)?
        };

        if crop == CropRect::full(image.width(), image.height()) {
            return Ok(rgba);
        }

        let _span = tracing::info_span!("crop",
            x0 = crop.x0,
            y0 = crop.y0,
            x1 = crop.x1,
            y1 = crop.y1
        )
        .entered();
        Ok(imageops::crop_imm(&rgba, crop.x0, crop.y0, crop.width(), crop.height()).to_image())
    }

    /// Encodes a thumbnail of `image` into `output`.
    ///
    /// Quality and crop are validated before anything is written.
    #[instrument(skip(self, image, config, output))]
    pub fn render(
        &self,
        image: &DecodedImage,
        format: ThumbnailFormat,
        config: &ThumbnailConfig,
        output: &mut dyn Write,
    ) -> Result<()> {
        let crop = config.validate(image.width(), image.height())?;
        let rgba = self.prepare(image, crop)?;

        let _span = tracing::info_span!("encode_thumbnail").entered();
        self.encoder.encode(&rgba, format, config.quality, output)
    }

    /// Writes a thumbnail of `image` to `destination`.
    ///
    /// The container format follows the destination's extension (png, jpeg,
    /// jpg, tiff, tif; case-insensitive). A destination without an extension
    /// gets `.jpg` appended. Quality, crop and extension are all checked before
    /// the file is created. Returns the path actually written.
    #[instrument(skip(self, image, destination, config))]
    pub fn create_thumbnail<P: AsRef<Path>>(
        &self,
        image: &DecodedImage,
        destination: P,
        config: &ThumbnailConfig,
    ) -> Result<PathBuf> {
        let crop = config.validate(image.width(), image.height())?;
        let (path, format) = ThumbnailFormat::for_destination(destination.as_ref())?;

        info!(
            output = %path.display(),
            ?format,
            quality = config.quality,
            "Creating thumbnail"
        );

        let rgba = self.prepare(image, crop)?;

        let file = {
            let _span = tracing::info_span!("create_output_file").entered();
            File::create(&path).map_err(|e| {
                ConversionError::EncodeError(format!("{}: {}", path.display(), e))
            })?
        };
        let mut output = BufWriter::new(file);

        {
            let _span = tracing::info_span!("encode_thumbnail").entered();
            self.encoder
                .encode(&rgba, format, config.quality, &mut output)?;
            output.flush().map_err(|e| {
                ConversionError::EncodeError(format!("{}: {}", path.display(), e))
            })?;
        }

        info!(
            width = rgba.width(),
            height = rgba.height(),
            "Thumbnail written"
        );
        Ok(path)
    }
}

impl DecodedImage {
    /// Shorthand for [`ThumbnailPipeline::create_thumbnail`] with the standard encoder.
    pub fn create_thumbnail<P: AsRef<Path>>(
        &self,
        destination: P,
        config: &ThumbnailConfig,
    ) -> Result<PathBuf> {
        ThumbnailPipeline::new().create_thumbnail(self, destination, config)
    }
}
