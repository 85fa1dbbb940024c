//! Decoded RAW image types

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::raw::metadata::CameraMetadata;

/// Number of interleaved samples per pixel in a decoded buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    /// Single-channel CFA sensor data, not demosaiced
    Cfa,
    /// Demosaiced RGB
    Rgb,
}

impl Channels {
    pub fn from_count(count: i64) -> Option<Self> {
        match count {
            1 => Some(Channels::Cfa),
            3 => Some(Channels::Rgb),
            _ => None,
        }
    }

    pub fn count(self) -> usize {
        match self {
            Channels::Cfa => 1,
            Channels::Rgb => 3,
        }
    }
}

/// Number of samples a `width x height` buffer with `channels` holds.
///
/// Returns `None` when the count, or its size in bytes, does not fit the
/// address space.
pub fn sample_count(width: u32, height: u32, channels: Channels) -> Option<usize> {
    let len = (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(channels.count())?;
    let bytes = len.checked_mul(size_of::<u16>())?;
    (bytes <= isize::MAX as usize).then_some(len)
}

/// Owned 16-bit image produced by a successful decode.
///
/// Samples are row-major and channel-interleaved. The buffer length always
/// equals `width * height * channels`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    channels: Channels,
    samples: Vec<u16>,
}

impl DecodedImage {
    pub fn new(width: u32, height: u32, channels: Channels, samples: Vec<u16>) -> Result<Self> {
        let expected = sample_count(width, height, channels);
        if width == 0 || height == 0 || expected != Some(samples.len()) {
            return Err(ConversionError::InvalidDimensions {
                width,
                height,
                channels: channels.count(),
                expected,
                actual: samples.len(),
            });
        }

        Ok(Self {
            width,
            height,
            channels,
            samples,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Interleaved samples, `width * height * channels` long.
    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<u16> {
        self.samples
    }
}

/// A decoded RAW file: pixels plus the camera metadata read alongside them.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPhoto {
    pub image: DecodedImage,
    pub metadata: CameraMetadata,
}

impl RawPhoto {
    pub fn into_parts(self) -> (DecodedImage, CameraMetadata) {
        (self.image, self.metadata)
    }
}
