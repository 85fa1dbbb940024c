use std::path::PathBuf;

use thiserror::Error;

/// Thumbnail request rejected before anything was written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Expected thumbnail quality between 1 and 100, received {0}")]
    InvalidQuality(u8),

    #[error(
        "Invalid crop (x0={x0}, y0={y0}, x1={x1}, y1={y1}): not contained in the {width}x{height} image"
    )]
    CropOutOfBounds {
        x0: u32,
        y0: u32,
        x1: u32,
        y1: u32,
        width: u32,
        height: u32,
    },

    #[error("Invalid crop (x0={x0}, y0={y0}, x1={x1}, y1={y1}): crop has zero area")]
    EmptyCrop { x0: u32, y0: u32, x1: u32, y1: u32 },

    #[error("Invalid thumbnail extension {0:?}")]
    UnsupportedExtension(String),
}

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Failed to decode RAW file {}: {reason}", .path.display())]
    DecodeError { path: PathBuf, reason: String },

    #[error("Invalid image geometry {width}x{height}x{channels}: expected {expected:?} samples, got {actual}")]
    InvalidDimensions {
        width: u32,
        height: u32,
        channels: usize,
        expected: Option<usize>,
        actual: usize,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Cannot render {0}-channel image data as RGBA (only 3-channel RGB is supported)")]
    UnsupportedChannels(usize),

    #[error("Failed to encode thumbnail: {0}")]
    EncodeError(String),

    #[error("Native version mismatch: packed 0x{packed:06x} disagrees with {text:?}")]
    VersionMismatch { packed: u32, text: String },
}

impl ConversionError {
    pub(crate) fn decode(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ConversionError::DecodeError {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConversionError>;
