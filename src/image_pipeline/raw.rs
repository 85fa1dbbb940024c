//! Decoded RAW image module
//!
//! Owned pixel buffers and camera metadata produced by the native decode gateway.

pub mod metadata;
pub mod types;

pub use metadata::{CameraMetadata, ColorSpace, DriveMode, ImageFormat, Orientation};
pub use types::{Channels, DecodedImage, RawPhoto, sample_count};
