//! Image processing pipeline module
//!
//! This module turns camera RAW files into owned 16-bit images and derives
//! thumbnails from them, with separate modules for the native decode boundary,
//! decoded image types, RGBA conversion and thumbnail writing.

pub mod common;
pub mod native;
pub mod raw;
pub mod rgba;
pub mod thumbnail;

pub use common::{
    ConversionError,
    Result,
    ValidationError,
};

pub use native::{
    DecodeGateway,
    DefaultDecoder,
    NativeDecoder,
    NativeVersion,
    RawLoaderDecoder,
    decode_file,
};

#[cfg(feature = "libraw")]
pub use native::LibRawDecoder;

pub use raw::{
    CameraMetadata,
    Channels,
    DecodedImage,
    RawPhoto,
};

pub use rgba::to_rgba;

pub use thumbnail::{
    CropRect,
    ThumbnailConfig,
    ThumbnailConfigBuilder,
    ThumbnailEncoder,
    ThumbnailFormat,
    ThumbnailPipeline,
    StandardThumbnailEncoder,
};
