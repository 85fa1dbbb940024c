//! Native decode gateway
//!
//! This module owns the boundary with the native RAW decoder: the C descriptor
//! layout, the decode/release contract, and the marshaling that copies a
//! result into owned [`RawPhoto`](crate::image_pipeline::RawPhoto) values.

pub mod ffi;
mod decoder;
mod demosaic;
mod gateway;
mod rawloader_decoder;
#[cfg(feature = "libraw")]
mod libraw_decoder;
pub mod version;


pub use decoder::NativeDecoder;
pub use gateway::{DecodeGateway, DefaultDecoder, decode_file};
pub use rawloader_decoder::RawLoaderDecoder;
#[cfg(feature = "libraw")]
pub use libraw_decoder::LibRawDecoder;
pub use version::NativeVersion;
