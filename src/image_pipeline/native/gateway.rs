//! Marshaling of native decode results into owned Rust values.
//!
//! Every non-null result from a [`NativeDecoder`] is wrapped in a guard that
//! calls `release` exactly once when it goes out of scope, after the pixel
//! buffer and metadata have been copied. Nothing returned from here points
//! into native memory.

use std::ffi::CString;
use std::path::Path;
use std::ptr::NonNull;
use std::slice;

use tracing::{debug, instrument};

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::native::decoder::NativeDecoder;
use crate::image_pipeline::native::ffi::{RawKitImage, read_fixed_text};
use crate::image_pipeline::native::version::NativeVersion;
use crate::image_pipeline::raw::metadata::{
    CameraMetadata, ColorSpace, DriveMode, ImageFormat,
};
use crate::image_pipeline::raw::types::{Channels, DecodedImage, RawPhoto, sample_count};

#[cfg(feature = "libraw")]
pub type DefaultDecoder = crate::image_pipeline::native::libraw_decoder::LibRawDecoder;

#[cfg(not(feature = "libraw"))]
pub type DefaultDecoder = crate::image_pipeline::native::rawloader_decoder::RawLoaderDecoder;

/// Releases a native result when dropped.
struct NativeResult<'a, D: NativeDecoder> {
    decoder: &'a D,
    image: NonNull<RawKitImage>,
}

impl<D: NativeDecoder> NativeResult<'_, D> {
    fn descriptor(&self) -> &RawKitImage {
        // SAFETY: the decoder contract keeps the descriptor valid until release,
        // which only happens in Drop.
        unsafe { self.image.as_ref() }
    }
}

impl<D: NativeDecoder> Drop for NativeResult<'_, D> {
    fn drop(&mut self) {
        debug!("Releasing native decode result");
        // SAFETY: `image` came from `decoder.decode` and this is the only release.
        unsafe { self.decoder.release(self.image) };
    }
}

pub struct DecodeGateway<D: NativeDecoder> {
    decoder: D,
}

impl DecodeGateway<DefaultDecoder> {
    pub fn new() -> Self {
        Self {
            decoder: DefaultDecoder::default(),
        }
    }
}

impl Default for DecodeGateway<DefaultDecoder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: NativeDecoder> DecodeGateway<D> {
    pub fn with_decoder(decoder: D) -> Self {
        Self { decoder }
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Decodes a RAW file into an owned image and its camera metadata.
    ///
    /// Fails with [`ConversionError::DecodeError`] when the native decoder
    /// signals failure or returns geometry that cannot describe a valid buffer.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn decode<P: AsRef<Path>>(&self, path: P) -> Result<RawPhoto> {
        let path = path.as_ref();

        let c_path = c_path(path)?;

        let image = {
            let _span = tracing::info_span!("native_decode").entered();
            self.decoder.decode(&c_path)
        }
        .ok_or_else(|| ConversionError::decode(path, "native decoder signaled failure"))?;

        let result = NativeResult {
            decoder: &self.decoder,
            image,
        };

        let photo = marshal(path, result.descriptor())?;
        drop(result);

        debug!(
            width = photo.image.width(),
            height = photo.image.height(),
            channels = photo.image.channels().count(),
            "Decode complete"
        );
        Ok(photo)
    }

    /// Native library version, checked for agreement between its packed and
    /// dotted forms. `None` for backends without a native library.
    pub fn native_version(&self) -> Result<Option<NativeVersion>> {
        let Some((packed, text)) = self.decoder.version() else {
            return Ok(None);
        };

        let from_packed = NativeVersion::from_packed(packed);
        match NativeVersion::parse(&text) {
            Some(parsed) if parsed.agrees_with(&from_packed) => Ok(Some(from_packed)),
            _ => Err(ConversionError::VersionMismatch { packed, text }),
        }
    }
}

/// Decodes `path` with the default backend.
pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<RawPhoto> {
    DecodeGateway::new().decode(path)
}

/// Any NUL-free path is passed through byte for byte.
#[cfg(unix)]
fn c_path(path: &Path) -> Result<CString> {
    use std::os::unix::ffi::OsStrExt;

    CString::new(path.as_os_str().as_bytes())
        .map_err(|_| ConversionError::decode(path, "path contains a NUL byte"))
}

#[cfg(not(unix))]
fn c_path(path: &Path) -> Result<CString> {
    let path_str = path
        .to_str()
        .ok_or_else(|| ConversionError::decode(path, "path is not valid UTF-8"))?;
    CString::new(path_str).map_err(|_| ConversionError::decode(path, "path contains a NUL byte"))
}

fn marshal(path: &Path, native: &RawKitImage) -> Result<RawPhoto> {
    let invalid = |reason: String| ConversionError::decode(path, reason);

    let (width, height) = match (u32::try_from(native.width), u32::try_from(native.height)) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => (w, h),
        _ => {
            return Err(invalid(format!(
                "invalid dimensions {}x{}",
                native.width, native.height
            )));
        }
    };

    let channels = Channels::from_count(native.colors.into())
        .ok_or_else(|| invalid(format!("unsupported channel count {}", native.colors)))?;

    let len = sample_count(width, height, channels).ok_or_else(|| {
        invalid(format!(
            "buffer size {}x{}x{} overflows the address space",
            width,
            height,
            channels.count()
        ))
    })?;

    if native.buffer.is_null() {
        return Err(invalid("native buffer is null".to_string()));
    }

    // SAFETY: the decoder contract guarantees `len` initialized samples behind
    // a non-null buffer until release, and `len * 2` fits in isize.
    let samples = unsafe { slice::from_raw_parts(native.buffer, len) }.to_vec();
    let image = DecodedImage::new(width, height, channels, samples)
        .map_err(|e| invalid(e.to_string()))?;

    let metadata = CameraMetadata {
        format: ImageFormat::from_mime(&read_fixed_text(&native.format)),
        flip: native.flip,
        as_shot_wb_applied: native.as_shot_wb_applied != 0,
        raw_bits_per_pixel: native.raw_bits_per_pixel,
        raw_count: native.raw_count,
        dng_version: native.dng_version,
        color_space: ColorSpace::from_code(native.color_space),
        drive_mode: DriveMode::from_code(native.drive_mode),
        iso: native.iso_speed,
        shutter_speed: native.shutter,
        aperture: native.aperture,
        focal_length: native.focal_len,
        artist: read_fixed_text(&native.artist),
        camera_make: read_fixed_text(&native.camera_make),
        camera_model: read_fixed_text(&native.camera_model),
        normalized_make: read_fixed_text(&native.normalized_make),
        normalized_model: read_fixed_text(&native.normalized_model),
        software: read_fixed_text(&native.software),
    };

    Ok(RawPhoto { image, metadata })
}
