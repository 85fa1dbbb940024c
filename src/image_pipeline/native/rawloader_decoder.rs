//! Pure-Rust decode backend built on the rawloader library.
//!
//! rawloader does not demosaic, so 2x2 Bayer data is interpolated to RGB here
//! (see [`demosaic`](super::demosaic)). Linear/RGB raws already carry three
//! channels. Other mosaics such as X-Trans come back as single-channel CFA data
//! (`colors == 1`). The result is laid out in the same [`RawKitImage`]
//! descriptor the native wrapper produces, so the gateway marshals both
//! backends through one path.

use std::ffi::CStr;
use std::path::Path;
use std::ptr::{self, NonNull};

use rawloader::{Orientation as RawloaderOrientation, RawImageData as RawloaderImageData};
use tracing::debug;

use crate::image_pipeline::native::decoder::NativeDecoder;
use crate::image_pipeline::native::demosaic::{Levels, bayer_pattern, demosaic};
use crate::image_pipeline::native::ffi::{RawKitImage, write_fixed_text};
use crate::image_pipeline::raw::metadata::{ImageFormat, Orientation};

/// Decode backend that runs rawloader in-process.
///
/// Supports any format rawloader can decode, including Sony ARW, Canon CR2,
/// Nikon NEF, Fujifilm RAF and DNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawLoaderDecoder;

/// Default bit depth when no white level information is available from the RAW file.
const DEFAULT_BITS_PER_SAMPLE: u32 = 16;

/// The bit width of the u16 data type, used for calculating actual bits per sample.
const U16_BITS: u32 = 16;

fn flip_code(orientation: RawloaderOrientation) -> i32 {
    let orientation = match orientation {
        RawloaderOrientation::Rotate180 => Orientation::Rotate180,
        RawloaderOrientation::Rotate90 => Orientation::Rotate90Cw,
        RawloaderOrientation::Rotate270 => Orientation::Rotate90Ccw,
        _ => Orientation::Normal,
    };
    orientation.to_flip()
}

/// Minimum bits needed to represent the sensor's highest white level,
/// e.g. 4095 (0xFFF) -> 12 bits, 16383 (0x3FFF) -> 14 bits.
fn bits_per_sample(whitelevels: &[u16]) -> u32 {
    let max_white_level = whitelevels.iter().max().copied().unwrap_or(u16::MAX);
    if max_white_level == 0 {
        DEFAULT_BITS_PER_SAMPLE
    } else {
        U16_BITS - max_white_level.leading_zeros()
    }
}

#[cfg(unix)]
fn fs_path(path: &CStr) -> Option<&Path> {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    Some(Path::new(OsStr::from_bytes(path.to_bytes())))
}

#[cfg(not(unix))]
fn fs_path(path: &CStr) -> Option<&Path> {
    path.to_str().ok().map(Path::new)
}

/// Sample count described by a descriptor's geometry.
fn descriptor_len(image: &RawKitImage) -> Option<usize> {
    let width = usize::try_from(image.width).ok()?;
    let height = usize::try_from(image.height).ok()?;
    let colors = usize::try_from(image.colors).ok()?;
    width.checked_mul(height)?.checked_mul(colors)
}

/// Moves `samples` and the descriptor onto the heap for the gateway.
///
/// The descriptor's geometry must describe exactly `samples.len()` samples,
/// otherwise nothing is allocated. Ownership comes back through
/// [`RawLoaderDecoder::release`].
pub(crate) fn into_descriptor(
    mut image: RawKitImage,
    samples: Vec<u16>,
) -> Option<NonNull<RawKitImage>> {
    if descriptor_len(&image) != Some(samples.len()) {
        debug!(
            width = image.width,
            height = image.height,
            colors = image.colors,
            samples = samples.len(),
            "Descriptor geometry does not match its samples"
        );
        return None;
    }

    image.buffer = Box::into_raw(samples.into_boxed_slice()) as *mut u16;
    NonNull::new(Box::into_raw(Box::new(image)))
}

// SAFETY: `decode` only returns descriptors built by `into_descriptor`, whose
// buffer holds exactly `width * height * colors` samples, and both allocations
// live until `release`.
unsafe impl NativeDecoder for RawLoaderDecoder {
    fn decode(&self, path: &CStr) -> Option<NonNull<RawKitImage>> {
        let path = fs_path(path)?;
        debug!(path = %path.display(), "Decoding RAW file with rawloader");

        let decoded = match rawloader::decode_file(path) {
            Ok(decoded) => decoded,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "rawloader rejected file");
                return None;
            }
        };

        // Float data (normalized 0.0-1.0) is scaled to the u16 range
        let (samples, levels): (Vec<u16>, Levels) = match decoded.data {
            RawloaderImageData::Integer(values) => (
                values,
                Levels::from_sensor(&decoded.blacklevels, &decoded.whitelevels, &decoded.wb_coeffs),
            ),
            RawloaderImageData::Float(values) => (
                values.iter().map(|&v| (v * u16::MAX as f32) as u16).collect(),
                Levels::identity(),
            ),
        };

        let expected = decoded
            .width
            .checked_mul(decoded.height)
            .and_then(|n| n.checked_mul(decoded.cpp));
        if expected != Some(samples.len()) {
            debug!(
                width = decoded.width,
                height = decoded.height,
                cpp = decoded.cpp,
                samples = samples.len(),
                "rawloader returned a buffer that does not match its geometry"
            );
            return None;
        }

        let (samples, colors, wb_applied) = match (decoded.cpp, bayer_pattern(&decoded.cfa)) {
            (1, Some(pattern)) => {
                let rgb = demosaic(&samples, decoded.width, decoded.height, pattern, &levels)?;
                (rgb, 3, levels.wb != [1.0; 3])
            }
            (1, None) => {
                debug!(cfa = %decoded.cfa.name, "No Bayer layout, returning CFA data");
                (samples, 1, false)
            }
            (cpp, _) => (samples, cpp, false),
        };

        let mut image = RawKitImage::empty();
        image.width = i32::try_from(decoded.width).ok()?;
        image.height = i32::try_from(decoded.height).ok()?;
        image.colors = i32::try_from(colors).ok()?;
        image.flip = flip_code(decoded.orientation);
        image.as_shot_wb_applied = i32::from(wb_applied);
        image.raw_bits_per_pixel = bits_per_sample(&decoded.whitelevels);
        image.raw_count = 1;
        write_fixed_text(&mut image.format, ImageFormat::Bitmap.mime());
        write_fixed_text(&mut image.camera_make, &decoded.make);
        write_fixed_text(&mut image.camera_model, &decoded.model);
        write_fixed_text(&mut image.normalized_make, &decoded.clean_make);
        write_fixed_text(&mut image.normalized_model, &decoded.clean_model);

        debug!(
            width = decoded.width,
            height = decoded.height,
            colors,
            bits = image.raw_bits_per_pixel,
            "rawloader decode complete"
        );

        into_descriptor(image, samples)
    }

    unsafe fn release(&self, image: NonNull<RawKitImage>) {
        // SAFETY: the descriptor and its buffer were leaked from boxes in
        // `into_descriptor`, which checked the buffer length against the geometry.
        unsafe {
            let image = Box::from_raw(image.as_ptr());
            if let (false, Some(len)) = (image.buffer.is_null(), descriptor_len(&image)) {
                drop(Box::from_raw(ptr::slice_from_raw_parts_mut(image.buffer, len)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::image_pipeline::native::gateway::DecodeGateway;
    use crate::image_pipeline::raw::types::Channels;

    /// Hands out a fixed sample buffer through the rawloader backend's
    /// allocation and release path.
    struct Preloaded {
        width: i32,
        height: i32,
        colors: i32,
        samples: Vec<u16>,
        releases: AtomicUsize,
    }

    impl Preloaded {
        fn new(width: i32, height: i32, colors: i32, samples: Vec<u16>) -> Self {
            Self {
                width,
                height,
                colors,
                samples,
                releases: AtomicUsize::new(0),
            }
        }
    }

    // SAFETY: descriptors come from `into_descriptor` and go back through
    // `RawLoaderDecoder::release`.
    unsafe impl NativeDecoder for Preloaded {
        fn decode(&self, _path: &CStr) -> Option<NonNull<RawKitImage>> {
            let mut image = RawKitImage::empty();
            image.width = self.width;
            image.height = self.height;
            image.colors = self.colors;
            write_fixed_text(&mut image.format, ImageFormat::Bitmap.mime());
            write_fixed_text(&mut image.camera_make, "Sony");
            into_descriptor(image, self.samples.clone())
        }

        unsafe fn release(&self, image: NonNull<RawKitImage>) {
            unsafe { RawLoaderDecoder.release(image) };
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_bits_per_sample_from_white_level() {
        assert_eq!(bits_per_sample(&[4095, 4095, 4095, 4095]), 12);
        assert_eq!(bits_per_sample(&[16383, 16000, 16383, 0]), 14);
        assert_eq!(bits_per_sample(&[0, 0, 0, 0]), DEFAULT_BITS_PER_SAMPLE);
        assert_eq!(bits_per_sample(&[]), 16);
    }

    #[test]
    fn test_flip_code_mapping() {
        assert_eq!(flip_code(RawloaderOrientation::Normal), 0);
        assert_eq!(flip_code(RawloaderOrientation::Rotate180), 3);
        assert_eq!(flip_code(RawloaderOrientation::Rotate90), 6);
        assert_eq!(flip_code(RawloaderOrientation::Rotate270), 5);
    }

    #[test]
    fn test_missing_file_signals_failure() {
        let path = CString::new("/nonexistent/path/to/file.arw").unwrap();
        assert!(RawLoaderDecoder.decode(&path).is_none());
    }

    #[test]
    fn test_garbage_file_signals_failure() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("garbage.arw");
        std::fs::write(&file, b"not a valid raw file").unwrap();

        let path = CString::new(file.to_str().unwrap()).unwrap();
        assert!(RawLoaderDecoder.decode(&path).is_none());
    }

    #[test]
    fn test_heap_descriptor_marshals_and_releases_once() {
        let samples: Vec<u16> = (0..4 * 3 * 3).map(|i| i * 1000).collect();
        let gateway = DecodeGateway::with_decoder(Preloaded::new(4, 3, 3, samples.clone()));

        let photo = gateway.decode("preloaded.arw").unwrap();
        assert_eq!(gateway.decoder().releases.load(Ordering::SeqCst), 1);
        assert_eq!(photo.image.width(), 4);
        assert_eq!(photo.image.height(), 3);
        assert_eq!(photo.image.channels(), Channels::Rgb);
        assert_eq!(photo.image.samples(), samples.as_slice());
        assert_eq!(photo.metadata.camera_make, "Sony");

        let again = gateway.decode("preloaded.arw").unwrap();
        assert_eq!(again.image.samples(), samples.as_slice());
        assert_eq!(gateway.decoder().releases.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_heap_descriptor_single_channel() {
        let samples = vec![7u16; 6 * 2];
        let gateway = DecodeGateway::with_decoder(Preloaded::new(6, 2, 1, samples));

        let photo = gateway.decode("cfa.raf").unwrap();
        assert_eq!(photo.image.channels(), Channels::Cfa);
        assert_eq!(photo.image.samples().len(), 12);
        assert_eq!(gateway.decoder().releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_descriptor_rejects_mismatched_samples() {
        let mut image = RawKitImage::empty();
        image.width = 4;
        image.height = 4;
        image.colors = 3;
        assert!(into_descriptor(image, vec![0; 47]).is_none());

        let mut image = RawKitImage::empty();
        image.width = -4;
        image.height = -4;
        image.colors = 1;
        assert!(into_descriptor(image, vec![0; 16]).is_none());
    }

    #[test]
    fn test_mismatched_preload_is_decode_failure() {
        let gateway = DecodeGateway::with_decoder(Preloaded::new(4, 4, 3, vec![0; 10]));

        assert!(gateway.decode("short.arw").is_err());
        assert_eq!(gateway.decoder().releases.load(Ordering::SeqCst), 0);
    }
}
