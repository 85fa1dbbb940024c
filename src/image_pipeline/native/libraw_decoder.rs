//! Decode backend that calls into the native LibRaw wrapper library.

use std::ffi::CStr;
use std::ptr::NonNull;

use tracing::debug;

use crate::image_pipeline::native::decoder::NativeDecoder;
use crate::image_pipeline::native::ffi::{RawKitImage, bindings};

/// Demosaiced 16-bit RGB decoding through `rawkit_load` / `rawkit_free`.
///
/// LibRaw instances are created per call inside the wrapper, but the library is
/// not documented as reentrant; serialize calls across threads if in doubt.
#[derive(Debug, Default, Clone, Copy)]
pub struct LibRawDecoder;

// SAFETY: `rawkit_load` returns either NULL or a malloc'd descriptor whose buffer
// holds `width * height * colors` samples, freed only by `rawkit_free`.
unsafe impl NativeDecoder for LibRawDecoder {
    fn decode(&self, path: &CStr) -> Option<NonNull<RawKitImage>> {
        debug!(path = ?path, "Decoding RAW file with LibRaw");
        // SAFETY: `path` is a valid NUL-terminated string for the duration of the call.
        NonNull::new(unsafe { bindings::rawkit_load(path.as_ptr()) })
    }

    unsafe fn release(&self, image: NonNull<RawKitImage>) {
        // SAFETY: caller guarantees `image` came from `rawkit_load` and is released once.
        unsafe { bindings::rawkit_free(image.as_ptr()) }
    }

    fn version(&self) -> Option<(u32, String)> {
        // SAFETY: both calls only read static data inside LibRaw.
        let packed = unsafe { bindings::rawkit_libraw_version_num() };
        let text = unsafe { bindings::rawkit_libraw_version_str() };
        if text.is_null() {
            return None;
        }
        // SAFETY: LibRaw returns a pointer to a static NUL-terminated string.
        let text = unsafe { CStr::from_ptr(text) }.to_string_lossy().into_owned();
        Some((u32::try_from(packed).ok()?, text))
    }
}
