use std::ffi::CStr;
use std::ptr::NonNull;

use crate::image_pipeline::native::ffi::RawKitImage;

/// A native decode/release pair.
///
/// # Safety
///
/// A pointer returned by [`NativeDecoder::decode`] must point to an initialized
/// [`RawKitImage`] whose `buffer` holds at least `width * height * colors`
/// samples, and both must stay valid until the pointer is handed back to
/// [`NativeDecoder::release`].
pub unsafe trait NativeDecoder {
    /// Decodes the file at `path`, `None` when the native side signals failure.
    fn decode(&self, path: &CStr) -> Option<NonNull<RawKitImage>>;

    /// Frees a result previously returned by `decode`.
    ///
    /// # Safety
    ///
    /// `image` must come from this decoder's `decode` and must not be used or
    /// released again afterwards.
    unsafe fn release(&self, image: NonNull<RawKitImage>);

    /// Packed and dotted native library version, when the backend has one.
    fn version(&self) -> Option<(u32, String)> {
        None
    }
}
