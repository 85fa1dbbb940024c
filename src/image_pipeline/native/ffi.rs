//! C layout of the native decode result, mirroring `native/rawkit_wrapper.h`.

use std::os::raw::{c_char, c_int, c_uint};

/// Byte length of every fixed text field in [`RawKitImage`].
pub const RAWKIT_TEXT_LEN: usize = 64;

pub type FixedText = [c_char; RAWKIT_TEXT_LEN];

#[repr(C)]
#[derive(Debug)]
pub struct RawKitImage {
    pub buffer: *mut u16,
    pub width: c_int,
    pub height: c_int,
    pub colors: c_int,
    pub format: FixedText,
    pub flip: c_int,
    pub as_shot_wb_applied: c_int,
    pub raw_bits_per_pixel: c_uint,
    pub raw_count: c_uint,
    pub dng_version: c_uint,
    pub color_space: c_int,
    pub drive_mode: c_int,
    pub iso_speed: f32,
    pub shutter: f32,
    pub aperture: f32,
    pub focal_len: f32,
    pub artist: FixedText,
    pub camera_make: FixedText,
    pub camera_model: FixedText,
    pub normalized_make: FixedText,
    pub normalized_model: FixedText,
    pub software: FixedText,
}

impl RawKitImage {
    /// Descriptor with every field zeroed and a null buffer.
    pub fn empty() -> Self {
        Self {
            buffer: std::ptr::null_mut(),
            width: 0,
            height: 0,
            colors: 0,
            format: [0; RAWKIT_TEXT_LEN],
            flip: 0,
            as_shot_wb_applied: 0,
            raw_bits_per_pixel: 0,
            raw_count: 0,
            dng_version: 0,
            color_space: 0,
            drive_mode: 0,
            iso_speed: 0.0,
            shutter: 0.0,
            aperture: 0.0,
            focal_len: 0.0,
            artist: [0; RAWKIT_TEXT_LEN],
            camera_make: [0; RAWKIT_TEXT_LEN],
            camera_model: [0; RAWKIT_TEXT_LEN],
            normalized_make: [0; RAWKIT_TEXT_LEN],
            normalized_model: [0; RAWKIT_TEXT_LEN],
            software: [0; RAWKIT_TEXT_LEN],
        }
    }
}

/// Copies a fixed text field, stopping at the first NUL or the field end.
pub fn read_fixed_text(field: &FixedText) -> String {
    let bytes: Vec<u8> = field
        .iter()
        .map(|&c| c as u8)
        .take_while(|&b| b != 0)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Fills a fixed text field, truncating so at least one NUL terminator remains.
pub fn write_fixed_text(field: &mut FixedText, text: &str) {
    field.fill(0);
    for (dst, &src) in field
        .iter_mut()
        .zip(text.as_bytes().iter().take(RAWKIT_TEXT_LEN - 1))
    {
        *dst = src as c_char;
    }
}

#[cfg(feature = "libraw")]
#[allow(non_upper_case_globals)]
#[allow(non_camel_case_types)]
#[allow(non_snake_case)]
#[allow(dead_code)]
pub mod bindings {
    include!(concat!(env!("OUT_DIR"), "/rawkit_bindings.rs"));
}
