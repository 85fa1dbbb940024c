//! Camera metadata read alongside the decoded pixels

/// Container the native decoder produced the pixels in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Bitmap,
    Jpeg,
    JpegXl,
    H265,
}

impl ImageFormat {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/bitmap" => Some(ImageFormat::Bitmap),
            "image/jpeg" => Some(ImageFormat::Jpeg),
            "image/jpegxl" => Some(ImageFormat::JpegXl),
            "image/h265" => Some(ImageFormat::H265),
            _ => None,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ImageFormat::Bitmap => "image/bitmap",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::JpegXl => "image/jpegxl",
            ImageFormat::H265 => "image/h265",
        }
    }
}

/// Working color space reported by the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Srgb,
    AdobeRgb,
    Unknown,
}

impl ColorSpace {
    /// `0` means the decoder did not supply a value.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => None,
            1 => Some(ColorSpace::Srgb),
            2 => Some(ColorSpace::AdobeRgb),
            _ => Some(ColorSpace::Unknown),
        }
    }
}

/// Shooting mode the frame was captured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveMode {
    SingleFrame,
    ContinuousLow,
    ContinuousHigh,
}

impl DriveMode {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(DriveMode::SingleFrame),
            2 => Some(DriveMode::ContinuousLow),
            3 => Some(DriveMode::ContinuousHigh),
            _ => None,
        }
    }
}

/// Rotation needed to display the image upright, decoded from the flip code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Normal,
    Rotate180,
    Rotate90Ccw,
    Rotate90Cw,
    Unknown(i32),
}

impl Orientation {
    pub fn from_flip(flip: i32) -> Self {
        match flip {
            0 => Orientation::Normal,
            3 => Orientation::Rotate180,
            5 => Orientation::Rotate90Ccw,
            6 => Orientation::Rotate90Cw,
            other => Orientation::Unknown(other),
        }
    }

    pub fn to_flip(self) -> i32 {
        match self {
            Orientation::Normal => 0,
            Orientation::Rotate180 => 3,
            Orientation::Rotate90Ccw => 5,
            Orientation::Rotate90Cw => 6,
            Orientation::Unknown(flip) => flip,
        }
    }
}

/// Descriptive fields copied out of the native decode result.
///
/// Text fields come from fixed 64-byte native fields, cut at the first NUL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CameraMetadata {
    pub format: Option<ImageFormat>,
    /// Raw flip code, see [`CameraMetadata::orientation`]
    pub flip: i32,
    /// White balance already applied in camera (multishot modes, small raw)
    pub as_shot_wb_applied: bool,
    pub raw_bits_per_pixel: u32,
    /// Number of raw frames in the file
    pub raw_count: u32,
    pub dng_version: u32,
    pub color_space: Option<ColorSpace>,
    pub drive_mode: Option<DriveMode>,
    pub iso: f32,
    pub shutter_speed: f32,
    pub aperture: f32,
    pub focal_length: f32,
    pub artist: String,
    pub camera_make: String,
    pub camera_model: String,
    pub normalized_make: String,
    pub normalized_model: String,
    pub software: String,
}

impl CameraMetadata {
    pub fn orientation(&self) -> Orientation {
        Orientation::from_flip(self.flip)
    }
}
