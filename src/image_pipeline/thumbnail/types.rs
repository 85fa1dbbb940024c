//! Thumbnail configuration types

use std::path::{Path, PathBuf};

use crate::image_pipeline::common::error::ValidationError;

/// JPEG quality used when none is configured.
pub const DEFAULT_QUALITY: u8 = 90;

/// Container format a thumbnail is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailFormat {
    /// Lossy, uses the configured quality
    Jpeg,
    /// Lossless, quality is ignored
    Png,
    /// Lossless, quality is ignored
    Tiff,
}

impl ThumbnailFormat {
    /// Maps a lower-case extension without the leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "jpg" | "jpeg" => Some(ThumbnailFormat::Jpeg),
            "png" => Some(ThumbnailFormat::Png),
            "tif" | "tiff" => Some(ThumbnailFormat::Tiff),
            _ => None,
        }
    }

    /// Resolves the format from a destination path.
    ///
    /// A path without an extension gets `.jpg` appended and is written as JPEG.
    /// The extension is everything after the last dot of the file name, so a
    /// dotfile such as `.thumb` has extension `thumb` and is rejected.
    pub fn for_destination(path: &Path) -> Result<(PathBuf, Self), ValidationError> {
        let Some(ext) = extension_of(path) else {
            let mut amended = path.as_os_str().to_owned();
            amended.push(".jpg");
            return Ok((PathBuf::from(amended), ThumbnailFormat::Jpeg));
        };

        let ext = ext.to_lowercase();
        match Self::from_extension(&ext) {
            Some(format) => Ok((path.to_path_buf(), format)),
            None => Err(ValidationError::UnsupportedExtension(ext)),
        }
    }
}

// Unlike `Path::extension`, a leading dot counts as the separator.
fn extension_of(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    name.rsplit_once('.').map(|(_, ext)| ext.to_string())
}

/// Half-open pixel rectangle `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl CropRect {
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// The whole `width x height` image.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn width(&self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    pub fn height(&self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Fully inside a `width x height` image.
    pub fn is_within(&self, width: u32, height: u32) -> bool {
        self.x1 <= width && self.y1 <= height
    }
}

/// Options for a single thumbnail request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailConfig {
    /// JPEG quality, 1-100 inclusive. Lossless formats ignore it.
    pub quality: u8,
    /// Region to keep; `None` keeps the whole image
    pub crop: Option<CropRect>,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            crop: None,
        }
    }
}

impl ThumbnailConfig {
    pub fn new(quality: u8, crop: Option<CropRect>) -> Self {
        Self { quality, crop }
    }

    pub fn builder() -> ThumbnailConfigBuilder {
        ThumbnailConfigBuilder::default()
    }

    /// Checks the configuration against an image's bounds, quality first.
    ///
    /// Returns the crop rectangle to apply.
    pub fn validate(&self, width: u32, height: u32) -> Result<CropRect, ValidationError> {
        if !(1..=100).contains(&self.quality) {
            return Err(ValidationError::InvalidQuality(self.quality));
        }

        let crop = self.crop.unwrap_or(CropRect::full(width, height));
        if crop.is_empty() {
            return Err(ValidationError::EmptyCrop {
                x0: crop.x0,
                y0: crop.y0,
                x1: crop.x1,
                y1: crop.y1,
            });
        }
        if !crop.is_within(width, height) {
            return Err(ValidationError::CropOutOfBounds {
                x0: crop.x0,
                y0: crop.y0,
                x1: crop.x1,
                y1: crop.y1,
                width,
                height,
            });
        }

        Ok(crop)
    }
}

/// Builder for ThumbnailConfig
#[derive(Default)]
pub struct ThumbnailConfigBuilder {
    quality: Option<u8>,
    crop: Option<CropRect>,
}

impl ThumbnailConfigBuilder {
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn crop(mut self, crop: CropRect) -> Self {
        self.crop = Some(crop);
        self
    }

    pub fn build(self) -> ThumbnailConfig {
        let default = ThumbnailConfig::default();
        ThumbnailConfig {
            quality: self.quality.unwrap_or(default.quality),
            crop: self.crop.or(default.crop),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = ThumbnailConfig::builder().build();
        assert_eq!(config, ThumbnailConfig::default());
        assert_eq!(config.quality, 90);
        assert_eq!(config.crop, None);
    }

    #[test]
    fn test_builder_overrides() {
        let config = ThumbnailConfig::builder()
            .quality(40)
            .crop(CropRect::new(1, 2, 3, 4))
            .build();
        assert_eq!(config.quality, 40);
        assert_eq!(config.crop, Some(CropRect::new(1, 2, 3, 4)));
    }

    #[test]
    fn test_quality_bounds() {
        for quality in [0, 101, 255] {
            assert_eq!(
                ThumbnailConfig::new(quality, None).validate(10, 10),
                Err(ValidationError::InvalidQuality(quality))
            );
        }
        for quality in [1, 50, 100] {
            assert!(ThumbnailConfig::new(quality, None).validate(10, 10).is_ok());
        }
    }

    #[test]
    fn test_quality_checked_before_crop() {
        let config = ThumbnailConfig::new(0, Some(CropRect::new(0, 0, 50, 50)));
        assert_eq!(config.validate(10, 10), Err(ValidationError::InvalidQuality(0)));
    }

    #[test]
    fn test_default_crop_is_full_bounds() {
        let crop = ThumbnailConfig::default().validate(40, 30).unwrap();
        assert_eq!(crop, CropRect::full(40, 30));
    }

    #[test]
    fn test_crop_containment() {
        let config = |crop| ThumbnailConfig::builder().crop(crop).build();

        assert!(config(CropRect::full(40, 30)).validate(40, 30).is_ok());
        assert!(config(CropRect::new(5, 5, 20, 10)).validate(40, 30).is_ok());

        for crop in [
            CropRect::new(0, 0, 41, 30),
            CropRect::new(0, 0, 40, 31),
            CropRect::new(0, 0, 45, 35),
            CropRect::new(35, 25, 45, 35),
        ] {
            assert!(matches!(
                config(crop).validate(40, 30),
                Err(ValidationError::CropOutOfBounds { .. })
            ));
        }
    }

    #[test]
    fn test_empty_crop_rejected_as_zero_area() {
        let config = |crop| ThumbnailConfig::builder().crop(crop).build();

        assert_eq!(
            config(CropRect::new(10, 10, 10, 20)).validate(40, 30),
            Err(ValidationError::EmptyCrop {
                x0: 10,
                y0: 10,
                x1: 10,
                y1: 20
            })
        );
        assert!(matches!(
            config(CropRect::new(20, 5, 10, 10)).validate(40, 30),
            Err(ValidationError::EmptyCrop { .. })
        ));

        // Empty even though it is outside the image.
        let err = config(CropRect::new(50, 50, 50, 60)).validate(40, 30).unwrap_err();
        assert!(err.to_string().contains("zero area"), "{err}");
        assert!(!err.to_string().contains("not contained"), "{err}");
    }

    #[test]
    fn test_empty_image_rejects_default_crop() {
        assert!(matches!(
            ThumbnailConfig::default().validate(0, 10),
            Err(ValidationError::EmptyCrop { .. })
        ));
    }

    #[test]
    fn test_crop_error_names_bounds() {
        let err = ThumbnailConfig::builder()
            .crop(CropRect::new(0, 0, 45, 35))
            .build()
            .validate(40, 30)
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("x1=45"));
        assert!(message.contains("y1=35"));
        assert!(message.contains("40x30"));
    }

    #[test]
    fn test_extension_dispatch() {
        let cases = [
            ("thumb.png", ThumbnailFormat::Png),
            ("thumb.jpeg", ThumbnailFormat::Jpeg),
            ("thumb.jpg", ThumbnailFormat::Jpeg),
            ("thumb.tiff", ThumbnailFormat::Tiff),
            ("thumb.tif", ThumbnailFormat::Tiff),
            ("thumb.PNG", ThumbnailFormat::Png),
            ("thumb.Jpg", ThumbnailFormat::Jpeg),
        ];
        for (path, expected) in cases {
            let (resolved, format) = ThumbnailFormat::for_destination(Path::new(path)).unwrap();
            assert_eq!(format, expected, "{path}");
            assert_eq!(resolved, PathBuf::from(path));
        }
    }

    #[test]
    fn test_missing_extension_defaults_to_jpg() {
        let (resolved, format) =
            ThumbnailFormat::for_destination(Path::new("tmp/tree-jpeg")).unwrap();
        assert_eq!(resolved, PathBuf::from("tmp/tree-jpeg.jpg"));
        assert_eq!(format, ThumbnailFormat::Jpeg);
    }

    #[test]
    fn test_unknown_extension_rejected() {
        assert_eq!(
            ThumbnailFormat::for_destination(Path::new("tree-bad.foo")),
            Err(ValidationError::UnsupportedExtension("foo".to_string()))
        );
        assert!(ThumbnailFormat::for_destination(Path::new("tree.")).is_err());
    }

    #[test]
    fn test_dotfile_name_is_its_own_extension() {
        assert_eq!(
            ThumbnailFormat::for_destination(Path::new("out/.thumb")),
            Err(ValidationError::UnsupportedExtension("thumb".to_string()))
        );

        let (resolved, format) = ThumbnailFormat::for_destination(Path::new("out/.PNG")).unwrap();
        assert_eq!(resolved, PathBuf::from("out/.PNG"));
        assert_eq!(format, ThumbnailFormat::Png);
    }

    #[test]
    fn test_dot_in_directory_is_not_an_extension() {
        let (resolved, format) =
            ThumbnailFormat::for_destination(Path::new("out.d/thumb")).unwrap();
        assert_eq!(resolved, PathBuf::from("out.d/thumb.jpg"));
        assert_eq!(format, ThumbnailFormat::Jpeg);
    }
}
