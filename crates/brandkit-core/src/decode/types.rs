//! Core types for source decoding.

use std::sync::Arc;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for source decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes are not in a recognized raster format.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// The image decoded to zero pixels.
    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

/// Filter type for resampling operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// Nearest neighbor interpolation (fastest, lowest quality).
    Nearest,
    /// Bilinear interpolation (fast, acceptable quality).
    Bilinear,
    /// Lanczos3 interpolation (slower, highest quality).
    #[default]
    Lanczos3,
}

impl FilterType {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Orientation {
    #[default]
    Normal = 1,
    FlipHorizontal = 2,
    Rotate180 = 3,
    FlipVertical = 4,
    Transpose = 5,
    Rotate90CW = 6,
    Transverse = 7,
    Rotate270CW = 8,
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// On-screen size of a rendered image, in layout (CSS) pixels.
///
/// Always finite and strictly positive; construct with [`DisplaySize::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplaySize {
    width: f64,
    height: f64,
}

impl DisplaySize {
    /// Returns `None` unless both edges are finite and greater than zero.
    pub fn new(width: f64, height: f64) -> Option<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        (valid(width) && valid(height)).then_some(Self { width, height })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }
}

/// A decoded source carrying both its natural and its display resolution.
///
/// The pixel buffer is shared, so clones are cheap and can be moved into
/// export futures while the orchestrator keeps its own handle.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: Arc<RgbaImage>,
    display: DisplaySize,
}

impl SourceImage {
    /// Wrap decoded pixels. The display size starts equal to the natural size
    /// until the layout reports otherwise.
    pub fn new(pixels: RgbaImage) -> Result<Self, DecodeError> {
        let (width, height) = pixels.dimensions();
        let display = DisplaySize::new(width as f64, height as f64)
            .ok_or(DecodeError::EmptyImage { width, height })?;
        Ok(Self {
            pixels: Arc::new(pixels),
            display,
        })
    }

    /// Same pixels, new on-screen size.
    pub fn with_display(mut self, display: DisplaySize) -> Self {
        self.display = display;
        self
    }

    pub fn natural_width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn natural_height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn display(&self) -> DisplaySize {
        self.display
    }

    /// Native pixels per displayed pixel along each axis.
    pub fn display_scale(&self) -> (f64, f64) {
        (
            self.natural_width() as f64 / self.display.width,
            self.natural_height() as f64 / self.display.height,
        )
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Whether any pixel is not fully opaque.
    pub fn has_transparency(&self) -> bool {
        self.pixels.pixels().any(|p| p.0[3] < u8::MAX)
    }

    /// Live handles on the shared pixel buffer.
    #[cfg(test)]
    pub(crate) fn pixel_handles(&self) -> usize {
        Arc::strong_count(&self.pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_type_conversion() {
        assert!(matches!(
            FilterType::Nearest.to_image_filter(),
            image::imageops::FilterType::Nearest
        ));
        assert!(matches!(
            FilterType::Bilinear.to_image_filter(),
            image::imageops::FilterType::Triangle
        ));
        assert!(matches!(
            FilterType::Lanczos3.to_image_filter(),
            image::imageops::FilterType::Lanczos3
        ));
    }

    #[test]
    fn test_orientation_from_u32() {
        assert_eq!(Orientation::from(1), Orientation::Normal);
        assert_eq!(Orientation::from(6), Orientation::Rotate90CW);
        assert_eq!(Orientation::from(99), Orientation::Normal);
    }

    #[test]
    fn test_display_size_rejects_degenerate() {
        assert!(DisplaySize::new(0.0, 10.0).is_none());
        assert!(DisplaySize::new(10.0, -1.0).is_none());
        assert!(DisplaySize::new(f64::NAN, 10.0).is_none());
        assert!(DisplaySize::new(f64::INFINITY, 10.0).is_none());
        assert!(DisplaySize::new(640.0, 360.0).is_some());
    }

    #[test]
    fn test_source_image_defaults_display_to_natural() {
        let src = SourceImage::new(RgbaImage::new(300, 200)).unwrap();
        assert_eq!(src.natural_width(), 300);
        assert_eq!(src.natural_height(), 200);
        assert_eq!(src.display().width(), 300.0);
        assert_eq!(src.display().height(), 200.0);
        assert_eq!(src.display_scale(), (1.0, 1.0));
    }

    #[test]
    fn test_source_image_display_scale() {
        let src = SourceImage::new(RgbaImage::new(4000, 3000))
            .unwrap()
            .with_display(DisplaySize::new(800.0, 600.0).unwrap());
        assert_eq!(src.display_scale(), (5.0, 5.0));
    }

    #[test]
    fn test_source_image_rejects_empty() {
        let result = SourceImage::new(RgbaImage::new(0, 10));
        assert!(matches!(result, Err(DecodeError::EmptyImage { .. })));
    }

    #[test]
    fn test_has_transparency() {
        let mut img = RgbaImage::from_pixel(4, 4, image::Rgba([10, 20, 30, 255]));
        let src = SourceImage::new(img.clone()).unwrap();
        assert!(!src.has_transparency());

        img.put_pixel(1, 1, image::Rgba([0, 0, 0, 0]));
        let src = SourceImage::new(img).unwrap();
        assert!(src.has_transparency());
    }

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::CorruptedFile("truncated".to_string());
        assert_eq!(err.to_string(), "Corrupted or incomplete image file: truncated");

        let err = DecodeError::InvalidFormat;
        assert_eq!(err.to_string(), "Invalid or unsupported image format");
    }
}
