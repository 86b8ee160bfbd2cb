//! Per-slot target configuration.
//!
//! A [`TargetSpec`] fixes everything a slot needs to normalize an upload:
//! the locked aspect ratio, the exported resolution, the byte budget and the
//! constants used by the one-pass down-sample. The two presets cover the
//! square logo and the wide cover; hosts can override individual fields
//! (for example a 1 MiB cover budget in the creation wizard) by
//! deserializing a spec or by using the `with_*` builders.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::{DownsampleBox, FilterType};

/// Tolerance used wherever a width/height ratio is compared with a target.
pub const ASPECT_EPSILON: f64 = 1e-6;

const MIB: u64 = 1024 * 1024;

/// Opaque RGB colour painted beneath transparent pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl FillColor {
    pub const WHITE: FillColor = FillColor::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Allowed zoom interval for the crop controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomRange {
    pub min: f64,
    pub max: f64,
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self { min: 1.0, max: 3.0 }
    }
}

impl ZoomRange {
    /// Clamp `zoom` into the range; non-finite input falls back to `min`.
    pub fn clamp(&self, zoom: f64) -> f64 {
        if zoom.is_finite() {
            zoom.clamp(self.min, self.max)
        } else {
            self.min
        }
    }
}

/// Configuration errors reported by [`TargetSpec::validate`].
#[derive(Debug, Error, PartialEq)]
pub enum TargetError {
    #[error("Aspect ratio must be finite and positive, got {0}")]
    InvalidAspectRatio(f64),

    #[error("Output size must be non-zero, got {width}x{height}")]
    InvalidOutputSize { width: u32, height: u32 },

    #[error("Output size {width}x{height} does not match aspect ratio {aspect_ratio}")]
    OutputRatioMismatch {
        width: u32,
        height: u32,
        aspect_ratio: f64,
    },

    #[error("Byte budget must be non-zero")]
    ZeroByteBudget,

    #[error("Down-sample box must be non-zero, got {max_width}x{max_height}")]
    InvalidDownsampleBox { max_width: u32, max_height: u32 },

    #[error("{field} must be within 1..=100, got {value}")]
    InvalidQuality { field: &'static str, value: u8 },

    #[error("Zoom range must satisfy 0 < min <= max, got {min}..{max}")]
    InvalidZoomRange { min: f64, max: f64 },
}

/// Immutable description of one asset role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSpec {
    /// Locked width/height ratio of the crop and of the exported asset.
    pub aspect_ratio: f64,
    /// Exported pixel width.
    pub output_width: u32,
    /// Exported pixel height.
    pub output_height: u32,
    /// Maximum accepted source size in bytes.
    pub byte_budget: u64,
    /// Colour painted beneath transparent pixels before JPEG encoding.
    #[serde(default)]
    pub background_fill: Option<FillColor>,
    /// Bounding box for the one-pass down-sample.
    pub downsample_box: DownsampleBox,
    /// JPEG quality (1-100) of the down-sample re-encode.
    pub guard_quality: u8,
    /// JPEG quality (1-100) of the exported crop.
    pub export_quality: u8,
    /// Whether the slot routes through the interactive cropper.
    pub requires_crop: bool,
    /// Stem used for exported filenames, e.g. `cover` -> `cover.jpg`.
    pub asset_name: String,
    #[serde(default)]
    pub zoom_range: ZoomRange,
    #[serde(default)]
    pub filter: FilterType,
}

impl TargetSpec {
    /// 1:1 profile mark: 800x800, 1 MiB, flattened over white.
    ///
    /// The logo never enters the cropper; its guarded source is the
    /// committed asset.
    pub fn square_logo() -> Self {
        Self {
            aspect_ratio: 1.0,
            output_width: 800,
            output_height: 800,
            byte_budget: MIB,
            background_fill: Some(FillColor::WHITE),
            downsample_box: DownsampleBox::new(800, 800),
            guard_quality: 70,
            export_quality: 90,
            requires_crop: false,
            asset_name: "logo".to_string(),
            zoom_range: ZoomRange::default(),
            filter: FilterType::Lanczos3,
        }
    }

    /// 16:9 banner: 1600x900, 2 MiB, cropped interactively.
    pub fn wide_cover() -> Self {
        Self {
            aspect_ratio: 16.0 / 9.0,
            output_width: 1600,
            output_height: 900,
            byte_budget: 2 * MIB,
            background_fill: None,
            downsample_box: DownsampleBox::new(1600, 900),
            guard_quality: 80,
            export_quality: 90,
            requires_crop: true,
            asset_name: "cover".to_string(),
            zoom_range: ZoomRange::default(),
            filter: FilterType::Lanczos3,
        }
    }

    pub fn with_byte_budget(mut self, byte_budget: u64) -> Self {
        self.byte_budget = byte_budget;
        self
    }

    pub fn with_background_fill(mut self, fill: Option<FillColor>) -> Self {
        self.background_fill = fill;
        self
    }

    /// Filename given to exported assets.
    pub fn export_filename(&self) -> String {
        format!("{}.jpg", self.asset_name)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), TargetError> {
        if !self.aspect_ratio.is_finite() || self.aspect_ratio <= 0.0 {
            return Err(TargetError::InvalidAspectRatio(self.aspect_ratio));
        }

        if self.output_width == 0 || self.output_height == 0 {
            return Err(TargetError::InvalidOutputSize {
                width: self.output_width,
                height: self.output_height,
            });
        }

        // One output pixel of slack on either edge.
        let output_ratio = self.output_width as f64 / self.output_height as f64;
        let slack = 1.0 / self.output_height.min(self.output_width) as f64;
        if (output_ratio - self.aspect_ratio).abs() / self.aspect_ratio > slack {
            return Err(TargetError::OutputRatioMismatch {
                width: self.output_width,
                height: self.output_height,
                aspect_ratio: self.aspect_ratio,
            });
        }

        if self.byte_budget == 0 {
            return Err(TargetError::ZeroByteBudget);
        }

        let DownsampleBox {
            max_width,
            max_height,
        } = self.downsample_box;
        if max_width == 0 || max_height == 0 {
            return Err(TargetError::InvalidDownsampleBox {
                max_width,
                max_height,
            });
        }

        for (field, value) in [
            ("guard_quality", self.guard_quality),
            ("export_quality", self.export_quality),
        ] {
            if !(1..=100).contains(&value) {
                return Err(TargetError::InvalidQuality { field, value });
            }
        }

        let ZoomRange { min, max } = self.zoom_range;
        if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= max) {
            return Err(TargetError::InvalidZoomRange { min, max });
        }

        Ok(())
    }
}
