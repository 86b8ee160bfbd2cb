//! WASM-compatible wrapper types shared by the bindings.
//!
//! This module wraps the core configuration and geometry types, handling the
//! conversion between Rust values and what JavaScript passes in.

use brandkit_core::decode::FilterType;
use brandkit_core::{CropRegion, TargetSpec};
use wasm_bindgen::prelude::*;

/// Configuration for one asset slot.
///
/// Start from a preset and override individual fields, or pass a whole
/// object through [`JsTargetSpec::from_json`].
///
/// ```typescript
/// const cover = JsTargetSpec.wide_cover();
/// cover.byte_budget = 1024 * 1024; // creation wizard limit
/// ```
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct JsTargetSpec {
    inner: TargetSpec,
}

#[wasm_bindgen]
impl JsTargetSpec {
    /// 1:1 logo, 800x800, 1 MiB budget, white fill.
    pub fn square_logo() -> JsTargetSpec {
        Self {
            inner: TargetSpec::square_logo(),
        }
    }

    /// 16:9 cover, 1600x900, 2 MiB budget, interactive crop.
    pub fn wide_cover() -> JsTargetSpec {
        Self {
            inner: TargetSpec::wide_cover(),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn aspect_ratio(&self) -> f64 {
        self.inner.aspect_ratio
    }

    #[wasm_bindgen(getter)]
    pub fn output_width(&self) -> u32 {
        self.inner.output_width
    }

    #[wasm_bindgen(getter)]
    pub fn output_height(&self) -> u32 {
        self.inner.output_height
    }

    /// Get the byte budget. Returned as f64 so JavaScript sees a number.
    #[wasm_bindgen(getter)]
    pub fn byte_budget(&self) -> f64 {
        self.inner.byte_budget as f64
    }

    #[wasm_bindgen(setter)]
    pub fn set_byte_budget(&mut self, value: f64) {
        self.inner.byte_budget = value.max(0.0) as u64;
    }

    #[wasm_bindgen(getter)]
    pub fn requires_crop(&self) -> bool {
        self.inner.requires_crop
    }

    /// Resampling filter as a u8 (see [`filter_from_u8`]).
    #[wasm_bindgen(getter)]
    pub fn filter(&self) -> u8 {
        match self.inner.filter {
            FilterType::Nearest => 0,
            FilterType::Bilinear => 1,
            FilterType::Lanczos3 => 2,
        }
    }

    #[wasm_bindgen(setter)]
    pub fn set_filter(&mut self, value: u8) {
        self.inner.filter = filter_from_u8(value);
    }

    /// Serialize to a plain object.
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner).map_err(js_error)
    }

    /// Deserialize and validate a plain object.
    pub fn from_json(value: JsValue) -> Result<JsTargetSpec, JsValue> {
        let inner: TargetSpec = serde_wasm_bindgen::from_value(value).map_err(js_error)?;
        inner.validate().map_err(js_error)?;
        Ok(Self { inner })
    }
}

impl JsTargetSpec {
    pub(crate) fn inner(&self) -> &TargetSpec {
        &self.inner
    }
}

/// A crop rectangle in displayed coordinates.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JsCropRegion {
    inner: CropRegion,
}

#[wasm_bindgen]
impl JsCropRegion {
    #[wasm_bindgen(constructor)]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> JsCropRegion {
        Self {
            inner: CropRegion::new(x, y, width, height),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn x(&self) -> f64 {
        self.inner.x
    }

    #[wasm_bindgen(getter)]
    pub fn y(&self) -> f64 {
        self.inner.y
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> f64 {
        self.inner.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> f64 {
        self.inner.height
    }
}

impl JsCropRegion {
    pub(crate) fn into_inner(self) -> CropRegion {
        self.inner
    }
}

impl From<CropRegion> for JsCropRegion {
    fn from(inner: CropRegion) -> Self {
        Self { inner }
    }
}

/// Convert a u8 filter type value to the core FilterType enum.
///
/// Values:
/// - 0 = Nearest (fastest, lowest quality)
/// - 1 = Bilinear (good balance of speed and quality)
/// - 2 = Lanczos3 (best quality, slowest)
///
/// Any other value defaults to Lanczos3.
pub(crate) fn filter_from_u8(value: u8) -> FilterType {
    match value {
        0 => FilterType::Nearest,
        1 => FilterType::Bilinear,
        _ => FilterType::Lanczos3,
    }
}

/// Hand an error back to JavaScript as its message string.
pub(crate) fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let logo = JsTargetSpec::square_logo();
        assert_eq!(logo.aspect_ratio(), 1.0);
        assert_eq!((logo.output_width(), logo.output_height()), (800, 800));
        assert!(!logo.requires_crop());

        let cover = JsTargetSpec::wide_cover();
        assert_eq!((cover.output_width(), cover.output_height()), (1600, 900));
        assert_eq!(cover.byte_budget(), 2.0 * 1024.0 * 1024.0);
        assert!(cover.requires_crop());
    }

    #[test]
    fn test_byte_budget_override() {
        let mut cover = JsTargetSpec::wide_cover();
        cover.set_byte_budget(1024.0 * 1024.0);
        assert_eq!(cover.inner().byte_budget, 1024 * 1024);

        cover.set_byte_budget(-5.0);
        assert_eq!(cover.inner().byte_budget, 0);
    }

    #[test]
    fn test_crop_region_round_trip() {
        let region = JsCropRegion::new(1.0, 2.0, 160.0, 90.0);
        assert_eq!(region.x(), 1.0);
        assert_eq!(region.height(), 90.0);
        assert_eq!(region.into_inner(), CropRegion::new(1.0, 2.0, 160.0, 90.0));
    }

    #[test]
    fn test_filter_from_u8() {
        assert!(matches!(filter_from_u8(0), FilterType::Nearest));
        assert!(matches!(filter_from_u8(1), FilterType::Bilinear));
        assert!(matches!(filter_from_u8(2), FilterType::Lanczos3));
        assert!(matches!(filter_from_u8(255), FilterType::Lanczos3));
    }
}
