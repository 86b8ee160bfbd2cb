//! Crop geometry WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! const source = decode_source(accepted.bytes(), img.clientWidth, img.clientHeight);
//! const cropper = new JsCropController(source, JsTargetSpec.wide_cover());
//! cropper.update(new JsCropRegion(x, y, width, height));
//! window.onresize = () => cropper.relayout(img.clientWidth, img.clientHeight);
//! ```

use crate::types::{js_error, JsCropRegion, JsTargetSpec};
use brandkit_core::decode::{self, DisplaySize, SourceImage};
use brandkit_core::transform::{self, CropController};
use wasm_bindgen::prelude::*;

/// A decoded source and the size it is rendered at.
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct JsSourceImage {
    inner: SourceImage,
}

#[wasm_bindgen]
impl JsSourceImage {
    #[wasm_bindgen(getter)]
    pub fn natural_width(&self) -> u32 {
        self.inner.natural_width()
    }

    #[wasm_bindgen(getter)]
    pub fn natural_height(&self) -> u32 {
        self.inner.natural_height()
    }

    #[wasm_bindgen(getter)]
    pub fn display_width(&self) -> f64 {
        self.inner.display().width()
    }

    #[wasm_bindgen(getter)]
    pub fn display_height(&self) -> f64 {
        self.inner.display().height()
    }

    /// Record a new rendered size.
    pub fn set_display(&mut self, width: f64, height: f64) -> Result<(), JsValue> {
        let display = display_size(width, height)?;
        self.inner = self.inner.clone().with_display(display);
        Ok(())
    }
}

impl JsSourceImage {
    pub(crate) fn inner(&self) -> &SourceImage {
        &self.inner
    }
}

/// Decode image bytes, recording the size they are rendered at.
///
/// # Errors
///
/// Returns an error if the bytes cannot be decoded or the display size is
/// not positive.
#[wasm_bindgen]
pub fn decode_source(
    bytes: &[u8],
    display_width: f64,
    display_height: f64,
) -> Result<JsSourceImage, JsValue> {
    let display = display_size(display_width, display_height)?;
    let source = decode::decode_source(bytes).map_err(js_error)?;
    Ok(JsSourceImage {
        inner: source.with_display(display),
    })
}

/// Centred, aspect-locked default crop for `source`.
#[wasm_bindgen]
pub fn initialize_crop(source: &JsSourceImage, target: &JsTargetSpec) -> JsCropRegion {
    transform::initialize_crop(source.inner(), target.inner()).into()
}

/// Stateful crop controller for the interactive UI.
#[wasm_bindgen]
pub struct JsCropController {
    inner: CropController,
}

#[wasm_bindgen]
impl JsCropController {
    #[wasm_bindgen(constructor)]
    pub fn new(source: &JsSourceImage, target: &JsTargetSpec) -> JsCropController {
        Self {
            inner: CropController::new(source.inner(), target.inner()),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn region(&self) -> JsCropRegion {
        self.inner.region().into()
    }

    #[wasm_bindgen(getter)]
    pub fn zoom(&self) -> f64 {
        self.inner.zoom()
    }

    /// Apply a drag or resize; returns the snapped region.
    pub fn update(&mut self, proposal: &JsCropRegion) -> JsCropRegion {
        self.inner.update(proposal.into_inner()).into()
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> JsCropRegion {
        self.inner.move_to(x, y).into()
    }

    /// Set zoom; returns the clamped value.
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        self.inner.set_zoom(zoom)
    }

    pub fn relayout(&mut self, width: f64, height: f64) -> Result<JsCropRegion, JsValue> {
        let display = display_size(width, height)?;
        Ok(self.inner.relayout(display).into())
    }

    /// The rectangle captured at export, after zoom.
    pub fn resolved_region(&self) -> JsCropRegion {
        self.inner.resolved_region().into()
    }
}

pub(crate) fn display_size(width: f64, height: f64) -> Result<DisplaySize, JsValue> {
    checked_display(width, height).map_err(js_error)
}

pub(crate) fn checked_display(width: f64, height: f64) -> Result<DisplaySize, String> {
    DisplaySize::new(width, height).ok_or_else(|| format!("Invalid display size {width}x{height}"))
}
