//! Edit orchestrator WASM bindings.
//!
//! The browser host is single-threaded and the pipeline steps are
//! synchronous, so each event runs its step to completion before returning.
//! A step that would not finish immediately is reported as discarded.
//!
//! # Example
//!
//! ```typescript
//! const cover = new JsAssetSlot(JsTargetSpec.wide_cover());
//! cover.on_select(bytes, file.type, file.name);
//! cover.on_open_cropper(img.clientWidth, img.clientHeight);
//! cover.on_crop_change(new JsCropRegion(x, y, w, h));
//! const { state, preview_data_url } = cover.on_apply_crop();
//! ```

use crate::crop::{checked_display, display_size};
use crate::types::{js_error, JsCropRegion, JsTargetSpec};
use brandkit_core::guard::RawSource;
use brandkit_core::session::{Completion, Pending, Slot, SlotError, SlotUpdate, Transition};
use brandkit_core::{DisplaySize, EditState, Preview};
use futures::FutureExt;
use wasm_bindgen::prelude::*;

/// The state a slot settled into, plus what to preview.
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct JsTransition {
    state: EditState,
    preview: Option<Preview>,
    discarded: bool,
}

#[wasm_bindgen]
impl JsTransition {
    /// One of `idle`, `selected`, `cropping`, `committed`.
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        state_name(self.state).to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn preview_data_url(&self) -> Option<String> {
        self.preview.as_ref().map(Preview::data_url)
    }

    /// Whether the event's result was dropped as stale.
    #[wasm_bindgen(getter)]
    pub fn discarded(&self) -> bool {
        self.discarded
    }
}

impl From<Transition> for JsTransition {
    fn from(transition: Transition) -> Self {
        Self {
            state: transition.state,
            preview: transition.preview,
            discarded: false,
        }
    }
}

/// One independent logo or cover slot.
#[wasm_bindgen]
pub struct JsAssetSlot {
    inner: Slot,
}

#[wasm_bindgen]
impl JsAssetSlot {
    #[wasm_bindgen(constructor)]
    pub fn new(target: &JsTargetSpec) -> Result<JsAssetSlot, JsValue> {
        let inner = Slot::new(target.inner().clone()).map_err(js_error)?;
        Ok(Self { inner })
    }

    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        state_name(self.inner.state()).to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn preview_data_url(&self) -> Option<String> {
        self.inner.preview().map(|preview| preview.data_url())
    }

    #[wasm_bindgen(getter)]
    pub fn crop_region(&self) -> Option<JsCropRegion> {
        self.inner.crop_region().map(JsCropRegion::from)
    }

    /// Bytes of the committed asset, for the form submission.
    pub fn committed_bytes(&self) -> Option<Vec<u8>> {
        self.inner.committed().map(|asset| asset.bytes().to_vec())
    }

    pub fn committed_filename(&self) -> Option<String> {
        self.inner.committed().map(|asset| asset.filename().to_string())
    }

    pub fn committed_media_type(&self) -> Option<String> {
        self.inner
            .committed()
            .map(|asset| asset.media_type().mime().to_string())
    }

    /// Load a newly selected file.
    ///
    /// # Errors
    ///
    /// Returns a user-facing message if the file is rejected.
    pub fn on_select(
        &mut self,
        bytes: Vec<u8>,
        declared_type: &str,
        filename: &str,
    ) -> Result<JsTransition, JsValue> {
        let pending = self.inner.on_select(RawSource::new(bytes, declared_type, filename));
        match run_now(pending) {
            Some(completion) => self.settle(|slot| slot.finish_select(completion)),
            None => Ok(self.discarded()),
        }
    }

    pub fn on_layout(&mut self, width: f64, height: f64) -> Result<Option<JsCropRegion>, JsValue> {
        let display = display_size(width, height)?;
        Ok(self.inner.on_layout(display).map(JsCropRegion::from))
    }

    /// Open the cropper, optionally recording the rendered size first.
    ///
    /// Pass both edges or neither.
    pub fn on_open_cropper(
        &mut self,
        display_width: Option<f64>,
        display_height: Option<f64>,
    ) -> Result<JsCropRegion, JsValue> {
        let display = requested_display(display_width, display_height).map_err(js_error)?;
        self.inner
            .on_open_cropper(display)
            .map(JsCropRegion::from)
            .map_err(slot_error)
    }

    pub fn on_crop_change(&mut self, proposal: &JsCropRegion) -> Result<JsCropRegion, JsValue> {
        self.inner
            .on_crop_change(proposal.into_inner())
            .map(JsCropRegion::from)
            .map_err(slot_error)
    }

    pub fn on_zoom(&mut self, zoom: f64) -> Result<f64, JsValue> {
        self.inner.on_zoom(zoom).map_err(slot_error)
    }

    /// Export and commit the current crop.
    ///
    /// Applying before a region exists is a no-op that reports the current
    /// state.
    pub fn on_apply_crop(&mut self) -> Result<JsTransition, JsValue> {
        let pending = match self.inner.on_apply_crop() {
            Ok(pending) => pending,
            Err(SlotError::NoActiveCropRegion) => return Ok(self.current()),
            Err(err) => return Err(slot_error(err)),
        };
        match run_now(pending) {
            Some(completion) => self.settle(|slot| slot.finish_export(completion)),
            None => Ok(self.discarded()),
        }
    }

    pub fn on_cancel_crop(&mut self) -> JsTransition {
        self.inner.on_cancel_crop().into()
    }

    pub fn on_reedit(&mut self) -> Result<JsTransition, JsValue> {
        self.inner
            .on_reedit()
            .map(JsTransition::from)
            .map_err(slot_error)
    }

    pub fn on_reset(&mut self) -> JsTransition {
        self.inner.on_reset().into()
    }
}

impl JsAssetSlot {
    fn settle(
        &mut self,
        finish: impl FnOnce(&mut Slot) -> Result<SlotUpdate, SlotError>,
    ) -> Result<JsTransition, JsValue> {
        match finish(&mut self.inner).map_err(slot_error)? {
            SlotUpdate::Applied(transition) => Ok(transition.into()),
            SlotUpdate::Discarded => Ok(self.discarded()),
        }
    }

    fn current(&self) -> JsTransition {
        JsTransition {
            state: self.inner.state(),
            preview: self.inner.preview(),
            discarded: false,
        }
    }

    fn discarded(&self) -> JsTransition {
        JsTransition {
            discarded: true,
            ..self.current()
        }
    }
}

fn run_now<T>(pending: Pending<T>) -> Option<Completion<T>> {
    pending.run().now_or_never()
}

fn requested_display(
    width: Option<f64>,
    height: Option<f64>,
) -> Result<Option<DisplaySize>, String> {
    match (width, height) {
        (None, None) => Ok(None),
        (Some(width), Some(height)) => checked_display(width, height).map(Some),
        (width, height) => Err(format!(
            "Invalid display size {}x{}",
            width.map_or("?".to_string(), |w| w.to_string()),
            height.map_or("?".to_string(), |h| h.to_string()),
        )),
    }
}

fn state_name(state: EditState) -> &'static str {
    match state {
        EditState::Idle => "idle",
        EditState::Selected => "selected",
        EditState::Cropping => "cropping",
        EditState::Committed => "committed",
    }
}

/// Prefer the user-facing message when there is one.
fn slot_error(err: SlotError) -> JsValue {
    match err.user_message() {
        Some(message) => js_error(message),
        None => js_error(err),
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbaImage};
    use std::io::Cursor;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(RgbaImage::new(width, height))
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[wasm_bindgen_test]
    fn test_rejected_type_has_user_message() {
        let mut slot = JsAssetSlot::new(&JsTargetSpec::square_logo()).unwrap();
        let err = slot.on_select(vec![0u8; 8], "image/bmp", "a.bmp").unwrap_err();
        assert_eq!(
            err.as_string().as_deref(),
            Some("Please choose a JPEG, PNG or GIF image.")
        );
        assert_eq!(slot.state(), "idle");
    }

    #[wasm_bindgen_test]
    fn test_half_display_is_rejected() {
        let mut slot = JsAssetSlot::new(&JsTargetSpec::wide_cover()).unwrap();
        slot.on_select(png(160, 90), "image/png", "c.png").unwrap();

        let err = slot.on_open_cropper(Some(320.0), None).unwrap_err();
        assert_eq!(err.as_string().as_deref(), Some("Invalid display size 320x?"));
        assert_eq!(slot.state(), "selected");
        assert!(slot.crop_region().is_none());
    }

    #[wasm_bindgen_test]
    fn test_crop_change_error_is_plain_message() {
        let mut slot = JsAssetSlot::new(&JsTargetSpec::wide_cover()).unwrap();
        let err = slot
            .on_crop_change(&JsCropRegion::new(0.0, 0.0, 16.0, 9.0))
            .unwrap_err();
        assert_eq!(err.as_string().as_deref(), Some("No crop region is active"));
    }

    #[wasm_bindgen_test]
    fn test_reedit_requires_commit() {
        let mut slot = JsAssetSlot::new(&JsTargetSpec::wide_cover()).unwrap();
        assert!(slot.on_reedit().is_err());
    }
}
