//! Size guard WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { validate_and_guard, JsTargetSpec } from '@brandkit/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const accepted = validate_and_guard(bytes, file.type, file.name, JsTargetSpec.square_logo());
//! img.src = accepted.data_url();
//! ```

use crate::types::{js_error, JsTargetSpec};
use brandkit_core::guard::{self, AcceptedSource, RawSource};
use wasm_bindgen::prelude::*;

/// A source that passed the size guard.
#[wasm_bindgen]
pub struct JsAcceptedSource {
    inner: AcceptedSource,
}

#[wasm_bindgen]
impl JsAcceptedSource {
    /// Copy of the accepted bytes as a `Uint8Array`.
    pub fn bytes(&self) -> Vec<u8> {
        self.inner.bytes.to_vec()
    }

    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.bytes.len()
    }

    /// MIME type of the accepted bytes, e.g. `image/jpeg`.
    #[wasm_bindgen(getter)]
    pub fn media_type(&self) -> String {
        self.inner.media_type.mime().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn filename(&self) -> String {
        self.inner.filename.clone()
    }

    /// Whether the source was down-sampled to fit the budget.
    #[wasm_bindgen(getter)]
    pub fn reencoded(&self) -> bool {
        self.inner.reencoded
    }

    pub fn data_url(&self) -> String {
        self.inner.preview().data_url()
    }
}

/// Validate a selected file and enforce the slot's byte budget.
///
/// # Errors
///
/// Returns an error if the type is not JPEG/PNG/GIF, or if one down-sample
/// pass cannot bring the file under budget.
#[wasm_bindgen]
pub fn validate_and_guard(
    bytes: Vec<u8>,
    declared_type: &str,
    filename: &str,
    target: &JsTargetSpec,
) -> Result<JsAcceptedSource, JsValue> {
    let raw = RawSource::new(bytes, declared_type, filename);
    guard::validate_and_guard(raw, target.inner())
        .map(|inner| JsAcceptedSource { inner })
        .map_err(js_error)
}
