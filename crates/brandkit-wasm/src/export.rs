//! Crop export WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! const asset = export_crop(source, cropper.resolved_region(), JsTargetSpec.wide_cover());
//! form.append('cover', new Blob([asset.bytes()], { type: asset.media_type }), asset.filename);
//! ```

use crate::crop::JsSourceImage;
use crate::types::{js_error, JsCropRegion, JsTargetSpec};
use brandkit_core::encode::{self, ExportedAsset};
use wasm_bindgen::prelude::*;

/// A fixed-resolution JPEG ready for submission.
#[wasm_bindgen]
pub struct JsExportedAsset {
    inner: ExportedAsset,
}

#[wasm_bindgen]
impl JsExportedAsset {
    /// Copy of the encoded bytes as a `Uint8Array`.
    pub fn bytes(&self) -> Vec<u8> {
        self.inner.bytes.to_vec()
    }

    #[wasm_bindgen(getter)]
    pub fn filename(&self) -> String {
        self.inner.filename.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn media_type(&self) -> String {
        self.inner.media_type.mime().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    pub fn data_url(&self) -> String {
        self.inner.preview().data_url()
    }
}

/// Rasterize `region` of `source` at the target's output size.
///
/// # Errors
///
/// Returns an error if the region is degenerate or encoding fails.
#[wasm_bindgen]
pub fn export_crop(
    source: &JsSourceImage,
    region: &JsCropRegion,
    target: &JsTargetSpec,
) -> Result<JsExportedAsset, JsValue> {
    encode::export_crop(source.inner(), &region.into_inner(), target.inner())
        .map(|inner| JsExportedAsset { inner })
        .map_err(js_error)
}
