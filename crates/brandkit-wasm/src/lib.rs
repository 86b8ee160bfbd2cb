//! Brandkit WASM - WebAssembly bindings for Brandkit
//!
//! This crate exposes the brandkit-core image pipeline to the JavaScript form
//! that collects a business profile's logo and cover.
//!
//! # Module Structure
//!
//! - `types` - Target configuration and crop region wrappers
//! - `guard` - Type check and byte-budget guard for selected files
//! - `crop` - Source decoding and the interactive crop controller
//! - `export` - Fixed-resolution JPEG export of a crop
//! - `slot` - The per-slot edit orchestrator
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsAssetSlot, JsTargetSpec } from '@brandkit/wasm';
//!
//! await init();
//!
//! const logo = new JsAssetSlot(JsTargetSpec.square_logo());
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const { state, preview_data_url } = logo.on_select(bytes, file.type, file.name);
//! ```
//!
//! Errors are returned as strings. Showing them is left to the caller.

use wasm_bindgen::prelude::*;

mod crop;
mod export;
mod guard;
mod slot;
mod types;

// Re-export public types
pub use crop::{decode_source, initialize_crop, JsCropController, JsSourceImage};
pub use export::{export_crop, JsExportedAsset};
pub use guard::{validate_and_guard, JsAcceptedSource};
pub use slot::{JsAssetSlot, JsTransition};
pub use types::{JsCropRegion, JsTargetSpec};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
