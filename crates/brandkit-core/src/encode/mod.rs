//! Encoding and export for Brandkit.
//!
//! This module provides functionality for:
//! - Encoding RGBA pixels to JPEG, flattening transparency first
//! - Exporting a finalized crop as a fixed-resolution [`ExportedAsset`]
//!
//! # Examples
//!
//! ```ignore
//! use brandkit_core::encode::export_crop;
//!
//! let asset = export_crop(&source, &region, &TargetSpec::wide_cover())?;
//! assert_eq!((asset.width, asset.height), (1600, 900));
//! ```

mod asset;
mod jpeg;

pub use asset::{export_crop, ExportError, ExportedAsset};
pub use jpeg::{encode_jpeg, encode_rgba_jpeg, flatten, EncodeError};
