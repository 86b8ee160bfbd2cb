//! Source decoding for Brandkit.
//!
//! This module provides functionality for:
//! - Decoding user-selected JPEG, PNG and GIF bytes into RGBA pixels
//! - Applying EXIF orientation so natural size matches the rendered image
//! - Bounding-box down-sampling for the size guard
//!
//! # Architecture
//!
//! Everything here is synchronous and single-threaded. Asynchrony lives one
//! level up, in the edit session, which wraps these calls in futures.
//!
//! # Examples
//!
//! ```ignore
//! use brandkit_core::decode::decode_source;
//!
//! let bytes = std::fs::read("logo.png").unwrap();
//! let source = decode_source(&bytes).unwrap();
//! println!("Decoded {}x{}", source.natural_width(), source.natural_height());
//! ```

mod resize;
mod source;
mod types;

pub use resize::{downsample, fit_within_box, DownsampleBox};
pub use source::{decode_rgba, decode_source};
pub use types::{DecodeError, DisplaySize, FilterType, Orientation, SourceImage};
