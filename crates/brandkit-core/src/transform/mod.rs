//! Crop geometry and rasterization.
//!
//! # Pipeline
//!
//! 1. [`initialize_crop`] places a centred, aspect-locked default region
//! 2. [`CropController`] applies drags, resizes, zoom and relayouts
//! 3. [`rasterize`] maps the final region to native pixels and stretches it
//!    over a fixed-size output surface
//!
//! # Coordinate System
//!
//! - Crop regions live in display space (what the user sees on screen)
//! - Rasterization works in native space (the decoded pixel grid)
//! - Origin is the top-left corner in both

mod crop;
mod rasterize;

pub use crop::{constrain, initialize_crop, CropController, CropRegion};
pub use rasterize::{map_to_native, rasterize, SourceRect};
