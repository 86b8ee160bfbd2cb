//! Brandkit Core - Business identity image pipeline
//!
//! This crate normalizes the two images a business profile carries, a square
//! logo and a wide cover, before they are submitted with the surrounding
//! form. It includes the size guard, aspect-locked crop geometry,
//! fixed-resolution export and a per-slot edit orchestrator.

pub mod decode;
pub mod encode;
pub mod guard;
pub mod preview;
pub mod session;
pub mod target;
pub mod transform;

pub use decode::{decode_source, DecodeError, DisplaySize, SourceImage};
pub use encode::{export_crop, ExportError, ExportedAsset};
pub use guard::{validate_and_guard, AcceptedSource, GuardError, MediaType, RawSource};
pub use preview::Preview;
pub use session::{EditState, Slot, SlotError, SlotUpdate, SubmittableAsset, Transition};
pub use target::{FillColor, TargetError, TargetSpec, ZoomRange};
pub use transform::{initialize_crop, CropController, CropRegion};
