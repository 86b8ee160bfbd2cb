//! Edit orchestration for one asset slot.
//!
//! | From        | Event                | To                              |
//! |-------------|----------------------|---------------------------------|
//! | `Idle`      | select succeeds      | `Selected`                      |
//! | `Selected`  | open cropper         | `Cropping`                      |
//! | `Cropping`  | apply succeeds       | `Committed`                     |
//! | `Cropping`  | cancel               | `Committed` if one exists, else `Idle` |
//! | `Committed` | re-edit              | `Selected`                      |
//!
//! Re-selecting from any state abandons the edit in progress. Slots without
//! a cropper stop at `Selected` with the guarded source committed.

mod error;
mod pending;
mod slot;

pub use error::SlotError;
pub use pending::{
    Completion, ExportCompletion, LoadedSource, Pending, PendingExport, PendingSelect,
    SelectCompletion, Selection, Ticket,
};
pub use slot::{EditState, Slot, SlotUpdate, SubmittableAsset, Transition};
