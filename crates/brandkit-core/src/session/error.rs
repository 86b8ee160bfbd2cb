use thiserror::Error;

use super::EditState;
use crate::decode::DecodeError;
use crate::encode::ExportError;
use crate::guard::GuardError;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Errors surfaced by a [`super::Slot`].
#[derive(Debug, Error)]
pub enum SlotError {
    #[error(transparent)]
    Guard(#[from] GuardError),

    #[error("Failed to decode selected image: {0}")]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Export(#[from] ExportError),

    /// Apply arrived before the cropper resolved a region.
    #[error("No crop region is active")]
    NoActiveCropRegion,

    #[error("Cannot {event} while the slot is {state:?}")]
    InvalidState {
        event: &'static str,
        state: EditState,
    },
}

impl SlotError {
    /// Text for the surrounding form, or `None` when the failure should stay
    /// silent.
    pub fn user_message(&self) -> Option<String> {
        match self {
            SlotError::Guard(GuardError::InvalidFileType { .. }) => {
                Some("Please choose a JPEG, PNG or GIF image.".to_string())
            }
            SlotError::Guard(GuardError::StillTooLarge { budget, .. }) => Some(format!(
                "This image is too large even after compression. Please choose an image under {:.0} MB.",
                (*budget as f64 / BYTES_PER_MB).max(1.0)
            )),
            SlotError::Guard(GuardError::Decode(_)) | SlotError::Decode(_) => {
                Some("This image could not be read. Please choose another file.".to_string())
            }
            SlotError::Guard(GuardError::Encode(_)) => {
                Some("This image could not be compressed. Please choose another file.".to_string())
            }
            SlotError::Export(_) => {
                Some("The cropped image could not be created. Please try again.".to_string())
            }
            SlotError::NoActiveCropRegion | SlotError::InvalidState { .. } => None,
        }
    }
}
