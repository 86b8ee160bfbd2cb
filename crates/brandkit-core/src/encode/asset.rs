//! Export of a finalized crop as a submittable JPEG asset.

use bytes::Bytes;
use thiserror::Error;

use super::jpeg::{encode_rgba_jpeg, EncodeError};
use crate::decode::SourceImage;
use crate::guard::MediaType;
use crate::preview::Preview;
use crate::target::TargetSpec;
use crate::transform::{rasterize, CropRegion};

/// Errors produced by [`export_crop`].
#[derive(Debug, Error)]
pub enum ExportError {
    /// The region has a non-finite or non-positive component.
    #[error("Crop region is not usable: {0:?}")]
    InvalidRegion(CropRegion),

    /// The encoder returned no bytes.
    #[error("Export produced an empty image")]
    EmptyOutput,

    #[error("Failed to encode exported image: {0}")]
    Encode(#[from] EncodeError),
}

/// A cropped, fixed-resolution JPEG ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedAsset {
    pub bytes: Bytes,
    pub filename: String,
    pub media_type: MediaType,
    pub width: u32,
    pub height: u32,
}

impl ExportedAsset {
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn preview(&self) -> Preview {
        Preview::new(self.media_type, self.bytes.clone())
    }
}

/// Rasterize `region` of `source` at the target's output size and encode it
/// as JPEG at the target's export quality.
///
/// The output is always exactly `output_width`x`output_height`, whatever the
/// source or region size.
pub fn export_crop(
    source: &SourceImage,
    region: &CropRegion,
    target: &TargetSpec,
) -> Result<ExportedAsset, ExportError> {
    if !region.is_well_formed() {
        return Err(ExportError::InvalidRegion(*region));
    }

    let surface = rasterize(source, region, target);
    let encoded = encode_rgba_jpeg(&surface, target.background_fill, target.export_quality)?;
    if encoded.is_empty() {
        return Err(ExportError::EmptyOutput);
    }

    tracing::debug!(
        region = ?region,
        width = surface.width(),
        height = surface.height(),
        size = encoded.len(),
        "exported crop"
    );

    Ok(ExportedAsset {
        bytes: Bytes::from(encoded),
        filename: target.export_filename(),
        media_type: MediaType::Jpeg,
        width: surface.width(),
        height: surface.height(),
    })
}
