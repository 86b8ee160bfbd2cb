//! Selection and size guard.
//!
//! The guard is the first stage a user-selected file passes through:
//!
//! 1. The declared type must be JPEG, PNG or GIF; anything else fails with
//!    [`GuardError::InvalidFileType`] before a single byte is decoded.
//! 2. A source within the slot's byte budget is accepted untouched.
//! 3. A source over budget gets exactly one down-sample pass: decode, fit the
//!    slot's down-sample box, re-encode as JPEG at the slot's guard quality.
//!    If that result is still over budget the upload fails with
//!    [`GuardError::StillTooLarge`]. There is no second attempt.

mod media;

use bytes::Bytes;
use thiserror::Error;

use crate::decode::{decode_rgba, downsample, DecodeError};
use crate::encode::{encode_rgba_jpeg, EncodeError};
use crate::preview::Preview;
use crate::target::TargetSpec;

pub use media::MediaType;
pub(crate) use media::with_extension;

/// Errors produced by [`validate_and_guard`].
#[derive(Debug, Error)]
pub enum GuardError {
    /// The declared type is outside the allow-list.
    #[error("Unsupported file type '{declared}' (expected JPEG, PNG or GIF)")]
    InvalidFileType { declared: String },

    /// The one down-sample pass did not bring the source under budget.
    #[error("Image is {size} bytes after compression, over the {budget} byte limit")]
    StillTooLarge { size: u64, budget: u64 },

    /// The over-budget source could not be decoded for down-sampling.
    #[error("Failed to decode image: {0}")]
    Decode(#[from] DecodeError),

    /// Re-encoding the down-sampled source failed.
    #[error("Failed to re-encode image: {0}")]
    Encode(#[from] EncodeError),
}

/// A file exactly as the selection surface supplied it.
#[derive(Debug, Clone)]
pub struct RawSource {
    pub bytes: Bytes,
    /// MIME type declared by the selection surface, possibly empty.
    pub declared_type: String,
    pub filename: String,
}

impl RawSource {
    pub fn new(
        bytes: impl Into<Bytes>,
        declared_type: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            declared_type: declared_type.into(),
            filename: filename.into(),
        }
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A source that passed the guard and fits the slot's byte budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedSource {
    pub bytes: Bytes,
    pub media_type: MediaType,
    pub filename: String,
    /// Whether the down-sample pass produced these bytes.
    pub reencoded: bool,
}

impl AcceptedSource {
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

/// Validate an upload's type and enforce the slot's byte budget.
///
/// # Errors
///
/// - [`GuardError::InvalidFileType`] for types outside JPEG/PNG/GIF
/// - [`GuardError::Decode`] / [`GuardError::Encode`] if the down-sample pass
///   cannot run
/// - [`GuardError::StillTooLarge`] if the down-sample pass is not enough
pub fn validate_and_guard(
    raw: RawSource,
    target: &TargetSpec,
) -> Result<AcceptedSource, GuardError> {
    let media_type = MediaType::detect(&raw.declared_type, &raw.filename).ok_or_else(|| {
        GuardError::InvalidFileType {
            declared: if raw.declared_type.trim().is_empty() {
                raw.filename.clone()
            } else {
                raw.declared_type.clone()
            },
        }
    })?;

    let size = raw.len();
    if size <= target.byte_budget {
        tracing::debug!(size, budget = target.byte_budget, "source within budget");
        return Ok(AcceptedSource {
            bytes: raw.bytes,
            media_type,
            filename: raw.filename,
            reencoded: false,
        });
    }

    let decoded = decode_rgba(&raw.bytes)?;
    let resized = downsample(&decoded, target.downsample_box, target.filter);
    let encoded = encode_rgba_jpeg(&resized, target.background_fill, target.guard_quality)?;
    let new_size = encoded.len() as u64;

    tracing::debug!(
        original = size,
        reencoded = new_size,
        budget = target.byte_budget,
        from = ?decoded.dimensions(),
        to = ?resized.dimensions(),
        "down-sampled over-budget source"
    );

    if new_size > target.byte_budget {
        return Err(GuardError::StillTooLarge {
            size: new_size,
            budget: target.byte_budget,
        });
    }

    Ok(AcceptedSource {
        bytes: Bytes::from(encoded),
        media_type: MediaType::Jpeg,
        filename: with_extension(&raw.filename, MediaType::Jpeg.extension()),
        reencoded: true,
    })
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::target::FillColor;

    #[test]
    fn test_rejects_bmp_before_decoding() {
        // Not even valid BMP bytes: rejection must not depend on decoding.
        let raw = RawSource::new(vec![0u8; 32], "image/bmp", "logo.bmp");
        let result = validate_and_guard(raw, &TargetSpec::square_logo());
        match result {
            Err(GuardError::InvalidFileType { declared }) => assert_eq!(declared, "image/bmp"),
            other => panic!("Expected InvalidFileType, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_extension_without_declared_type() {
        let raw = RawSource::new(vec![0u8; 32], "", "cover.webp");
        let result = validate_and_guard(raw, &TargetSpec::wide_cover());
        assert!(matches!(result, Err(GuardError::InvalidFileType { .. })));
    }

    #[test]
    fn test_under_budget_passes_through_byte_identical() {
        let bytes = png_bytes(&gradient_image(64, 64));
        assert!(bytes.len() < 10 * 1024);

        let raw = RawSource::new(bytes.clone(), "image/png", "logo.png");
        let accepted = validate_and_guard(raw, &TargetSpec::square_logo()).unwrap();

        assert_eq!(accepted.bytes.as_ref(), bytes.as_slice());
        assert_eq!(accepted.media_type, MediaType::Png);
        assert_eq!(accepted.filename, "logo.png");
        assert!(!accepted.reencoded);
    }

    #[test]
    fn test_exactly_at_budget_passes_through() {
        let bytes = png_bytes(&gradient_image(16, 16));
        let target = TargetSpec::square_logo().with_byte_budget(bytes.len() as u64);
        let raw = RawSource::new(bytes, "image/png", "logo.png");
        assert!(!validate_and_guard(raw, &target).unwrap().reencoded);
    }

    #[test]
    fn test_over_budget_is_downsampled_once() {
        let bytes = png_bytes(&noise_image(1000, 500, 5));
        let target = TargetSpec::square_logo().with_byte_budget(bytes.len() as u64 - 1);

        let raw = RawSource::new(bytes, "image/png", "brand.png");
        let accepted = validate_and_guard(raw, &target).unwrap();

        assert!(accepted.reencoded);
        assert_eq!(accepted.media_type, MediaType::Jpeg);
        assert_eq!(accepted.filename, "brand.jpg");
        assert!(accepted.len() <= target.byte_budget);

        let decoded = image::load_from_memory(&accepted.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (800, 400));
    }

    #[test]
    fn test_still_too_large_is_terminal() {
        let bytes = png_bytes(&noise_image(400, 400, 7));
        let target = TargetSpec::square_logo().with_byte_budget(4 * 1024);

        let raw = RawSource::new(bytes, "image/png", "noise.png");
        match validate_and_guard(raw, &target) {
            Err(GuardError::StillTooLarge { size, budget }) => {
                assert_eq!(budget, 4 * 1024);
                assert!(size > budget);
            }
            other => panic!("Expected StillTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn test_over_budget_undecodable_is_decode_failure() {
        let raw = RawSource::new(vec![0xABu8; 2048], "image/jpeg", "broken.jpg");
        let target = TargetSpec::square_logo().with_byte_budget(1024);
        let result = validate_and_guard(raw, &target);
        assert!(matches!(result, Err(GuardError::Decode(_))));
    }

    #[test]
    fn test_transparent_logo_is_flattened_over_fill() {
        // Left half transparent, right half noise so the PNG is large.
        let mut img = noise_image(1000, 1000, 3);
        for y in 0..1000 {
            for x in 0..500 {
                img.put_pixel(x, y, image::Rgba([0, 0, 0, 0]));
            }
        }
        let bytes = png_bytes(&img);
        assert!(bytes.len() as u64 > 1024 * 1024);

        let raw = RawSource::new(bytes, "image/png", "mark.png");
        let accepted = validate_and_guard(raw, &TargetSpec::square_logo()).unwrap();
        assert!(accepted.len() < 1024 * 1024);

        let decoded = image::load_from_memory(&accepted.bytes).unwrap().into_rgb8();
        assert_eq!(decoded.dimensions(), (800, 800));
        let [r, g, b] = decoded.get_pixel(100, 400).0;
        assert!(r > 245 && g > 245 && b > 245, "expected white fill, got {r},{g},{b}");
    }

    #[test]
    fn test_custom_fill_colour() {
        let mut img = noise_image(300, 300, 11);
        for y in 0..300 {
            for x in 0..150 {
                img.put_pixel(x, y, image::Rgba([0, 0, 0, 0]));
            }
        }
        let bytes = png_bytes(&img);
        let target = TargetSpec::square_logo()
            .with_byte_budget(bytes.len() as u64 - 1)
            .with_background_fill(Some(FillColor::new(0, 0, 255)));

        let accepted = validate_and_guard(RawSource::new(bytes, "image/png", "m.png"), &target)
            .unwrap();
        let decoded = image::load_from_memory(&accepted.bytes).unwrap().into_rgb8();
        let [r, _, b] = decoded.get_pixel(20, 150).0;
        assert!(b > 200 && r < 40);
    }

    #[test]
    fn test_preview_shares_accepted_bytes() {
        let bytes = jpeg_bytes(&gradient_image(32, 32));
        let accepted = validate_and_guard(
            RawSource::new(bytes, "image/jpeg", "c.jpg"),
            &TargetSpec::wide_cover(),
        )
        .unwrap();
        let preview = accepted.preview();
        assert_eq!(preview.media_type(), MediaType::Jpeg);
        assert_eq!(preview.bytes(), &accepted.bytes);
    }
}
