//! Bounding-box down-sampling used by the size guard.
//!
//! Only one edge is ever clamped (width for landscape sources, height for
//! square and portrait ones); the other is derived from it so the aspect
//! ratio survives rounding.

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use super::FilterType;

/// Maximum width and height a down-sampled source may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownsampleBox {
    pub max_width: u32,
    pub max_height: u32,
}

impl DownsampleBox {
    pub const fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
        }
    }
}

/// Compute the down-sampled dimensions for a `width`x`height` source.
///
/// If `width > height` and `width > max_width`, the width is clamped and the
/// height derived. Otherwise, if `height > max_height`, the height is clamped
/// and the width derived. Sources already inside the rule are unchanged.
pub fn fit_within_box(width: u32, height: u32, bounds: DownsampleBox) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }

    if width > height {
        if width > bounds.max_width {
            let scaled = (height as f64 * bounds.max_width as f64 / width as f64).round() as u32;
            return (bounds.max_width, scaled.max(1));
        }
    } else if height > bounds.max_height {
        let scaled = (width as f64 * bounds.max_height as f64 / height as f64).round() as u32;
        return (scaled.max(1), bounds.max_height);
    }

    (width, height)
}

/// Resample `image` to the dimensions chosen by [`fit_within_box`].
///
/// Returns a clone when no clamping applies.
pub fn downsample(image: &RgbaImage, bounds: DownsampleBox, filter: FilterType) -> RgbaImage {
    let (width, height) = image.dimensions();
    let (new_width, new_height) = fit_within_box(width, height, bounds);

    if (new_width, new_height) == (width, height) {
        return image.clone();
    }

    image::imageops::resize(image, new_width, new_height, filter.to_image_filter())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: at most one edge is clamped and the ratio survives rounding.
        #[test]
        fn prop_ratio_preserved(
            width in 1u32..=10_000,
            height in 1u32..=10_000,
            max_width in 1u32..=2000,
            max_height in 1u32..=2000,
        ) {
            let bounds = DownsampleBox::new(max_width, max_height);
            let (w, h) = fit_within_box(width, height, bounds);

            prop_assert!(w >= 1 && h >= 1);
            prop_assert!(w <= width && h <= height);

            if (w, h) != (width, height) {
                prop_assert!(w == max_width || h == max_height);
                // Derived edge is within one pixel of the exact proportional value.
                let exact_h = height as f64 * w as f64 / width as f64;
                let exact_w = width as f64 * h as f64 / height as f64;
                prop_assert!((h as f64 - exact_h).abs() <= 1.0 || (w as f64 - exact_w).abs() <= 1.0);
            }
        }

        /// Property: fitting is idempotent.
        #[test]
        fn prop_idempotent(
            width in 1u32..=10_000,
            height in 1u32..=10_000,
        ) {
            let once = fit_within_box(width, height, DownsampleBox::new(800, 800));
            let twice = fit_within_box(once.0, once.1, DownsampleBox::new(800, 800));
            prop_assert_eq!(once, twice);
        }
    }
}
