//! Aspect-locked crop geometry in displayed coordinates.
//!
//! # Coordinate System
//!
//! - Units are display (layout) pixels of the rendered source, not native pixels
//! - (0, 0) is the top-left corner of the rendered image
//! - A region always lies inside `[0, display_width] x [0, display_height]`
//!   and always has `width / height == aspect_ratio`
//!
//! The mapping to native pixels happens only at export time, in
//! [`super::map_to_native`].

use serde::{Deserialize, Serialize};

use crate::decode::{DisplaySize, SourceImage};
use crate::target::{TargetSpec, ZoomRange, ASPECT_EPSILON};

/// Share of the limiting display edge covered by the default crop.
const DEFAULT_COVERAGE: f64 = 0.8;

/// Smallest edge, in display pixels, a region may shrink to.
const MIN_CROP_EDGE: f64 = 1.0;

/// A crop rectangle in displayed coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRegion {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }

    /// Finite origin and strictly positive finite size.
    pub fn is_well_formed(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }

    pub fn is_aspect_locked(&self, aspect_ratio: f64) -> bool {
        (self.aspect_ratio() - aspect_ratio).abs() < ASPECT_EPSILON * aspect_ratio.max(1.0)
    }

    /// Whether the region lies inside the display, with float slack.
    pub fn fits_within(&self, display: DisplaySize) -> bool {
        let slack = ASPECT_EPSILON * display.width().max(display.height());
        self.x >= -slack
            && self.y >= -slack
            && self.x + self.width <= display.width() + slack
            && self.y + self.height <= display.height() + slack
    }

    /// Shrink about the centre by `zoom`; `zoom == 1` is the identity.
    pub fn zoomed(&self, zoom: f64) -> CropRegion {
        let width = self.width / zoom;
        let height = self.height / zoom;
        CropRegion {
            x: self.x + (self.width - width) / 2.0,
            y: self.y + (self.height - height) / 2.0,
            width,
            height,
        }
    }
}

/// Compute the default crop for a freshly loaded source.
///
/// The region is centred and aspect-locked. It spans 80% of the display
/// width; when that would overflow the display height it spans 80% of the
/// height instead.
///
/// Only the limiting edge is guaranteed a margin. When the display is up to
/// 1.25 times wider than the target ratio, the width rule still applies and
/// the height margin shrinks to zero at exactly 1.25 times.
pub fn initialize_crop(source: &SourceImage, target: &TargetSpec) -> CropRegion {
    default_region(source.display(), target.aspect_ratio)
}

fn default_region(display: DisplaySize, aspect_ratio: f64) -> CropRegion {
    let (display_width, display_height) = (display.width(), display.height());

    let mut width = display_width * DEFAULT_COVERAGE;
    let mut height = width / aspect_ratio;
    if height > display_height {
        height = display_height * DEFAULT_COVERAGE;
        width = height * aspect_ratio;
    }

    CropRegion {
        x: (display_width - width) / 2.0,
        y: (display_height - height) / 2.0,
        width,
        height,
    }
}

/// Snap `proposal` to `aspect_ratio` and clamp it into `display`.
///
/// The proposal's width drives the size; height is always derived. Missing
/// or degenerate components fall back to `fallback`.
pub fn constrain(
    proposal: CropRegion,
    fallback: CropRegion,
    display: DisplaySize,
    aspect_ratio: f64,
) -> CropRegion {
    let (display_width, display_height) = (display.width(), display.height());

    let pick = |value: f64, current: f64| if value.is_finite() { value } else { current };
    let proposed_width = if proposal.width.is_finite() && proposal.width > 0.0 {
        proposal.width
    } else {
        fallback.width
    };

    let max_width = display_width.min(display_height * aspect_ratio);
    let min_width = MIN_CROP_EDGE.max(MIN_CROP_EDGE * aspect_ratio).min(max_width);
    let width = proposed_width.clamp(min_width, max_width);
    let height = width / aspect_ratio;

    let x = pick(proposal.x, fallback.x).clamp(0.0, (display_width - width).max(0.0));
    let y = pick(proposal.y, fallback.y).clamp(0.0, (display_height - height).max(0.0));

    CropRegion {
        x,
        y,
        width,
        height,
    }
}

/// Owns the mutable crop state for one source/target pair.
#[derive(Debug, Clone)]
pub struct CropController {
    display: DisplaySize,
    aspect_ratio: f64,
    zoom_range: ZoomRange,
    region: CropRegion,
    zoom: f64,
}

impl CropController {
    /// Start from the default crop for `source` displayed at its current size.
    pub fn new(source: &SourceImage, target: &TargetSpec) -> Self {
        let region = initialize_crop(source, target);
        tracing::debug!(
            display_width = source.display().width(),
            display_height = source.display().height(),
            ?region,
            "initialized crop"
        );
        Self {
            display: source.display(),
            aspect_ratio: target.aspect_ratio,
            zoom_range: target.zoom_range,
            region,
            zoom: target.zoom_range.clamp(1.0),
        }
    }

    pub fn region(&self) -> CropRegion {
        self.region
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn display(&self) -> DisplaySize {
        self.display
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    /// Apply a drag or resize from the interactive UI.
    ///
    /// Whichever edge changed proportionally more drives the new size; the
    /// other is re-derived from the locked ratio.
    pub fn update(&mut self, proposal: CropRegion) -> CropRegion {
        let current = self.region;
        let width_change = relative_change(proposal.width, current.width);
        let height_change = relative_change(proposal.height, current.height);

        let mut driven = proposal;
        if height_change > width_change {
            driven.width = proposal.height * self.aspect_ratio;
        }

        self.region = constrain(driven, current, self.display, self.aspect_ratio);
        self.region
    }

    /// Move without resizing.
    pub fn move_to(&mut self, x: f64, y: f64) -> CropRegion {
        let proposal = CropRegion { x, y, ..self.region };
        self.region = constrain(proposal, self.region, self.display, self.aspect_ratio);
        self.region
    }

    /// Set the zoom factor, clamped to the target's range.
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        self.zoom = self.zoom_range.clamp(zoom);
        self.zoom
    }

    /// React to the rendered image changing size.
    ///
    /// The region keeps its relative placement and is re-snapped to the new
    /// display.
    pub fn relayout(&mut self, display: DisplaySize) -> CropRegion {
        let scale_x = display.width() / self.display.width();
        let scale_y = display.height() / self.display.height();
        let scaled = CropRegion {
            x: self.region.x * scale_x,
            y: self.region.y * scale_y,
            width: self.region.width * scale_x,
            height: self.region.height * scale_y,
        };

        self.display = display;
        self.region = constrain(scaled, scaled, display, self.aspect_ratio);
        self.region
    }

    /// The region actually captured at export: the rectangle shrunk by zoom.
    pub fn resolved_region(&self) -> CropRegion {
        self.region.zoomed(self.zoom)
    }
}

fn relative_change(proposed: f64, current: f64) -> f64 {
    if proposed.is_finite() && proposed > 0.0 {
        ((proposed - current) / current).abs()
    } else {
        0.0
    }
}
