//! Rasterization of a displayed crop into a fixed-resolution surface.
//!
//! # Algorithm
//!
//! The crop is first mapped from display space to native pixel space using
//! the source's live display size:
//!
//! ```text
//! scale_x = natural_width  / display_width
//! scale_y = natural_height / display_height
//! src = (x * scale_x, y * scale_y, width * scale_x, height * scale_y)
//! ```
//!
//! The native rectangle is then stretched over the whole output surface in
//! a single resample. Because the crop is aspect-locked to the output ratio
//! the stretch is undistorted.

use image::{imageops, Rgba, RgbaImage};

use super::CropRegion;
use crate::decode::SourceImage;
use crate::target::{FillColor, TargetSpec};

/// A rectangle in native (stored) pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SourceRect {
    /// Integer pixel window `(x, y, width, height)` inside a
    /// `bounds_width`x`bounds_height` image, at least 1x1.
    pub fn pixel_window(&self, bounds_width: u32, bounds_height: u32) -> (u32, u32, u32, u32) {
        let edge = |start: f64, len: f64, bound: u32| {
            let bound = bound as f64;
            let lo = start.round().clamp(0.0, bound - 1.0);
            let hi = (start + len).round().clamp(lo + 1.0, bound);
            (lo as u32, (hi - lo) as u32)
        };
        let (x, width) = edge(self.x, self.width, bounds_width);
        let (y, height) = edge(self.y, self.height, bounds_height);
        (x, y, width, height)
    }
}

/// Map a displayed crop to native pixel coordinates.
pub fn map_to_native(region: &CropRegion, source: &SourceImage) -> SourceRect {
    let (scale_x, scale_y) = source.display_scale();
    SourceRect {
        x: region.x * scale_x,
        y: region.y * scale_y,
        width: region.width * scale_x,
        height: region.height * scale_y,
    }
}

/// Draw `region` of `source` into a new `output_width`x`output_height`
/// surface.
///
/// When the target has a background fill, the surface is painted with it
/// first so transparent source pixels come out as the fill colour.
pub fn rasterize(source: &SourceImage, region: &CropRegion, target: &TargetSpec) -> RgbaImage {
    let pixels = source.pixels();
    let native = map_to_native(region, source);
    let (x, y, width, height) = native.pixel_window(pixels.width(), pixels.height());

    let sub = imageops::crop_imm(pixels, x, y, width, height).to_image();
    let scaled = imageops::resize(
        &sub,
        target.output_width,
        target.output_height,
        target.filter.to_image_filter(),
    );

    match target.background_fill {
        Some(fill) => paint_over(fill, &scaled),
        None => scaled,
    }
}

/// Paint an opaque `fill` surface, then source-over composite `drawn` on it.
fn paint_over(fill: FillColor, drawn: &RgbaImage) -> RgbaImage {
    let mut surface = RgbaImage::from_pixel(
        drawn.width(),
        drawn.height(),
        Rgba([fill.r, fill.g, fill.b, u8::MAX]),
    );
    for (dst, src) in surface.pixels_mut().zip(drawn.pixels()) {
        let alpha = src.0[3] as u32;
        for c in 0..3 {
            let blended = src.0[c] as u32 * alpha + dst.0[c] as u32 * (255 - alpha);
            dst.0[c] = ((blended + 127) / 255) as u8;
        }
    }
    surface
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{DisplaySize, FilterType};
    use crate::transform::initialize_crop;

    fn fast(mut target: TargetSpec) -> TargetSpec {
        target.filter = FilterType::Bilinear;
        target
    }

    /// Left half red, right half blue.
    fn split_image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        })
    }

    #[test]
    fn test_map_to_native_scales_each_axis() {
        let src = SourceImage::new(RgbaImage::new(4000, 3000))
            .unwrap()
            .with_display(DisplaySize::new(800.0, 600.0).unwrap());
        let rect = map_to_native(&CropRegion::new(100.0, 50.0, 320.0, 180.0), &src);
        assert_eq!(rect, SourceRect { x: 500.0, y: 250.0, width: 1600.0, height: 900.0 });
    }

    #[test]
    fn test_map_to_native_uses_live_display() {
        let src = SourceImage::new(RgbaImage::new(1000, 1000)).unwrap();
        let region = CropRegion::new(100.0, 100.0, 200.0, 200.0);
        assert_eq!(map_to_native(&region, &src).x, 100.0);

        let relaid = src.with_display(DisplaySize::new(500.0, 500.0).unwrap());
        assert_eq!(map_to_native(&region, &relaid).x, 200.0);
    }

    #[test]
    fn test_pixel_window_clamps_to_bounds() {
        let rect = SourceRect { x: -3.0, y: 90.4, width: 200.0, height: 50.0 };
        assert_eq!(rect.pixel_window(100, 100), (0, 90, 100, 10));
    }

    #[test]
    fn test_pixel_window_never_empty() {
        let rect = SourceRect { x: 99.9, y: 5.0, width: 0.01, height: 0.01 };
        let (_, _, w, h) = rect.pixel_window(100, 100);
        assert_eq!((w, h), (1, 1));
    }

    #[test]
    fn test_output_shape_invariance() {
        let target = fast(TargetSpec::wide_cover());
        for (width, height) in [(200, 200), (4000, 3000), (50, 4000)] {
            let src = SourceImage::new(RgbaImage::new(width, height)).unwrap();
            let region = initialize_crop(&src, &target);
            let out = rasterize(&src, &region, &target);
            assert_eq!(out.dimensions(), (1600, 900), "source {width}x{height}");
        }
    }

    #[test]
    fn test_draws_selected_subregion() {
        let src = SourceImage::new(split_image(200, 100)).unwrap();
        let mut target = fast(TargetSpec::square_logo());
        target.output_width = 20;
        target.output_height = 20;

        let left = rasterize(&src, &CropRegion::new(0.0, 0.0, 80.0, 80.0), &target);
        assert_eq!(left.get_pixel(10, 10).0, [255, 0, 0, 255]);

        let right = rasterize(&src, &CropRegion::new(120.0, 0.0, 80.0, 80.0), &target);
        assert_eq!(right.get_pixel(10, 10).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_fill_replaces_transparency() {
        let src = SourceImage::new(RgbaImage::new(50, 50)).unwrap();
        let mut target = fast(TargetSpec::square_logo());
        target.output_width = 10;
        target.output_height = 10;
        target.background_fill = Some(FillColor::new(1, 2, 3));

        let out = rasterize(&src, &CropRegion::new(0.0, 0.0, 50.0, 50.0), &target);
        assert_eq!(out.get_pixel(5, 5).0, [1, 2, 3, 255]);
    }

    #[test]
    fn test_paint_over_blends_partial_alpha() {
        let drawn = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 128]));
        let out = paint_over(FillColor::WHITE, &drawn);
        assert_eq!(out.get_pixel(0, 0).0, [127, 127, 127, 255]);
    }

    #[test]
    fn test_no_fill_keeps_alpha() {
        let src = SourceImage::new(RgbaImage::new(50, 50)).unwrap();
        let mut target = fast(TargetSpec::wide_cover());
        target.output_width = 16;
        target.output_height = 9;

        let out = rasterize(&src, &CropRegion::new(0.0, 0.0, 32.0, 18.0), &target);
        assert_eq!(out.get_pixel(0, 0).0[3], 0);
    }
}
