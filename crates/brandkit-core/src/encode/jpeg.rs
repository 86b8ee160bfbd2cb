//! JPEG encoding for guarded sources and exported assets.
//!
//! JPEG has no alpha channel, so RGBA input is flattened first: composited
//! over a fill colour when one is configured, otherwise the alpha is dropped.

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage, RgbaImage};
use std::io::Cursor;
use thiserror::Error;

use crate::target::FillColor;

/// Errors that can occur during JPEG encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// JPEG encoding failed
    #[error("JPEG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Encode RGB pixel data to JPEG bytes.
///
/// # Arguments
///
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `quality` - JPEG quality (1-100, clamped)
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected_len = (width as usize) * (height as usize) * 3;
    if pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: pixels.len(),
        });
    }

    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

/// Flatten `image` to RGB, then encode it.
pub fn encode_rgba_jpeg(
    image: &RgbaImage,
    fill: Option<FillColor>,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    let rgb = flatten(image, fill);
    encode_jpeg(rgb.as_raw(), rgb.width(), rgb.height(), quality)
}

/// Composite RGBA pixels over `fill`, or drop alpha when there is no fill.
pub fn flatten(image: &RgbaImage, fill: Option<FillColor>) -> RgbImage {
    let Some(fill) = fill else {
        return image::DynamicImage::ImageRgba8(image.clone()).into_rgb8();
    };

    let background = [fill.r, fill.g, fill.b];
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let alpha = a as u32;
        let blend = |c: u8, bg: u8| ((c as u32 * alpha + bg as u32 * (255 - alpha) + 127) / 255) as u8;
        image::Rgb([
            blend(r, background[0]),
            blend(g, background[1]),
            blend(b, background[2]),
        ])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const WHITE: FillColor = FillColor::new(255, 255, 255);

    #[test]
    fn test_encode_jpeg_markers() {
        let pixels = vec![128u8; 64 * 48 * 3];
        let jpeg = encode_jpeg(&pixels, 64, 48, 90).unwrap();

        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
        assert_eq!(&jpeg[jpeg.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_encode_jpeg_quality_clamping() {
        let pixels = vec![128u8; 10 * 10 * 3];
        assert!(encode_jpeg(&pixels, 10, 10, 0).is_ok());
        assert!(encode_jpeg(&pixels, 10, 10, 255).is_ok());
    }

    #[test]
    fn test_encode_jpeg_invalid_pixel_data() {
        let pixels = vec![128u8; 99 * 100 * 3];
        let result = encode_jpeg(&pixels, 100, 100, 90);
        assert!(matches!(result, Err(EncodeError::InvalidPixelData { .. })));
    }

    #[test]
    fn test_encode_jpeg_zero_dimensions() {
        assert!(matches!(
            encode_jpeg(&[], 0, 100, 90),
            Err(EncodeError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            encode_jpeg(&[], 100, 0, 90),
            Err(EncodeError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_flatten_transparent_over_fill() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        let flat = flatten(&img, Some(WHITE));
        assert_eq!(flat.get_pixel(0, 0).0, [255, 255, 255]);
    }

    #[test]
    fn test_flatten_opaque_is_unchanged() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 255]));
        let flat = flatten(&img, Some(WHITE));
        assert_eq!(flat.get_pixel(1, 1).0, [10, 20, 30]);
    }

    #[test]
    fn test_flatten_half_alpha_blends() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 128]));
        let flat = flatten(&img, Some(WHITE));
        let [r, g, b] = flat.get_pixel(0, 0).0;
        assert_eq!((r, g, b), (127, 127, 127));
    }

    #[test]
    fn test_flatten_without_fill_drops_alpha() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([40, 50, 60, 0]));
        let flat = flatten(&img, None);
        assert_eq!(flat.get_pixel(0, 0).0, [40, 50, 60]);
    }

    #[test]
    fn test_encode_rgba_jpeg_round_trips_dimensions() {
        let img = RgbaImage::from_pixel(33, 17, Rgba([90, 90, 90, 200]));
        let jpeg = encode_rgba_jpeg(&img, Some(WHITE), 80).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (33, 17));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: valid input always yields a non-empty, well-formed JPEG.
        #[test]
        fn prop_valid_input_produces_valid_jpeg(
            width in 1u32..=40,
            height in 1u32..=40,
            quality in 1u8..=100,
        ) {
            let pixels = vec![100u8; (width * height * 3) as usize];
            let jpeg = encode_jpeg(&pixels, width, height, quality).unwrap();

            prop_assert!(jpeg.len() >= 4);
            prop_assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
            prop_assert_eq!(&jpeg[jpeg.len() - 2..], &[0xFF, 0xD9]);
        }

        /// Property: a fully opaque pixel never changes under flattening.
        #[test]
        fn prop_opaque_flatten_identity(
            r in any::<u8>(), g in any::<u8>(), b in any::<u8>(),
            fr in any::<u8>(), fg in any::<u8>(), fb in any::<u8>(),
        ) {
            let img = RgbaImage::from_pixel(1, 1, image::Rgba([r, g, b, 255]));
            let flat = flatten(&img, Some(FillColor::new(fr, fg, fb)));
            prop_assert_eq!(flat.get_pixel(0, 0).0, [r, g, b]);
        }
    }
}
