// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pixelation — linear downscale followed by nearest-neighbour upscale.

use geoveil_core::PixelBox;
use image::RgbImage;
use image::imageops::{self, FilterType};
use tracing::{debug, instrument};

/// Size of the low-resolution intermediate for a `width` x `height` region.
///
/// Each axis is truncated like an integer cast and clamped to at least one
/// pixel, so tiny scales or slivers never produce an empty image.
pub fn downscale_dimensions(width: u32, height: u32, scale: f32) -> (u32, u32) {
    let shrink = |len: u32| ((len as f32 * scale) as u32).max(1);
    (shrink(width), shrink(height))
}

/// Pixelate the `region` of `image` and return a buffer of the region's size.
///
/// `region` must be non-degenerate and lie within the image.
#[instrument(skip(image), fields(region = ?region))]
pub fn pixelate_region(image: &RgbImage, region: PixelBox, scale: f32) -> RgbImage {
    let (x, y) = (region.x1 as u32, region.y1 as u32);
    let (width, height) = (region.width() as u32, region.height() as u32);

    let roi = imageops::crop_imm(image, x, y, width, height).to_image();
    let (small_w, small_h) = downscale_dimensions(width, height, scale);
    debug!(width, height, small_w, small_h, "Pixelating region");

    let small = imageops::resize(&roi, small_w, small_h, FilterType::Triangle);
    imageops::resize(&small, width, height, FilterType::Nearest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn downscale_truncates() {
        assert_eq!(downscale_dimensions(100, 50, 0.06), (6, 3));
        assert_eq!(downscale_dimensions(100, 100, 1.0), (100, 100));
    }

    #[test]
    fn downscale_never_reaches_zero() {
        assert_eq!(downscale_dimensions(10, 3, 0.01), (1, 1));
        assert_eq!(downscale_dimensions(1, 1, f32::MIN_POSITIVE), (1, 1));
    }

    #[test]
    fn output_matches_region_size() {
        let img = RgbImage::from_fn(40, 30, |x, y| Rgb([x as u8, y as u8, 0]));
        let out = pixelate_region(&img, PixelBox::new(5, 5, 25, 17), 0.2);
        assert_eq!(out.dimensions(), (20, 12));
    }

    #[test]
    fn tiny_scale_flattens_region_to_one_colour() {
        let img = RgbImage::from_fn(16, 16, |x, _| Rgb([(x * 16) as u8, 0, 0]));
        let out = pixelate_region(&img, PixelBox::new(0, 0, 16, 16), 0.001);
        let first = *out.get_pixel(0, 0);
        assert!(out.pixels().all(|p| *p == first));
    }

    #[test]
    fn output_is_blocky() {
        let img = RgbImage::from_fn(20, 20, |x, y| Rgb([(x * 12) as u8, (y * 12) as u8, 90]));
        let out = pixelate_region(&img, PixelBox::new(0, 0, 20, 20), 0.25);
        // 5x5 intermediate, so each output block is 4x4 pixels.
        assert_eq!(out.get_pixel(0, 0), out.get_pixel(3, 3));
        assert_eq!(out.get_pixel(4, 4), out.get_pixel(7, 7));
        assert_ne!(out.get_pixel(0, 0), out.get_pixel(19, 19));
    }
}
