// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Gaussian blur with an explicit, odd kernel size.

use image::RgbImage;
use imageproc::filter::separable_filter_equal;
use tracing::{debug, instrument};

/// Kernel size actually used for `requested`: even sizes have no centre
/// pixel, so they are bumped to the next odd size.
#[inline]
pub fn effective_kernel_size(requested: u32) -> u32 {
    if requested % 2 == 0 {
        requested.saturating_add(1)
    } else {
        requested
    }
}

/// Standard deviation conventionally paired with a Gaussian kernel of
/// `size` taps when no sigma is given.
pub fn sigma_for_kernel(size: u32) -> f64 {
    0.3 * ((f64::from(size) - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized 1-D Gaussian weights, `size` taps long.
pub fn gaussian_kernel(size: u32) -> Vec<f32> {
    let size = effective_kernel_size(size.max(1));
    let sigma = sigma_for_kernel(size);
    let centre = f64::from(size / 2);
    let two_sigma_sq = 2.0 * sigma * sigma;

    let weights: Vec<f64> = (0..size)
        .map(|i| {
            let d = f64::from(i) - centre;
            (-(d * d) / two_sigma_sq).exp()
        })
        .collect();
    let total: f64 = weights.iter().sum();

    weights.iter().map(|w| (w / total) as f32).collect()
}

/// Blur the whole image with a square Gaussian kernel of
/// `effective_kernel_size(kernel_size)` taps. Border pixels are replicated.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn gaussian_blur(image: &RgbImage, kernel_size: u32) -> RgbImage {
    let kernel = gaussian_kernel(kernel_size);
    debug!(taps = kernel.len(), "Applying separable Gaussian blur");
    separable_filter_equal(image, &kernel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn even_sizes_become_odd() {
        assert_eq!(effective_kernel_size(14), 15);
        assert_eq!(effective_kernel_size(15), 15);
        assert_eq!(effective_kernel_size(150), 151);
        assert_eq!(effective_kernel_size(1), 1);
    }

    #[test]
    fn kernel_is_normalized_and_symmetric() {
        let kernel = gaussian_kernel(15);
        assert_eq!(kernel.len(), 15);
        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5, "sum = {sum}");
        for i in 0..kernel.len() / 2 {
            assert!((kernel[i] - kernel[kernel.len() - 1 - i]).abs() < 1e-7);
        }
        assert!(kernel[7] > kernel[6]);
    }

    #[test]
    fn sigma_matches_the_usual_formula() {
        assert!((sigma_for_kernel(3) - 0.8).abs() < 1e-12);
        assert!((sigma_for_kernel(151) - 23.0).abs() < 1e-12);
    }

    #[test]
    fn unit_kernel_is_identity() {
        let img = RgbImage::from_fn(8, 8, |x, y| Rgb([(x * 30) as u8, (y * 30) as u8, 7]));
        assert_eq!(gaussian_blur(&img, 1), img);
    }

    #[test]
    fn blur_smooths_a_checkerboard() {
        let img = RgbImage::from_fn(32, 32, |x, y| {
            if (x + y) % 2 == 0 { Rgb([255, 255, 255]) } else { Rgb([0, 0, 0]) }
        });
        let blurred = gaussian_blur(&img, 9);
        let centre = blurred.get_pixel(16, 16).0[0];
        assert!((100..=160).contains(&centre), "centre = {centre}");
    }
}
