// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Redaction filter — blur or pixelate the masked pixels of an image.

pub mod blur;
pub mod pixelate;

use geoveil_core::{GeoveilError, RedactMethod, RedactionConfig, Result};
use image::RgbImage;
use tracing::{debug, info, instrument};

use crate::mask::RedactionMask;

pub use blur::{effective_kernel_size, gaussian_blur};
pub use pixelate::{downscale_dimensions, pixelate_region};

/// Apply the configured transform to every masked pixel of `image`.
///
/// The transform is always computed from the original pixels and then
/// composited through the mask, so unmasked pixels come back bit-for-bit
/// identical. The input is never modified.
///
/// # Errors
///
/// - [`GeoveilError::InvalidConfig`] for a zero kernel size or a pixelate
///   scale outside `(0, 1]`. An even kernel size is not an error.
/// - [`GeoveilError::DimensionMismatch`] when mask and image differ in size.
#[instrument(skip_all, fields(
    width = image.width(),
    height = image.height(),
    method = %config.method,
))]
pub fn redact(image: &RgbImage, mask: &RedactionMask, config: &RedactionConfig) -> Result<RgbImage> {
    config.validate()?;

    if image.dimensions() != mask.dimensions() {
        return Err(GeoveilError::DimensionMismatch {
            image: image.dimensions(),
            mask: mask.dimensions(),
        });
    }

    if mask.is_empty() {
        debug!("Mask is empty; returning an unmodified copy");
        return Ok(image.clone());
    }

    let output = match config.method {
        RedactMethod::Blur => redact_blur(image, mask, config.blur_kernel_size),
        RedactMethod::Pixelate => redact_pixelate(image, mask, config.pixelate_scale),
    };

    info!(
        redacted = mask.redacted_pixel_count(),
        "Redaction applied"
    );
    Ok(output)
}

fn redact_blur(image: &RgbImage, mask: &RedactionMask, kernel_size: u32) -> RgbImage {
    // Blurring the whole frame is equivalent to blurring the masked region
    // with its surroundings, since only masked pixels are written back.
    let blurred = gaussian_blur(image, effective_kernel_size(kernel_size));
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        if mask.is_redacted(x, y) {
            *blurred.get_pixel(x, y)
        } else {
            *image.get_pixel(x, y)
        }
    })
}

fn redact_pixelate(image: &RgbImage, mask: &RedactionMask, scale: f32) -> RgbImage {
    let mut output = image.clone();
    let Some(region) = mask.bounding_box() else {
        return output;
    };

    let pixelated = pixelate_region(image, region, scale);
    let (x0, y0) = (region.x1 as u32, region.y1 as u32);
    for (dx, dy, pixel) in pixelated.enumerate_pixels() {
        let (x, y) = (x0 + dx, y0 + dy);
        if mask.is_redacted(x, y) {
            output.put_pixel(x, y, *pixel);
        }
    }
    output
}
