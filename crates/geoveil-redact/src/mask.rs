// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Redaction mask — a per-pixel keep/redact raster built from box lists.

use geoveil_core::PixelBox;
use image::{GrayImage, Luma};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use tracing::{debug, instrument};

/// Raster value marking a pixel for redaction.
pub const REDACT: u8 = 255;
/// Raster value marking a pixel to keep.
pub const KEEP: u8 = 0;

/// Binary raster the size of an image. Each pixel is either [`REDACT`] or
/// [`KEEP`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactionMask {
    raster: GrayImage,
}

impl RedactionMask {
    /// An all-keep mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            raster: GrayImage::from_pixel(width, height, Luma([KEEP])),
        }
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    /// `(width, height)`, matching `image::GenericImageView::dimensions`.
    pub fn dimensions(&self) -> (u32, u32) {
        self.raster.dimensions()
    }

    /// Whether pixel `(x, y)` is marked for redaction. Out-of-bounds pixels
    /// are never redacted.
    #[inline]
    pub fn is_redacted(&self, x: u32, y: u32) -> bool {
        x < self.width() && y < self.height() && self.raster.get_pixel(x, y).0[0] == REDACT
    }

    /// Mark every pixel of `bbox` for redaction, after clipping it to the
    /// mask. Degenerate and fully outside boxes mark nothing.
    pub fn mark_box(&mut self, bbox: &PixelBox) {
        let clipped = bbox.clamp_to(self.width(), self.height());
        if clipped.is_degenerate() {
            return;
        }
        // Clipped coordinates are non-negative and ordered.
        let rect = Rect::at(clipped.x1, clipped.y1)
            .of_size(clipped.width() as u32, clipped.height() as u32);
        draw_filled_rect_mut(&mut self.raster, rect, Luma([REDACT]));
    }

    pub fn redacted_pixel_count(&self) -> u64 {
        self.raster.pixels().filter(|p| p.0[0] == REDACT).count() as u64
    }

    /// True when no pixel is marked for redaction.
    pub fn is_empty(&self) -> bool {
        !self.raster.pixels().any(|p| p.0[0] == REDACT)
    }

    /// Fraction of pixels marked for redaction, in `[0, 1]`.
    pub fn coverage(&self) -> f64 {
        let total = u64::from(self.width()) * u64::from(self.height());
        if total == 0 {
            return 0.0;
        }
        self.redacted_pixel_count() as f64 / total as f64
    }

    /// Tightest box around all redacted pixels, or `None` if the mask is empty.
    pub fn bounding_box(&self) -> Option<PixelBox> {
        let mut hull: Option<(u32, u32, u32, u32)> = None;
        for (x, y, pixel) in self.raster.enumerate_pixels() {
            if pixel.0[0] != REDACT {
                continue;
            }
            hull = Some(match hull {
                None => (x, y, x, y),
                Some((x1, y1, x2, y2)) => (x1.min(x), y1.min(y), x2.max(x), y2.max(y)),
            });
        }
        // Inclusive pixel hull to half-open box.
        hull.map(|(x1, y1, x2, y2)| {
            PixelBox::new(x1 as i32, y1 as i32, x2 as i32 + 1, y2 as i32 + 1)
        })
    }

    /// Borrow the raster (`255` redact, `0` keep), e.g. for saving as PNG.
    pub fn as_gray(&self) -> &GrayImage {
        &self.raster
    }

    pub fn into_gray(self) -> GrayImage {
        self.raster
    }
}

/// Rasterize every box of every list into one mask of `width` x `height`.
///
/// Plain OR-composition: a pixel is redacted iff at least one box from any
/// list covers it, so the result does not depend on list or box order and
/// repeating a list changes nothing.
#[instrument(skip(box_lists), fields(lists = box_lists.len()))]
pub fn union_masks<L>(width: u32, height: u32, box_lists: &[L]) -> RedactionMask
where
    L: AsRef<[PixelBox]>,
{
    let mut mask = RedactionMask::new(width, height);
    let mut box_count = 0usize;
    for list in box_lists {
        for bbox in list.as_ref() {
            mask.mark_box(bbox);
            box_count += 1;
        }
    }
    debug!(
        box_count,
        redacted = mask.redacted_pixel_count(),
        "Mask composited"
    );
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(x1: i32, y1: i32, x2: i32, y2: i32) -> PixelBox {
        PixelBox::new(x1, y1, x2, y2)
    }

    #[test]
    fn new_mask_keeps_everything() {
        let mask = RedactionMask::new(20, 10);
        assert!(mask.is_empty());
        assert_eq!(mask.dimensions(), (20, 10));
        assert_eq!(mask.bounding_box(), None);
        assert_eq!(mask.coverage(), 0.0);
    }

    #[test]
    fn box_fill_is_half_open() {
        let mask = union_masks(20, 20, &[vec![b(2, 3, 5, 7)]]);
        assert_eq!(mask.redacted_pixel_count(), 3 * 4);
        assert!(mask.is_redacted(2, 3));
        assert!(mask.is_redacted(4, 6));
        assert!(!mask.is_redacted(5, 6));
        assert!(!mask.is_redacted(4, 7));
        assert_eq!(mask.bounding_box(), Some(b(2, 3, 5, 7)));
    }

    #[test]
    fn partially_outside_boxes_are_clipped() {
        let mask = union_masks(10, 10, &[vec![b(-5, -5, 3, 3), b(8, 8, 40, 40)]]);
        assert_eq!(mask.redacted_pixel_count(), 9 + 4);
        assert!(mask.is_redacted(0, 0));
        assert!(mask.is_redacted(9, 9));
    }

    #[test]
    fn degenerate_and_outside_boxes_mark_nothing() {
        let mask = union_masks(
            10,
            10,
            &[vec![b(3, 3, 3, 9), b(1, 4, 8, 4), b(20, 20, 30, 30), b(-9, 0, -1, 5)]],
        );
        assert!(mask.is_empty());
    }

    #[test]
    fn union_across_lists() {
        let a = vec![b(10, 10, 50, 50)];
        let c = vec![b(40, 40, 80, 80)];
        let mask = union_masks(100, 100, &[a, c]);
        // Two 40x40 squares sharing a 10x10 corner.
        assert_eq!(mask.redacted_pixel_count(), 1600 + 1600 - 100);
        assert!(mask.is_redacted(30, 30));
        assert!(mask.is_redacted(70, 70));
        assert!(!mask.is_redacted(70, 20));
        assert!(!mask.is_redacted(0, 0));
        assert_eq!(mask.bounding_box(), Some(b(10, 10, 80, 80)));
    }

    #[test]
    fn order_and_repetition_do_not_matter() {
        let a = vec![b(0, 0, 6, 6), b(4, 1, 9, 3)];
        let c = vec![b(2, 5, 8, 10)];
        let ab = union_masks(12, 12, &[a.clone(), c.clone()]);
        let ba = union_masks(12, 12, &[c, a.clone()]);
        assert_eq!(ab, ba);
        assert_eq!(
            union_masks(12, 12, &[a.clone()]),
            union_masks(12, 12, &[a.clone(), a])
        );
    }

    #[test]
    fn no_lists_gives_empty_mask() {
        let lists: Vec<Vec<PixelBox>> = Vec::new();
        assert!(union_masks(5, 5, &lists).is_empty());
    }

    #[test]
    fn coverage_fraction() {
        let mask = union_masks(10, 10, &[vec![b(0, 0, 5, 10)]]);
        assert!((mask.coverage() - 0.5).abs() < 1e-12);
    }
}
