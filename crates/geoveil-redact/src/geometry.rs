// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Box geometry — intersection-over-union and enclosing boxes.

use geoveil_core::PixelBox;

/// Area of the overlap between two boxes, in pixels.
pub fn intersection_area(a: &PixelBox, b: &PixelBox) -> i64 {
    let width = (i64::from(a.x2.min(b.x2)) - i64::from(a.x1.max(b.x1))).max(0);
    let height = (i64::from(a.y2.min(b.y2)) - i64::from(a.y1.max(b.y1))).max(0);
    width.saturating_mul(height)
}

/// Intersection-over-union of two boxes, in `[0, 1]`.
///
/// Returns `0.0` whenever the boxes share no area, which also covers every
/// pairing with a degenerate box, so the division below never sees a zero
/// denominator.
pub fn iou(a: &PixelBox, b: &PixelBox) -> f32 {
    let intersection = intersection_area(a, b);
    if intersection == 0 {
        return 0.0;
    }
    let intersection = intersection as f64;
    let union = a.area() as f64 + b.area() as f64 - intersection;
    (intersection / union) as f32
}

/// Smallest box containing every box in `boxes`, or `None` for an empty input.
pub fn enclosing_box<'a>(boxes: impl IntoIterator<Item = &'a PixelBox>) -> Option<PixelBox> {
    boxes.into_iter().fold(None, |acc, b| {
        Some(match acc {
            None => *b,
            Some(hull) => PixelBox {
                x1: hull.x1.min(b.x1),
                y1: hull.y1.min(b.y1),
                x2: hull.x2.max(b.x2),
                y2: hull.y2.max(b.y2),
            },
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(x1: i32, y1: i32, x2: i32, y2: i32) -> PixelBox {
        PixelBox::new(x1, y1, x2, y2)
    }

    #[test]
    fn identical_boxes_have_unit_iou() {
        let a = b(3, 4, 30, 40);
        assert_eq!(iou(&a, &a), 1.0);
    }

    #[test]
    fn disjoint_and_touching_boxes_have_zero_iou() {
        assert_eq!(iou(&b(0, 0, 10, 10), &b(20, 20, 30, 30)), 0.0);
        // Shared edge, no shared pixel.
        assert_eq!(iou(&b(0, 0, 10, 10), &b(10, 0, 20, 10)), 0.0);
    }

    #[test]
    fn degenerate_boxes_have_zero_iou() {
        let line = b(5, 0, 5, 10);
        assert_eq!(iou(&line, &line), 0.0);
        assert_eq!(iou(&line, &b(0, 0, 10, 10)), 0.0);
    }

    #[test]
    fn partial_overlap() {
        // 8x8 overlap, union 100 + 100 - 64.
        let value = iou(&b(0, 0, 10, 10), &b(2, 2, 12, 12));
        assert!((value - 64.0 / 136.0).abs() < 1e-6, "got {value}");
        assert!(value > 0.2);
    }

    #[test]
    fn end_to_end_pair_is_below_default_threshold() {
        // 10x10 overlap, union 1600 + 1600 - 100.
        let value = iou(&b(10, 10, 50, 50), &b(40, 40, 80, 80));
        assert!((value - 100.0 / 3100.0).abs() < 1e-6, "got {value}");
        assert!(value < 0.2);
    }

    #[test]
    fn boxes_spanning_the_coordinate_range() {
        let wide = b(i32::MIN, 0, i32::MAX, 10);
        assert_eq!(intersection_area(&wide, &wide), wide.area());
        assert_eq!(iou(&wide, &wide), 1.0);

        let small = b(0, 0, 10, 10);
        let value = iou(&wide, &small);
        assert!(value > 0.0 && value < 1e-6, "got {value}");
    }

    #[test]
    fn enclosing_box_of_several() {
        let boxes = [b(5, 10, 20, 20), b(0, 12, 8, 30), b(15, 2, 18, 4)];
        assert_eq!(enclosing_box(&boxes), Some(b(0, 2, 20, 30)));
        assert_eq!(enclosing_box(std::iter::empty()), None);
    }
}
