// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Debug overlay — outlines detections on a copy of the image.

use geoveil_core::{BoxList, DetectionSource};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

/// Outline colour per detection source.
pub fn source_colour(source: DetectionSource) -> Rgb<u8> {
    match source {
        DetectionSource::Object => Rgb([0, 255, 0]),
        DetectionSource::Text => Rgb([0, 0, 255]),
        DetectionSource::Manual => Rgb([255, 0, 0]),
    }
}

/// Copy of `image` with a two pixel outline around every box.
pub fn draw_detections(image: &RgbImage, box_lists: &[BoxList]) -> RgbImage {
    let mut canvas = image.clone();
    let (width, height) = image.dimensions();

    for list in box_lists {
        let colour = source_colour(list.source);
        for bbox in &list.boxes {
            let clipped = bbox.clamp_to(width, height);
            if clipped.is_degenerate() {
                continue;
            }
            let (w, h) = (clipped.width() as u32, clipped.height() as u32);
            draw_hollow_rect_mut(&mut canvas, Rect::at(clipped.x1, clipped.y1).of_size(w, h), colour);
            if w > 2 && h > 2 {
                let inner = Rect::at(clipped.x1 + 1, clipped.y1 + 1).of_size(w - 2, h - 2);
                draw_hollow_rect_mut(&mut canvas, inner, colour);
            }
        }
    }
    canvas
}
