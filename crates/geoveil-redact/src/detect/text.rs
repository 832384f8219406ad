// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR polygons to axis-aligned boxes.

use geoveil_core::{PixelBox, TextRegion};
use tracing::{debug, warn};

/// Reduce OCR polygons to boxes and drop the small ones.
///
/// Each polygon becomes its axis-aligned hull, clipped to the last valid
/// pixel (`width - 1`, `height - 1`). Regions whose box area is below
/// `min_area` are treated as noise. Polygons without usable points are
/// skipped.
pub fn text_regions_to_boxes(
    regions: &[TextRegion],
    width: u32,
    height: u32,
    min_area: i64,
) -> Vec<PixelBox> {
    let max_x = i32::try_from(width.saturating_sub(1)).unwrap_or(i32::MAX);
    let max_y = i32::try_from(height.saturating_sub(1)).unwrap_or(i32::MAX);

    let mut skipped = 0usize;
    let boxes: Vec<PixelBox> = regions
        .iter()
        .filter_map(|region| PixelBox::from_polygon(&region.polygon))
        .map(|hull| {
            PixelBox::new(
                hull.x1.clamp(0, max_x),
                hull.y1.clamp(0, max_y),
                hull.x2.clamp(0, max_x),
                hull.y2.clamp(0, max_y),
            )
        })
        .filter(|bbox| {
            let keep = bbox.area() >= min_area;
            if !keep {
                skipped += 1;
            }
            keep
        })
        .collect();

    if skipped > 0 {
        warn!(skipped, min_area, "Dropped text regions below minimum area");
    }
    debug!(
        regions = regions.len(),
        boxes = boxes.len(),
        skipped,
        min_area,
        "Text regions reduced to boxes"
    );
    boxes
}
