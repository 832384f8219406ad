// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Box fusion — greedy seed-only clustering of overlapping detections.

use geoveil_core::PixelBox;
use tracing::debug;

use crate::geometry::{enclosing_box, iou};

/// Default IOU above which two boxes are merged.
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.2;

/// Collapse overlapping boxes into merged covering boxes.
///
/// Repeatedly takes the first remaining box as a seed, pulls in every other
/// remaining box whose IOU with the *seed* is strictly above
/// `iou_threshold`, and emits the bounding box of that cluster. Members are
/// never compared with each other, so a box that overlaps a cluster member
/// but not the seed starts a cluster of its own. The result can therefore
/// depend on input order.
///
/// The output never has more boxes than the input, and every input box is
/// contained in the output box of its cluster. A threshold of `1.0` leaves
/// the input unchanged.
pub fn merge_overlaps(boxes: &[PixelBox], iou_threshold: f32) -> Vec<PixelBox> {
    let mut remaining: Vec<PixelBox> = boxes.to_vec();
    let mut merged = Vec::with_capacity(remaining.len());

    while !remaining.is_empty() {
        let seed = remaining.remove(0);
        let mut cluster = vec![seed];

        remaining.retain(|candidate| {
            if iou(&seed, candidate) > iou_threshold {
                cluster.push(*candidate);
                false
            } else {
                true
            }
        });

        if let Some(hull) = enclosing_box(&cluster) {
            merged.push(hull);
        }
    }

    debug!(
        input = boxes.len(),
        output = merged.len(),
        iou_threshold,
        "Boxes fused"
    );
    merged
}
