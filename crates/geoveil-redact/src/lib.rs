// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// geoveil-redact — Image redaction for Geoveil.
//
// Provides box geometry (IOU, enclosing boxes), greedy fusion of overlapping
// detections, binary redaction masks, blur and pixelate filters, and the
// pipeline that ties detector output to a redacted image plus report.

pub mod detect;
pub mod filter;
pub mod fusion;
pub mod geometry;
pub mod mask;
pub mod overlay;
pub mod pipeline;
pub mod report;

// Re-export the primary entry points so callers can use `geoveil_redact::redact_image` etc.
pub use detect::{BoxDetector, DetectionThresholds, TextDetector};
pub use filter::redact;
pub use fusion::merge_overlaps;
pub use geometry::{enclosing_box, iou};
pub use mask::{RedactionMask, union_masks};
pub use pipeline::{
    DetectionServices, RedactionOutcome, clamp_box_lists, redact_dynamic, redact_image,
};
pub use report::RedactionReport;

#[cfg(feature = "ocr")]
pub use detect::ocr::{OcrModelConfig, OcrTextDetector};
