// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detector seams — the object detector and OCR engine are external
// collaborators. This module defines what they must provide and how their
// raw output is turned into box lists.

pub mod text;

#[cfg(feature = "ocr")]
pub mod ocr;

use geoveil_core::{Detection, PixelBox, RedactCategory, Result, TextRegion};
use image::RgbImage;
use tracing::debug;

pub use text::text_regions_to_boxes;

/// Score cut-offs handed to the object detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionThresholds {
    pub box_threshold: f32,
    pub text_threshold: f32,
}

impl Default for DetectionThresholds {
    fn default() -> Self {
        Self {
            box_threshold: 0.25,
            text_threshold: 0.20,
        }
    }
}

/// Open-vocabulary object detector (faces, signs, flags, landmarks).
///
/// Boxes are in the image's own pixel space, in any order and any count.
/// Implementations are loaded once and shared, hence `Send + Sync`.
pub trait BoxDetector: Send + Sync {
    fn detect_boxes(
        &self,
        image: &RgbImage,
        queries: &[String],
        thresholds: DetectionThresholds,
    ) -> Result<Vec<Detection>>;
}

/// Text region detector. Regions are polygons in image coordinates.
pub trait TextDetector: Send + Sync {
    fn detect_text(&self, image: &RgbImage) -> Result<Vec<TextRegion>>;
}

/// Detector queries for the requested categories, in category order,
/// without duplicates.
pub fn build_queries(categories: &[RedactCategory]) -> Vec<String> {
    let mut queries: Vec<String> = Vec::new();
    for category in categories {
        for query in category.queries() {
            if !queries.iter().any(|q| q == query) {
                queries.push((*query).to_string());
            }
        }
    }
    queries
}

/// Boxes of the detections whose label mentions one of `keywords`
/// (case-insensitive substring match). An empty keyword list keeps all.
pub fn filter_detections(detections: &[Detection], keywords: &[String]) -> Vec<PixelBox> {
    let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    let kept: Vec<PixelBox> = detections
        .iter()
        .filter(|det| {
            let label = det.label.to_lowercase();
            keywords.is_empty() || keywords.iter().any(|k| label.contains(k.as_str()))
        })
        .map(|det| det.bbox)
        .collect();
    debug!(
        detections = detections.len(),
        kept = kept.len(),
        "Detections filtered by label"
    );
    kept
}
