// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-request redaction report with SHA-256 fingerprints of the pixels
// before and after redaction.

use chrono::{DateTime, Utc};
use geoveil_core::{DetectionSource, RedactMethod, RequestId};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::mask::RedactionMask;

/// Compute the SHA-256 hash of `data` and return it as a lowercase hex string.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Fingerprint of the raw RGB buffer (not of any encoded file).
pub fn fingerprint(image: &RgbImage) -> String {
    hash_bytes(image.as_raw())
}

/// Box counts for one input list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSummary {
    pub source: DetectionSource,
    pub raw_boxes: usize,
    /// Equal to `raw_boxes` when the source is not fused.
    pub fused_boxes: usize,
}

/// What one call to the pipeline did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactionReport {
    pub request_id: RequestId,
    pub started_at: DateTime<Utc>,
    pub width: u32,
    pub height: u32,
    pub method: RedactMethod,
    pub sources: Vec<SourceSummary>,
    pub redacted_pixels: u64,
    /// Fraction of the image that was redacted.
    pub coverage: f64,
    pub input_sha256: String,
    pub output_sha256: String,
}

impl RedactionReport {
    pub fn new(
        started_at: DateTime<Utc>,
        method: RedactMethod,
        sources: Vec<SourceSummary>,
        input: &RgbImage,
        mask: &RedactionMask,
        output: &RgbImage,
    ) -> Self {
        Self {
            request_id: RequestId::new(),
            started_at,
            width: input.width(),
            height: input.height(),
            method,
            sources,
            redacted_pixels: mask.redacted_pixel_count(),
            coverage: mask.coverage(),
            input_sha256: fingerprint(input),
            output_sha256: fingerprint(output),
        }
    }

    /// True when the output pixels differ from the input pixels.
    pub fn changed(&self) -> bool {
        self.input_sha256 != self.output_sha256
    }
}
