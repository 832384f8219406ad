// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Step-by-step debug images for one redaction run.

use std::path::{Path, PathBuf};

use geoveil_core::{BoxList, Result};
use geoveil_redact::RedactionOutcome;
use geoveil_redact::overlay::draw_detections;
use image::RgbImage;
use tracing::info;

use super::images::{save_gray, save_rgb};

pub const ORIGINAL: &str = "step1_original.png";
pub const DETECTIONS: &str = "step2_detections.png";
pub const MASK: &str = "step3_mask.png";
pub const REDACTED: &str = "step4_redacted.png";

/// Write the four pipeline stages into `dir` and return the written paths.
///
/// `box_lists` are drawn as given (before fusion) so the overlay shows what
/// the detectors reported.
pub fn write_debug_images(
    dir: &Path,
    original: &RgbImage,
    box_lists: &[BoxList],
    outcome: &RedactionOutcome,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let paths = [ORIGINAL, DETECTIONS, MASK, REDACTED].map(|name| dir.join(name));
    save_rgb(original, &paths[0])?;
    save_rgb(&draw_detections(original, box_lists), &paths[1])?;
    save_gray(outcome.mask.as_gray(), &paths[2])?;
    save_rgb(&outcome.image, &paths[3])?;

    info!(dir = %dir.display(), "Debug images written");
    Ok(paths.to_vec())
}
