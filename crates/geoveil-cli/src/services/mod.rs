// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer — bridges the command line to the geoveil backend crates.
//
// Each service wraps file handling around a backend API so that the
// subcommands in `main.rs` stay thin.

pub mod batch;
pub mod box_files;
pub mod config_dir;
pub mod debug_output;
pub mod images;

use geoveil_core::{BoxList, PipelineConfig, Result};
use geoveil_redact::{DetectionServices, RedactionOutcome, redact_image};
use image::RgbImage;

/// Run the detectors when any are loaded, otherwise redact from the given
/// box lists alone.
pub fn redact_with(
    services: &DetectionServices,
    image: &RgbImage,
    box_lists: &[BoxList],
    config: &PipelineConfig,
) -> Result<RedactionOutcome> {
    if services.has_object_detector() || services.has_text_detector() {
        services.process(image, box_lists, config)
    } else {
        redact_image(image, box_lists, config)
    }
}
