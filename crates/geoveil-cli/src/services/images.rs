// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image file I/O with errors mapped into `GeoveilError`.

use std::path::Path;

use geoveil_core::{GeoveilError, Result};
use image::{GrayImage, RgbImage};
use tracing::debug;

/// Decode any supported format and convert to RGB8.
pub fn open_rgb(path: &Path) -> Result<RgbImage> {
    if !path.exists() {
        return Err(GeoveilError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )));
    }
    let decoded = image::open(path)
        .map_err(|e| GeoveilError::ImageError(format!("{}: {}", path.display(), e)))?;
    debug!(path = %path.display(), width = decoded.width(), height = decoded.height(), "Image loaded");
    Ok(decoded.to_rgb8())
}

/// Encode by file extension, creating the parent directory if needed.
pub fn save_rgb(image: &RgbImage, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    image
        .save(path)
        .map_err(|e| GeoveilError::ImageError(format!("{}: {}", path.display(), e)))
}

pub fn save_gray(image: &GrayImage, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    image
        .save(path)
        .map_err(|e| GeoveilError::ImageError(format!("{}: {}", path.display(), e)))
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
