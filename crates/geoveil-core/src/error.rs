// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Geoveil.

use thiserror::Error;

/// Top-level error type for all Geoveil operations.
#[derive(Debug, Error)]
pub enum GeoveilError {
    // -- Geometry / configuration --
    #[error("invalid box: {0}")]
    InvalidBox(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(
        "mask is {}x{} but image is {}x{}",
        mask.0, mask.1, image.0, image.1
    )]
    DimensionMismatch {
        /// Image `(width, height)`.
        image: (u32, u32),
        /// Mask `(width, height)`.
        mask: (u32, u32),
    },

    // -- Image / detection --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("detector failed: {0}")]
    Detection(String),

    #[error("OCR failed: {0}")]
    OcrError(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, GeoveilError>;
