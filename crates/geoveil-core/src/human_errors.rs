// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives how front ends present it and whether a retry makes sense.

use crate::error::GeoveilError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// A detector or file system hiccup; trying again may work.
    Transient,
    /// The user must change an input or a setting.
    ActionRequired,
    /// Cannot be fixed by retrying: a bug or an unusable input.
    Permanent,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transient => "temporary problem",
            Self::ActionRequired => "action required",
            Self::Permanent => "cannot be fixed by retrying",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    /// Whether retrying the same request could succeed.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `GeoveilError` into a `HumanError`.
pub fn humanize_error(err: &GeoveilError) -> HumanError {
    match err {
        GeoveilError::InvalidBox(detail) => HumanError {
            message: "A detection box could not be read.".into(),
            suggestion: format!(
                "Check that every box has four finite numbers (x1, y1, x2, y2). ({detail})"
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        GeoveilError::InvalidConfig(detail) => HumanError {
            message: "The redaction settings are not valid.".into(),
            suggestion: format!(
                "Use a positive blur kernel and a pixelate scale between 0 and 1. ({detail})"
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        GeoveilError::DimensionMismatch { .. } => HumanError {
            message: "The redaction mask does not match the image size.".into(),
            suggestion: "This is a bug in the caller: build the mask from the same image you redact."
                .into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        GeoveilError::ImageError(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        GeoveilError::Detection(_) => HumanError {
            message: "Sensitive content detection failed.".into(),
            suggestion: "Try again. If it keeps failing, supply boxes manually with --boxes.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        GeoveilError::OcrError(_) => HumanError {
            message: "Text detection didn't work on this image.".into(),
            suggestion: "Check that the OCR model files are installed, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        GeoveilError::Io(io_err) => humanize_io_error(io_err),

        GeoveilError::Serialization(_) => HumanError {
            message: "A settings or box file could not be read.".into(),
            suggestion: "Check that the file is valid JSON in the expected shape.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}

fn humanize_io_error(err: &std::io::Error) -> HumanError {
    match err.kind() {
        std::io::ErrorKind::NotFound => HumanError {
            message: "A file could not be found.".into(),
            suggestion: "Check the path and try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
        std::io::ErrorKind::PermissionDenied => HumanError {
            message: "Permission denied.".into(),
            suggestion: "Check that you can read the input and write to the output location."
                .into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
        _ => HumanError {
            message: "A file operation failed.".into(),
            suggestion: format!("Try again. ({err})"),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}
