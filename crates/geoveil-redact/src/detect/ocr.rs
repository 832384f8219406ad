// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR text detector for Geoveil.
//
// Locates text lines in photos using the `ocrs` crate, a pure-Rust OCR
// engine backed by neural network models executed via `rten`. Only the
// detection half of OCR matters for redaction: where the text is, not what
// it says.
//
// # Feature Gate
//
// This module is only available when the `ocr` feature is enabled:
//
// ```toml
// geoveil-redact = { path = "crates/geoveil-redact", features = ["ocr"] }
// ```
//
// # Model Setup
//
// Two model files are required:
//
// - **Detection model** (`text-detection.rten`): locates text regions.
// - **Recognition model** (`text-recognition.rten`): required by the engine
//   even though only line geometry is used here.
//
// Running `ocrs-cli` once downloads both to `$XDG_CACHE_HOME/ocrs`
// (typically `~/.cache/ocrs`), which is the default lookup directory.

use std::path::{Path, PathBuf};

use geoveil_core::{GeoveilError, Result, TextRegion};
use image::RgbImage;
use ocrs::{ImageSource, OcrEngine as OcrsEngine, OcrEngineParams};
use rten::Model;
use rten_imageproc::RotatedRect;
use tracing::{debug, info, instrument};

use super::TextDetector;

/// Default directory for cached OCR model files.
///
/// `$XDG_CACHE_HOME/ocrs`, falling back to `~/.cache/ocrs`.
fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// Where to find the OCR model files.
#[derive(Debug, Clone)]
pub struct OcrModelConfig {
    pub detection_model_path: PathBuf,
    pub recognition_model_path: PathBuf,
}

impl Default for OcrModelConfig {
    fn default() -> Self {
        Self::from_dir(default_model_dir())
    }
}

impl OcrModelConfig {
    /// Expects `dir` to contain `text-detection.rten` and
    /// `text-recognition.rten`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
            recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    /// Verify that both model files exist.
    pub fn validate(&self) -> Result<()> {
        for path in [&self.detection_model_path, &self.recognition_model_path] {
            if !path.exists() {
                return Err(GeoveilError::OcrError(format!(
                    "model not found at {}; run `ocrs-cli` once to download models",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// [`TextDetector`] backed by the `ocrs` engine.
///
/// Model loading is the expensive step: build one detector per process and
/// share it.
pub struct OcrTextDetector {
    engine: OcrsEngine,
}

impl OcrTextDetector {
    /// # Errors
    ///
    /// Returns [`GeoveilError::OcrError`] if model files are missing or corrupt.
    #[instrument(skip_all, fields(
        detection = %config.detection_model_path.display(),
        recognition = %config.recognition_model_path.display(),
    ))]
    pub fn new(config: OcrModelConfig) -> Result<Self> {
        config.validate()?;

        info!("Loading OCR models");
        let load = |path: &Path| {
            Model::load_file(path).map_err(|err| {
                GeoveilError::OcrError(format!(
                    "failed to load model from {}: {}",
                    path.display(),
                    err
                ))
            })
        };
        let detection_model = load(&config.detection_model_path)?;
        let recognition_model = load(&config.recognition_model_path)?;

        let engine = OcrsEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|err| GeoveilError::OcrError(format!("failed to initialise OCR engine: {}", err)))?;

        info!("OCR engine initialised");
        Ok(Self { engine })
    }

    /// Load models from the default cache directory.
    pub fn with_defaults() -> Result<Self> {
        Self::new(OcrModelConfig::default())
    }
}

impl TextDetector for OcrTextDetector {
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn detect_text(&self, image: &RgbImage) -> Result<Vec<TextRegion>> {
        let (width, height) = image.dimensions();
        let source = ImageSource::from_bytes(image.as_raw(), (width, height)).map_err(|err| {
            GeoveilError::OcrError(format!(
                "failed to create image source ({}x{}): {}",
                width, height, err
            ))
        })?;

        let input = self
            .engine
            .prepare_input(source)
            .map_err(|err| GeoveilError::OcrError(format!("OCR preprocessing failed: {}", err)))?;

        let words = self
            .engine
            .detect_words(&input)
            .map_err(|err| GeoveilError::OcrError(format!("word detection failed: {}", err)))?;
        let lines = self.engine.find_text_lines(&input, &words);
        debug!(words = words.len(), lines = lines.len(), "Text lines found");

        Ok(lines.iter().map(Vec::as_slice).map(line_region).collect())
    }
}

/// One polygon per text line, made of the corners of all its words.
fn line_region(words: &[RotatedRect]) -> TextRegion {
    let polygon = words
        .iter()
        .flat_map(|word| word.corners())
        .map(|corner| (corner.x, corner.y))
        .collect();
    TextRegion {
        polygon,
        text: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_dir() {
        let config = OcrModelConfig::from_dir("/tmp/my-models");
        assert_eq!(
            config.detection_model_path,
            PathBuf::from("/tmp/my-models/text-detection.rten")
        );
        assert_eq!(
            config.recognition_model_path,
            PathBuf::from("/tmp/my-models/text-recognition.rten")
        );
    }

    #[test]
    fn validate_missing_models() {
        let config = OcrModelConfig::from_dir("/nonexistent/path/ocr-models");
        assert!(matches!(config.validate(), Err(GeoveilError::OcrError(_))));
    }

    #[test]
    fn missing_models_fail_construction() {
        let result = OcrTextDetector::new(OcrModelConfig::from_dir("/nonexistent/ocr"));
        assert!(result.is_err());
    }
}
