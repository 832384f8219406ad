// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GeoveilError, Result};
use crate::types::{DetectionSource, RedactCategory, RedactMethod};

/// Redaction filter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactionConfig {
    /// Transform applied to masked pixels.
    pub method: RedactMethod,
    /// Gaussian kernel size. Even values are bumped to the next odd size.
    pub blur_kernel_size: u32,
    /// Downscale factor for pixelation, in `(0, 1]`.
    pub pixelate_scale: f32,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            method: RedactMethod::Blur,
            blur_kernel_size: 151,
            pixelate_scale: 0.06,
        }
    }
}

impl RedactionConfig {
    pub fn blur(kernel_size: u32) -> Self {
        Self {
            method: RedactMethod::Blur,
            blur_kernel_size: kernel_size,
            ..Self::default()
        }
    }

    pub fn pixelate(scale: f32) -> Self {
        Self {
            method: RedactMethod::Pixelate,
            pixelate_scale: scale,
            ..Self::default()
        }
    }

    /// Both parameters are checked regardless of the selected method.
    pub fn validate(&self) -> Result<()> {
        if self.blur_kernel_size == 0 {
            return Err(GeoveilError::InvalidConfig(
                "blur_kernel_size must be positive".into(),
            ));
        }
        if !(self.pixelate_scale.is_finite()
            && self.pixelate_scale > 0.0
            && self.pixelate_scale <= 1.0)
        {
            return Err(GeoveilError::InvalidConfig(format!(
                "pixelate_scale must be in (0, 1], got {}",
                self.pixelate_scale
            )));
        }
        Ok(())
    }
}

/// Box fusion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Boxes whose IOU with a cluster seed exceeds this value are merged.
    pub iou_threshold: f32,
    /// Sources whose boxes are fused before compositing.
    pub sources: Vec<DetectionSource>,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            iou_threshold: 0.2,
            sources: vec![DetectionSource::Text],
        }
    }
}

impl FusionConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(GeoveilError::InvalidConfig(format!(
                "iou_threshold must be in [0, 1], got {}",
                self.iou_threshold
            )));
        }
        Ok(())
    }

    pub fn applies_to(&self, source: DetectionSource) -> bool {
        self.sources.contains(&source)
    }
}

/// Object detector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub box_threshold: f32,
    pub text_threshold: f32,
    /// What to ask the detector for.
    pub categories: Vec<RedactCategory>,
    /// Detections whose label contains none of these are dropped.
    /// An empty list keeps everything.
    pub label_keywords: Vec<String>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            box_threshold: 0.25,
            text_threshold: 0.20,
            categories: RedactCategory::ALL.to_vec(),
            label_keywords: [
                "sign", "flag", "board", "landmark", "monument", "person", "child", "face", "head",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
        }
    }
}

impl DetectionConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("box_threshold", self.box_threshold),
            ("text_threshold", self.text_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(GeoveilError::InvalidConfig(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// OCR region filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Text boxes smaller than this many pixels are ignored.
    pub min_area: i64,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self { min_area: 4000 }
    }
}

/// Complete settings for one redaction request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub redaction: RedactionConfig,
    pub fusion: FusionConfig,
    pub detection: DetectionConfig,
    pub text: TextConfig,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        self.redaction.validate()?;
        self.fusion.validate()?;
        self.detection.validate()?;
        if self.text.min_area < 0 {
            return Err(GeoveilError::InvalidConfig(format!(
                "text.min_area must not be negative, got {}",
                self.text.min_area
            )));
        }
        Ok(())
    }

    /// Read a JSON config file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        Ok(config)
    }
}
