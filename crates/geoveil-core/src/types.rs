// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Geoveil.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::{GeoveilError, Result};

/// Unique identifier for one redaction request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// -- Boxes --------------------------------------------------------------------

/// An axis-aligned rectangle in integer pixel coordinates.
///
/// Corners are always ordered (`x1 <= x2`, `y1 <= y2`): every constructor
/// swaps inverted corners instead of rejecting them. Pixel coverage is
/// half-open, so the box covers columns `x1..x2` and rows `y1..y2`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct PixelBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl PixelBox {
    /// Build a box from two corners, normalizing their order.
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// Build a box from floating point detector output.
    ///
    /// Coordinates are truncated toward zero. Non-finite input is rejected.
    pub fn from_f64(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self> {
        if ![x1, y1, x2, y2].iter().all(|v| v.is_finite()) {
            return Err(GeoveilError::InvalidBox(format!(
                "non-finite coordinates [{x1}, {y1}, {x2}, {y2}]"
            )));
        }
        Ok(Self::new(x1 as i32, y1 as i32, x2 as i32, y2 as i32))
    }

    /// Axis-aligned hull of a polygon. Non-finite points are ignored;
    /// returns `None` when no usable point remains.
    pub fn from_polygon(points: &[(f32, f32)]) -> Option<Self> {
        let mut finite = points
            .iter()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|&(x, y)| (x as i32, y as i32));

        let (fx, fy) = finite.next()?;
        let (x1, y1, x2, y2) = finite.fold((fx, fy, fx, fy), |(x1, y1, x2, y2), (x, y)| {
            (x1.min(x), y1.min(y), x2.max(x), y2.max(y))
        });
        Some(Self { x1, y1, x2, y2 })
    }

    /// Computed in 64 bits: corners may span the whole `i32` range.
    #[inline]
    pub fn width(&self) -> i64 {
        i64::from(self.x2) - i64::from(self.x1)
    }

    #[inline]
    pub fn height(&self) -> i64 {
        i64::from(self.y2) - i64::from(self.y1)
    }

    /// Area in pixels, saturating at `i64::MAX`.
    #[inline]
    pub fn area(&self) -> i64 {
        self.width().saturating_mul(self.height())
    }

    /// True when the box covers no pixel.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.x1 == self.x2 || self.y1 == self.y2
    }

    /// True when `other` lies entirely within `self`.
    pub fn contains(&self, other: &PixelBox) -> bool {
        self.x1 <= other.x1 && self.y1 <= other.y1 && self.x2 >= other.x2 && self.y2 >= other.y2
    }

    /// Clip to the half-open image area `[0, width] x [0, height]`.
    ///
    /// A box lying fully outside the image collapses onto an edge and
    /// becomes degenerate.
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        let w = i32::try_from(width).unwrap_or(i32::MAX);
        let h = i32::try_from(height).unwrap_or(i32::MAX);
        Self {
            x1: self.x1.clamp(0, w),
            y1: self.y1.clamp(0, h),
            x2: self.x2.clamp(0, w),
            y2: self.y2.clamp(0, h),
        }
    }
}

impl fmt::Debug for PixelBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.x1, self.y1, self.x2, self.y2)
    }
}

// Accepts `{"x1":..}` objects or `[x1, y1, x2, y2]` arrays, fractional or not.
impl<'de> Deserialize<'de> for PixelBox {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawBox {
            Named { x1: f64, y1: f64, x2: f64, y2: f64 },
            Array([f64; 4]),
        }

        let [x1, y1, x2, y2] = match RawBox::deserialize(deserializer)? {
            RawBox::Named { x1, y1, x2, y2 } => [x1, y1, x2, y2],
            RawBox::Array(coords) => coords,
        };
        PixelBox::from_f64(x1, y1, x2, y2).map_err(serde::de::Error::custom)
    }
}

/// Which detector produced a box list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionSource {
    /// Zero-shot object detector (faces, signs, flags, landmarks).
    Object,
    /// OCR text regions.
    Text,
    /// Boxes supplied directly by the caller.
    #[default]
    Manual,
}

impl DetectionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Text => "text",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for DetectionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boxes produced by one detection source for one image.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoxList {
    #[serde(default)]
    pub source: DetectionSource,
    #[serde(default)]
    pub boxes: Vec<PixelBox>,
}

impl BoxList {
    pub fn new(source: DetectionSource, boxes: Vec<PixelBox>) -> Self {
        Self { source, boxes }
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

impl AsRef<[PixelBox]> for BoxList {
    fn as_ref(&self) -> &[PixelBox] {
        &self.boxes
    }
}

// -- Detector output ----------------------------------------------------------

/// A labelled box returned by the object detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub score: f32,
    pub bbox: PixelBox,
}

/// A text region returned by OCR, as a polygon in image coordinates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextRegion {
    pub polygon: Vec<(f32, f32)>,
    #[serde(default)]
    pub text: Option<String>,
}

// -- Redaction options --------------------------------------------------------

/// Visual transform applied to masked pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedactMethod {
    #[default]
    Blur,
    Pixelate,
}

impl RedactMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blur => "blur",
            Self::Pixelate => "pixelate",
        }
    }
}

impl fmt::Display for RedactMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RedactMethod {
    type Err = GeoveilError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blur" => Ok(Self::Blur),
            "pixelate" | "mosaic" => Ok(Self::Pixelate),
            other => Err(GeoveilError::InvalidConfig(format!(
                "unknown redaction method `{other}` (expected `blur` or `pixelate`)"
            ))),
        }
    }
}

/// Kinds of content a caller can ask to have redacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedactCategory {
    Faces,
    Signs,
    Flags,
    Landmarks,
}

impl RedactCategory {
    pub const ALL: [RedactCategory; 4] = [Self::Faces, Self::Signs, Self::Flags, Self::Landmarks];

    /// Text prompts sent to the object detector for this category.
    pub fn queries(&self) -> &'static [&'static str] {
        match self {
            Self::Faces => &[
                "human faces",
                "faces",
                "people faces",
                "child faces",
                "human head",
                "people head",
            ],
            Self::Signs => &["street name sign", "road name sign"],
            Self::Flags => &["flag", "country flags", "state flags"],
            Self::Landmarks => &[
                "famous landmark",
                "monument",
                "historical site",
                "tourist attraction",
            ],
        }
    }
}

impl FromStr for RedactCategory {
    type Err = GeoveilError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "face" | "faces" => Ok(Self::Faces),
            "sign" | "signs" => Ok(Self::Signs),
            "flag" | "flags" => Ok(Self::Flags),
            "landmark" | "landmarks" => Ok(Self::Landmarks),
            other => Err(GeoveilError::InvalidConfig(format!(
                "unknown redaction category `{other}`"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_normalizes_inverted_corners() {
        let b = PixelBox::new(50, 40, 10, 20);
        assert_eq!(b, PixelBox { x1: 10, y1: 20, x2: 50, y2: 40 });
        assert_eq!(b.width(), 40);
        assert_eq!(b.height(), 20);
        assert_eq!(b.area(), 800);
    }

    #[test]
    fn extreme_corners_do_not_overflow() {
        let b = PixelBox::from_f64(-3e9, -3e9, 3e9, 3e9).unwrap();
        assert_eq!(b.width(), i64::from(i32::MAX) - i64::from(i32::MIN));
        assert_eq!(b.area(), i64::MAX);
        assert_eq!(b.clamp_to(20, 10), PixelBox::new(0, 0, 20, 10));
    }

    #[test]
    fn from_f64_truncates_and_rejects_nan() {
        let b = PixelBox::from_f64(10.9, 20.2, 30.7, 40.999).unwrap();
        assert_eq!(b, PixelBox::new(10, 20, 30, 40));

        let err = PixelBox::from_f64(f64::NAN, 0.0, 1.0, 1.0).unwrap_err();
        assert!(matches!(err, GeoveilError::InvalidBox(_)));
    }

    #[test]
    fn degenerate_boxes_have_zero_area() {
        assert!(PixelBox::new(5, 5, 5, 20).is_degenerate());
        assert!(PixelBox::new(5, 5, 20, 5).is_degenerate());
        assert_eq!(PixelBox::new(5, 5, 5, 20).area(), 0);
        assert!(!PixelBox::new(5, 5, 6, 6).is_degenerate());
    }

    #[test]
    fn clamp_clips_partially_outside_boxes() {
        let b = PixelBox::new(-10, -5, 120, 50).clamp_to(100, 80);
        assert_eq!(b, PixelBox::new(0, 0, 100, 50));
    }

    #[test]
    fn clamp_collapses_fully_outside_boxes() {
        let b = PixelBox::new(150, 10, 200, 20).clamp_to(100, 80);
        assert!(b.is_degenerate());
    }

    #[test]
    fn polygon_hull() {
        let poly = [(12.5, 30.0), (80.2, 28.0), (81.0, 45.9), (11.0, 47.0)];
        assert_eq!(
            PixelBox::from_polygon(&poly),
            Some(PixelBox::new(11, 28, 81, 47))
        );
        assert_eq!(PixelBox::from_polygon(&[]), None);
        assert_eq!(PixelBox::from_polygon(&[(f32::NAN, 1.0)]), None);
    }

    #[test]
    fn deserialize_object_and_array_forms() {
        let a: PixelBox = serde_json::from_str(r#"{"x1": 1, "y1": 2, "x2": 3, "y2": 4}"#).unwrap();
        let b: PixelBox = serde_json::from_str("[3.7, 4.2, 1, 2]").unwrap();
        assert_eq!(a, PixelBox::new(1, 2, 3, 4));
        assert_eq!(b, PixelBox::new(1, 2, 3, 4));
    }

    #[test]
    fn box_list_defaults_to_manual_source() {
        let list: BoxList = serde_json::from_str(r#"{"boxes": [[0, 0, 10, 10]]}"#).unwrap();
        assert_eq!(list.source, DetectionSource::Manual);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn unknown_method_is_a_config_error() {
        assert_eq!("Pixelate".parse::<RedactMethod>().unwrap(), RedactMethod::Pixelate);
        let err = "sharpen".parse::<RedactMethod>().unwrap_err();
        assert!(matches!(err, GeoveilError::InvalidConfig(_)));
        assert!(serde_json::from_str::<RedactMethod>(r#""sharpen""#).is_err());
    }

    #[test]
    fn category_aliases() {
        assert_eq!("sign".parse::<RedactCategory>().unwrap(), RedactCategory::Signs);
        assert_eq!("FACES".parse::<RedactCategory>().unwrap(), RedactCategory::Faces);
        assert!("cars".parse::<RedactCategory>().is_err());
    }
}
