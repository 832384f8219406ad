// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Redaction pipeline — box lists in, redacted image out.
//
// clamp → fuse (per source) → union_masks → redact → report

use chrono::Utc;
use geoveil_core::{BoxList, DetectionSource, FusionConfig, PipelineConfig, Result};
use image::{DynamicImage, RgbImage};
use tracing::{debug, info, instrument, warn};

use crate::detect::{
    BoxDetector, DetectionThresholds, TextDetector, build_queries, filter_detections,
    text_regions_to_boxes,
};
use crate::filter::redact;
use crate::fusion::merge_overlaps;
use crate::mask::{RedactionMask, union_masks};
use crate::report::{RedactionReport, SourceSummary};

/// Everything one pipeline run produced.
#[derive(Debug, Clone)]
pub struct RedactionOutcome {
    /// The redacted image. The caller's input is left untouched.
    pub image: RgbImage,
    pub mask: RedactionMask,
    /// Box lists after fusion, in input order.
    pub box_lists: Vec<BoxList>,
    pub report: RedactionReport,
}

/// Clip every box to the `width` x `height` image. Boxes left with no area
/// stay in their list and mark nothing.
pub fn clamp_box_lists(box_lists: &[BoxList], width: u32, height: u32) -> Vec<BoxList> {
    box_lists
        .iter()
        .map(|list| {
            let boxes = list.boxes.iter().map(|b| b.clamp_to(width, height)).collect();
            BoxList::new(list.source, boxes)
        })
        .collect()
}

/// Fuse the lists whose source is selected in `fusion`; pass the rest
/// through unchanged.
pub fn fuse_box_lists(box_lists: &[BoxList], fusion: &FusionConfig) -> Vec<BoxList> {
    box_lists
        .iter()
        .map(|list| {
            if fusion.applies_to(list.source) {
                BoxList::new(list.source, merge_overlaps(&list.boxes, fusion.iou_threshold))
            } else {
                list.clone()
            }
        })
        .collect()
}

/// Redact `image` using boxes already produced by the detectors.
///
/// # Errors
///
/// Fails fast with [`geoveil_core::GeoveilError::InvalidConfig`] on an invalid
/// configuration. Empty or degenerate box lists are not errors: they yield
/// an unmodified copy.
#[instrument(skip_all, fields(
    width = image.width(),
    height = image.height(),
    lists = box_lists.len(),
))]
pub fn redact_image(
    image: &RgbImage,
    box_lists: &[BoxList],
    config: &PipelineConfig,
) -> Result<RedactionOutcome> {
    let started_at = Utc::now();
    config.validate()?;

    let (width, height) = image.dimensions();
    let clamped = clamp_box_lists(box_lists, width, height);
    let fused = fuse_box_lists(&clamped, &config.fusion);
    let sources = box_lists
        .iter()
        .zip(&fused)
        .map(|(raw, fused)| SourceSummary {
            source: raw.source,
            raw_boxes: raw.len(),
            fused_boxes: fused.len(),
        })
        .collect();

    let mask = union_masks(width, height, &fused);
    let redacted = redact(image, &mask, &config.redaction)?;
    let report = RedactionReport::new(
        started_at,
        config.redaction.method,
        sources,
        image,
        &mask,
        &redacted,
    );

    info!(
        request_id = %report.request_id,
        redacted_pixels = report.redacted_pixels,
        coverage = report.coverage,
        "Image redacted"
    );

    Ok(RedactionOutcome {
        image: redacted,
        mask,
        box_lists: fused,
        report,
    })
}

/// [`redact_image`] for any decoded image; the input is converted to RGB8.
pub fn redact_dynamic(
    image: &DynamicImage,
    box_lists: &[BoxList],
    config: &PipelineConfig,
) -> Result<RedactionOutcome> {
    redact_image(&image.to_rgb8(), box_lists, config)
}

/// The detectors available to this process.
///
/// Built once at startup and passed by reference to every request; either
/// detector may be absent.
#[derive(Default)]
pub struct DetectionServices {
    objects: Option<Box<dyn BoxDetector>>,
    text: Option<Box<dyn TextDetector>>,
}

impl DetectionServices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object_detector(mut self, detector: impl BoxDetector + 'static) -> Self {
        self.objects = Some(Box::new(detector));
        self
    }

    pub fn with_text_detector(mut self, detector: impl TextDetector + 'static) -> Self {
        self.text = Some(Box::new(detector));
        self
    }

    pub fn has_object_detector(&self) -> bool {
        self.objects.is_some()
    }

    pub fn has_text_detector(&self) -> bool {
        self.text.is_some()
    }

    /// Run every available detector and return one box list per detector,
    /// object detections first. A missing detector yields an empty list.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn collect_box_lists(
        &self,
        image: &RgbImage,
        config: &PipelineConfig,
    ) -> Result<Vec<BoxList>> {
        let (width, height) = image.dimensions();

        let object_boxes = match &self.objects {
            Some(detector) => {
                let queries = build_queries(&config.detection.categories);
                if queries.is_empty() {
                    debug!("No categories requested; skipping object detection");
                    Vec::new()
                } else {
                    let thresholds = DetectionThresholds {
                        box_threshold: config.detection.box_threshold,
                        text_threshold: config.detection.text_threshold,
                    };
                    let detections = detector.detect_boxes(image, &queries, thresholds)?;
                    filter_detections(&detections, &config.detection.label_keywords)
                }
            }
            None => {
                warn!("No object detector configured; continuing without it");
                Vec::new()
            }
        };

        let text_boxes = match &self.text {
            Some(detector) => {
                let regions = detector.detect_text(image)?;
                text_regions_to_boxes(&regions, width, height, config.text.min_area)
            }
            None => {
                warn!("No text detector configured; continuing without OCR");
                Vec::new()
            }
        };

        debug!(
            object_boxes = object_boxes.len(),
            text_boxes = text_boxes.len(),
            "Detection complete"
        );
        Ok(vec![
            BoxList::new(DetectionSource::Object, object_boxes),
            BoxList::new(DetectionSource::Text, text_boxes),
        ])
    }

    /// Detect, then redact. `extra` lists (e.g. manual boxes) are appended
    /// to the detector output.
    pub fn process(
        &self,
        image: &RgbImage,
        extra: &[BoxList],
        config: &PipelineConfig,
    ) -> Result<RedactionOutcome> {
        config.validate()?;
        let mut box_lists = self.collect_box_lists(image, config)?;
        box_lists.extend_from_slice(extra);
        redact_image(image, &box_lists, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoveil_core::{Detection, GeoveilError, PixelBox, RedactionConfig, TextRegion};
    use image::Rgb;

    struct FixedDetector {
        detections: Vec<Detection>,
    }

    impl BoxDetector for FixedDetector {
        fn detect_boxes(
            &self,
            _image: &RgbImage,
            queries: &[String],
            _thresholds: DetectionThresholds,
        ) -> Result<Vec<Detection>> {
            assert!(queries.iter().any(|q| q == "street name sign"));
            Ok(self.detections.clone())
        }
    }

    struct FixedText(Vec<TextRegion>);

    impl TextDetector for FixedText {
        fn detect_text(&self, _image: &RgbImage) -> Result<Vec<TextRegion>> {
            Ok(self.0.clone())
        }
    }

    struct FailingText;

    impl TextDetector for FailingText {
        fn detect_text(&self, _image: &RgbImage) -> Result<Vec<TextRegion>> {
            Err(GeoveilError::OcrError("engine crashed".into()))
        }
    }

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x ^ y) % 256) as u8])
        })
    }

    fn small_blur() -> PipelineConfig {
        PipelineConfig {
            redaction: RedactionConfig::blur(5),
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn text_lists_are_fused_by_default() {
        let lists = vec![
            BoxList::new(
                DetectionSource::Text,
                vec![PixelBox::new(0, 0, 10, 10), PixelBox::new(2, 2, 12, 12)],
            ),
            BoxList::new(
                DetectionSource::Object,
                vec![PixelBox::new(0, 0, 10, 10), PixelBox::new(2, 2, 12, 12)],
            ),
        ];
        let fused = fuse_box_lists(&lists, &FusionConfig::default());
        assert_eq!(fused[0].boxes, vec![PixelBox::new(0, 0, 12, 12)]);
        assert_eq!(fused[1].boxes.len(), 2);
    }

    #[test]
    fn boxes_are_clamped_before_fusion() {
        // Unclamped, the first box barely overlaps the second (IOU ~0.005).
        // Clipped to [0, 0, 10, 10] the pair overlaps above the threshold.
        let img = gradient(20, 20);
        let lists = vec![BoxList::new(
            DetectionSource::Text,
            vec![PixelBox::new(-100, -100, 10, 10), PixelBox::new(2, 2, 12, 12)],
        )];
        let outcome = redact_image(&img, &lists, &small_blur()).unwrap();
        assert_eq!(outcome.box_lists[0].boxes, vec![PixelBox::new(0, 0, 12, 12)]);
        assert!(outcome.mask.is_redacted(11, 0));
    }

    #[test]
    fn huge_detector_coordinates_are_clipped() {
        let img = gradient(20, 20);
        let lists: Vec<BoxList> = serde_json::from_str(
            r#"[{"source": "text", "boxes": [[-3e9, 0, 3e9, 10], [-3e9, 0, 3e9, 10]]}]"#,
        )
        .unwrap();
        let outcome = redact_image(&img, &lists, &small_blur()).unwrap();
        assert_eq!(outcome.box_lists[0].boxes, vec![PixelBox::new(0, 0, 20, 10)]);
        assert_eq!(outcome.report.redacted_pixels, 200);
    }

    #[test]
    fn report_counts_raw_and_fused_boxes() {
        let img = gradient(40, 40);
        let lists = vec![BoxList::new(
            DetectionSource::Text,
            vec![PixelBox::new(0, 0, 10, 10), PixelBox::new(2, 2, 12, 12)],
        )];
        let outcome = redact_image(&img, &lists, &small_blur()).unwrap();
        assert_eq!(
            outcome.report.sources,
            vec![SourceSummary {
                source: DetectionSource::Text,
                raw_boxes: 2,
                fused_boxes: 1,
            }]
        );
        assert_eq!(outcome.report.redacted_pixels, 144);
        assert!(outcome.report.changed());
    }

    #[test]
    fn invalid_config_fails_fast() {
        let img = gradient(10, 10);
        let config = PipelineConfig {
            redaction: RedactionConfig::blur(0),
            ..PipelineConfig::default()
        };
        assert!(matches!(
            redact_image(&img, &[], &config),
            Err(GeoveilError::InvalidConfig(_))
        ));
    }

    #[test]
    fn dynamic_images_are_converted() {
        let img = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            12,
            8,
            image::Rgba([9, 8, 7, 255]),
        ));
        let outcome = redact_dynamic(&img, &[], &small_blur()).unwrap();
        assert_eq!(outcome.image.dimensions(), (12, 8));
        assert_eq!(*outcome.image.get_pixel(0, 0), Rgb([9, 8, 7]));
    }

    #[test]
    fn services_run_both_detectors() {
        let detector = FixedDetector {
            detections: vec![
                Detection {
                    label: "street name sign".into(),
                    score: 0.9,
                    bbox: PixelBox::new(5, 5, 20, 20),
                },
                Detection {
                    label: "tree".into(),
                    score: 0.8,
                    bbox: PixelBox::new(30, 30, 40, 40),
                },
            ],
        };
        let text = FixedText(vec![TextRegion {
            polygon: vec![(40.0, 0.0), (100.0, 0.0), (100.0, 70.0), (40.0, 70.0)],
            text: Some("MAIN ST".into()),
        }]);
        let services = DetectionServices::new()
            .with_object_detector(detector)
            .with_text_detector(text);

        let img = gradient(100, 100);
        let lists = services
            .collect_box_lists(&img, &PipelineConfig::default())
            .unwrap();
        assert_eq!(lists[0].source, DetectionSource::Object);
        assert_eq!(lists[0].boxes, vec![PixelBox::new(5, 5, 20, 20)]);
        assert_eq!(lists[1].source, DetectionSource::Text);
        assert_eq!(lists[1].boxes, vec![PixelBox::new(40, 0, 99, 70)]);
    }

    #[test]
    fn services_without_detectors_use_extra_boxes_only() {
        let services = DetectionServices::new();
        assert!(!services.has_object_detector());
        assert!(!services.has_text_detector());

        let img = gradient(30, 30);
        let manual = [BoxList::new(DetectionSource::Manual, vec![PixelBox::new(0, 0, 5, 5)])];
        let outcome = services.process(&img, &manual, &small_blur()).unwrap();
        assert_eq!(outcome.report.redacted_pixels, 25);
        assert_eq!(outcome.box_lists.len(), 3);
    }

    #[test]
    fn detector_errors_propagate() {
        let services = DetectionServices::new().with_text_detector(FailingText);
        let img = gradient(10, 10);
        assert!(matches!(
            services.process(&img, &[], &small_blur()),
            Err(GeoveilError::OcrError(_))
        ));
    }
}
