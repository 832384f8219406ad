// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch redaction — many images from one manifest, processed concurrently.
//
// Each image runs on the blocking thread pool; a semaphore bounds how many
// run at once. A failing image is recorded and the rest carry on.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use geoveil_core::{BoxList, GeoveilError, PipelineConfig, Result};
use geoveil_redact::{DetectionServices, RedactionReport};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{error, info, instrument};

use super::images::{open_rgb, save_rgb};

/// Name of the summary written next to the redacted images.
pub const SUMMARY_FILE: &str = "batch_report.json";

/// One manifest entry. Relative `input` paths are resolved against the
/// manifest's directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    pub input: PathBuf,
    #[serde(default)]
    pub box_lists: Vec<BoxList>,
}

/// Outcome for one manifest entry.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub input: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<RedactionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// All results, in manifest order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub results: Vec<BatchResult>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.error.is_none()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }
}

/// Read a manifest: a JSON array of `{input, box_lists}` objects.
pub fn read_manifest(path: &Path) -> Result<Vec<BatchItem>> {
    let data = std::fs::read_to_string(path)?;
    let mut items: Vec<BatchItem> = serde_json::from_str(&data)?;

    let base = path.parent().unwrap_or(Path::new(""));
    for item in &mut items {
        if item.input.is_relative() {
            item.input = base.join(&item.input);
        }
    }
    Ok(items)
}

/// Where the redacted copy of `input` goes.
pub fn output_path(output_dir: &Path, input: &Path) -> Result<PathBuf> {
    let name = input.file_name().ok_or_else(|| {
        GeoveilError::InvalidConfig(format!("{} has no file name", input.display()))
    })?;
    Ok(output_dir.join(name))
}

/// Redact one image synchronously.
pub fn process_item(
    item: &BatchItem,
    output_dir: &Path,
    config: &PipelineConfig,
    services: &DetectionServices,
) -> Result<(PathBuf, RedactionReport)> {
    let output = output_path(output_dir, &item.input)?;
    let image = open_rgb(&item.input)?;

    let outcome = super::redact_with(services, &image, &item.box_lists, config)?;
    save_rgb(&outcome.image, &output)?;
    Ok((output, outcome.report))
}

/// Run every item with at most `jobs` images in flight.
#[instrument(skip_all, fields(items = items.len(), jobs = jobs))]
pub async fn run_batch(
    items: Vec<BatchItem>,
    output_dir: PathBuf,
    jobs: usize,
    config: Arc<PipelineConfig>,
    services: Arc<DetectionServices>,
) -> BatchSummary {
    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
    let output_dir = Arc::new(output_dir);

    let handles: Vec<_> = items
        .into_iter()
        .map(|item| {
            let semaphore = Arc::clone(&semaphore);
            let output_dir = Arc::clone(&output_dir);
            let config = Arc::clone(&config);
            let services = Arc::clone(&services);
            let input = item.input.clone();

            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| GeoveilError::Io(std::io::Error::other(e)))?;
                tokio::task::spawn_blocking(move || {
                    process_item(&item, &output_dir, &config, &services)
                })
                .await
                .map_err(|e| GeoveilError::Io(std::io::Error::other(e)))?
            });
            (input, handle)
        })
        .collect();

    let mut summary = BatchSummary::default();
    for (input, handle) in handles {
        let joined = handle
            .await
            .map_err(|e| GeoveilError::Io(std::io::Error::other(e)))
            .and_then(|result| result);

        let result = match joined {
            Ok((output, report)) => {
                info!(input = %input.display(), output = %output.display(), "Redacted");
                BatchResult {
                    input,
                    output: Some(output),
                    report: Some(report),
                    error: None,
                }
            }
            Err(e) => {
                error!(input = %input.display(), error = %e, "Redaction failed");
                BatchResult {
                    input,
                    output: None,
                    report: None,
                    error: Some(e.to_string()),
                }
            }
        };
        summary.results.push(result);
    }

    info!(
        succeeded = summary.succeeded(),
        failed = summary.failed(),
        "Batch complete"
    );
    summary
}
