// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geoveil — privacy redaction for photos.
//
// Entry point. Initialises logging, parses the command line and dispatches to
// the redact, batch and config subcommands.

mod services;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use geoveil_core::human_errors::humanize_error;
use geoveil_core::{PipelineConfig, RedactMethod, Result};
use geoveil_redact::DetectionServices;

use services::{batch, box_files, config_dir, debug_output, images};

/// The geoveil CLI application.
#[derive(Parser)]
#[command(name = "geoveil")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Redact one image using detector box files.
    Redact(RedactArgs),
    /// Redact every image listed in a JSON manifest.
    Batch(BatchArgs),
    /// Print the effective configuration as JSON.
    Config(PipelineOptions),
}

/// Settings shared by every subcommand. Flags override the config file.
#[derive(Args, Debug, Clone, Default)]
struct PipelineOptions {
    /// Config file (default: $XDG_CONFIG_HOME/geoveil/config.json when present).
    #[arg(long, env = "GEOVEIL_CONFIG")]
    config: Option<PathBuf>,

    /// Redaction method ('blur' or 'pixelate').
    #[arg(long)]
    method: Option<RedactMethod>,

    /// Gaussian kernel size in pixels; even sizes are rounded up.
    #[arg(long)]
    blur_kernel: Option<u32>,

    /// Pixelate downscale factor in (0, 1].
    #[arg(long)]
    pixelate_scale: Option<f32>,

    /// IOU above which text boxes are fused.
    #[arg(long)]
    iou_threshold: Option<f32>,

    /// Run OCR text detection with models from this directory.
    #[cfg(feature = "ocr")]
    #[arg(long)]
    ocr_models: Option<PathBuf>,
}

/// Arguments for the redact subcommand.
#[derive(Args)]
struct RedactArgs {
    /// Image to redact.
    input: PathBuf,

    /// Where to write the redacted image (format from the extension).
    #[arg(short, long)]
    output: PathBuf,

    /// JSON box list file; repeat for several detectors.
    #[arg(long = "boxes", value_name = "FILE")]
    boxes: Vec<PathBuf>,

    /// Write the redaction report as JSON.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Write step-by-step debug images into this directory.
    #[arg(long)]
    debug_dir: Option<PathBuf>,

    #[command(flatten)]
    options: PipelineOptions,
}

/// Arguments for the batch subcommand.
#[derive(Args)]
struct BatchArgs {
    /// JSON array of {"input": ..., "box_lists": [...]} entries.
    manifest: PathBuf,

    /// Directory for redacted images and the batch report.
    #[arg(long)]
    output_dir: PathBuf,

    /// Images processed at once (default: available CPUs).
    #[arg(long)]
    jobs: Option<usize>,

    #[command(flatten)]
    options: PipelineOptions,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Redact(args) => run_redact(args),
        Commands::Batch(args) => run_batch(args),
        Commands::Config(options) => run_config(&options),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            let human = humanize_error(&err);
            eprintln!("error ({}): {}", human.severity, human.message);
            eprintln!("  cause: {err}");
            eprintln!("  hint: {}", human.suggestion);
            if human.retriable {
                eprintln!("  retrying may help");
            }
            ExitCode::FAILURE
        }
    }
}

/// Load the config file and apply command-line overrides.
fn effective_config(options: &PipelineOptions) -> Result<PipelineConfig> {
    let mut config = config_dir::load_config(options.config.as_deref())?;

    if let Some(method) = options.method {
        config.redaction.method = method;
    }
    if let Some(kernel) = options.blur_kernel {
        config.redaction.blur_kernel_size = kernel;
    }
    if let Some(scale) = options.pixelate_scale {
        config.redaction.pixelate_scale = scale;
    }
    if let Some(threshold) = options.iou_threshold {
        config.fusion.iou_threshold = threshold;
    }

    config.validate()?;
    Ok(config)
}

/// Detectors available to this build. Without the `ocr` feature the CLI
/// redacts from box files only.
fn detection_services(options: &PipelineOptions) -> Result<DetectionServices> {
    #[cfg(feature = "ocr")]
    if let Some(dir) = &options.ocr_models {
        use geoveil_redact::{OcrModelConfig, OcrTextDetector};
        let detector = OcrTextDetector::new(OcrModelConfig::from_dir(dir))?;
        return Ok(DetectionServices::new().with_text_detector(detector));
    }

    let _ = options;
    Ok(DetectionServices::new())
}

fn run_redact(args: RedactArgs) -> Result<ExitCode> {
    let config = effective_config(&args.options)?;
    let detectors = detection_services(&args.options)?;

    let image = images::open_rgb(&args.input)?;
    let box_lists = box_files::read_all(&args.boxes)?;
    let outcome = services::redact_with(&detectors, &image, &box_lists, &config)?;

    images::save_rgb(&outcome.image, &args.output)?;

    if let Some(path) = &args.report {
        std::fs::write(path, serde_json::to_string_pretty(&outcome.report)?)?;
    }
    if let Some(dir) = &args.debug_dir {
        debug_output::write_debug_images(dir, &image, &box_lists, &outcome)?;
    }

    println!(
        "Redacted {} pixels ({:.2}% of image) with {} -> {}",
        outcome.report.redacted_pixels,
        outcome.report.coverage * 100.0,
        outcome.report.method,
        args.output.display()
    );
    Ok(ExitCode::SUCCESS)
}

fn run_batch(args: BatchArgs) -> Result<ExitCode> {
    let config = effective_config(&args.options)?;
    let detectors = detection_services(&args.options)?;
    let items = batch::read_manifest(&args.manifest)?;
    let jobs = args.jobs.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    });

    std::fs::create_dir_all(&args.output_dir)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let summary = runtime.block_on(batch::run_batch(
        items,
        args.output_dir.clone(),
        jobs,
        Arc::new(config),
        Arc::new(detectors),
    ));

    let report_path = args.output_dir.join(batch::SUMMARY_FILE);
    std::fs::write(&report_path, serde_json::to_string_pretty(&summary)?)?;

    for result in summary.results.iter().filter(|r| r.error.is_some()) {
        eprintln!(
            "failed: {}: {}",
            result.input.display(),
            result.error.as_deref().unwrap_or_default()
        );
    }
    println!(
        "{} succeeded, {} failed (report: {})",
        summary.succeeded(),
        summary.failed(),
        report_path.display()
    );

    if summary.failed() == 0 {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn run_config(options: &PipelineOptions) -> Result<ExitCode> {
    let config = effective_config(options)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(ExitCode::SUCCESS)
}
