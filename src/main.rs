//! coco-metrics CLI - taxonomy correction and metric reports.
//!
//! # Usage
//!
//! ```bash
//! # Remap ground truth onto the canonical classes
//! coco-metrics correct-annotations --coco-file instances.json --out-file gt.json
//!
//! # Remap detector output the same way
//! coco-metrics correct-detections --coco-file detections.json --out-file dt.json
//!
//! # Per-class AP, mAP and optimal score thresholds from an evaluator table
//! coco-metrics report --metrics metrics.json --iou 0.5 --iou 0.75
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use coco_metrics::loader::{
    load_detections_from_file, load_from_file, load_metrics_table_from_file,
    load_taxonomy_from_file, save_dataset, save_detections,
};
use coco_metrics::report::Report;
use coco_metrics::{remap_annotations, remap_detections, EvalParams, QueryEngine, Taxonomy};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Post-process COCO detection evaluation results.
#[derive(Parser)]
#[command(name = "coco-metrics", version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Remap a ground-truth annotation file onto the canonical categories
    CorrectAnnotations {
        /// Input COCO annotation file
        #[arg(short = 'c', long = "coco-file", alias = "coco")]
        coco_file: PathBuf,

        /// Output file
        #[arg(short = 'o', long = "out-file", alias = "out")]
        out_file: PathBuf,

        /// Taxonomy file (categories + raw-to-canonical mapping)
        #[arg(long)]
        mapping: Option<PathBuf>,
    },

    /// Remap a detector result list onto the canonical categories
    CorrectDetections {
        /// Input detection list
        #[arg(short = 'c', long = "coco-file", alias = "coco")]
        coco_file: PathBuf,

        /// Output file
        #[arg(short = 'o', long = "out-file", alias = "out")]
        out_file: PathBuf,

        /// Taxonomy file (only its mapping is used)
        #[arg(long)]
        mapping: Option<PathBuf>,
    },

    /// Print per-class AP, mAP and optimal score thresholds
    Report {
        /// Metrics table (JSON row records)
        #[arg(short, long)]
        metrics: PathBuf,

        /// Evaluator parameters (IoU grid and score grid)
        #[arg(long)]
        params: Option<PathBuf>,

        /// Classes to report, comma separated (default: every class in the table)
        #[arg(long, value_delimiter = ',')]
        classes: Vec<String>,

        /// IoU thresholds to report
        #[arg(long = "iou", default_value = "0.5")]
        iou_thresholds: Vec<f64>,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::CorrectAnnotations {
            coco_file,
            out_file,
            mapping,
        } => correct_annotations(&coco_file, &out_file, mapping.as_deref()),
        Command::CorrectDetections {
            coco_file,
            out_file,
            mapping,
        } => correct_detections(&coco_file, &out_file, mapping.as_deref()),
        Command::Report {
            metrics,
            params,
            classes,
            iou_thresholds,
            json,
        } => report(&metrics, params.as_deref(), classes, iou_thresholds, json),
    }
}

fn load_taxonomy(path: Option<&Path>, fallback: Taxonomy) -> Result<Taxonomy> {
    match path {
        Some(path) => load_taxonomy_from_file(path)
            .with_context(|| format!("Failed to read taxonomy {}", path.display())),
        None => Ok(fallback),
    }
}

fn correct_annotations(coco_file: &Path, out_file: &Path, mapping: Option<&Path>) -> Result<()> {
    let taxonomy = load_taxonomy(mapping, Taxonomy::annotation_default())?;
    let dataset = load_from_file(coco_file)
        .with_context(|| format!("Failed to load annotations {}", coco_file.display()))?;

    let (dataset, stats) = remap_annotations(dataset, &taxonomy)?;
    stats.log_summary("annotations");

    save_dataset(out_file, &dataset)
        .with_context(|| format!("Failed to write {}", out_file.display()))?;
    info!(out = %out_file.display(), "wrote corrected annotations");
    Ok(())
}

fn correct_detections(coco_file: &Path, out_file: &Path, mapping: Option<&Path>) -> Result<()> {
    let taxonomy = load_taxonomy(mapping, Taxonomy::detection_default())?;
    let detections = load_detections_from_file(coco_file)
        .with_context(|| format!("Failed to load detections {}", coco_file.display()))?;

    let (detections, stats) = remap_detections(detections, &taxonomy.mapping);
    stats.log_summary("detections");

    save_detections(out_file, &detections)
        .with_context(|| format!("Failed to write {}", out_file.display()))?;
    info!(out = %out_file.display(), "wrote corrected detections");
    Ok(())
}

fn report(
    metrics: &Path,
    params: Option<&Path>,
    classes: Vec<String>,
    iou_thresholds: Vec<f64>,
    json: bool,
) -> Result<()> {
    let table = load_metrics_table_from_file(metrics)
        .with_context(|| format!("Failed to load metrics table {}", metrics.display()))?;
    let params = match params {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("Failed to open params {}", path.display()))?;
            serde_json::from_reader::<_, EvalParams>(std::io::BufReader::new(file))
                .with_context(|| format!("Failed to parse params {}", path.display()))?
        }
        None => EvalParams::default(),
    };
    let engine = QueryEngine::from_params(&table, &params);

    let classes = if classes.is_empty() {
        table.classes().into_iter().map(str::to_string).collect()
    } else {
        classes
    };
    info!(classes = classes.len(), rows = table.len(), "building report");

    let report = Report::build(&engine, classes, iou_thresholds)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.to_text());
    }
    Ok(())
}
