//! Error types for the coco-metrics library.

use thiserror::Error;

/// Result type for coco-metrics operations.
pub type Result<T> = std::result::Result<T, CocoMetricsError>;

/// Error types that can occur while normalizing datasets or querying a metrics table.
#[derive(Error, Debug)]
pub enum CocoMetricsError {
    /// Error during JSON parsing or serialization.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error during I/O operations.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error raised by polars while reading a metrics frame.
    #[error("Polars error: {0}")]
    PolarsError(#[from] polars::prelude::PolarsError),

    /// Requested IoU threshold is not on the configured grid.
    #[error("Invalid IoU threshold: {0} is not on the IoU grid")]
    InvalidThreshold(f64),

    /// The table has zero or several rows for a single key.
    #[error("Expected exactly one row for class '{class}' at IoU {iou_threshold}, found {matches}")]
    AmbiguousOrMissingRow {
        class: String,
        iou_threshold: f64,
        matches: usize,
    },

    /// No class rows match the area/maxDet/IoU filter.
    #[error("No rows match IoU threshold {iou_threshold}")]
    NoMatchingRows { iou_threshold: f64 },

    /// The precision/recall curve has no usable point.
    #[error("No optimal score threshold for class '{class}' at IoU {iou_threshold}")]
    NoOptimalThreshold { class: String, iou_threshold: f64 },

    /// Recall and precision sequences of one row differ in length.
    #[error("Curve length mismatch for class '{class}': recall has {recall} points, precision has {precision}")]
    CurveLengthMismatch {
        class: String,
        recall: usize,
        precision: usize,
    },

    /// A curve is not index-aligned with the score-threshold grid.
    #[error("Curve has {curve} points but the score grid has {grid}")]
    ScoreGridMismatch { curve: usize, grid: usize },

    /// Invalid annotation data.
    #[error("Invalid annotation: {0}")]
    InvalidAnnotation(String),

    /// Missing required field in COCO format.
    #[error("Missing field: {0}")]
    MissingField(String),

    /// Empty dataset provided.
    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    /// Category id that a mapping refers to but the category list does not define.
    #[error("Unknown category id: {0}")]
    UnknownCategory(u64),

    /// Required column missing from a metrics frame.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Metrics frame has an unexpected shape or type.
    #[error("Invalid data frame: {0}")]
    InvalidDataFrame(String),
}
