//! Optimal confidence-score threshold search.
//!
//! The optimal score threshold of a class is the cutoff at which its recall and
//! precision curves cross, or come closest to crossing.

use crate::error::{CocoMetricsError, Result};
use crate::metrics::query_grid;
use crate::params::QueryConfig;
use crate::shape::{OneOrMany, Shaped};
use crate::table::MetricsTable;
use crate::threshold::resolve_iou_threshold;
use tracing::{debug, instrument};

/// Gaps at or above this value never qualify. Valid curves stay within [0, 1].
const MAX_CURVE_GAP: f64 = 2.0;

/// Index of the point where `|recall - precision|` is smallest.
///
/// The scan keeps the first index on ties. Points whose gap is NaN or at
/// least 2 never qualify, so an empty or degenerate curve yields `None`.
///
/// # Example
///
/// ```
/// use coco_metrics::metrics::find_balanced_index;
///
/// let recall = [1.0, 0.8, 0.5, 0.2];
/// let precision = [0.2, 0.5, 0.8, 1.0];
/// assert_eq!(find_balanced_index(&recall, &precision), Some(1));
/// assert_eq!(find_balanced_index(&[], &[]), None);
/// ```
pub fn find_balanced_index(recall: &[f64], precision: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    let mut best_gap = MAX_CURVE_GAP;

    for (i, (r, p)) in recall.iter().zip(precision).enumerate() {
        let gap = (r - p).abs();
        if gap < best_gap {
            best_gap = gap;
            best = Some(i);
        }
    }

    best
}

/// Optimal score threshold of one class at one IoU threshold.
///
/// `score_grid[i]` is the confidence cutoff that produced point `i` of every
/// curve in the table.
///
/// # Errors
///
/// * `InvalidThreshold` if `iou_threshold` is not on the configured grid
/// * `AmbiguousOrMissingRow` if the table does not hold exactly one row for the key
/// * `NoOptimalThreshold` if no point of the curve qualifies (an empty curve included)
/// * `ScoreGridMismatch` if the row's curve and the grid differ in length
pub fn optimal_score_threshold(
    table: &MetricsTable,
    class: &str,
    iou_threshold: f64,
    score_grid: &[f64],
    config: &QueryConfig,
) -> Result<f64> {
    let iou_threshold = resolve_iou_threshold(iou_threshold, &config.iou_grid)?;
    let row = table.find_row(config, class, iou_threshold)?;

    let index = find_balanced_index(&row.recall, &row.precision).ok_or_else(|| {
        CocoMetricsError::NoOptimalThreshold {
            class: class.to_string(),
            iou_threshold,
        }
    })?;

    if row.recall.len() != score_grid.len() {
        return Err(CocoMetricsError::ScoreGridMismatch {
            curve: row.recall.len(),
            grid: score_grid.len(),
        });
    }

    debug!(class, iou_threshold, index, "balanced point found");
    Ok(score_grid[index])
}

/// Optimal score thresholds for one or many classes at one or many IoU thresholds.
///
/// Shaped like [`crate::metrics::extract_ap`].
#[instrument(level = "debug", skip_all, fields(grid_len = score_grid.len()))]
pub fn extract_optimal_thresholds(
    table: &MetricsTable,
    classes: impl Into<OneOrMany<String>>,
    iou_thresholds: impl Into<OneOrMany<f64>>,
    score_grid: &[f64],
    config: &QueryConfig,
) -> Result<Shaped<f64>> {
    let classes = classes.into();
    let iou_thresholds = iou_thresholds.into();

    query_grid(&classes, &iou_thresholds, config, |class, iou_threshold| {
        optimal_score_threshold(table, class, iou_threshold, score_grid, config)
    })
}
