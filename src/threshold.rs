//! IoU and score threshold validation.

use crate::error::{CocoMetricsError, Result};
use crate::params::IOU_EPSILON;

/// Check whether two IoU thresholds denote the same grid point.
pub fn iou_matches(a: f64, b: f64) -> bool {
    (a - b).abs() < IOU_EPSILON
}

/// Resolve a requested IoU threshold against the grid.
///
/// Returns the grid value the request denotes, so later row lookups compare
/// against the exact value the table was built with. A request matches a grid
/// point when it lies within [`IOU_EPSILON`] (1e-9) of it; this absorbs
/// floating-point drift only, so `0.5000005` is rejected.
///
/// # Errors
///
/// Returns `InvalidThreshold` if the value is not on the grid. Off-grid values
/// are never snapped to the nearest grid point.
///
/// # Example
///
/// ```
/// use coco_metrics::params::default_iou_grid;
/// use coco_metrics::threshold::resolve_iou_threshold;
///
/// let grid = default_iou_grid();
/// assert_eq!(resolve_iou_threshold(0.75, &grid).unwrap(), 0.75);
/// assert!(resolve_iou_threshold(0.52, &grid).is_err());
/// ```
pub fn resolve_iou_threshold(value: f64, grid: &[f64]) -> Result<f64> {
    grid.iter()
        .copied()
        .find(|&g| iou_matches(g, value))
        .ok_or(CocoMetricsError::InvalidThreshold(value))
}

/// Resolve every requested IoU threshold, failing on the first off-grid value.
pub fn resolve_iou_thresholds(values: &[f64], grid: &[f64]) -> Result<Vec<f64>> {
    values
        .iter()
        .map(|&v| resolve_iou_threshold(v, grid))
        .collect()
}

/// Validate a score-threshold grid: values in [0.0, 1.0], non-decreasing.
pub fn validate_score_grid(grid: &[f64]) -> Result<()> {
    if let Some(&bad) = grid.iter().find(|t| !(0.0..=1.0).contains(*t)) {
        return Err(CocoMetricsError::InvalidThreshold(bad));
    }
    if let Some(pair) = grid.windows(2).find(|w| w[1] < w[0]) {
        return Err(CocoMetricsError::InvalidThreshold(pair[1]));
    }
    Ok(())
}
