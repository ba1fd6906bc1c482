//! Metric queries over a precision/recall table.

pub mod ap;
pub mod optimal;

pub use ap::{calculate_map, class_ap, extract_ap, extract_map, mean_ap};
pub use optimal::{extract_optimal_thresholds, find_balanced_index, optimal_score_threshold};

use crate::error::Result;
use crate::params::QueryConfig;
use crate::shape::{OneOrMany, Shaped};
use crate::threshold::resolve_iou_thresholds;

/// Run `lookup` for every (threshold, class) pair, threshold-major.
///
/// All thresholds are validated before the first lookup. The first failing
/// pair aborts the batch.
pub(crate) fn query_grid<T, F>(
    classes: &OneOrMany<String>,
    iou_thresholds: &OneOrMany<f64>,
    config: &QueryConfig,
    mut lookup: F,
) -> Result<Shaped<T>>
where
    F: FnMut(&str, f64) -> Result<T>,
{
    let thresholds = resolve_iou_thresholds(iou_thresholds.as_slice(), &config.iou_grid)?;

    let mut grid = Vec::with_capacity(thresholds.len());
    for &iou_threshold in &thresholds {
        let mut per_class = Vec::with_capacity(classes.as_slice().len());
        for class in classes.as_slice() {
            per_class.push(lookup(class, iou_threshold)?);
        }
        grid.push(per_class);
    }

    Ok(Shaped::from_grid(
        grid,
        classes.is_many(),
        iou_thresholds.is_many(),
    ))
}
