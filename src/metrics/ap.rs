//! Average Precision (AP) and mean Average Precision (mAP) extraction.

use crate::error::{CocoMetricsError, Result};
use crate::metrics::query_grid;
use crate::params::QueryConfig;
use crate::shape::{OneOrMany, Shaped};
use crate::table::MetricsTable;
use crate::threshold::{resolve_iou_threshold, resolve_iou_thresholds};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Calculate mean Average Precision (mAP) across multiple classes.
///
/// Returns `None` for an empty slice.
///
/// # Example
///
/// ```
/// use coco_metrics::metrics::ap::calculate_map;
///
/// let class_aps = vec![0.8, 0.9, 0.75, 0.85];
/// let map = calculate_map(&class_aps).unwrap();
/// assert!((map - 0.825).abs() < 1e-10);
/// assert!(calculate_map(&[]).is_none());
/// ```
pub fn calculate_map(class_aps: &[f64]) -> Option<f64> {
    if class_aps.is_empty() {
        return None;
    }

    Some(class_aps.iter().sum::<f64>() / class_aps.len() as f64)
}

/// AP of one class at one IoU threshold.
///
/// `None` means the AP is undefined (the class has no ground truth in the
/// evaluated bucket).
///
/// # Errors
///
/// * `InvalidThreshold` if `iou_threshold` is not on the configured grid
/// * `AmbiguousOrMissingRow` if the table does not hold exactly one row for the key
pub fn class_ap(
    table: &MetricsTable,
    class: &str,
    iou_threshold: f64,
    config: &QueryConfig,
) -> Result<Option<f64>> {
    let iou_threshold = resolve_iou_threshold(iou_threshold, &config.iou_grid)?;
    Ok(table.find_row(config, class, iou_threshold)?.ap)
}

/// mAP over every class row at one IoU threshold.
///
/// Classes whose AP is undefined are left out of the mean rather than counted
/// as zero. `None` when every matching class is undefined.
///
/// # Errors
///
/// * `InvalidThreshold` if `iou_threshold` is not on the configured grid
/// * `NoMatchingRows` if no row passes the area/maxDet/IoU filter
/// * `AmbiguousOrMissingRow` if a class appears more than once at the threshold
pub fn mean_ap(
    table: &MetricsTable,
    iou_threshold: f64,
    config: &QueryConfig,
) -> Result<Option<f64>> {
    let iou_threshold = resolve_iou_threshold(iou_threshold, &config.iou_grid)?;

    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut defined = Vec::new();
    for row in table.rows_at(config, iou_threshold) {
        *seen.entry(row.class.as_str()).or_insert(0) += 1;
        if let Some(ap) = row.ap {
            defined.push(ap);
        }
    }

    if seen.is_empty() {
        return Err(CocoMetricsError::NoMatchingRows { iou_threshold });
    }
    if let Some((class, &matches)) = seen.iter().find(|(_, &n)| n > 1) {
        return Err(CocoMetricsError::AmbiguousOrMissingRow {
            class: class.to_string(),
            iou_threshold,
            matches,
        });
    }

    let skipped = seen.len() - defined.len();
    if skipped > 0 {
        debug!(iou_threshold, skipped, "excluding classes with undefined AP from mAP");
    }

    Ok(calculate_map(&defined))
}

/// Per-class AP for one or many classes at one or many IoU thresholds.
///
/// The result is shaped after the arguments (see [`crate::shape`]):
/// threshold-major, class-minor when both are lists. Undefined APs come back
/// as `None` without failing the rest of the batch.
///
/// # Example
///
/// ```
/// use coco_metrics::metrics::extract_ap;
/// use coco_metrics::params::QueryConfig;
/// use coco_metrics::table::{MetricsRow, MetricsTable};
///
/// let table = MetricsTable::new(vec![
///     MetricsRow::new("Person", "custom", 100, 0.5, Some(0.8), vec![], vec![]),
///     MetricsRow::new("Car", "custom", 100, 0.5, None, vec![], vec![]),
/// ]).unwrap();
/// let config = QueryConfig::default();
///
/// let person = extract_ap(&table, "Person", 0.5, &config).unwrap();
/// assert_eq!(person.into_scalar(), Some(Some(0.8)));
///
/// let both = extract_ap(&table, ["Person", "Car"], 0.5, &config).unwrap();
/// assert_eq!(both.into_vec(), Some(vec![Some(0.8), None]));
/// ```
#[instrument(level = "debug", skip_all)]
pub fn extract_ap(
    table: &MetricsTable,
    classes: impl Into<OneOrMany<String>>,
    iou_thresholds: impl Into<OneOrMany<f64>>,
    config: &QueryConfig,
) -> Result<Shaped<Option<f64>>> {
    let classes = classes.into();
    let iou_thresholds = iou_thresholds.into();
    debug!(?classes, ?iou_thresholds, "extracting per-class AP");

    query_grid(&classes, &iou_thresholds, config, |class, iou_threshold| {
        class_ap(table, class, iou_threshold, config)
    })
}

/// mAP at one or many IoU thresholds, shaped after the threshold argument.
#[instrument(level = "debug", skip_all)]
pub fn extract_map(
    table: &MetricsTable,
    iou_thresholds: impl Into<OneOrMany<f64>>,
    config: &QueryConfig,
) -> Result<Shaped<Option<f64>>> {
    let iou_thresholds = iou_thresholds.into();
    debug!(?iou_thresholds, "extracting mAP");

    let thresholds = resolve_iou_thresholds(iou_thresholds.as_slice(), &config.iou_grid)?;
    let maps = thresholds
        .iter()
        .map(|&iou_threshold| mean_ap(table, iou_threshold, config))
        .collect::<Result<Vec<Option<f64>>>>()?;

    Ok(Shaped::from_values(maps, iou_thresholds.is_many()))
}
