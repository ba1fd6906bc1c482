//! Conversion of Polars DataFrames into metrics tables
//!
//! Evaluators commonly hand back their per-class precision/recall results as a
//! data frame. This module validates such a frame and turns it into a
//! [`MetricsTable`].

use crate::error::CocoMetricsError;
use crate::table::{MetricsRow, MetricsTable};
use polars::prelude::*;

/// Columns a metrics frame must carry.
pub const METRICS_COLUMNS: [&str; 7] = [
    "class", "area", "maxDet", "iouThr", "AP", "recall", "precision",
];

fn series<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series, CocoMetricsError> {
    Ok(df.column(name)?.as_materialized_series())
}

/// Validate that a DataFrame contains all required columns
///
/// # Arguments
///
/// * `df` - The DataFrame to validate
/// * `required_columns` - Slice of required column names
///
/// # Returns
///
/// `Ok(())` if all columns are present, error otherwise
pub fn validate_columns(df: &DataFrame, required_columns: &[&str]) -> Result<(), CocoMetricsError> {
    let column_names: Vec<String> = df.get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    for col in required_columns {
        if !column_names.iter().any(|c| c == col) {
            return Err(CocoMetricsError::MissingColumn(col.to_string()));
        }
    }

    Ok(())
}

/// Validate the schema of a metrics DataFrame
///
/// Expected columns: class, area, maxDet, iouThr, AP, recall, precision
pub fn validate_metrics_schema(df: &DataFrame) -> Result<(), CocoMetricsError> {
    validate_columns(df, &METRICS_COLUMNS)?;

    for name in ["class", "area"] {
        let dtype = series(df, name)?.dtype();
        if !matches!(dtype, DataType::String) {
            return Err(CocoMetricsError::InvalidDataFrame(
                format!("{} must be String, got {:?}", name, dtype)
            ));
        }
    }

    let max_det_dtype = series(df, "maxDet")?.dtype();
    if !matches!(max_det_dtype, DataType::Int64 | DataType::Int32 | DataType::UInt64 | DataType::UInt32) {
        return Err(CocoMetricsError::InvalidDataFrame(
            format!("maxDet must be integer type, got {:?}", max_det_dtype)
        ));
    }

    for name in ["iouThr", "AP"] {
        let dtype = series(df, name)?.dtype();
        if !matches!(dtype, DataType::Float64 | DataType::Float32) {
            return Err(CocoMetricsError::InvalidDataFrame(
                format!("{} must be Float64 or Float32, got {:?}", name, dtype)
            ));
        }
    }

    for name in ["recall", "precision"] {
        let dtype = series(df, name)?.dtype();
        if !matches!(dtype, DataType::List(_)) {
            return Err(CocoMetricsError::InvalidDataFrame(
                format!("{} must be of List type, got {:?}", name, dtype)
            ));
        }
    }

    Ok(())
}

/// Extract one precision or recall curve from a List Series at a given index
///
/// Null entries inside the curve become NaN, which the threshold search never
/// selects. A null curve is an empty curve.
pub fn extract_curve_from_series(curve_series: &Series, idx: usize) -> Result<Vec<f64>, CocoMetricsError> {
    let list_ca = curve_series.list()?;
    let Some(curve) = list_ca.get_as_series(idx) else {
        return Ok(Vec::new());
    };

    let curve = curve.cast(&DataType::Float64)?;
    let values = curve.f64()?;
    Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

/// Build a [`MetricsTable`] from a metrics DataFrame
///
/// Null AP values are read as "undefined", as are the negative AP sentinels
/// COCO tooling writes for classes without ground truth.
pub fn metrics_table_from_dataframe(df: &DataFrame) -> Result<MetricsTable, CocoMetricsError> {
    validate_metrics_schema(df)?;

    let classes = series(df, "class")?.str()?;
    let areas = series(df, "area")?.str()?;
    let max_dets = series(df, "maxDet")?.cast(&DataType::Int64)?;
    let max_dets = max_dets.i64()?;
    let ious = series(df, "iouThr")?.cast(&DataType::Float64)?;
    let ious = ious.f64()?;
    let aps = series(df, "AP")?.cast(&DataType::Float64)?;
    let aps = aps.f64()?;
    let recalls = series(df, "recall")?;
    let precisions = series(df, "precision")?;

    let mut rows = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let class = classes.get(idx).ok_or_else(|| null_cell("class", idx))?;
        let area = areas.get(idx).ok_or_else(|| null_cell("area", idx))?;
        let max_det = max_dets.get(idx).ok_or_else(|| null_cell("maxDet", idx))?;
        let max_det = u32::try_from(max_det).map_err(|_| {
            CocoMetricsError::InvalidDataFrame(format!("maxDet out of range at row {}: {}", idx, max_det))
        })?;
        let iou_threshold = ious.get(idx).ok_or_else(|| null_cell("iouThr", idx))?;

        rows.push(MetricsRow::new(
            class,
            area,
            max_det,
            iou_threshold,
            aps.get(idx),
            extract_curve_from_series(recalls, idx)?,
            extract_curve_from_series(precisions, idx)?,
        ));
    }

    MetricsTable::new(rows)
}

fn null_cell(column: &str, idx: usize) -> CocoMetricsError {
    CocoMetricsError::InvalidDataFrame(format!("{} is null at row {}", column, idx))
}
