//! JSON loading and saving for COCO datasets, detector output and metrics tables.

use crate::error::{CocoMetricsError, Result};
use crate::table::MetricsTable;
use crate::taxonomy::Taxonomy;
use crate::types::{CocoDataset, Detection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path = path.as_ref();
    debug!(path = %path.display(), "reading JSON");
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

fn write_json<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    debug!(path = %path.display(), "writing JSON");
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// Load a COCO dataset from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if the dataset
/// fails validation.
///
/// # Example
///
/// ```no_run
/// use coco_metrics::loader::load_from_file;
///
/// let dataset = load_from_file("annotations.json").unwrap();
/// println!("Loaded {} annotations", dataset.annotations.len());
/// ```
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<CocoDataset> {
    let dataset: CocoDataset = read_json(path)?;
    validate_dataset(&dataset)?;
    Ok(dataset)
}

/// Load a COCO dataset from a JSON string.
///
/// # Example
///
/// ```
/// use coco_metrics::loader::load_from_string;
///
/// let json = r#"{
///     "annotations": [],
///     "categories": [{"id": 1, "name": "person"}]
/// }"#;
/// let dataset = load_from_string(json).unwrap();
/// assert!(dataset.images.is_empty());
/// ```
pub fn load_from_string(json_str: &str) -> Result<CocoDataset> {
    let dataset: CocoDataset = serde_json::from_str(json_str)?;
    validate_dataset(&dataset)?;
    Ok(dataset)
}

/// Load a detector result list (a bare JSON array) from a file.
pub fn load_detections_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<Detection>> {
    let detections: Vec<Detection> = read_json(path)?;
    validate_detections(&detections)?;
    Ok(detections)
}

/// Load a detector result list from a JSON string.
pub fn load_detections_from_string(json_str: &str) -> Result<Vec<Detection>> {
    let detections: Vec<Detection> = serde_json::from_str(json_str)?;
    validate_detections(&detections)?;
    Ok(detections)
}

/// Load a metrics table stored as a JSON list of row records.
pub fn load_metrics_table_from_file<P: AsRef<Path>>(path: P) -> Result<MetricsTable> {
    read_json(path)
}

/// Load a metrics table from a JSON string.
///
/// ```
/// use coco_metrics::loader::load_metrics_table_from_string;
///
/// let table = load_metrics_table_from_string(r#"[
///     {"class": "Person", "area": "custom", "maxDet": 100, "iouThr": 0.5,
///      "AP": 0.8, "recall": [1.0, 0.5], "precision": [0.5, 1.0]}
/// ]"#).unwrap();
/// assert_eq!(table.len(), 1);
/// ```
pub fn load_metrics_table_from_string(json_str: &str) -> Result<MetricsTable> {
    Ok(serde_json::from_str(json_str)?)
}

/// Load a taxonomy (canonical categories plus raw-to-canonical mapping) file.
pub fn load_taxonomy_from_file<P: AsRef<Path>>(path: P) -> Result<Taxonomy> {
    read_json(path)
}

/// Write a COCO dataset as JSON.
pub fn save_dataset<P: AsRef<Path>>(path: P, dataset: &CocoDataset) -> Result<()> {
    write_json(path, dataset)
}

/// Write a detector result list as JSON.
pub fn save_detections<P: AsRef<Path>>(path: P, detections: &[Detection]) -> Result<()> {
    write_json(path, &detections)
}

/// Validate that a COCO dataset has the required structure.
fn validate_dataset(dataset: &CocoDataset) -> Result<()> {
    if dataset.categories.is_empty() {
        return Err(CocoMetricsError::EmptyDataset(
            "Dataset must contain at least one category".to_string(),
        ));
    }

    for annotation in &dataset.annotations {
        validate_bbox(&annotation.bbox, &format!("Annotation {}", annotation.id))?;
    }

    Ok(())
}

fn validate_detections(detections: &[Detection]) -> Result<()> {
    for (index, detection) in detections.iter().enumerate() {
        validate_bbox(&detection.bbox, &format!("Detection #{index}"))?;
    }
    Ok(())
}

fn validate_bbox(bbox: &[f64], owner: &str) -> Result<()> {
    if bbox.len() != 4 {
        return Err(CocoMetricsError::InvalidAnnotation(format!(
            "{owner} has invalid bbox length: {}",
            bbox.len()
        )));
    }
    if bbox[2] < 0.0 || bbox[3] < 0.0 {
        return Err(CocoMetricsError::InvalidAnnotation(format!(
            "{owner} has negative dimensions"
        )));
    }
    Ok(())
}
