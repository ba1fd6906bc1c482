//! Precision/recall metrics table.
//!
//! A table holds one row per `(class, area, maxDet, iouThr)` key as produced by
//! the evaluator. Rows are kept in the order they were supplied; lookups are
//! linear scans, which is plenty for tables of a few thousand rows.

use crate::error::{CocoMetricsError, Result};
use crate::params::QueryConfig;
use crate::threshold::iou_matches;
use serde::{Deserialize, Deserializer, Serialize};

/// One row of the metrics table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRow {
    pub class: String,
    pub area: String,
    #[serde(rename = "maxDet")]
    pub max_det: u32,
    #[serde(rename = "iouThr")]
    pub iou_threshold: f64,
    /// Average precision, `None` when the class has no ground truth.
    #[serde(rename = "AP", default, deserialize_with = "deserialize_ap")]
    pub ap: Option<f64>,
    pub recall: Vec<f64>,
    pub precision: Vec<f64>,
}

impl MetricsRow {
    pub fn new(
        class: impl Into<String>,
        area: impl Into<String>,
        max_det: u32,
        iou_threshold: f64,
        ap: Option<f64>,
        recall: Vec<f64>,
        precision: Vec<f64>,
    ) -> Self {
        Self {
            class: class.into(),
            area: area.into(),
            max_det,
            iou_threshold,
            ap: normalize_ap(ap),
            recall,
            precision,
        }
    }

    /// Whether the row passes the configured area/maxDet filter at `iou_threshold`.
    pub fn matches(&self, config: &QueryConfig, iou_threshold: f64) -> bool {
        self.area == config.area_label
            && self.max_det == config.max_det
            && iou_matches(self.iou_threshold, iou_threshold)
    }
}

/// COCO marks "no ground truth" with -1; pandas with NaN. Both become `None`.
fn normalize_ap(ap: Option<f64>) -> Option<f64> {
    ap.filter(|v| v.is_finite() && *v >= 0.0)
}

fn deserialize_ap<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let ap = Option::<f64>::deserialize(deserializer)?;
    Ok(normalize_ap(ap))
}

/// Immutable table of precision/recall rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<MetricsRow>", into = "Vec<MetricsRow>")]
pub struct MetricsTable {
    rows: Vec<MetricsRow>,
}

impl MetricsTable {
    /// Build a table, checking that every row's curves have matching lengths.
    ///
    /// Duplicate keys are accepted here; they are reported by the lookups that
    /// hit them.
    pub fn new(rows: Vec<MetricsRow>) -> Result<Self> {
        for row in &rows {
            if row.recall.len() != row.precision.len() {
                return Err(CocoMetricsError::CurveLengthMismatch {
                    class: row.class.clone(),
                    recall: row.recall.len(),
                    precision: row.precision.len(),
                });
            }
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[MetricsRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct class labels in first-seen order.
    pub fn classes(&self) -> Vec<&str> {
        let mut classes: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !classes.contains(&row.class.as_str()) {
                classes.push(&row.class);
            }
        }
        classes
    }

    /// Rows passing the configured filter at one IoU threshold, one per class.
    pub fn rows_at<'a>(
        &'a self,
        config: &'a QueryConfig,
        iou_threshold: f64,
    ) -> impl Iterator<Item = &'a MetricsRow> + 'a {
        self.rows
            .iter()
            .filter(move |row| row.matches(config, iou_threshold))
    }

    /// Locate the single row for `class` at `iou_threshold`.
    ///
    /// # Errors
    ///
    /// Returns `AmbiguousOrMissingRow` when zero or more than one row carries the key.
    pub fn find_row(
        &self,
        config: &QueryConfig,
        class: &str,
        iou_threshold: f64,
    ) -> Result<&MetricsRow> {
        let mut found = self
            .rows
            .iter()
            .filter(|row| row.class == class && row.matches(config, iou_threshold));

        match (found.next(), found.count()) {
            (Some(row), 0) => Ok(row),
            (first, rest) => Err(CocoMetricsError::AmbiguousOrMissingRow {
                class: class.to_string(),
                iou_threshold,
                matches: usize::from(first.is_some()) + rest,
            }),
        }
    }
}

impl TryFrom<Vec<MetricsRow>> for MetricsTable {
    type Error = CocoMetricsError;

    fn try_from(rows: Vec<MetricsRow>) -> Result<Self> {
        Self::new(rows)
    }
}

impl From<MetricsTable> for Vec<MetricsRow> {
    fn from(table: MetricsTable) -> Self {
        table.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(class: &str, area: &str, max_det: u32, iou: f64, ap: f64) -> MetricsRow {
        MetricsRow::new(class, area, max_det, iou, Some(ap), vec![1.0, 0.5], vec![0.5, 1.0])
    }

    #[test]
    fn test_find_row_unique() {
        let table = MetricsTable::new(vec![
            row("Person", "custom", 100, 0.5, 0.8),
            row("Person", "custom", 10, 0.5, 0.7),
            row("Person", "all", 100, 0.5, 0.6),
            row("Person", "custom", 100, 0.55, 0.5),
            row("Car", "custom", 100, 0.5, 0.4),
        ])
        .unwrap();

        let config = QueryConfig::default();
        let found = table.find_row(&config, "Person", 0.5).unwrap();
        assert_eq!(found.ap, Some(0.8));
        let found = table.find_row(&config, "Person", 0.55).unwrap();
        assert_eq!(found.ap, Some(0.5));
    }

    #[test]
    fn test_found_row_outlives_config() {
        let table = MetricsTable::new(vec![row("Person", "custom", 100, 0.5, 0.8)]).unwrap();
        let found = {
            let config = QueryConfig::default().with_max_det(100);
            table.find_row(&config, "Person", 0.5).unwrap()
        };
        assert_eq!(found.class, "Person");
        assert_eq!(found.ap, Some(0.8));
    }

    #[test]
    fn test_find_row_missing() {
        let table = MetricsTable::new(vec![row("Person", "custom", 100, 0.5, 0.8)]).unwrap();
        match table.find_row(&QueryConfig::default(), "Car", 0.5) {
            Err(CocoMetricsError::AmbiguousOrMissingRow { class, matches, .. }) => {
                assert_eq!(class, "Car");
                assert_eq!(matches, 0);
            }
            other => panic!("Expected AmbiguousOrMissingRow, got {:?}", other),
        }
    }

    #[test]
    fn test_find_row_duplicate() {
        let table = MetricsTable::new(vec![
            row("Person", "custom", 100, 0.5, 0.8),
            row("Person", "custom", 100, 0.5, 0.3),
            row("Person", "custom", 100, 0.5, 0.1),
        ])
        .unwrap();
        match table.find_row(&QueryConfig::default(), "Person", 0.5) {
            Err(CocoMetricsError::AmbiguousOrMissingRow { matches, .. }) => assert_eq!(matches, 3),
            other => panic!("Expected AmbiguousOrMissingRow, got {:?}", other),
        }
    }

    #[test]
    fn test_curve_length_mismatch() {
        let bad = MetricsRow::new("Car", "custom", 100, 0.5, None, vec![1.0, 0.5], vec![1.0]);
        match MetricsTable::new(vec![bad]) {
            Err(CocoMetricsError::CurveLengthMismatch { recall, precision, .. }) => {
                assert_eq!((recall, precision), (2, 1));
            }
            other => panic!("Expected CurveLengthMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_undefined_ap_from_json() {
        let json = r#"[
            {"class": "Person", "area": "custom", "maxDet": 100, "iouThr": 0.5,
             "AP": -1.0, "recall": [], "precision": []},
            {"class": "Car", "area": "custom", "maxDet": 100, "iouThr": 0.5,
             "AP": null, "recall": [], "precision": []},
            {"class": "Bus", "area": "custom", "maxDet": 100, "iouThr": 0.5,
             "recall": [], "precision": []}
        ]"#;
        let table: MetricsTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.len(), 3);
        assert!(table.rows().iter().all(|r| r.ap.is_none()));
    }

    #[test]
    fn test_classes_first_seen_order() {
        let table = MetricsTable::new(vec![
            row("Person", "custom", 100, 0.5, 0.8),
            row("Car", "custom", 100, 0.5, 0.4),
            row("Person", "custom", 100, 0.55, 0.8),
        ])
        .unwrap();
        assert_eq!(table.classes(), vec!["Person", "Car"]);
    }
}
