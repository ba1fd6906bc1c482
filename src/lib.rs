//! # coco-metrics
//!
//! A Rust library for querying COCO-style object detection evaluation results.
//!
//! An external evaluator produces a table of precision/recall curves, one per
//! class × area bucket × maxDet × IoU threshold. This library answers three
//! questions against that table:
//! - **AP** of one or more classes at one or more IoU thresholds
//! - **mAP** at one or more IoU thresholds
//! - the **optimal confidence-score threshold** per class, where recall and
//!   precision cross
//!
//! It also ships the taxonomy normalizer that remaps ground-truth annotations and
//! detector output onto one canonical category set before evaluation.
//!
//! ## Quick Start
//!
//! ```rust
//! use coco_metrics::{MetricsRow, MetricsTable, QueryEngine};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let table = MetricsTable::new(vec![
//!     MetricsRow::new("Person", "custom", 100, 0.5, Some(0.8), vec![], vec![]),
//!     MetricsRow::new("Car", "custom", 100, 0.5, Some(0.6), vec![], vec![]),
//! ])?;
//! let engine = QueryEngine::new(&table);
//!
//! let per_class = engine.ap(["Person", "Car"], 0.5)?;
//! let map = engine.map(0.5)?;
//!
//! assert_eq!(per_class.into_vec(), Some(vec![Some(0.8), Some(0.6)]));
//! assert!((map.into_scalar().flatten().unwrap() - 0.7).abs() < 1e-10);
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics table format
//!
//! Tables are read from JSON row records or from a Polars `DataFrame` with the
//! same columns:
//!
//! ```json
//! [
//!   {
//!     "class": "Person",
//!     "area": "custom",
//!     "maxDet": 100,
//!     "iouThr": 0.5,
//!     "AP": 0.8,
//!     "recall": [1.0, 0.8, ...],
//!     "precision": [0.2, 0.5, ...]
//!   }
//! ]
//! ```

pub mod error;
pub mod types;
pub mod params;
pub mod threshold;
pub mod table;
pub mod shape;
pub mod metrics;
pub mod engine;
pub mod report;
pub mod frame;
pub mod stats;
pub mod taxonomy;
pub mod loader;

// Re-export commonly used types and functions
pub use error::{CocoMetricsError, Result};
pub use types::{Annotation, Category, CocoDataset, Detection, Image};
pub use params::{EvalParams, QueryConfig};
pub use table::{MetricsRow, MetricsTable};
pub use shape::{OneOrMany, Shaped};
pub use metrics::{extract_ap, extract_map, extract_optimal_thresholds};
pub use engine::QueryEngine;
pub use report::Report;
pub use taxonomy::{remap_annotations, remap_detections, CategoryMapping, Taxonomy};
pub use stats::RemapStats;
pub use loader::{load_from_file, load_from_string, load_metrics_table_from_file};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_reexports_answer_queries() {
        let table = MetricsTable::new(vec![
            MetricsRow::new("Person", "custom", 100, 0.5, Some(0.8), vec![], vec![]),
            MetricsRow::new("Car", "custom", 100, 0.5, None, vec![], vec![]),
        ])
        .unwrap();
        let config = QueryConfig::default();

        let ap = extract_ap(&table, ["Person", "Car"], 0.5, &config).unwrap();
        assert_eq!(ap, Shaped::Sequence(vec![Shaped::Scalar(Some(0.8)), Shaped::Scalar(None)]));
        assert_eq!(
            QueryEngine::new(&table).map(0.5).unwrap(),
            extract_map(&table, 0.5, &config).unwrap()
        );
        assert!(matches!(
            extract_ap(&table, "Person", 0.52, &config),
            Err(CocoMetricsError::InvalidThreshold(_))
        ));
    }
}
