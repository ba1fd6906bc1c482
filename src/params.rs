//! Evaluation parameters and query configuration.
//!
//! [`EvalParams`] mirrors the parameter object of the evaluator that produced a
//! metrics table; its recall-threshold grid doubles as the score-threshold grid
//! for the optimal-threshold search. [`QueryConfig`] holds the fixed filter values
//! every query applies to the table.

use serde::{Deserialize, Serialize};

/// Area bucket consulted by the queries.
pub const DEFAULT_AREA_LABEL: &str = "custom";

/// Detection cap consulted by the queries.
pub const DEFAULT_MAX_DET: u32 = 100;

/// Tolerance used when comparing IoU thresholds.
///
/// Wide enough for float drift in computed values such as `0.05 * 12.0`, far
/// below the 0.05 grid spacing so no distinct request is folded onto a grid point.
pub const IOU_EPSILON: f64 = 1e-9;

/// The ten COCO IoU thresholds 0.50:0.05:0.95.
pub fn default_iou_grid() -> Vec<f64> {
    (0..10).map(|i| f64::from(50 + 5 * i) / 100.0).collect()
}

/// The 101-point recall grid 0.00:0.01:1.00.
pub fn default_rec_thrs() -> Vec<f64> {
    (0..=100).map(|i| f64::from(i) / 100.0).collect()
}

/// Parameters of the evaluator that produced a metrics table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalParams {
    pub iou_thrs: Vec<f64>,
    pub rec_thrs: Vec<f64>,
    pub max_dets: Vec<u32>,
    pub area_rng_lbl: Vec<String>,
}

impl Default for EvalParams {
    fn default() -> Self {
        Self {
            iou_thrs: default_iou_grid(),
            rec_thrs: default_rec_thrs(),
            max_dets: vec![1, 10, 100],
            area_rng_lbl: vec![
                "all".into(),
                "small".into(),
                "medium".into(),
                "large".into(),
                DEFAULT_AREA_LABEL.into(),
            ],
        }
    }
}

impl EvalParams {
    /// Score-threshold grid aligned index-for-index with every curve in the table.
    pub fn score_grid(&self) -> &[f64] {
        &self.rec_thrs
    }

    /// Query configuration matching these parameters.
    pub fn query_config(&self) -> QueryConfig {
        QueryConfig::default().with_iou_grid(self.iou_thrs.clone())
    }
}

/// Fixed filters applied by every metrics query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Area bucket label rows must carry.
    pub area_label: String,
    /// maxDet value rows must carry.
    pub max_det: u32,
    /// IoU thresholds a query may ask for.
    pub iou_grid: Vec<f64>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            area_label: DEFAULT_AREA_LABEL.to_string(),
            max_det: DEFAULT_MAX_DET,
            iou_grid: default_iou_grid(),
        }
    }
}

impl QueryConfig {
    pub fn with_area_label(mut self, area_label: impl Into<String>) -> Self {
        self.area_label = area_label.into();
        self
    }

    pub fn with_max_det(mut self, max_det: u32) -> Self {
        self.max_det = max_det;
        self
    }

    pub fn with_iou_grid(mut self, iou_grid: Vec<f64>) -> Self {
        self.iou_grid = iou_grid;
        self
    }
}
