//! Query engine bundling a metrics table with its configuration.

use crate::error::Result;
use crate::metrics::{extract_ap, extract_map, extract_optimal_thresholds};
use crate::params::{EvalParams, QueryConfig};
use crate::shape::{OneOrMany, Shaped};
use crate::table::MetricsTable;
use crate::threshold::validate_score_grid;

/// Read-only view answering AP, mAP and optimal-threshold queries.
///
/// The engine borrows the table and never mutates it, so one table can back
/// any number of engines across threads.
#[derive(Debug, Clone)]
pub struct QueryEngine<'a> {
    table: &'a MetricsTable,
    config: QueryConfig,
    score_grid: Vec<f64>,
}

impl<'a> QueryEngine<'a> {
    /// Engine using the default query configuration and the evaluator's default
    /// 101-point score grid.
    pub fn new(table: &'a MetricsTable) -> Self {
        Self::from_params(table, &EvalParams::default())
    }

    /// Engine matching the parameters the table was evaluated with.
    pub fn from_params(table: &'a MetricsTable, params: &EvalParams) -> Self {
        Self {
            table,
            config: params.query_config(),
            score_grid: params.score_grid().to_vec(),
        }
    }

    pub fn with_config(mut self, config: QueryConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the score grid.
    ///
    /// # Errors
    ///
    /// Returns `InvalidThreshold` if a cutoff is outside [0, 1] or the grid is not
    /// non-decreasing.
    pub fn with_score_grid(mut self, score_grid: Vec<f64>) -> Result<Self> {
        validate_score_grid(&score_grid)?;
        self.score_grid = score_grid;
        Ok(self)
    }

    pub fn table(&self) -> &MetricsTable {
        self.table
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    pub fn score_grid(&self) -> &[f64] {
        &self.score_grid
    }

    pub fn ap(
        &self,
        classes: impl Into<OneOrMany<String>>,
        iou_thresholds: impl Into<OneOrMany<f64>>,
    ) -> Result<Shaped<Option<f64>>> {
        extract_ap(self.table, classes, iou_thresholds, &self.config)
    }

    pub fn map(&self, iou_thresholds: impl Into<OneOrMany<f64>>) -> Result<Shaped<Option<f64>>> {
        extract_map(self.table, iou_thresholds, &self.config)
    }

    pub fn optimal_thresholds(
        &self,
        classes: impl Into<OneOrMany<String>>,
        iou_thresholds: impl Into<OneOrMany<f64>>,
    ) -> Result<Shaped<f64>> {
        extract_optimal_thresholds(
            self.table,
            classes,
            iou_thresholds,
            &self.score_grid,
            &self.config,
        )
    }
}
