//! Per-class summary report over a metrics table.
//!
//! A report is always a grid: one entry per requested IoU threshold, each
//! holding one value per class. Undefined AP and curves without a usable
//! crossing show up as `None` instead of failing the whole report.

use crate::engine::QueryEngine;
use crate::error::{CocoMetricsError, Result};
use crate::metrics::{class_ap, mean_ap, optimal_score_threshold};
use serde::Serialize;
use std::fmt::Write;
use tracing::{debug, instrument};

/// AP, mAP and optimal score thresholds for a set of classes and IoU thresholds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub classes: Vec<String>,
    pub iou_thresholds: Vec<f64>,
    /// `ap[t][c]` for threshold `t` and class `c`.
    pub ap: Vec<Vec<Option<f64>>>,
    /// `map[t]` for threshold `t`.
    pub map: Vec<Option<f64>>,
    /// `optimal_thresholds[t][c]` for threshold `t` and class `c`.
    pub optimal_thresholds: Vec<Vec<Option<f64>>>,
}

impl Report {
    /// Build a report for `classes` at every threshold in `iou_thresholds`.
    ///
    /// # Errors
    ///
    /// Lookup errors abort the report (off-grid threshold, missing or duplicate
    /// rows, a curve that does not line up with the score grid). A curve with
    /// no qualifying point only blanks its own cell.
    #[instrument(level = "debug", skip_all, fields(classes = classes.len()))]
    pub fn build(
        engine: &QueryEngine<'_>,
        classes: Vec<String>,
        iou_thresholds: Vec<f64>,
    ) -> Result<Self> {
        let table = engine.table();
        let config = engine.config();

        let mut ap = Vec::with_capacity(iou_thresholds.len());
        let mut map = Vec::with_capacity(iou_thresholds.len());
        let mut optimal_thresholds = Vec::with_capacity(iou_thresholds.len());

        for &iou_threshold in &iou_thresholds {
            let mut ap_row = Vec::with_capacity(classes.len());
            let mut optimal_row = Vec::with_capacity(classes.len());
            for class in &classes {
                ap_row.push(class_ap(table, class, iou_threshold, config)?);
                let optimal =
                    optimal_score_threshold(table, class, iou_threshold, engine.score_grid(), config);
                optimal_row.push(match optimal {
                    Ok(threshold) => Some(threshold),
                    Err(CocoMetricsError::NoOptimalThreshold { .. }) => {
                        debug!(class = class.as_str(), iou_threshold, "no optimal threshold");
                        None
                    }
                    Err(e) => return Err(e),
                });
            }
            ap.push(ap_row);
            optimal_thresholds.push(optimal_row);
            map.push(mean_ap(table, iou_threshold, config)?);
        }

        Ok(Self {
            classes,
            iou_thresholds,
            ap,
            map,
            optimal_thresholds,
        })
    }

    /// Plain-text rendering, one block per IoU threshold.
    ///
    /// Undefined values print as `-`.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (t, iou_threshold) in self.iou_thresholds.iter().enumerate() {
            let _ = writeln!(out, "IoU {:.2}", iou_threshold);
            let _ = writeln!(out, "{:15} {:>8} {:>10}", "class", "AP", "threshold");
            for (c, class) in self.classes.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "{:15} {:>8} {:>10}",
                    class,
                    cell(self.ap[t][c], 4),
                    cell(self.optimal_thresholds[t][c], 2)
                );
            }
            let _ = writeln!(out);
            let _ = writeln!(out, "{:15} {:>8}", "mAP", cell(self.map[t], 4));
            let _ = writeln!(out);
        }
        out
    }
}

fn cell(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "-".to_string(),
    }
}
