//! Stress tests with large tables and full COCO-sized grids.

use coco_metrics::metrics::{extract_ap, extract_map, extract_optimal_thresholds};
use coco_metrics::params::{default_iou_grid, EvalParams, QueryConfig};
use coco_metrics::table::{MetricsRow, MetricsTable};
use coco_metrics::{QueryEngine, Shaped};

const AREAS: [&str; 5] = ["all", "small", "medium", "large", "custom"];
const MAX_DETS: [u32; 3] = [1, 10, 100];

/// Step curves that meet only at index `cross`.
fn create_curve(cross: usize) -> (Vec<f64>, Vec<f64>) {
    let recall = (0..=100)
        .map(|i| if i <= cross { 1.0 } else { 0.0 })
        .collect();
    let precision = (0..=100)
        .map(|i| if i < cross { 0.0 } else { 1.0 })
        .collect();
    (recall, precision)
}

/// 80 classes x 5 areas x 3 maxDets x 10 IoU thresholds, 101-point curves.
fn create_coco_sized_table() -> MetricsTable {
    let mut rows = Vec::new();
    for class in 0..80 {
        for area in AREAS {
            for max_det in MAX_DETS {
                for (step, iou) in default_iou_grid().into_iter().enumerate() {
                    let ap = (class as f64 / 100.0) + (step as f64 / 1000.0);
                    let (recall, precision) = create_curve(class + 10);
                    rows.push(MetricsRow::new(
                        format!("class_{class}"),
                        area,
                        max_det,
                        iou,
                        Some(ap),
                        recall,
                        precision,
                    ));
                }
            }
        }
    }
    MetricsTable::new(rows).unwrap()
}

#[test]
fn test_coco_sized_table_all_classes_all_thresholds() {
    let table = create_coco_sized_table();
    assert_eq!(table.len(), 80 * 5 * 3 * 10);

    let classes: Vec<String> = (0..80).map(|c| format!("class_{c}")).collect();
    let grid = extract_ap(&table, classes, default_iou_grid(), &QueryConfig::default())
        .unwrap()
        .transpose()
        .and_then(Shaped::into_grid)
        .unwrap();

    assert_eq!(grid.len(), 10);
    for (step, per_class) in grid.iter().enumerate() {
        assert_eq!(per_class.len(), 80);
        for (class, ap) in per_class.iter().enumerate() {
            let expected = (class as f64 / 100.0) + (step as f64 / 1000.0);
            assert!((ap - expected).abs() < 1e-12);
        }
    }
}

#[test]
fn test_coco_sized_table_map() {
    let table = create_coco_sized_table();
    let maps = extract_map(&table, default_iou_grid(), &QueryConfig::default())
        .unwrap()
        .transpose()
        .and_then(Shaped::into_vec)
        .unwrap();

    // mean of class/100 over 0..80 is 0.395
    for (step, map) in maps.iter().enumerate() {
        let expected = 0.395 + step as f64 / 1000.0;
        assert!((map - expected).abs() < 1e-9, "step {}: {} != {}", step, map, expected);
    }
}

#[test]
fn test_coco_sized_table_optimal_thresholds() {
    let table = create_coco_sized_table();
    let params = EvalParams::default();
    let classes: Vec<String> = (0..80).map(|c| format!("class_{c}")).collect();

    let thresholds = extract_optimal_thresholds(
        &table,
        classes,
        0.75,
        params.score_grid(),
        &QueryConfig::default(),
    )
    .unwrap()
    .into_vec()
    .unwrap();

    for (class, threshold) in thresholds.iter().enumerate() {
        let expected = (class + 10) as f64 / 100.0;
        assert!((threshold - expected).abs() < 1e-12, "class {}: {}", class, threshold);
    }
}

#[test]
fn test_parallel_queries_on_shared_table() {
    let table = create_coco_sized_table();

    std::thread::scope(|s| {
        let handles: Vec<_> = default_iou_grid()
            .into_iter()
            .map(|iou| {
                let table = &table;
                s.spawn(move || {
                    let engine = QueryEngine::new(table);
                    engine.map(iou).unwrap().into_scalar().flatten().unwrap()
                })
            })
            .collect();

        for (step, handle) in handles.into_iter().enumerate() {
            let map = handle.join().unwrap();
            assert!((map - (0.395 + step as f64 / 1000.0)).abs() < 1e-9);
        }
    });
}
