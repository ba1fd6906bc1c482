use coco_metrics::metrics::{extract_ap, extract_map, extract_optimal_thresholds, find_balanced_index};
use coco_metrics::params::{default_iou_grid, EvalParams, QueryConfig};
use coco_metrics::table::{MetricsRow, MetricsTable};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn create_table(num_classes: usize) -> MetricsTable {
    let mut rows = Vec::new();
    for class in 0..num_classes {
        for area in ["all", "small", "medium", "large", "custom"] {
            for max_det in [1, 10, 100] {
                for iou in default_iou_grid() {
                    let recall = (0..=100).map(|i| 1.0 - f64::from(i) / 100.0).collect();
                    let precision = (0..=100).map(|i| f64::from(i) / 100.0).collect();
                    rows.push(MetricsRow::new(
                        format!("class_{class}"),
                        area,
                        max_det,
                        iou,
                        Some(class as f64 / num_classes as f64),
                        recall,
                        precision,
                    ));
                }
            }
        }
    }
    MetricsTable::new(rows).unwrap()
}

fn class_names(num_classes: usize) -> Vec<String> {
    (0..num_classes).map(|c| format!("class_{c}")).collect()
}

fn bench_balanced_index(c: &mut Criterion) {
    let recall: Vec<f64> = (0..=100).map(|i| 1.0 - f64::from(i) / 100.0).collect();
    let precision: Vec<f64> = (0..=100).map(|i| f64::from(i) / 100.0).collect();

    c.bench_function("balanced_index_101", |b| {
        b.iter(|| find_balanced_index(black_box(&recall), black_box(&precision)));
    });
}

fn bench_extract_ap(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_ap");
    let config = QueryConfig::default();

    for num_classes in [2, 20, 80].iter() {
        let table = create_table(*num_classes);
        let classes = class_names(*num_classes);

        group.bench_with_input(BenchmarkId::from_parameter(num_classes), num_classes, |b, _| {
            b.iter(|| {
                extract_ap(
                    black_box(&table),
                    classes.clone(),
                    default_iou_grid(),
                    &config,
                )
                .unwrap()
            });
        });
    }
    group.finish();
}

fn bench_extract_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_map");
    let config = QueryConfig::default();

    for num_classes in [2, 20, 80].iter() {
        let table = create_table(*num_classes);

        group.bench_with_input(BenchmarkId::from_parameter(num_classes), num_classes, |b, _| {
            b.iter(|| extract_map(black_box(&table), default_iou_grid(), &config).unwrap());
        });
    }
    group.finish();
}

fn bench_optimal_thresholds(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimal_thresholds");
    let params = EvalParams::default();
    let config = params.query_config();

    for num_classes in [2, 20, 80].iter() {
        let table = create_table(*num_classes);
        let classes = class_names(*num_classes);

        group.bench_with_input(BenchmarkId::from_parameter(num_classes), num_classes, |b, _| {
            b.iter(|| {
                extract_optimal_thresholds(
                    black_box(&table),
                    classes.clone(),
                    default_iou_grid(),
                    params.score_grid(),
                    &config,
                )
                .unwrap()
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_balanced_index,
    bench_extract_ap,
    bench_extract_map,
    bench_optimal_thresholds,
);
criterion_main!(benches);
