//! End-to-end tests of the `coco-metrics` binary.

use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_coco-metrics"))
        .args(args)
        .output()
        .expect("failed to run coco-metrics")
}

/// Person crosses at score 0.5; Car has no ground truth at either threshold.
fn write_metrics(path: &Path) {
    let recall: Vec<f64> = (0..=100).map(|i| 1.0 - f64::from(i) / 100.0).collect();
    let precision: Vec<f64> = (0..=100).map(|i| f64::from(i) / 100.0).collect();
    let mut rows = Vec::new();
    for (iou, ap) in [(0.5, 0.8), (0.75, 0.6)] {
        rows.push(json!({"class": "Person", "area": "custom", "maxDet": 100, "iouThr": iou,
                         "AP": ap, "recall": recall, "precision": precision}));
        rows.push(json!({"class": "Car", "area": "custom", "maxDet": 100, "iouThr": iou,
                         "AP": -1, "recall": [], "precision": []}));
    }
    fs::write(path, Value::Array(rows).to_string()).unwrap();
}

// ============================================================================
// REPORT
// ============================================================================

#[test]
fn test_report_text() {
    let dir = tempdir().unwrap();
    let metrics = dir.path().join("metrics.json");
    write_metrics(&metrics);

    let output = run(&["report", "--metrics", metrics.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "IoU 0.50");
    assert_eq!(lines[2], format!("{:15} {:>8} {:>10}", "Person", "0.8000", "0.50"));
    assert_eq!(lines[3], format!("{:15} {:>8} {:>10}", "Car", "-", "-"));
    assert_eq!(lines[5], format!("{:15} {:>8}", "mAP", "0.8000"));
}

#[test]
fn test_report_json_grid() {
    let dir = tempdir().unwrap();
    let metrics = dir.path().join("metrics.json");
    write_metrics(&metrics);

    let output = run(&[
        "report",
        "--metrics",
        metrics.to_str().unwrap(),
        "--classes",
        "Car,Person",
        "--iou",
        "0.5",
        "--iou",
        "0.75",
        "--json",
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["classes"], json!(["Car", "Person"]));
    assert_eq!(report["ap"], json!([[null, 0.8], [null, 0.6]]));
    assert_eq!(report["map"], json!([0.8, 0.6]));
    assert_eq!(report["optimal_thresholds"], json!([[null, 0.5], [null, 0.5]]));
}

#[test]
fn test_report_off_grid_threshold_fails() {
    let dir = tempdir().unwrap();
    let metrics = dir.path().join("metrics.json");
    write_metrics(&metrics);

    let output = run(&["report", "--metrics", metrics.to_str().unwrap(), "--iou", "0.52"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("0.52"));
}

// ============================================================================
// TAXONOMY CORRECTION
// ============================================================================

#[test]
fn test_correct_detections_command() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("detections.json");
    let output_path = dir.path().join("corrected.json");
    let raw = json!([
        {"image_id": 1, "category_id": 3, "bbox": [0, 0, 1, 1], "score": 0.9},
        {"image_id": 1, "category_id": 5, "bbox": [0, 0, 1, 1], "score": 0.8}
    ]);
    fs::write(&input, raw.to_string()).unwrap();

    let output = run(&[
        "correct-detections",
        "--coco",
        input.to_str().unwrap(),
        "--out",
        output_path.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let written: Value = serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();
    assert_eq!(written.as_array().unwrap().len(), 1);
    assert_eq!(written[0]["category_id"], 2);
}
