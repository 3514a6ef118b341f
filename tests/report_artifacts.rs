use serde_json::json;

use roadguard::report::{
    render_json, render_markdown, sample_accuracy_data, BandThresholds, RenderOptions, ReportData,
};

#[test]
fn writes_both_artifacts_and_json_round_trips() {
    let dir = tempfile::tempdir().expect("temp dir");
    let md_path = dir.path().join("accuracy_report.md");
    let json_path = dir.path().join("accuracy_data.json");

    let data = sample_accuracy_data();
    let options = RenderOptions {
        generated: Some("2025-03-01 12:00:00".to_string()),
        bands: Some(BandThresholds::default()),
        ..RenderOptions::default()
    };
    std::fs::write(&md_path, render_markdown(&data, &options).expect("markdown")).expect("write md");
    std::fs::write(&json_path, render_json(&data).expect("json")).expect("write json");

    let md = std::fs::read_to_string(&md_path).expect("read md");
    assert!(md.contains("## Detection Performance"));
    assert!(md.contains("- **Detection Accuracy**: 87.5%"));
    assert!(md.contains("- **Processing Time**: 0.041s per frame"));
    assert!(md.contains("- **Memory Usage**: 2.1 GB"));
    assert!(md.contains("## Test Conditions"));
    assert!(md.contains("### Excellent (>= 90):"));

    let parsed: ReportData =
        serde_json::from_slice(&std::fs::read(&json_path).expect("read json")).expect("parse json");
    assert_eq!(parsed, data);
    assert_eq!(
        parsed.keys().collect::<Vec<_>>(),
        vec![
            "model_performance",
            "severity_classification",
            "performance_metrics",
            "test_conditions"
        ]
    );
}

#[test]
fn renders_arbitrary_metric_names() {
    let data = match json!({
        "run_id": "nightly-42",
        "edge_cases": { "wet_asphalt_recall": 71.25, "frames": 300 }
    }) {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    };
    let md = render_markdown(&data, &RenderOptions::default()).expect("markdown");
    assert!(md.contains("- **Run Id**: nightly-42"));
    assert!(md.contains("## Edge Cases"));
    assert!(md.contains("- **Wet Asphalt Recall**: 71.25"));
    assert!(md.contains("- **Frames**: 300"));
}
