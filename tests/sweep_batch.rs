mod common;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use common::{ScriptedEngine, buffer_reporter, output_of};
use nb_batch::driver::{BatchDriver, DriverOptions};
use nb_batch::error::BatchError;
use nb_batch::work::Batch;
use serde_json::json;

const NOTEBOOK: &str = "simulation_univariate_compare_four_model_matern_gabor_tdf2";

fn options(stop_on_error: bool) -> DriverOptions {
    DriverOptions {
        stop_on_error,
        suppress_diagnostics: true,
        cwd: PathBuf::from("/proj"),
    }
}

fn orientation_sweep() -> Batch {
    let other = BTreeMap::from([("n_samples".to_string(), json!(500))]);
    Batch::sweep(
        Path::new("/proj"),
        NOTEBOOK,
        "orientation",
        &[json!(0), json!(0.7854), json!(1.5708)],
        &other,
    )
    .unwrap()
}

#[tokio::test]
async fn sweep_writes_one_named_artifact_per_value_in_order() {
    let engine = ScriptedEngine::new().with_delay(Duration::from_millis(2));
    let driver = BatchDriver::new(&engine, options(true));
    let mut reporter = buffer_reporter(true);

    let summary = driver
        .run(&orientation_sweep(), &mut reporter)
        .await
        .unwrap();

    let calls = engine.calls();
    let outputs: Vec<_> = calls.iter().map(|c| c.output_path.clone()).collect();
    assert_eq!(
        outputs,
        vec![
            PathBuf::from(format!("/proj/{NOTEBOOK}_orientation_0.ipynb")),
            PathBuf::from(format!("/proj/{NOTEBOOK}_orientation_0.7854.ipynb")),
            PathBuf::from(format!("/proj/{NOTEBOOK}_orientation_1.5708.ipynb")),
        ]
    );
    for (call, value) in calls.iter().zip([json!(0), json!(0.7854), json!(1.5708)]) {
        assert_eq!(call.input_path, PathBuf::from(format!("/proj/{NOTEBOOK}.ipynb")));
        assert_eq!(call.parameters["orientation"], value);
        assert_eq!(call.parameters["n_samples"], json!(500));
        assert_eq!(call.cwd, PathBuf::from("/proj"));
    }

    assert_eq!(summary.item_count, 3);
    assert!(summary.is_complete());
    assert_eq!(
        summary.total_elapsed,
        summary.item_elapsed.iter().sum::<Duration>()
    );
    assert!(summary.total_elapsed >= Duration::from_millis(6));
    assert!(summary.finished_at >= summary.started_at);
}

#[tokio::test]
async fn sweep_progress_uses_item_count_not_parameter_count() {
    let engine = ScriptedEngine::new();
    let driver = BatchDriver::new(&engine, options(true));
    let mut reporter = buffer_reporter(true);

    driver
        .run(&orientation_sweep(), &mut reporter)
        .await
        .unwrap();
    let out = output_of(reporter);

    assert!(out.starts_with("🚀 Starting Notebook Processing"));
    assert!(out.contains("🔧 Try Parameter : orientation=[0, 0.7854, 1.5708]"));
    assert!(out.contains(&format!("[1/3] Processing: {NOTEBOOK}.ipynb")));
    assert!(out.contains(&format!("[3/3] Processing: {NOTEBOOK}.ipynb")));
    assert!(!out.contains(&format!("Processing: {NOTEBOOK}_orientation")));
    assert!(out.contains(&format!("✅ Success: {NOTEBOOK}_orientation_1.5708.ipynb")));
    assert!(out.contains("| 0/3 (0%)"));
    assert!(out.contains("| 2/3 (67%)"));
    assert!(out.contains("| 3/3 (100%)"));
    assert_eq!(out.matches("✅ Success:").count(), 3);
    assert!(out.contains("⏱️ Total Time:"));
    assert!(out.contains("📅 End Time:"));
}

#[tokio::test]
async fn sweep_fail_fast_stops_at_first_failure() {
    let engine = ScriptedEngine::new().failing_on(2);
    let driver = BatchDriver::new(&engine, options(true));
    let mut reporter = buffer_reporter(true);

    let err = driver
        .run(&orientation_sweep(), &mut reporter)
        .await
        .unwrap_err();

    match err {
        BatchError::ItemFailed {
            index,
            total,
            label,
            ..
        } => {
            assert_eq!(index, 2);
            assert_eq!(total, 3);
            assert_eq!(label, format!("{NOTEBOOK}_orientation_0.7854.ipynb"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(engine.calls().len(), 2);

    let out = output_of(reporter);
    assert!(out.contains("❌ Failed:"));
    assert!(!out.contains("[3/3]"));
    assert!(!out.contains("⏱️ Total Time:"));
}
