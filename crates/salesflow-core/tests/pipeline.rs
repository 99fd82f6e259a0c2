use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use salesflow_core::{run_pipeline, PipelinePaths, Stage};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../salesflow-parser/tests/data")
        .join(name)
}

fn workspace() -> (TempDir, PipelinePaths) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let data_dir = dir.path().join("DATA");
    fs::create_dir_all(&data_dir).expect("create data dir");
    let paths = PipelinePaths::from_dirs(&data_dir, dir.path().join("KPI"));
    fs::copy(fixture("domestic_sample.csv"), &paths.domestic_sales).expect("copy domestic");
    fs::copy(fixture("international_sample.csv"), &paths.international_sales)
        .expect("copy international");
    (dir, paths)
}

fn csv_outputs(paths: &PipelinePaths, files: &[PathBuf]) -> BTreeMap<PathBuf, Vec<u8>> {
    files
        .iter()
        .chain([&paths.master_sales, &paths.cleaned_sales])
        .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
        .map(|path| (path.clone(), fs::read(path).expect("read output")))
        .collect()
}

#[test]
fn pipeline_runs_every_stage() {
    let (_dir, paths) = workspace();

    let outcome = run_pipeline(&paths).expect("pipeline succeeds");
    assert_eq!(outcome.merge.rows, 14);
    assert_eq!(outcome.clean.rows_out, 11);
    let report = outcome.report.expect("report generated");
    assert_eq!(report.kpis.total_order, 5);
    assert!(paths.master_sales.is_file());
    assert!(paths.cleaned_sales.is_file());
}

#[test]
fn rerunning_pipeline_is_byte_identical() {
    let (_dir, paths) = workspace();

    let first = run_pipeline(&paths).expect("first run");
    let first_files = first.report.expect("first report").files;
    let before = csv_outputs(&paths, &first_files);

    let second = run_pipeline(&paths).expect("second run");
    let second_files = second.report.expect("second report").files;
    let after = csv_outputs(&paths, &second_files);

    assert_eq!(first_files, second_files);
    assert_eq!(before.len(), 17);
    assert_eq!(before, after);
}

#[test]
fn merge_failure_stops_the_pipeline() {
    let (_dir, paths) = workspace();
    fs::remove_file(&paths.international_sales).expect("remove international");

    let err = run_pipeline(&paths).expect_err("pipeline must fail");
    assert_eq!(err.stage, Stage::Merge);
    assert!(!paths.master_sales.exists());
    assert!(!paths.cleaned_sales.exists());
    assert!(!paths.kpi_dir.exists());
}
