use std::fs;
use std::path::{Path, PathBuf};

use csv_cleanse::error::PipelineError;
use csv_cleanse::pipeline::{CleaningPipeline, PipelineOptions};
use csv_cleanse::report::{Reporter, Severity};
use tempfile::{TempDir, tempdir};

struct Fixture {
    _dir: TempDir,
    config: PathBuf,
    input: PathBuf,
    output: PathBuf,
}

fn fixture(config: &str, input: &str) -> Fixture {
    let dir = tempdir().expect("temp dir");
    let config_path = dir.path().join("cleaning.json");
    let input_path = dir.path().join("input.csv");
    let output_path = dir.path().join("output.csv");
    fs::write(&config_path, config).expect("write config");
    fs::write(&input_path, input).expect("write input");
    Fixture {
        _dir: dir,
        config: config_path,
        input: input_path,
        output: output_path,
    }
}

fn run_capturing(fx: &Fixture) -> (CleaningPipeline, Result<csv_cleanse::pipeline::RunReport, PipelineError>) {
    let mut pipeline = CleaningPipeline::new(Reporter::capturing(), PipelineOptions::default());
    let result = pipeline.run(&fx.config, &fx.input, &fx.output);
    (pipeline, result)
}

fn has_message(pipeline: &CleaningPipeline, severity: Severity, needle: &str) -> bool {
    pipeline
        .reporter()
        .captured()
        .iter()
        .any(|(sev, msg)| *sev == severity && msg.contains(needle))
}

const SAMPLE_INPUT: &str = "age,city\n25,NY\n,NY\n25,NY\n";

#[test]
fn drop_na_and_duplicates_scenario() {
    let fx = fixture(r#"{ "drop_na": true, "drop_duplicates": true }"#, SAMPLE_INPUT);
    let (pipeline, result) = run_capturing(&fx);
    let report = result.expect("run succeeds");

    assert_eq!(report.rows_loaded, 3);
    assert_eq!(report.rows_dropped_missing, 1);
    assert_eq!(report.rows_dropped_duplicate, 1);
    assert_eq!(report.rows_written, 1);
    assert_eq!(report.columns_written, 2);

    let output = fs::read_to_string(&fx.output).unwrap();
    assert_eq!(output, "age,city\n25,NY\n");

    assert!(has_message(&pipeline, Severity::Info, "3 row(s) before, 2 after"));
    assert!(has_message(&pipeline, Severity::Info, "2 row(s) before, 1 after"));
}

#[test]
fn remove_columns_scenario_keeps_all_rows() {
    let fx = fixture(r#"{ "remove_columns": ["city"] }"#, SAMPLE_INPUT);
    let (pipeline, result) = run_capturing(&fx);
    let report = result.expect("run succeeds");

    assert_eq!(report.rows_written, 3);
    assert_eq!(report.columns_removed, 1);
    assert_eq!(report.columns_written, 1);

    let output = fs::read_to_string(&fx.output).unwrap();
    // A lone empty field is quoted so the row is not read back as an empty record.
    assert_eq!(output, "age\n25\n\"\"\n25\n");
    assert!(has_message(&pipeline, Severity::Info, "Removed column(s): city"));
}

#[test]
fn disabled_stages_pass_rows_through_unchanged() {
    let fx = fixture("{}", SAMPLE_INPUT);
    let (_pipeline, result) = run_capturing(&fx);
    let report = result.expect("run succeeds");

    assert_eq!(report.rows_written, report.rows_loaded);
    let output = fs::read_to_string(&fx.output).unwrap();
    assert_eq!(output, SAMPLE_INPUT);
}

#[test]
fn cast_failure_warns_and_still_completes() {
    let fx = fixture(
        r#"{ "data_type_corrections": { "age": "integer" } }"#,
        "age,city\nabc,NY\n25,LA\n",
    );
    let (pipeline, result) = run_capturing(&fx);
    let report = result.expect("run succeeds despite the cast failure");

    assert_eq!(report.cast_failures, 1);
    assert_eq!(report.columns_cast, 0);
    // The column is left exactly as it was loaded.
    let output = fs::read_to_string(&fx.output).unwrap();
    assert_eq!(output, "age,city\nabc,NY\n25,LA\n");
    assert!(has_message(&pipeline, Severity::Warn, "column left unchanged"));
}

#[test]
fn successful_cast_is_reported() {
    let fx = fixture(
        r#"{ "data_type_corrections": { "age": "integer" } }"#,
        "age,city\n25,NY\n31,LA\n",
    );
    let (pipeline, result) = run_capturing(&fx);
    let report = result.expect("run succeeds");
    assert_eq!(report.columns_cast, 1);
    assert_eq!(report.cast_failures, 0);
    assert!(has_message(&pipeline, Severity::Info, "Column 'age' cast to integer"));
}

#[test]
fn cast_for_absent_column_is_silent() {
    let fx = fixture(
        r#"{ "data_type_corrections": { "salary": "float" } }"#,
        SAMPLE_INPUT,
    );
    let (pipeline, result) = run_capturing(&fx);
    let report = result.expect("run succeeds");
    assert_eq!(report.columns_cast, 0);
    assert_eq!(report.cast_failures, 0);
    assert!(!has_message(&pipeline, Severity::Warn, "salary"));
}

#[test]
fn malformed_config_aborts_before_dataset_io() {
    let fx = fixture("{ not json", SAMPLE_INPUT);
    let (pipeline, result) = run_capturing(&fx);

    let err = result.expect_err("run must fail");
    assert!(matches!(err, PipelineError::ConfigLoad { .. }));
    assert!(!fx.output.exists(), "no output may be produced");
    assert!(has_message(&pipeline, Severity::Error, "Failed to load configuration"));
    assert!(!has_message(&pipeline, Severity::Info, "Dataset loaded"));
}

#[test]
fn missing_input_aborts_before_any_transformation() {
    let dir = tempdir().expect("temp dir");
    let config = dir.path().join("cleaning.json");
    fs::write(&config, r#"{ "drop_na": true }"#).unwrap();
    let output = dir.path().join("output.csv");

    let mut pipeline = CleaningPipeline::new(Reporter::capturing(), PipelineOptions::default());
    let err = pipeline
        .run(&config, Path::new("definitely-missing.csv"), &output)
        .expect_err("run must fail");
    assert!(matches!(err, PipelineError::DataLoad { .. }));
    assert!(!output.exists());
}

#[test]
fn unwritable_output_is_a_data_write_error() {
    let fx = fixture("{}", SAMPLE_INPUT);
    let bad_output = fx._dir.path().join("no-such-dir").join("output.csv");

    let mut pipeline = CleaningPipeline::new(Reporter::capturing(), PipelineOptions::default());
    let err = pipeline
        .run(&fx.config, &fx.input, &bad_output)
        .expect_err("run must fail");
    assert!(matches!(err, PipelineError::DataWrite { .. }));
}

#[test]
fn zero_surviving_rows_is_still_a_successful_run() {
    let fx = fixture(r#"{ "drop_na": true }"#, "age,city\n,NY\n25,\n");
    let (_pipeline, result) = run_capturing(&fx);
    let report = result.expect("run succeeds");
    assert_eq!(report.rows_written, 0);
    let output = fs::read_to_string(&fx.output).unwrap();
    assert_eq!(output, "age,city\n");
}

#[test]
fn run_reports_start_and_completion_stages() {
    let fx = fixture("{}", SAMPLE_INPUT);
    let (pipeline, result) = run_capturing(&fx);
    result.expect("run succeeds");

    let captured = pipeline.reporter().captured();
    assert_eq!(captured.first().map(|(sev, _)| *sev), Some(Severity::Stage));
    assert_eq!(
        captured.last(),
        Some(&(Severity::Stage, "Data cleaning completed successfully".to_string()))
    );
}

#[test]
fn corrections_apply_in_name_order() {
    let fx = fixture(
        r#"{ "data_type_corrections": { "b": "integer", "a": "integer" } }"#,
        "b,a\n1,2\n",
    );
    let (pipeline, result) = run_capturing(&fx);
    result.expect("run succeeds");
    let casts: Vec<&str> = pipeline
        .reporter()
        .captured()
        .iter()
        .filter(|(_, msg)| msg.contains("cast to"))
        .map(|(_, msg)| msg.as_str())
        .collect();
    assert_eq!(casts.len(), 2);
    assert!(casts[0].contains("'a'"));
    assert!(casts[1].contains("'b'"));
}
