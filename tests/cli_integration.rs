//! Tests for the command-line entry points.

use std::fs;
use std::path::{Path, PathBuf};

use codelens::cli::{
    collect_files, run_analyze, run_init, AnalyzeArgs, InitArgs, OutputFormat, EXIT_ERROR,
    EXIT_FAILED, EXIT_SUCCESS,
};
use codelens::Config;
use tempfile::TempDir;

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn args(path: &Path, format: OutputFormat) -> AnalyzeArgs {
    AnalyzeArgs {
        path: path.to_path_buf(),
        format,
        config: None,
        name: None,
        show_passed: false,
    }
}

fn copy_fixture(dir: &Path, name: &str) {
    fs::copy(testdata_path().join(name), dir.join(name)).unwrap();
}

/// Run the analyze command and return its exit code and JSON output.
fn analyze_json(args: &AnalyzeArgs) -> (i32, serde_json::Value) {
    let mut out = Vec::new();
    let code = run_analyze(args, &mut out).unwrap();
    let value = serde_json::from_slice(&out).unwrap();
    (code, value)
}

#[test]
fn test_clean_file_exits_success() {
    let path = testdata_path().join("Counter.cs");
    let (code, json) = analyze_json(&args(&path, OutputFormat::Json));
    assert_eq!(code, EXIT_SUCCESS);
    assert_eq!(json["totalIssues"], 0);
}

#[test]
fn test_issues_exit_failed() {
    let path = testdata_path().join("OrderService.cs");
    let mut args = args(&path, OutputFormat::Json);
    args.name = Some("Orders.cs".to_string());
    let (code, json) = analyze_json(&args);
    assert_eq!(code, EXIT_FAILED);
    assert_eq!(json["fileName"], "Orders.cs");
    assert!(json["totalIssues"].as_u64().unwrap() > 0);
}

#[test]
fn test_pretty_output() {
    let path = testdata_path().join("OrderService.cs");
    let mut out = Vec::new();
    let code = run_analyze(&args(&path, OutputFormat::Pretty), &mut out).unwrap();
    assert_eq!(code, EXIT_FAILED);
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("OrderService.cs"));
    assert!(text.contains("Rename to 'OrderService'"));
}

#[test]
fn test_missing_path_is_error() {
    let mut out = Vec::new();
    let code = run_analyze(
        &args(Path::new("does/not/exist.cs"), OutputFormat::Json),
        &mut out,
    )
    .unwrap();
    assert_eq!(code, EXIT_ERROR);
    assert!(out.is_empty());
}

#[test]
fn test_invalid_config_is_error() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("codelens.yaml");
    fs::write(&config, "size:\n  max_lines: 0\n").unwrap();

    let mut args = args(&testdata_path().join("Counter.cs"), OutputFormat::Json);
    args.config = Some(config);
    let mut out = Vec::new();
    assert_eq!(run_analyze(&args, &mut out).unwrap(), EXIT_ERROR);
}

#[test]
fn test_directory_scan_with_exclusions() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("src");
    fs::create_dir_all(root.join("Generated")).unwrap();
    fs::create_dir_all(root.join("obj")).unwrap();
    copy_fixture(&root, "Counter.cs");
    copy_fixture(&root.join("Generated"), "OrderService.cs");
    copy_fixture(&root.join("obj"), "Broken.cs");
    fs::write(root.join("notes.txt"), "not C#").unwrap();

    let config = Config::default();
    let files = collect_files(&root, &config).unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|f| f.strip_prefix(&root).unwrap().to_path_buf())
        .collect();
    assert_eq!(
        names,
        vec![
            PathBuf::from("Counter.cs"),
            PathBuf::from("Generated").join("OrderService.cs"),
        ]
    );

    let config_path = temp.path().join("codelens.yaml");
    fs::write(&config_path, "excluded_paths:\n  - \"Generated/**\"\n").unwrap();
    let mut args = args(&root, OutputFormat::Json);
    args.config = Some(config_path);
    let (code, json) = analyze_json(&args);
    assert_eq!(code, EXIT_SUCCESS);
    assert_eq!(json["fileName"], "Counter.cs");
}

#[test]
fn test_directory_scan_reports_every_file() {
    let temp = TempDir::new().unwrap();
    copy_fixture(temp.path(), "Counter.cs");
    copy_fixture(temp.path(), "OrderService.cs");

    let (code, json) = analyze_json(&args(temp.path(), OutputFormat::Json));
    assert_eq!(code, EXIT_FAILED);
    let results = json.as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["fileName"], "Counter.cs");
    assert_eq!(results[1]["fileName"], "OrderService.cs");
}

#[test]
fn test_unreadable_file_does_not_stop_scan() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("Latin1.cs"), b"class A { string s = \"caf\xe9\"; }").unwrap();
    copy_fixture(temp.path(), "OrderService.cs");

    let (code, json) = analyze_json(&args(temp.path(), OutputFormat::Json));
    assert_eq!(code, EXIT_FAILED);
    let results = json.as_array().unwrap();
    assert_eq!(results.len(), 2);

    assert_eq!(results[0]["fileName"], "Latin1.cs");
    let errors = &results[0]["categories"][0];
    assert_eq!(errors["name"], "Error");
    assert_eq!(errors["issues"][0]["ruleName"], "Unreadable source");

    assert_eq!(results[1]["fileName"], "OrderService.cs");
    assert!(results[1]["totalIssues"].as_u64().unwrap() > 0);
}

#[test]
fn test_init_writes_default_config() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("nested").join("codelens.yaml");
    let init = InitArgs {
        output: output.clone(),
    };

    assert_eq!(run_init(&init).unwrap(), EXIT_SUCCESS);
    let config = Config::parse_file(&output).unwrap();
    assert_eq!(config, Config::default());

    // Refuses to overwrite
    assert_eq!(run_init(&init).unwrap(), EXIT_ERROR);
}
