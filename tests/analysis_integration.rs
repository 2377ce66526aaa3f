//! Integration tests for the analysis pipeline.
//!
//! These tests drive the public API end to end against the C# fixtures in
//! `testdata/`.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use codelens::detect::ERROR_CATEGORY;
use codelens::{analyze, AnalysisResult, Config, Rule, Runner};

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn analyze_fixture(name: &str) -> AnalysisResult {
    Runner::default()
        .analyze_file(testdata_path().join(name))
        .expect("fixture should be readable")
}

fn failing_rules(result: &AnalysisResult, category: &str) -> Vec<Rule> {
    result
        .category(category)
        .map(|c| c.issues.iter().filter(|i| !i.passed).map(|i| i.rule).collect())
        .unwrap_or_default()
}

#[test]
fn test_empty_source_has_no_categories() {
    let result = analyze("", "Unknown");
    assert_eq!(result.category_count(), 0);
    assert_eq!(result.total_issues(), 0);
}

#[test]
fn test_method_naming_and_complexity_example() {
    let result = analyze("void getData(){ if (x) { } }", codelens::UNKNOWN_FILE);
    assert_eq!(result.file_name(), "Unknown");

    let naming = result.category("Naming").unwrap();
    assert_eq!(naming.issues.len(), 1);
    assert_eq!(naming.issues[0].rule, Rule::MethodPascalCase);
    assert_eq!(naming.issues[0].suggestion, "Rename to 'GetData'");

    let complexity = result.category("Complexity").unwrap();
    assert_eq!(complexity.issues.len(), 1);
    assert!(complexity.issues[0].passed);
    assert!(complexity.issues[0].description.contains("complexity 2 (low)"));
}

#[test]
fn test_duplicate_bodies_example() {
    let result = analyze(
        r#"
class Jobs
{
    void First() { doWork(); doWork(); }
    void Second() { doWork(); doWork(); }
}
"#,
        "Jobs.cs",
    );
    let duplication = result.category("Duplication").unwrap();
    assert_eq!(duplication.issues.len(), 2);
    assert!(duplication
        .issues
        .iter()
        .all(|i| i.description == "Duplicated block (2 occurrences)"));
    assert_ne!(duplication.issues[0].line, duplication.issues[1].line);
}

#[test]
fn test_generic_empty_catch_and_unused_local_example() {
    let result = analyze(
        r#"
void Run()
{
    int temp = 0;
    try { Work(); }
    catch (Exception e) { }
}
"#,
        "Run.cs",
    );
    assert_eq!(
        failing_rules(&result, "Exceptions"),
        vec![Rule::GenericCatch, Rule::EmptyCatch]
    );
    let unused = result.category("UnusedCode").unwrap();
    assert_eq!(unused.issues.len(), 1);
    assert_eq!(unused.issues[0].rule, Rule::UnusedLocal);
    assert_eq!(unused.issues[0].code_snippet, "temp");
}

#[test]
fn test_clean_fixture_has_no_failures() {
    let result = analyze_fixture("Counter.cs");
    let failures: Vec<_> = result
        .issues()
        .filter(|i| !i.passed)
        .map(|i| i.description.clone())
        .collect();
    assert!(failures.is_empty(), "unexpected failures: {:?}", failures);
    assert_eq!(result.total_issues(), 0);

    let documentation = result.category("Documentation").unwrap();
    let score = documentation.issues.last().unwrap();
    assert_eq!(score.rule, Rule::DocumentationScore);
    assert_eq!(score.description, "Documented items: 3/3");
}

#[test]
fn test_messy_fixture_rules() {
    let result = analyze_fixture("OrderService.cs");

    let naming = failing_rules(&result, "Naming");
    for rule in [
        Rule::ClassPascalCase,
        Rule::FieldPrefix,
        Rule::PrivateFieldUnderscore,
        Rule::MethodPascalCase,
        Rule::ParameterCamelCase,
        Rule::AsyncSuffix,
    ] {
        assert!(naming.contains(&rule), "missing naming rule {:?}", rule);
    }

    let unused = failing_rules(&result, "UnusedCode");
    assert_eq!(unused.iter().filter(|r| **r == Rule::UnusedLocal).count(), 1);
    assert_eq!(
        unused.iter().filter(|r| **r == Rule::UnusedPrivateField).count(),
        2
    );
    assert_eq!(
        unused.iter().filter(|r| **r == Rule::UnusedPrivateMethod).count(),
        2
    );
    assert!(!unused.contains(&Rule::UnusedParameter));

    let exceptions = failing_rules(&result, "Exceptions");
    assert_eq!(
        exceptions,
        vec![Rule::GenericCatch, Rule::EmptyCatch, Rule::BlockingAsyncCall]
    );

    let duplication = result.category("Duplication").unwrap();
    assert_eq!(duplication.issues.len(), 2);

    let documentation = failing_rules(&result, "Documentation");
    assert!(documentation.contains(&Rule::MissingDocumentation));
    assert!(documentation.contains(&Rule::DocumentationScore));

    assert!(result.category(ERROR_CATEGORY).is_none());
}

#[test]
fn test_broken_fixture_reports_parse_failure() {
    let result = analyze_fixture("Broken.cs");
    assert_eq!(result.category_count(), 1);
    let errors = result.category(ERROR_CATEGORY).unwrap();
    assert_eq!(errors.issues.len(), 1);
    assert_eq!(errors.issues[0].rule, Rule::ParseFailure);
    assert!(!errors.issues[0].suggestion.is_empty());
    assert!(result.file_name().ends_with("Broken.cs"));
}

#[test]
fn test_partial_trees_when_allowed() {
    let mut config = Config::default();
    config.parser.allow_partial = true;
    let result = Runner::new(config)
        .unwrap()
        .analyze_file(testdata_path().join("Broken.cs"))
        .unwrap();
    assert!(result.category(ERROR_CATEGORY).is_none());
    assert!(result.category("Naming").is_some());
}

#[test]
fn test_result_invariants() {
    for fixture in ["Counter.cs", "OrderService.cs", "Broken.cs"] {
        let result = analyze_fixture(fixture);

        let names: Vec<_> = result.categories().map(|c| c.name.clone()).collect();
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(names.len(), unique.len(), "duplicate category in {}", fixture);

        for category in result.categories() {
            for issue in &category.issues {
                assert_eq!(issue.category, category.name);
                if !issue.passed {
                    assert!(!issue.suggestion.is_empty(), "{:?} has no suggestion", issue.rule);
                }
                assert!(issue.detail_message.is_some());
            }
        }

        let failing = result.issues().filter(|i| !i.passed).count();
        assert_eq!(result.total_issues(), failing);
    }
}

#[test]
fn test_repeated_runs_are_identical() {
    let source = std::fs::read_to_string(testdata_path().join("OrderService.cs")).unwrap();
    let first = analyze(&source, "OrderService.cs");
    let second = analyze(&source, "OrderService.cs");
    assert_eq!(first, second);

    let sequential = Runner::new(Config {
        parallel: false,
        ..Config::default()
    })
    .unwrap()
    .analyze(&source, "OrderService.cs");
    assert_eq!(first, sequential);
}

#[test]
fn test_cancelled_run() {
    let flag = Arc::new(AtomicBool::new(true));
    let result = Runner::default()
        .with_cancel_flag(flag)
        .analyze("class A { }", "A.cs");
    assert_eq!(failing_rules(&result, ERROR_CATEGORY), vec![Rule::Cancelled]);
}
