//! Fixture-driven checks over `tests/fixtures`
//!
//! Every input file (`.hpp`, `.toml`, `.json`) has a sibling `.expected`
//! file. It lists the violations one per line in their display form, or a
//! single `error: <code>` line when the input must be rejected.

use std::fs;
use std::path::{Path, PathBuf};

use overcheck::checker::logging;
use overcheck::{check_source, CheckerConfig};
use walkdir::WalkDir;

const INPUT_EXTENSIONS: &[&str] = &["hpp", "toml", "json"];

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

fn fixture_inputs(subdir: &str) -> Vec<PathBuf> {
    let mut inputs: Vec<PathBuf> = WalkDir::new(fixtures_dir().join(subdir))
        .into_iter()
        .filter_map(Result::ok)
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| INPUT_EXTENSIONS.contains(&e))
        })
        .collect();
    inputs.sort();
    inputs
}

fn expected_lines(input: &Path) -> Vec<String> {
    let expected = input.with_extension("expected");
    let content = fs::read_to_string(&expected)
        .unwrap_or_else(|e| panic!("missing {}: {}", expected.display(), e));
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Check one fixture and describe the outcome the way `.expected` files do
fn outcome(input: &Path) -> Vec<String> {
    let file_name = input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let text = fs::read_to_string(input).unwrap();

    match check_source(file_name, &text, &CheckerConfig::default()) {
        Ok(report) => report.violations.iter().map(|v| v.to_string()).collect(),
        Err(failure) => {
            let code = failure
                .diagnostics
                .errors()
                .last()
                .and_then(|d| d.code.clone())
                .unwrap_or_default();
            vec![format!("error: {}", code)]
        }
    }
}

fn run_fixtures(subdir: &str) -> usize {
    logging::init_test();
    let inputs = fixture_inputs(subdir);
    assert!(!inputs.is_empty(), "no fixtures under {}", subdir);

    let mut mismatches = Vec::new();
    for input in &inputs {
        let expected = expected_lines(input);
        let found = outcome(input);
        if found != expected {
            mismatches.push(format!(
                "{}:\n  expected: {:?}\n  found:    {:?}",
                input.display(),
                expected,
                found
            ));
        }
    }

    assert!(mismatches.is_empty(), "fixture mismatches:\n{}", mismatches.join("\n"));
    inputs.len()
}

#[test]
fn test_valid_fixtures() {
    assert_eq!(run_fixtures("valid"), 2);
}

#[test]
fn test_violation_fixtures() {
    assert_eq!(run_fixtures("violations"), 6);
}

#[test]
fn test_invalid_fixtures() {
    assert_eq!(run_fixtures("invalid"), 4);
}

#[test]
fn test_valid_declarations_have_no_warnings() {
    let input = fixtures_dir().join("valid").join("widgets.hpp");
    let text = fs::read_to_string(&input).unwrap();
    let report = check_source("widgets.hpp", &text, &CheckerConfig::default()).unwrap();

    assert!(report.is_valid());
    assert!(report.diagnostics.is_empty(), "{}", report.render());
}

#[test]
fn test_rendered_failure_shows_the_source_line() {
    let input = fixtures_dir().join("invalid").join("unknown_base.hpp");
    let text = fs::read_to_string(&input).unwrap();
    let failure = check_source("unknown_base.hpp", &text, &CheckerConfig::default()).unwrap_err();

    let rendered = failure.render();
    assert!(rendered.contains("--> unknown_base.hpp:3:28"));
    assert!(rendered.contains("3 | class Car : public Engine, public Wheels {"));
    assert!(rendered.contains("unknown base 'Wheels'"));
}
