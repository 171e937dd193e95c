//! Integration tests for the lending engine CLI.
//!
//! These tests run the actual binary and verify output against expected CSV files.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;

/// Get path to test data file
fn test_data_path(filename: &str) -> String {
    format!("tests/data/{}", filename)
}

/// Run the binary with the given input file and return stdout
fn run_engine(input_file: &str) -> String {
    let mut cmd = Command::cargo_bin("lending-engine").unwrap();
    let assert = cmd.arg(input_file).assert().success();
    String::from_utf8(assert.get_output().stdout.clone()).unwrap()
}

/// Normalize CSV for comparison (trim whitespace, drop blank lines)
fn normalize_csv(csv: &str) -> Vec<String> {
    csv.lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

fn assert_matches_expected(input: &str, expected: &str) {
    let output = run_engine(&test_data_path(input));
    let expected = fs::read_to_string(test_data_path(expected)).unwrap();

    assert_eq!(normalize_csv(&output), normalize_csv(&expected));
}

#[test]
fn test_sample_a_materials_and_checkout() {
    assert_matches_expected("sample_a.csv", "expected_a.csv");
}

#[test]
fn test_sample_b_rollback_then_retry() {
    assert_matches_expected("sample_b_rollback.csv", "expected_b.csv");
}

#[test]
fn test_sample_c_whitespace_handling() {
    assert_matches_expected("sample_c_whitespace.csv", "expected_c.csv");
}

#[test]
fn test_sample_d_edge_cases() {
    assert_matches_expected("sample_d_edge_cases.csv", "expected_d.csv");
}

#[test]
fn test_missing_file_error() {
    let mut cmd = Command::cargo_bin("lending-engine").unwrap();
    cmd.arg("nonexistent.csv")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_missing_argument_error() {
    let mut cmd = Command::cargo_bin("lending-engine").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Missing input file"));
}

#[test]
fn test_output_has_correct_header() {
    let output = run_engine(&test_data_path("sample_a.csv"));
    assert!(output.starts_with("material,name,description,total,reserved"));
}

#[test]
fn test_output_sorted_by_material_id() {
    let output = run_engine(&test_data_path("sample_a.csv"));
    let ids: Vec<u64> = output
        .lines()
        .skip(1)
        .map(|line| line.split(',').next().unwrap().parse().unwrap())
        .collect();

    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
}

#[test]
fn test_checkout_status_is_logged() {
    let mut cmd = Command::cargo_bin("lending-engine").unwrap();
    cmd.env("RUST_LOG", "info")
        .arg(test_data_path("sample_b_rollback.csv"))
        .assert()
        .success()
        .stderr(predicate::str::contains("rolled back (7)"))
        .stderr(predicate::str::contains("committed (0)"));
}

#[test]
fn test_header_only_input() {
    let mut input = NamedTempFile::new().unwrap();
    writeln!(input, "type,person,material,quantity,start,end,description").unwrap();

    let output = run_engine(input.path().to_str().unwrap());
    assert_eq!(
        normalize_csv(&output),
        vec!["material,name,description,total,reserved"]
    );
}

#[test]
fn test_description_with_comma_is_quoted() {
    let mut input = NamedTempFile::new().unwrap();
    write!(
        input,
        "type,person,material,quantity,start,end,description\n\
         material,,Zelt,1,,,\"Kuppelzelt, 2 Personen\"\n"
    )
    .unwrap();

    let output = run_engine(input.path().to_str().unwrap());
    assert!(output.contains("1,Zelt,\"Kuppelzelt, 2 Personen\",1,0"));
}

#[test]
fn test_edit_row_with_rename_column() {
    let mut input = NamedTempFile::new().unwrap();
    write!(
        input,
        "type,person,material,quantity,start,end,description,rename\n\
         material,,Stativv,5,,,Dreibien,\n\
         material,,Kabel,1,,,,\n\
         edit,,Stativv,4,,,Dreibein,Stativ\n\
         edit,,Kabel,,,,,STATIV\n"
    )
    .unwrap();

    let output = run_engine(input.path().to_str().unwrap());
    assert_eq!(
        normalize_csv(&output),
        vec![
            "material,name,description,total,reserved",
            "1,Stativ,Dreibein,4,0",
            "2,STATIV,,1,0",
        ]
    );
}
