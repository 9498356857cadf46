//! Integration tests for the working directory safety check.
//!
//! Tests cover:
//! - Missing and empty directories
//! - Media files dated today, earlier, or undated
//! - Partial downloads and staged copies

use chrono::NaiveDate;
use dub_fetch::core::safety::{blocking_files, check_working_directory};
use std::fs;
use tempfile::TempDir;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

#[test]
fn test_missing_directory_is_safe() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("multilang");

    assert!(check_working_directory(&missing, today()).is_ok());
}

#[test]
fn test_older_files_are_safe() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("20261018 a [abcABC12345].mp4"), "x").unwrap();
    fs::write(temp_dir.path().join("lang2 20250101 b [abcABC12345].mkv"), "x").unwrap();
    fs::write(temp_dir.path().join("readme.txt"), "x").unwrap();

    assert!(blocking_files(temp_dir.path(), today()).unwrap().is_empty());
}

#[test]
fn test_today_and_undated_files_block() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("20261019 a [abcABC12345].f160.mp4.bk1"), "x").unwrap();
    fs::write(temp_dir.path().join("20261019 a [abcABC12345].f233-0.m4a.part"), "x").unwrap();
    fs::write(temp_dir.path().join("untitled [abcABC12345].webm"), "x").unwrap();
    fs::write(temp_dir.path().join("20261018 old [abcABC12345].mp4"), "x").unwrap();

    let blocking = blocking_files(temp_dir.path(), today()).unwrap();
    assert_eq!(
        blocking,
        vec![
            "20261019 a [abcABC12345].f160.mp4.bk1".to_string(),
            "20261019 a [abcABC12345].f233-0.m4a.part".to_string(),
            "untitled [abcABC12345].webm".to_string(),
        ]
    );

    let err = check_working_directory(temp_dir.path(), today()).unwrap_err();
    assert!(matches!(err, dub_fetch::Error::UnsafeWorkingDirectory { .. }));
    assert_eq!(err.class().exit_code(), 3);
}

#[test]
fn test_file_in_place_of_directory() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("multilang");
    fs::write(&file, "x").unwrap();

    let result = check_working_directory(&file, today());
    assert!(matches!(result, Err(dub_fetch::Error::NotADirectory(_))));
}
