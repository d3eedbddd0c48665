//! End-to-end tests for the convsoak binary

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Helper to run the convsoak binary
fn run_convsoak(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_convsoak"))
        .args(args)
        .output()
        .expect("Failed to run convsoak")
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

struct Fixture {
    _dir: TempDir,
    input: PathBuf,
    kernel: PathBuf,
}

fn fixture(input: &str, kernel: &str) -> Fixture {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write(dir.path(), "input.txt", input);
    let kernel = write(dir.path(), "kernel.txt", kernel);
    Fixture {
        _dir: dir,
        input,
        kernel,
    }
}

const ONES_3X3: &str = "3 3\n1 1 1\n1 1 1\n1 1 1\n";
const ONES_KERNEL: &str = "3\n1 1 1\n1 1 1\n1 1 1\n";
const EXPECTED: &str = "Result:\n4 6 4 \n6 9 6 \n4 6 4 \n";

#[test]
fn prints_result_matrix() {
    let f = fixture(ONES_3X3, ONES_KERNEL);
    let out = run_convsoak(&[f.input.to_str().unwrap(), f.kernel.to_str().unwrap(), "4"]);

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(String::from_utf8_lossy(&out.stdout), EXPECTED);
}

#[test]
fn every_mode_prints_same_result() {
    let f = fixture(ONES_3X3, ONES_KERNEL);
    for mode in ["parallel", "serialized", "redundant"] {
        let out = run_convsoak(&[
            f.input.to_str().unwrap(),
            f.kernel.to_str().unwrap(),
            "2",
            "--mode",
            mode,
        ]);
        assert!(out.status.success(), "mode {mode}");
        assert_eq!(String::from_utf8_lossy(&out.stdout), EXPECTED, "mode {mode}");
    }
}

#[test]
fn zero_iterations_prints_zeros() {
    let f = fixture("2 2\n5 5\n5 5\n", "1\n3\n");
    let out = run_convsoak(&[f.input.to_str().unwrap(), f.kernel.to_str().unwrap(), "0"]);
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout), "Result:\n0 0 \n0 0 \n");
}

#[test]
fn wrong_argument_count_prints_usage() {
    let out = run_convsoak(&["only_one.txt"]);
    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("Usage: "), "stdout: {stdout}");
    assert!(stdout.contains("<input_file> <kernel_file> <iterations>"));
}

#[test]
fn missing_input_file_fails() {
    let f = fixture(ONES_3X3, ONES_KERNEL);
    let missing = f.input.with_file_name("nope.txt");
    let out = run_convsoak(&[missing.to_str().unwrap(), f.kernel.to_str().unwrap(), "1"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Could not open input file"), "stderr: {stderr}");
}

#[test]
fn missing_kernel_file_fails() {
    let f = fixture(ONES_3X3, ONES_KERNEL);
    let missing = f.kernel.with_file_name("nope.txt");
    let out = run_convsoak(&[f.input.to_str().unwrap(), missing.to_str().unwrap(), "1"]);

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Could not open kernel file"), "stderr: {stderr}");
}

#[test]
fn malformed_input_is_reported() {
    let f = fixture("3 3\n1 1 1\n1 1\n", ONES_KERNEL);
    let out = run_convsoak(&[f.input.to_str().unwrap(), f.kernel.to_str().unwrap(), "1"]);

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Malformed input"), "stderr: {stderr}");
}

#[test]
fn even_kernel_is_rejected() {
    let f = fixture(ONES_3X3, "2\n1 1\n1 1\n");
    let out = run_convsoak(&[f.input.to_str().unwrap(), f.kernel.to_str().unwrap(), "1"]);

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Invalid kernel"), "stderr: {stderr}");
}

#[test]
fn report_flag_logs_to_stderr_only() {
    let f = fixture(ONES_3X3, ONES_KERNEL);
    let out = run_convsoak(&[
        f.input.to_str().unwrap(),
        f.kernel.to_str().unwrap(),
        "3",
        "--mode",
        "serialized",
        "--report",
    ]);

    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout), EXPECTED);
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("run complete"), "stderr: {stderr}");
    assert!(stderr.contains("gate contention"), "stderr: {stderr}");
}

#[test]
fn help_succeeds() {
    let out = run_convsoak(&["--help"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("--mode"));
    assert!(stdout.contains("--max-workers"));
}
