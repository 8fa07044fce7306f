// tests/common/mod.rs
// Shared test utilities for integration tests
#![allow(dead_code)]

use std::io::Write;
use std::process::{Command, Stdio};
use tempfile::NamedTempFile;

pub const HEADER: &str = "id,value,label,timestamp";

fn csvtally_command(args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_csvtally"));
    // Keep user and project config files out of the picture
    cmd.arg("--ignore-config")
        .args(args)
        .env("NO_EMOJI", "1")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    cmd
}

fn collect(output: std::process::Output) -> (String, String, i32) {
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

/// Run csvtally with given arguments and input via stdin
pub fn run_csvtally_with_input(args: &[&str], input: &str) -> (String, String, i32) {
    let mut child = csvtally_command(args)
        .stdin(Stdio::piped())
        .spawn()
        .expect("Failed to start csvtally");

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(input.as_bytes())
            .expect("Failed to write to stdin");
    }

    collect(child.wait_with_output().expect("Failed to read output"))
}

/// Run csvtally on a temporary file holding `file_content`
pub fn run_csvtally_with_file(args: &[&str], file_content: &str) -> (String, String, i32) {
    run_csvtally_with_bytes(args, file_content.as_bytes())
}

/// Run csvtally on a temporary file holding raw (possibly compressed) bytes
pub fn run_csvtally_with_bytes(args: &[&str], bytes: &[u8]) -> (String, String, i32) {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file
        .write_all(bytes)
        .expect("Failed to write to temp file");

    let path = temp_file.path().to_str().expect("temp path is UTF-8");
    let mut full_args = args.to_vec();
    full_args.push(path);

    collect(
        csvtally_command(&full_args)
            .output()
            .expect("Failed to execute csvtally"),
    )
}

/// Run csvtally with exactly these arguments and no input
pub fn run_csvtally(args: &[&str]) -> (String, String, i32) {
    collect(
        csvtally_command(args)
            .stdin(Stdio::null())
            .output()
            .expect("Failed to execute csvtally"),
    )
}

/// Build CSV content from data rows, prefixed with the standard header
pub fn csv_with_rows(rows: &[&str]) -> String {
    let mut content = String::from(HEADER);
    content.push('\n');
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    content
}

/// Value of a `Key: value` line in the text report
pub fn report_field<'a>(stdout: &'a str, key: &str) -> Option<&'a str> {
    stdout
        .lines()
        .find_map(|line| line.strip_prefix(key)?.strip_prefix(": "))
}
