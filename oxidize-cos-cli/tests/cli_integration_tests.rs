//! Integration tests for the oxidizecos CLI
//!
//! Runs the built binary against small files written to a temporary
//! directory and checks its output and exit status.

use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::{tempdir, TempDir};

const SAMPLE: &[u8] = b"%PDF-1.7\n\
1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n\
2 0 obj\n<< /Type /Pages /Kids [] /Count 0 >>\nendobj\n";

fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("Failed to write fixture");
    path
}

fn run_cli_command(args: &[&str]) -> Result<Output> {
    let output = Command::new(env!("CARGO_BIN_EXE_oxidizecos"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()?;
    Ok(output)
}

fn offset_of(needle: &[u8]) -> usize {
    SAMPLE
        .windows(needle.len())
        .position(|window| window == needle)
        .expect("needle present")
}

#[test]
fn test_cli_help() -> Result<()> {
    let output = run_cli_command(&["--help"])?;
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("parse"));
    Ok(())
}

#[test]
fn test_parse_single_dictionary() -> Result<()> {
    let dir = tempdir()?;
    let path = write_file(&dir, "sample.pdf", SAMPLE);
    let offset = offset_of(b"<< /Type /Catalog").to_string();

    let output = run_cli_command(&["parse", path.to_str().unwrap(), "--offset", &offset])?;
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("#1 dictionary"));
    assert!(stdout.contains("Catalog"));
    assert!(!stdout.contains("warning:"));
    Ok(())
}

#[test]
fn test_parse_steps_over_endobj() -> Result<()> {
    let dir = tempdir()?;
    let body = b"<< /A 1 >>\nendobj\n[1 2 3]\nendobj\n";
    let path = write_file(&dir, "bodies.pdf", body);

    let output = run_cli_command(&["parse", path.to_str().unwrap(), "--count", "3"])?;
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("#1 dictionary"));
    assert!(stdout.contains("#2 array"));
    assert!(stdout.contains("End of input after 2 object(s)"));
    Ok(())
}

#[test]
fn test_parse_reports_warnings() -> Result<()> {
    let dir = tempdir()?;
    let path = write_file(&dir, "broken.pdf", b"(never closed");

    let output = run_cli_command(&["parse", path.to_str().unwrap()])?;
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("warning: Unterminated string"));

    let output = run_cli_command(&["parse", path.to_str().unwrap(), "--strict"])?;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unterminated literal string"));
    Ok(())
}

#[test]
fn test_parse_decodes_names_on_request() -> Result<()> {
    let dir = tempdir()?;
    let path = write_file(&dir, "names.pdf", b"/Lime#20Green");

    let output = run_cli_command(&["parse", path.to_str().unwrap(), "--decode-names"])?;
    assert!(output.status.success(), "{output:?}");
    assert!(String::from_utf8_lossy(&output.stdout).contains("Lime Green"));

    let output = run_cli_command(&["parse", path.to_str().unwrap()])?;
    assert!(String::from_utf8_lossy(&output.stdout).contains("Lime#20Green"));
    Ok(())
}

#[test]
fn test_parse_fails_on_invalid_input() -> Result<()> {
    let dir = tempdir()?;
    let path = write_file(&dir, "garbage.pdf", b"} not an object");

    let output = run_cli_command(&["parse", path.to_str().unwrap()])?;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to parse object 1"));
    Ok(())
}

#[test]
fn test_parse_rejects_offset_past_end() -> Result<()> {
    let dir = tempdir()?;
    let path = write_file(&dir, "short.pdf", b"null");

    let output = run_cli_command(&["parse", path.to_str().unwrap(), "--offset", "100"])?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("outside the file"));
    Ok(())
}

#[test]
fn test_parse_missing_file() -> Result<()> {
    let output = run_cli_command(&["parse", "/nonexistent/input.pdf"])?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read"));
    Ok(())
}

#[test]
fn test_parse_with_object_identity() -> Result<()> {
    let dir = tempdir()?;
    let path = write_file(&dir, "ref.pdf", b"[4 0 R (text)]");

    let output = run_cli_command(&["parse", path.to_str().unwrap(), "--object", "4", "0"])?;
    assert!(output.status.success(), "{output:?}");
    assert!(String::from_utf8_lossy(&output.stdout).contains("#1 array"));

    let output = run_cli_command(&["parse", path.to_str().unwrap(), "--object", "4", "70000"])?;
    assert!(!output.status.success());
    Ok(())
}
