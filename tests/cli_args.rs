//! Integration tests for CLI argument handling
//!
//! Tests the --format flag and the failure path for unknown formats.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Helper to run the CLI with given args inside `dir` and capture output
fn run_cli(dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_catalog-enricher"))
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to execute catalog-enricher")
}

#[test]
fn test_help_flag_exits_successfully() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let output = run_cli(temp_dir.path(), &["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("catalog-enricher"), "Help should mention the binary");
    assert!(stdout.contains("format"), "Help should mention --format flag");
}

#[test]
fn test_invalid_format_prints_error_and_exits() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let output = run_cli(temp_dir.path(), &["--format", "xml"]);

    assert!(!output.status.success(), "Expected invalid format to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid format"),
        "Should print error message about invalid format: {}",
        stderr
    );
    assert!(
        !temp_dir.path().join("files").exists(),
        "No output directory should be created for an invalid format"
    );
}

#[test]
fn test_invalid_format_is_logged_to_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let output = run_cli(temp_dir.path(), &["--format", "yaml"]);

    assert!(!output.status.success());
    let log = std::fs::read_to_string(temp_dir.path().join("logs").join("log.txt"))
        .expect("Log file should exist");
    assert!(log.contains("yaml"), "Log should record the rejected format: {}", log);
}

#[test]
fn test_unknown_flag_is_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let output = run_cli(temp_dir.path(), &["--plan"]);
    assert!(!output.status.success());
}

#[test]
fn test_unreachable_api_exits_with_failure() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    // Port 9 (discard) on localhost refuses connections on typical hosts
    let output = run_cli(
        temp_dir.path(),
        &["--base-url", "http://127.0.0.1:9", "--retries", "1"],
    );

    assert!(!output.status.success());
    assert!(!temp_dir
        .path()
        .join("files")
        .join("grouped_products.json")
        .exists());
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use catalog_enricher::cli::{parse_format_arg, Cli, RunConfig};
    use catalog_enricher::output::OutputFormat;
    use clap::Parser;

    #[test]
    fn test_format_arg_parsing() {
        assert_eq!(parse_format_arg("json").unwrap(), OutputFormat::Json);
        assert_eq!(parse_format_arg("csv").unwrap(), OutputFormat::Csv);
        assert!(parse_format_arg("tsv").is_err());
    }

    #[test]
    fn test_cli_with_csv_format() {
        let cli = Cli::parse_from(["catalog-enricher", "--format", "csv"]);
        let config = RunConfig::from_cli(&cli).unwrap();
        assert_eq!(config.format, OutputFormat::Csv);
    }
}
