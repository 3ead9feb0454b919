//! Integration tests for basic CLI behavior.
//!
//! Tests that the binary exists, accepts standard flags, and each subcommand
//! responds to `--help` with appropriate text.

#![allow(deprecated)] // cargo_bin deprecation, replacement not yet stable

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: get a Command for the `annolens` binary.
fn annolens() -> Command {
    Command::cargo_bin("annolens").expect("binary 'annolens' should be built")
}

// ─── Top-level flags ─────────────────────────────────────────────────────────

#[test]
fn help_flag_shows_usage() {
    annolens()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: annolens"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("bucket"))
        .stdout(predicate::str::contains("filters"))
        .stdout(predicate::str::contains("replay"));
}

#[test]
fn version_flag_shows_semver() {
    annolens()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^annolens \d+\.\d+\.\d+\n$").unwrap());
}

#[test]
fn no_subcommand_fails() {
    annolens()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn unknown_subcommand_fails() {
    annolens().arg("scrub").assert().failure();
}

// ─── Subcommand help ─────────────────────────────────────────────────────────

#[test]
fn list_help_shows_format() {
    annolens()
        .args(["list", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--format"))
        .stdout(predicate::str::contains("--labels"))
        .stdout(predicate::str::contains("--disable-classifier"));
}

#[test]
fn bucket_help_shows_dimensions() {
    annolens()
        .args(["bucket", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--at"))
        .stdout(predicate::str::contains("--native"))
        .stdout(predicate::str::contains("--displayed"));
}

#[test]
fn replay_help_shows_engine_options() {
    annolens()
        .args(["replay", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--speed"))
        .stdout(predicate::str::contains("--ready-after"))
        .stdout(predicate::str::contains("--fail-secondary"))
        .stdout(predicate::str::contains("--seek"));
}

#[test]
fn bucket_requires_at() {
    annolens()
        .args(["bucket", "tests/fixtures/predictions.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--at"));
}

#[test]
fn bad_dimensions_rejected() {
    annolens()
        .args([
            "bucket",
            "tests/fixtures/predictions.json",
            "--at",
            "3",
            "--native",
            "wide",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected WIDTHxHEIGHT"));
}

#[test]
fn missing_config_file_fails() {
    annolens()
        .args([
            "--config",
            "tests/fixtures/does-not-exist.toml",
            "list",
            "tests/fixtures/predictions.json",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}
