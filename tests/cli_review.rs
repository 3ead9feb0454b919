//! Integration tests for the review commands against fixture files.

#![allow(deprecated)] // cargo_bin deprecation, replacement not yet stable

use assert_cmd::Command;
use predicates::prelude::*;

const PREDICTIONS: &str = "tests/fixtures/predictions.json";
const LABELS: &str = "tests/fixtures/labels.json";

/// Helper: `annolens` with an empty config so the user's file is ignored.
fn annolens() -> Command {
    let mut cmd = Command::cargo_bin("annolens").expect("binary 'annolens' should be built");
    cmd.args(["--config", "tests/fixtures/empty.toml"]);
    cmd
}

// ─── list ────────────────────────────────────────────────────────────────────

#[test]
fn list_text_in_time_order() {
    let output = annolens().args(["list", PREDICTIONS]).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("TIME"));
    assert!(lines[1].contains("violence"));
    assert!(lines[2].contains("gun"));
    assert!(lines[3].contains("speech"));
    assert!(lines[4].contains("nudity"));
}

#[test]
fn list_with_labels_adds_ground_truth() {
    annolens()
        .args(["list", PREDICTIONS, "--labels", LABELS, "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"model\": \"Ground-Truth\""))
        .stdout(predicate::str::contains("\"timestamp\": \"00:00:03.100\""));
}

#[test]
fn list_disable_model() {
    annolens()
        .args(["list", PREDICTIONS, "--disable-model", "modelA"])
        .assert()
        .success()
        .stdout(predicate::str::contains("violence").not())
        .stdout(predicate::str::contains("gun").not())
        .stdout(predicate::str::contains("nudity"));
}

#[test]
fn list_unknown_filter_key_fails() {
    annolens()
        .args(["list", PREDICTIONS, "--disable-classifier", "explosions"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown classifier filter 'explosions'"));
}

#[test]
fn list_malformed_input_rejected() {
    annolens()
        .args(["list", "tests/fixtures/malformed.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed prediction #1: missing time"));
}

#[test]
fn config_file_sets_filters_and_format() {
    Command::cargo_bin("annolens")
        .unwrap()
        .args(["--config", "tests/fixtures/review.toml", "list", PREDICTIONS])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("| Time | Classifier |"))
        .stdout(predicate::str::contains("nudity").not());
}

// ─── bucket ──────────────────────────────────────────────────────────────────

#[test]
fn bucket_lists_active_second() {
    annolens()
        .args(["bucket", PREDICTIONS, "--at", "3.2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("violence"))
        .stdout(predicate::str::contains("gun"))
        .stdout(predicate::str::contains("nudity").not());
}

#[test]
fn bucket_covers_segment_span() {
    for at in ["7", "8", "9"] {
        annolens()
            .args(["bucket", PREDICTIONS, "--at", at])
            .assert()
            .success()
            .stdout(predicate::str::contains("speech"));
    }
    annolens()
        .args(["bucket", PREDICTIONS, "--at", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("speech").not());
}

#[test]
fn bucket_overlay_projects_boxes_and_markers() {
    let output = annolens()
        .args([
            "bucket",
            PREDICTIONS,
            "--at",
            "3",
            "--native",
            "1920x1080",
            "--displayed",
            "960x540",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let frame: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(frame["second"], 3);
    assert_eq!(frame["scale"]["x"], 0.5);
    let shapes = frame["shapes"].as_array().unwrap();
    assert_eq!(shapes.len(), 2);
    assert_eq!(shapes[0]["shape"], "box");
    assert_eq!(shapes[1]["shape"], "marker");
}

#[test]
fn bucket_overlay_needs_both_dimensions() {
    annolens()
        .args(["bucket", PREDICTIONS, "--at", "3", "--displayed", "960x540"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Overlay suppressed"));
}

// ─── filters ─────────────────────────────────────────────────────────────────

#[test]
fn filters_show_state() {
    annolens()
        .args(["filters", PREDICTIONS, "--disable-classifier", "gun"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Classifiers:"))
        .stdout(predicate::str::contains("[ ] gun"))
        .stdout(predicate::str::contains("[x] violence"))
        .stdout(predicate::str::contains("Models:"))
        .stdout(predicate::str::contains("[x] modelA"));
}

// ─── replay ──────────────────────────────────────────────────────────────────

#[test]
fn replay_reports_active_annotations() {
    annolens()
        .args(["replay", PREDICTIONS, "--tick-ms", "1", "--speed", "250"])
        .assert()
        .success()
        .stdout(predicate::str::contains("violence [modelA]"))
        .stdout(predicate::str::contains("nudity"))
        .stdout(predicate::str::contains("speech [vad]"))
        .stderr(predicate::str::contains("Waveform released"));
}

#[test]
fn replay_survives_secondary_failure() {
    annolens()
        .args([
            "replay",
            PREDICTIONS,
            "--tick-ms",
            "1",
            "--speed",
            "250",
            "--fail-secondary",
            "decode failed",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("nudity"))
        .stderr(predicate::str::contains("decode failed"))
        .stderr(predicate::str::contains("continuing without waveform"));
}
