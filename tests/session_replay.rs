//! Library-level tests: load fixture files, replay a session, tear it down.

use std::path::Path;
use std::time::Duration;

use annolens::annotate::{load_files, AnnotationError};
use annolens::playback::{
    MediaSource, MountPoint, SecondaryCommand, SimulatedPrimary, SimulatedSecondary,
};
use annolens::{replay, ReplayPlan, ReviewSession, SyncState};

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn fast_plan() -> ReplayPlan {
    ReplayPlan {
        tick: Duration::from_millis(1),
        speed: 250.0,
        ..ReplayPlan::default()
    }
}

#[test]
fn fixture_loads_with_labels() {
    let set = load_files(&fixture("predictions.json"), Some(&fixture("labels.json"))).unwrap();

    assert_eq!(set.len(), 5);
    assert!(set.models().contains("Ground-Truth"));
    let times: Vec<u64> = set.iter().map(|a| a.time_ms).collect();
    assert_eq!(times, vec![3000, 3100, 3400, 7000, 10000]);
}

#[test]
fn malformed_fixture_names_the_record() {
    let err = load_files(&fixture("malformed.json"), None).unwrap_err();
    assert!(matches!(err, AnnotationError::Malformed { index: 1, .. }));
}

#[test]
fn replay_then_close_releases_waveform() {
    let set = load_files(&fixture("predictions.json"), None).unwrap();
    let mut session: ReviewSession<SimulatedPrimary, SimulatedSecondary> =
        ReviewSession::open(set, SimulatedPrimary::new(11.0));
    session
        .attach_secondary(
            SimulatedSecondary::new(),
            MountPoint::new("waveform"),
            MediaSource::new("clip.mp4"),
        )
        .unwrap();

    let mut violence_seconds = Vec::new();
    let summary = tokio_test::block_on(replay(&mut session, &fast_plan(), |report| {
        if report.active.iter().any(|a| a.classifier == "violence") {
            violence_seconds.push(report.second);
        }
    }))
    .unwrap();

    assert_eq!(violence_seconds, vec![3]);
    assert_eq!(summary.final_state, SyncState::Ready);

    let waveform = session.close().unwrap();
    assert!(waveform.is_destroyed());
    assert_eq!(waveform.point_count(), 3);
    assert_eq!(waveform.segment_count(), 1);
    assert_eq!(
        waveform.commands(),
        &[SecondaryCommand::Play, SecondaryCommand::Pause]
    );
}

#[test]
fn disabled_classifier_never_reported() {
    let set = load_files(&fixture("predictions.json"), None).unwrap();
    let mut session: ReviewSession<SimulatedPrimary, SimulatedSecondary> =
        ReviewSession::open(set, SimulatedPrimary::new(11.0));
    session.filters_mut().set_classifier("violence", false).unwrap();

    let mut seen = Vec::new();
    tokio_test::block_on(replay(&mut session, &fast_plan(), |report| {
        seen.extend(report.active.iter().map(|a| a.classifier.clone()));
    }))
    .unwrap();

    assert!(!seen.iter().any(|c| c == "violence"));
    assert!(seen.iter().any(|c| c == "nudity"));
}
