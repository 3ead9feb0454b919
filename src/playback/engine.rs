//! Playback engine contracts.
//!
//! The review surface drives two independently clocked engines: a
//! [`PrimaryEngine`] (the video/audio element, canonical clock) and a
//! [`SecondaryEngine`] (waveform/region view, best-effort mirror). Engines
//! report back through [`EngineEvent`]s; the synchronizer only ever sends
//! them explicit commands.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::waveform::{WaveformPoint, WaveformSegment};
use crate::annotate::Dimensions;

/// Unit a primary engine expects for seek commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeekUnits {
    /// Absolute position in seconds
    #[default]
    Seconds,
    /// Normalized position `0.0..=1.0` of the media duration
    Fraction,
}

/// Seek command for the primary engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekTarget {
    Seconds(f64),
    Fraction(f64),
}

/// Where the secondary engine attaches its view (e.g. a container id)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPoint(String);

impl MountPoint {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Media both engines play
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSource(String);

impl MediaSource {
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Callback-style notifications from either engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Periodic progress tick from the primary engine
    PrimaryProgress {
        played_seconds: f64,
        loaded_seconds: f64,
    },
    /// Primary engine started playing
    PrimaryPlay,
    /// Primary engine paused
    PrimaryPause,
    /// Primary engine knows its intrinsic dimensions and duration
    PrimaryMetadataLoaded,
    /// Secondary engine finished building its view
    SecondaryReady,
    /// Secondary engine failed to initialize
    SecondaryError(String),
    /// User seeked on the secondary engine (absolute seconds)
    SecondarySeek(f64),
}

impl EngineEvent {
    /// Short name for logging
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::PrimaryProgress { .. } => "primary-progress",
            Self::PrimaryPlay => "primary-play",
            Self::PrimaryPause => "primary-pause",
            Self::PrimaryMetadataLoaded => "primary-metadata",
            Self::SecondaryReady => "secondary-ready",
            Self::SecondaryError(_) => "secondary-error",
            Self::SecondarySeek(_) => "secondary-seek",
        }
    }
}

/// The authoritative playback engine.
pub trait PrimaryEngine {
    /// Jump to a position.
    fn seek_to(&mut self, target: SeekTarget);

    fn play(&mut self);

    fn pause(&mut self);

    /// Unit this engine expects in [`seek_to`](Self::seek_to).
    fn seek_units(&self) -> SeekUnits {
        SeekUnits::Seconds
    }

    /// Media duration in seconds, once known.
    fn duration(&self) -> Option<f64>;

    /// Intrinsic size of the rendered media, once metadata has loaded.
    fn intrinsic_dimensions(&self) -> Option<Dimensions>;

    /// Size the media is currently displayed at.
    fn displayed_dimensions(&self) -> Option<Dimensions>;
}

/// The mirrored waveform/region engine.
///
/// `init` may finish asynchronously: success is reported later as
/// [`EngineEvent::SecondaryReady`], failure either as an `Err` here or as
/// [`EngineEvent::SecondaryError`].
pub trait SecondaryEngine {
    /// Start building the view from precomputed points and segments.
    fn init(
        &mut self,
        mount: &MountPoint,
        media: &MediaSource,
        points: &[WaveformPoint],
        segments: &[WaveformSegment],
    ) -> Result<()>;

    fn seek(&mut self, seconds: f64);

    fn play(&mut self);

    fn pause(&mut self);

    /// Release every resource held by the view.
    fn destroy(&mut self);
}
