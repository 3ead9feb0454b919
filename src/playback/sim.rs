//! In-process engines for headless replay and tests
//!
//! [`SimulatedPrimary`] is a clock that advances only when told to.
//! [`SimulatedSecondary`] records every command it receives so callers can
//! check what was mirrored.

use anyhow::{anyhow, bail, Result};

use super::engine::{
    MediaSource, MountPoint, PrimaryEngine, SecondaryEngine, SeekTarget, SeekUnits,
};
use super::waveform::{WaveformPoint, WaveformSegment};
use super::EngineEvent;
use crate::annotate::Dimensions;

/// Deterministic primary engine
#[derive(Debug, Clone)]
pub struct SimulatedPrimary {
    duration: f64,
    position: f64,
    playing: bool,
    metadata_loaded: bool,
    seek_units: SeekUnits,
    native: Option<Dimensions>,
    displayed: Option<Dimensions>,
    seeks: Vec<SeekTarget>,
}

impl SimulatedPrimary {
    /// Media of `duration` seconds; metadata is not loaded yet
    #[must_use]
    pub fn new(duration: f64) -> Self {
        Self {
            duration: if duration.is_finite() { duration.max(0.0) } else { 0.0 },
            position: 0.0,
            playing: false,
            metadata_loaded: false,
            seek_units: SeekUnits::Seconds,
            native: None,
            displayed: None,
            seeks: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_seek_units(mut self, units: SeekUnits) -> Self {
        self.seek_units = units;
        self
    }

    /// Intrinsic size (reported after metadata) and displayed size
    #[must_use]
    pub fn with_dimensions(mut self, native: Dimensions, displayed: Dimensions) -> Self {
        self.native = Some(native);
        self.displayed = Some(displayed);
        self
    }

    /// Make duration and intrinsic size available
    pub fn load_metadata(&mut self) -> EngineEvent {
        self.metadata_loaded = true;
        EngineEvent::PrimaryMetadataLoaded
    }

    /// Move the clock forward by `seconds` if playing and report progress.
    ///
    /// Playback pauses itself at the end of the media.
    pub fn advance(&mut self, seconds: f64) -> EngineEvent {
        if self.playing && seconds.is_finite() && seconds > 0.0 {
            self.position = (self.position + seconds).min(self.duration);
            if self.is_finished() {
                self.playing = false;
            }
        }
        EngineEvent::PrimaryProgress {
            played_seconds: self.position,
            loaded_seconds: if self.metadata_loaded { self.duration } else { 0.0 },
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.duration
    }

    /// Every seek command received, in order
    pub fn seeks(&self) -> &[SeekTarget] {
        &self.seeks
    }
}

impl PrimaryEngine for SimulatedPrimary {
    fn seek_to(&mut self, target: SeekTarget) {
        self.position = match target {
            SeekTarget::Seconds(s) => s.clamp(0.0, self.duration),
            SeekTarget::Fraction(f) => f.clamp(0.0, 1.0) * self.duration,
        };
        self.seeks.push(target);
    }

    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn seek_units(&self) -> SeekUnits {
        self.seek_units
    }

    fn duration(&self) -> Option<f64> {
        self.metadata_loaded.then_some(self.duration)
    }

    fn intrinsic_dimensions(&self) -> Option<Dimensions> {
        self.native.filter(|_| self.metadata_loaded)
    }

    fn displayed_dimensions(&self) -> Option<Dimensions> {
        self.displayed
    }
}

/// Command the synchronizer sent to the secondary engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SecondaryCommand {
    Seek(f64),
    Play,
    Pause,
}

/// Recording secondary engine
#[derive(Debug, Default)]
pub struct SimulatedSecondary {
    failure: Option<String>,
    mount: Option<String>,
    points: usize,
    segments: usize,
    init_count: usize,
    destroyed: bool,
    commands: Vec<SecondaryCommand>,
}

impl SimulatedSecondary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine whose `init` always fails with `message`
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.init_count > 0 && !self.destroyed
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn init_count(&self) -> usize {
        self.init_count
    }

    pub fn mount(&self) -> Option<&str> {
        self.mount.as_deref()
    }

    pub fn point_count(&self) -> usize {
        self.points
    }

    pub fn segment_count(&self) -> usize {
        self.segments
    }

    pub fn commands(&self) -> &[SecondaryCommand] {
        &self.commands
    }
}

impl SecondaryEngine for SimulatedSecondary {
    fn init(
        &mut self,
        mount: &MountPoint,
        _media: &MediaSource,
        points: &[WaveformPoint],
        segments: &[WaveformSegment],
    ) -> Result<()> {
        if self.destroyed {
            bail!("engine already destroyed");
        }
        if let Some(message) = &self.failure {
            return Err(anyhow!("{message}"));
        }

        self.init_count += 1;
        self.mount = Some(mount.as_str().to_string());
        self.points = points.len();
        self.segments = segments.len();
        Ok(())
    }

    fn seek(&mut self, seconds: f64) {
        self.commands.push(SecondaryCommand::Seek(seconds));
    }

    fn play(&mut self) {
        self.commands.push(SecondaryCommand::Play);
    }

    fn pause(&mut self) {
        self.commands.push(SecondaryCommand::Pause);
    }

    fn destroy(&mut self) {
        self.destroyed = true;
    }
}
