//! Dual-engine playback synchronization
//!
//! The primary engine is the only clock. Its progress ticks drive the
//! logical current time; its play/pause changes are mirrored to the
//! secondary engine as commands. The secondary engine talks back only with
//! user seeks, which are forwarded to the primary. Nothing flows the other
//! way, so the two engines cannot feed each other.
//!
//! ```text
//! Unbound ──attach+mount+media──▶ Bound ──ready──▶ Ready
//!                                   │                │
//!                                   └──init failure/error──▶ Error ◀──error
//! ```

use std::fmt;
use tracing::{debug, info, warn};

use super::engine::{
    EngineEvent, MediaSource, MountPoint, PrimaryEngine, SecondaryEngine, SeekTarget, SeekUnits,
};
use super::waveform::WaveformIndex;
use super::SyncError;
use crate::annotate::{bucket_for_seconds, AnnotationSet};

/// Lifecycle of the secondary engine binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    /// No secondary engine attached
    Unbound,
    /// Secondary engine initializing (e.g. generating a waveform)
    Bound,
    /// Both engines initialized and cross-wired
    Ready,
    /// Secondary engine failed; primary keeps working on its own
    Error(String),
}

impl SyncState {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unbound => "unbound",
            Self::Bound => "bound",
            Self::Ready => "ready",
            Self::Error(_) => "error",
        }
    }

    /// Whether the state machine allows moving from `self` to `next`.
    ///
    /// `Error` is only reachable from `Bound` or `Ready`; teardown may
    /// return to `Unbound` from anywhere.
    #[must_use]
    pub fn can_transition_to(&self, next: &SyncState) -> bool {
        matches!(
            (self, next),
            (_, Self::Unbound)
                | (Self::Unbound, Self::Bound)
                | (Self::Bound, Self::Ready | Self::Error(_))
                | (Self::Ready, Self::Error(_))
        )
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reconciles a primary and a secondary engine into one logical timeline
pub struct PlaybackSynchronizer<P: PrimaryEngine, S: SecondaryEngine> {
    primary: P,
    secondary: Option<S>,
    waveform: Option<WaveformIndex>,
    mount: Option<MountPoint>,
    media: Option<MediaSource>,
    state: SyncState,
    current_time: f64,
    loaded_time: f64,
    playing: bool,
}

impl<P: PrimaryEngine, S: SecondaryEngine> PlaybackSynchronizer<P, S> {
    /// Wrap a primary engine; no secondary is bound yet
    pub fn new(primary: P) -> Self {
        Self {
            primary,
            secondary: None,
            waveform: None,
            mount: None,
            media: None,
            state: SyncState::Unbound,
            current_time: 0.0,
            loaded_time: 0.0,
            playing: false,
        }
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == SyncState::Ready
    }

    /// Message of the secondary engine failure, if any
    pub fn last_error(&self) -> Option<&str> {
        match &self.state {
            SyncState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Logical playback position in seconds
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Buffered position reported by the primary engine, in seconds
    pub fn loaded_time(&self) -> f64 {
        self.loaded_time
    }

    /// Time index bucket for the current position
    pub fn current_second(&self) -> u64 {
        bucket_for_seconds(self.current_time)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn primary_mut(&mut self) -> &mut P {
        &mut self.primary
    }

    pub fn secondary(&self) -> Option<&S> {
        self.secondary.as_ref()
    }

    /// Points and segments handed to the secondary engine
    pub fn waveform(&self) -> Option<&WaveformIndex> {
        self.waveform.as_ref()
    }

    /// Provide the secondary engine's mount point
    pub fn set_mount(&mut self, mount: MountPoint) -> Result<(), SyncError> {
        self.mount = Some(mount);
        self.try_bind()
    }

    /// Provide the media reference shared by both engines
    pub fn set_media(&mut self, media: MediaSource) -> Result<(), SyncError> {
        self.media = Some(media);
        self.try_bind()
    }

    /// Attach the secondary engine and derive its index from `set`.
    ///
    /// Initialization starts as soon as mount point and media are known,
    /// whichever arrives last.
    pub fn attach(&mut self, secondary: S, set: &AnnotationSet) -> Result<(), SyncError> {
        if self.secondary.is_some() {
            return Err(SyncError::AlreadyAttached);
        }
        self.waveform = Some(WaveformIndex::build(set));
        self.secondary = Some(secondary);
        self.try_bind()
    }

    fn try_bind(&mut self) -> Result<(), SyncError> {
        // Construction happens at most once per binding
        if self.state != SyncState::Unbound {
            return Ok(());
        }

        let (Some(secondary), Some(mount), Some(media), Some(waveform)) = (
            self.secondary.as_mut(),
            self.mount.as_ref(),
            self.media.as_ref(),
            self.waveform.as_ref(),
        ) else {
            return Ok(());
        };

        info!(
            "Initializing secondary engine at {} for {} ({} points, {} segments)",
            mount.as_str(),
            media.as_str(),
            waveform.points.len(),
            waveform.segments.len()
        );

        let result = secondary.init(mount, media, &waveform.points, &waveform.segments);

        // Bound covers the init attempt itself, so a failure is Bound -> Error
        self.set_state(SyncState::Bound);
        result.map_err(|e| {
            let message = format!("{e:#}");
            warn!("Secondary engine init failed: {message}");
            self.set_state(SyncState::Error(message.clone()));
            SyncError::SecondaryEngineInitFailed(message)
        })
    }

    fn set_state(&mut self, next: SyncState) {
        debug_assert!(
            self.state.can_transition_to(&next),
            "invalid transition {} -> {next}",
            self.state
        );
        debug!("Sync state {} -> {next}", self.state);
        self.state = next;
    }

    /// Apply one engine event.
    ///
    /// Events that do not apply to the current state are ignored. A
    /// secondary seek before `Ready` returns [`SyncError::NotReady`].
    pub fn handle(&mut self, event: EngineEvent) -> Result<(), SyncError> {
        debug!("{} in state {}", event.name(), self.state);

        match event {
            EngineEvent::PrimaryProgress {
                played_seconds,
                loaded_seconds,
            } => {
                self.current_time = sanitize(played_seconds);
                self.loaded_time = sanitize(loaded_seconds);
            }
            EngineEvent::PrimaryPlay => {
                self.playing = true;
                self.mirror(S::play);
            }
            EngineEvent::PrimaryPause => {
                self.playing = false;
                self.mirror(S::pause);
            }
            EngineEvent::PrimaryMetadataLoaded => {
                debug!("Primary duration: {:?}", self.primary.duration());
            }
            EngineEvent::SecondaryReady => {
                if self.state == SyncState::Bound {
                    self.set_state(SyncState::Ready);
                    info!("Secondary engine ready");
                    if self.playing {
                        self.mirror(S::play);
                    }
                }
            }
            EngineEvent::SecondaryError(message) => {
                if matches!(self.state, SyncState::Bound | SyncState::Ready) {
                    warn!("Secondary engine error: {message}");
                    self.set_state(SyncState::Error(message));
                }
            }
            EngineEvent::SecondarySeek(seconds) => return self.forward_seek(seconds),
        }

        Ok(())
    }

    fn mirror(&mut self, command: fn(&mut S)) {
        if self.state != SyncState::Ready {
            return;
        }
        if let Some(secondary) = self.secondary.as_mut() {
            command(secondary);
        }
    }

    fn forward_seek(&mut self, seconds: f64) -> Result<(), SyncError> {
        if !self.is_ready() {
            return Err(SyncError::NotReady(self.state.name()));
        }

        let mut seconds = sanitize(seconds);
        let duration = self
            .primary
            .duration()
            .filter(|d| d.is_finite() && *d > 0.0);
        if let Some(duration) = duration {
            seconds = seconds.min(duration);
        }

        let target = match self.primary.seek_units() {
            SeekUnits::Seconds => SeekTarget::Seconds(seconds),
            SeekUnits::Fraction => {
                let duration = duration.ok_or(SyncError::DurationUnknown)?;
                SeekTarget::Fraction(seconds / duration)
            }
        };

        debug!("Forwarding secondary seek to primary: {target:?}");
        self.primary.seek_to(target);
        self.current_time = seconds;
        Ok(())
    }

    /// Release the secondary engine and return to `Unbound`.
    ///
    /// Returns the destroyed engine, if one was attached.
    pub fn teardown(&mut self) -> Option<S> {
        let secondary = self.secondary.take().map(|mut secondary| {
            secondary.destroy();
            secondary
        });
        if secondary.is_some() {
            info!("Secondary engine released");
        }

        self.waveform = None;
        self.mount = None;
        self.media = None;
        self.set_state(SyncState::Unbound);
        secondary
    }
}

impl<P: PrimaryEngine, S: SecondaryEngine> Drop for PlaybackSynchronizer<P, S> {
    fn drop(&mut self) {
        if let Some(secondary) = self.secondary.as_mut() {
            secondary.destroy();
        }
    }
}

fn sanitize(seconds: f64) -> f64 {
    if seconds.is_finite() {
        seconds.max(0.0)
    } else {
        0.0
    }
}
