//! Playback synchronization between a primary and a secondary engine
//!
//! - [`engine`] - engine traits and the events they emit
//! - [`waveform`] - points and segments handed to the secondary engine
//! - [`sync`] - the state machine that keeps both engines on one timeline
//! - [`sim`] - deterministic engines for replay and tests

pub mod engine;
pub mod sim;
pub mod sync;
pub mod waveform;

use thiserror::Error;

pub use engine::{
    EngineEvent, MediaSource, MountPoint, PrimaryEngine, SecondaryEngine, SeekTarget, SeekUnits,
};
pub use sim::{SecondaryCommand, SimulatedPrimary, SimulatedSecondary};
pub use sync::{PlaybackSynchronizer, SyncState};
pub use waveform::{WaveformIndex, WaveformPoint, WaveformSegment};

/// Synchronization errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    #[error("secondary engine failed to initialize: {0}")]
    SecondaryEngineInitFailed(String),

    #[error("synchronizer is {0}, not ready")]
    NotReady(&'static str),

    #[error("primary engine duration unknown, cannot seek by fraction")]
    DurationUnknown,

    #[error("a secondary engine is already attached")]
    AlreadyAttached,
}
