//! `annolens` - Annotation review against a media timeline
//!
//! # Features
//!
//! - **Loading**: predictions and ground-truth labels merged into one
//!   time-sorted set, malformed records rejected up front
//! - **Time index**: per-second buckets, multi-second segments expanded
//! - **Live filters**: classifier and model toggles
//! - **Overlay**: boxes and markers projected from native to display size
//! - **Playback sync**: a primary clock mirrored to a secondary waveform
//!   engine without feedback loops
//! - **Replay**: headless playback against simulated engines
//!
//! # Example
//!
//! ```rust
//! use annolens::annotate::{load, RawRecord};
//! use annolens::playback::{EngineEvent, SimulatedPrimary, SimulatedSecondary};
//! use annolens::ReviewSession;
//!
//! let set = load(&[RawRecord::prediction("violence", 3000.0, 0.9)], None).unwrap();
//! let mut session: ReviewSession<SimulatedPrimary, SimulatedSecondary> =
//!     ReviewSession::open(set, SimulatedPrimary::new(30.0));
//!
//! session
//!     .handle(EngineEvent::PrimaryProgress { played_seconds: 2.6, loaded_seconds: 30.0 })
//!     .unwrap();
//! assert_eq!(session.active_now().len(), 1);
//! ```

pub mod annotate;
pub mod config;
pub mod playback;
pub mod replay;
pub mod session;

pub use annotate::{
    Annotation, AnnotationError, AnnotationKind, AnnotationSet, FilterState, OverlayProjector,
    TimeIndex,
};
pub use config::{load_config, Config};
pub use playback::{
    EngineEvent, PlaybackSynchronizer, PrimaryEngine, SecondaryEngine, SyncError, SyncState,
};
pub use replay::{replay, ReplayPlan, ReplaySummary};
pub use session::ReviewSession;

/// Version of annolens
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
