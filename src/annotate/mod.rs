//! Annotation aggregation, time indexing and filtering
//!
//! Takes the classifier output for one media item and makes it reviewable
//! against the playback clock.
//!
//! # Pipeline
//!
//! - **Loading** - predictions and ground-truth labels merged into one
//!   time-sorted [`AnnotationSet`]
//! - **Indexing** - per-second [`TimeIndex`] buckets, segments expanded
//! - **Filtering** - live classifier/model toggles in [`FilterState`]
//! - **Overlay** - native→display projection of boxes and markers
//! - **Listing** - the same annotations as table rows
//!
//! # Example
//!
//! ```rust
//! use annolens::annotate::{load, FilterState, RawRecord, TimeIndex};
//!
//! let predictions = vec![
//!     RawRecord::prediction("violence", 3000.0, 1.0),
//!     RawRecord::prediction("nudity", 10000.0, 4.0),
//! ];
//! let set = load(&predictions, None).unwrap();
//! let index = TimeIndex::build(&set);
//! let filters = FilterState::seed(&set);
//!
//! assert_eq!(filters.active(index.bucket(3)).len(), 1);
//! ```

pub mod color;
pub mod filter;
pub mod index;
pub mod listing;
pub mod loader;
pub mod model;
pub mod overlay;

use thiserror::Error;

pub use color::{color, color_of, Rgba};
pub use filter::{FilterKind, FilterState};
pub use index::{bucket_for_millis, bucket_for_seconds, TimeIndex};
pub use listing::{format_timestamp, Listing, ListingFormat, ListingRow};
pub use loader::{load, load_files, parse_records, RawKind, RawRecord};
pub use model::{Annotation, AnnotationKind, AnnotationSet, Origin, Region, GROUND_TRUTH_MODEL};
pub use overlay::{Dimensions, OverlayFrame, OverlayProjector, OverlayStyle, Scale, Shape};

/// Annotation pipeline errors
#[derive(Error, Debug)]
pub enum AnnotationError {
    #[error("malformed {origin} #{index}: {reason}")]
    Malformed {
        origin: Origin,
        index: usize,
        reason: String,
    },

    #[error("unknown {kind} filter '{key}'")]
    UnknownFilterKey { kind: FilterKind, key: String },

    #[error("media dimensions not available yet")]
    DimensionsUnavailable,

    #[error("time index has not been built yet")]
    IndexConstructionSkipped,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Format error: {0}")]
    Format(#[from] std::fmt::Error),
}

pub type Result<T> = std::result::Result<T, AnnotationError>;
