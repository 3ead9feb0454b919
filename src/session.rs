//! One review session: a loaded annotation set played against a media item.
//!
//! The session owns the immutable data (set and time index), the only
//! mutable core state (filters), the overlay projector and the playback
//! synchronizer. Every change goes through `&mut self`, so the single event
//! stream serializes all mutation.

use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::annotate::{
    self, Annotation, AnnotationError, AnnotationSet, FilterState, Listing, ListingRow,
    OverlayFrame, OverlayProjector, OverlayStyle, TimeIndex,
};
use crate::playback::{
    EngineEvent, MediaSource, MountPoint, PlaybackSynchronizer, PrimaryEngine, SecondaryEngine,
    SyncError,
};

/// Annotations, filters, overlay and engine sync for one media item
pub struct ReviewSession<P: PrimaryEngine, S: SecondaryEngine> {
    set: AnnotationSet,
    index: OnceCell<TimeIndex>,
    filters: FilterState,
    projector: OverlayProjector,
    sync: PlaybackSynchronizer<P, S>,
    closed: bool,
}

impl<P: PrimaryEngine, S: SecondaryEngine> ReviewSession<P, S> {
    /// Create a session without building the time index yet.
    ///
    /// Lookups return nothing until [`build_index`](Self::build_index) runs.
    pub fn new(set: AnnotationSet, primary: P) -> Self {
        let filters = FilterState::seed(&set);
        let mut projector = OverlayProjector::new();
        projector.set_native(primary.intrinsic_dimensions());
        projector.set_displayed(primary.displayed_dimensions());

        Self {
            set,
            index: OnceCell::new(),
            filters,
            projector,
            sync: PlaybackSynchronizer::new(primary),
            closed: false,
        }
    }

    /// Create a session and build its time index immediately
    pub fn open(set: AnnotationSet, primary: P) -> Self {
        let session = Self::new(set, primary);
        session.build_index();
        session
    }

    #[must_use]
    pub fn with_overlay_style(mut self, style: OverlayStyle) -> Self {
        self.projector = self.projector.with_style(style);
        self
    }

    pub fn set(&self) -> &AnnotationSet {
        &self.set
    }

    /// Build the time index; later calls return the same index
    pub fn build_index(&self) -> &TimeIndex {
        self.index.get_or_init(|| {
            let index = TimeIndex::build(&self.set);
            info!(
                "Indexed {} annotations into {} buckets",
                self.set.len(),
                index.len()
            );
            index
        })
    }

    pub fn index(&self) -> Option<&TimeIndex> {
        self.index.get()
    }

    /// Unfiltered bucket contents, or `IndexConstructionSkipped` if the
    /// index is not built yet
    pub fn lookup(&self, second: u64) -> annotate::Result<&[Arc<Annotation>]> {
        self.index
            .get()
            .map(|index| index.bucket(second))
            .ok_or(AnnotationError::IndexConstructionSkipped)
    }

    /// Active annotations in one bucket; empty before the index exists
    pub fn active_at(&self, second: u64) -> Vec<Arc<Annotation>> {
        match self.lookup(second) {
            Ok(bucket) => self.filters.active(bucket),
            Err(e) => {
                debug!("{e}; second {second} has no active annotations");
                Vec::new()
            }
        }
    }

    /// Bucket of the synchronizer's current time
    pub fn current_second(&self) -> u64 {
        self.sync.current_second()
    }

    pub fn active_now(&self) -> Vec<Arc<Annotation>> {
        self.active_at(self.current_second())
    }

    /// Overlay shapes for the current second.
    ///
    /// `DimensionsUnavailable` means the overlay should not be drawn yet.
    pub fn overlay_now(&self) -> annotate::Result<OverlayFrame> {
        let second = self.current_second();
        self.projector.project(second, &self.active_at(second))
    }

    /// Listing rows for the whole set under the current filters
    pub fn listing(&self) -> Vec<ListingRow> {
        Listing::rows(&self.set, &self.filters)
    }

    /// Re-read native and displayed sizes from the primary engine (after
    /// metadata loads or the view resizes)
    pub fn refresh_dimensions(&mut self) {
        let primary = self.sync.primary();
        self.projector.set_native(primary.intrinsic_dimensions());
        self.projector.set_displayed(primary.displayed_dimensions());
        debug!("Overlay ready: {}", self.projector.is_ready());
    }

    /// Bind a secondary engine to `mount` and `media`
    pub fn attach_secondary(
        &mut self,
        secondary: S,
        mount: MountPoint,
        media: MediaSource,
    ) -> Result<(), SyncError> {
        self.sync.set_mount(mount)?;
        self.sync.set_media(media)?;
        self.sync.attach(secondary, &self.set)
    }

    /// Feed one engine event through the synchronizer.
    ///
    /// Seeks that cannot be forwarded are logged and dropped; they never
    /// affect the rest of the session.
    pub fn handle(&mut self, event: EngineEvent) -> Result<(), SyncError> {
        let metadata = matches!(event, EngineEvent::PrimaryMetadataLoaded);

        match self.sync.handle(event) {
            Ok(()) => {}
            Err(SyncError::NotReady(state)) => {
                debug!("Ignoring secondary seek while {state}");
            }
            Err(SyncError::DurationUnknown) => {
                warn!("Dropping secondary seek: {}", SyncError::DurationUnknown);
            }
            Err(e) => return Err(e),
        }

        if metadata {
            self.refresh_dimensions();
        }
        Ok(())
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut FilterState {
        &mut self.filters
    }

    pub fn sync(&self) -> &PlaybackSynchronizer<P, S> {
        &self.sync
    }

    pub fn sync_mut(&mut self) -> &mut PlaybackSynchronizer<P, S> {
        &mut self.sync
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// End the session, releasing the secondary engine.
    ///
    /// Dropping the session has the same effect.
    pub fn close(&mut self) -> Option<S> {
        if self.closed {
            return None;
        }
        self.closed = true;
        info!("Closing review session");
        self.sync.teardown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::{Dimensions, Region, Shape};
    use crate::playback::{
        PrimaryEngine, SecondaryCommand, SimulatedPrimary, SimulatedSecondary, SyncState,
    };

    type Session = ReviewSession<SimulatedPrimary, SimulatedSecondary>;

    fn scenario() -> AnnotationSet {
        AnnotationSet::from_annotations(vec![
            Annotation::point("violence", 3000)
                .with_model("modelA")
                .with_region(Region::new(100.0, 100.0, 200.0, 100.0)),
            Annotation::point("nudity", 10000).with_confidence(4.0),
        ])
    }

    fn primary() -> SimulatedPrimary {
        SimulatedPrimary::new(30.0)
            .with_dimensions(Dimensions::new(1920.0, 1080.0), Dimensions::new(960.0, 540.0))
    }

    fn seek_to(session: &mut Session, seconds: f64) {
        session.sync_mut().primary_mut().seek_to(crate::playback::SeekTarget::Seconds(seconds));
        let event = session.sync_mut().primary_mut().advance(0.0);
        session.handle(event).unwrap();
    }

    #[test]
    fn lookup_before_index_is_skipped() {
        let session = Session::new(scenario(), primary());
        assert!(matches!(
            session.lookup(3),
            Err(AnnotationError::IndexConstructionSkipped)
        ));
        assert!(session.active_at(3).is_empty());

        session.build_index();
        assert_eq!(session.active_at(3).len(), 1);
    }

    #[test]
    fn index_built_once() {
        let session = Session::open(scenario(), primary());
        let first: *const TimeIndex = session.build_index();
        let second: *const TimeIndex = session.build_index();
        assert_eq!(first, second);
    }

    #[test]
    fn violence_scenario() {
        let mut session = Session::open(scenario(), primary());

        seek_to(&mut session, 3.0);
        let active = session.active_now();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].classifier, "violence");

        seek_to(&mut session, 10.0);
        assert_eq!(session.active_now()[0].classifier, "nudity");

        session.filters_mut().set_classifier("violence", false).unwrap();
        seek_to(&mut session, 3.0);
        assert!(session.active_now().is_empty());
    }

    #[test]
    fn overlay_waits_for_metadata() {
        let mut session = Session::open(scenario(), primary());
        seek_to(&mut session, 3.0);
        assert!(matches!(
            session.overlay_now(),
            Err(AnnotationError::DimensionsUnavailable)
        ));

        let event = session.sync_mut().primary_mut().load_metadata();
        session.handle(event).unwrap();

        let frame = session.overlay_now().unwrap();
        assert_eq!(frame.second, 3);
        assert_eq!(frame.scale.x, 0.5);
        assert!(matches!(frame.shapes[0], Shape::Box { .. }));
    }

    #[test]
    fn listing_follows_filters() {
        let mut session = Session::open(scenario(), primary());
        assert_eq!(session.listing().len(), 2);

        session.filters_mut().toggle_model("modelA").unwrap();
        let rows = session.listing();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].classifier, "nudity");
    }

    #[test]
    fn secondary_lifecycle() {
        let mut session = Session::open(scenario(), primary());
        session
            .attach_secondary(
                SimulatedSecondary::new(),
                MountPoint::new("#waveform"),
                MediaSource::new("clip.mp4"),
            )
            .unwrap();
        assert_eq!(session.sync().state(), &SyncState::Bound);
        assert_eq!(session.sync().secondary().unwrap().point_count(), 2);

        // Seek before ready is dropped, not an error
        session.handle(EngineEvent::SecondarySeek(5.0)).unwrap();
        assert!(session.sync().primary().seeks().is_empty());

        session.handle(EngineEvent::SecondaryReady).unwrap();
        session.sync_mut().primary_mut().play();
        session.handle(EngineEvent::PrimaryPlay).unwrap();
        session.handle(EngineEvent::SecondarySeek(10.0)).unwrap();

        assert_eq!(session.current_second(), 10);
        assert_eq!(session.active_now()[0].classifier, "nudity");
        assert_eq!(
            session.sync().secondary().unwrap().commands(),
            &[SecondaryCommand::Play]
        );

        let secondary = session.close().unwrap();
        assert!(secondary.is_destroyed());
        assert!(session.is_closed());
        assert!(session.close().is_none());
    }

    #[test]
    fn failed_secondary_leaves_listing_usable() {
        let mut session = Session::open(scenario(), primary());
        let err = session
            .attach_secondary(
                SimulatedSecondary::failing("no audio"),
                MountPoint::new("#waveform"),
                MediaSource::new("clip.mp4"),
            )
            .unwrap_err();

        assert!(matches!(err, SyncError::SecondaryEngineInitFailed(_)));
        assert_eq!(session.sync().last_error(), Some("no audio"));
        assert_eq!(session.listing().len(), 2);

        seek_to(&mut session, 10.0);
        assert_eq!(session.active_now().len(), 1);
    }
}
