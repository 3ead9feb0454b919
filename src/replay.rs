//! Headless replay of a session against simulated engines
//!
//! Drives the primary engine from a `tokio::time::interval` tick, signals
//! secondary readiness once playback passes a given time, and reports the
//! active annotations every time the current second changes.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::annotate::Annotation;
use crate::playback::{
    EngineEvent, PrimaryEngine, SimulatedPrimary, SimulatedSecondary, SyncError, SyncState,
};
use crate::session::ReviewSession;

/// Session type the replay drives
pub type SimulatedSession = ReviewSession<SimulatedPrimary, SimulatedSecondary>;

/// How to drive a replay
#[derive(Debug, Clone)]
pub struct ReplayPlan {
    /// Wall-clock period between progress ticks
    pub tick: Duration,
    /// Media seconds advanced per wall-clock second
    pub speed: f64,
    /// Media time after which the secondary reports ready; `None` never
    pub ready_after: Option<f64>,
    /// User seek issued on the secondary right after it becomes ready
    pub seek: Option<f64>,
}

const DEFAULT_TICK: Duration = Duration::from_millis(250);

impl Default for ReplayPlan {
    fn default() -> Self {
        Self {
            tick: DEFAULT_TICK,
            speed: 1.0,
            ready_after: Some(0.0),
            seek: None,
        }
    }
}

impl ReplayPlan {
    /// Tick period; a zero tick falls back to 250 ms
    #[must_use]
    pub fn period(&self) -> Duration {
        if self.tick.is_zero() {
            DEFAULT_TICK
        } else {
            self.tick
        }
    }

    /// Media seconds covered by one tick
    #[must_use]
    pub fn step(&self) -> f64 {
        let speed = if self.speed.is_finite() && self.speed > 0.0 {
            self.speed
        } else {
            1.0
        };
        self.period().as_secs_f64() * speed
    }
}

/// What was active when playback entered a new second
#[derive(Debug, Clone)]
pub struct SecondReport {
    pub second: u64,
    pub time: f64,
    pub active: Vec<Arc<Annotation>>,
    /// Overlay shape count, `None` while dimensions are unknown
    pub overlay_shapes: Option<usize>,
}

/// Outcome of a finished replay
#[derive(Debug, Clone)]
pub struct ReplaySummary {
    pub ticks: usize,
    pub seconds_reported: usize,
    pub final_time: f64,
    pub final_state: SyncState,
}

/// Start playback and tick until the primary engine reaches the end.
///
/// `on_second` is called once per distinct second, including the first.
/// The session is left open; the caller closes it.
pub async fn replay<F>(
    session: &mut SimulatedSession,
    plan: &ReplayPlan,
    mut on_second: F,
) -> Result<ReplaySummary, SyncError>
where
    F: FnMut(SecondReport),
{
    let step = plan.step();
    let mut interval = tokio::time::interval(plan.period());
    let mut pending_seek = plan.seek;
    let mut last_second = None;
    let mut ticks = 0;
    let mut seconds_reported = 0;

    let event = session.sync_mut().primary_mut().load_metadata();
    session.handle(event)?;
    session.sync_mut().primary_mut().play();
    session.handle(EngineEvent::PrimaryPlay)?;

    info!("Replay started: {step:.3}s per tick");

    loop {
        interval.tick().await;
        ticks += 1;

        let event = session.sync_mut().primary_mut().advance(step);
        session.handle(event)?;

        let ready_due = plan
            .ready_after
            .is_some_and(|at| session.sync().current_time() >= at);
        if ready_due && session.sync().state() == &SyncState::Bound {
            session.handle(EngineEvent::SecondaryReady)?;
            if let Some(seconds) = pending_seek.take() {
                debug!("Replaying user seek to {seconds:.2}s");
                session.handle(EngineEvent::SecondarySeek(seconds))?;
            }
        }

        let second = session.current_second();
        if last_second != Some(second) {
            last_second = Some(second);
            seconds_reported += 1;
            on_second(SecondReport {
                second,
                time: session.sync().current_time(),
                active: session.active_at(second),
                overlay_shapes: session.overlay_now().ok().map(|frame| frame.shapes.len()),
            });
        }

        if session.sync().primary().is_finished() {
            break;
        }
    }

    session.handle(EngineEvent::PrimaryPause)?;

    let summary = ReplaySummary {
        ticks,
        seconds_reported,
        final_time: session.sync().current_time(),
        final_state: session.sync().state().clone(),
    };
    info!(
        "Replay finished at {:.2}s after {} ticks",
        summary.final_time, summary.ticks
    );
    Ok(summary)
}
