//! Per-second time index
//!
//! Buckets every annotation into the integer-second slots it occupies so the
//! playback clock can look up "what is happening now" without scanning the
//! whole set. Points occupy one slot; segments occupy `ceil(duration / 1s)`
//! consecutive slots.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use super::model::{Annotation, AnnotationSet};

/// Bucket for a millisecond timestamp, rounding half up (1499 → 1, 1500 → 2)
#[must_use]
pub fn bucket_for_millis(time_ms: u64) -> u64 {
    time_ms.saturating_add(500) / 1000
}

/// Bucket for a playback position in seconds, rounding to the nearest second.
///
/// Negative and non-finite positions map to bucket 0.
#[must_use]
pub fn bucket_for_seconds(seconds: f64) -> u64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    seconds.round() as u64
}

/// Immutable mapping from integer second to the annotations occupying it
#[derive(Debug, Clone, Default)]
pub struct TimeIndex {
    buckets: BTreeMap<u64, Vec<Arc<Annotation>>>,
    memberships: usize,
}

impl TimeIndex {
    /// Build the index for a whole set.
    ///
    /// Within a bucket, annotations keep the set's time order.
    #[must_use]
    pub fn build(set: &AnnotationSet) -> Self {
        let mut buckets: BTreeMap<u64, Vec<Arc<Annotation>>> = BTreeMap::new();
        let mut memberships = 0;

        for annotation in set {
            let start = bucket_for_millis(annotation.time_ms);
            let span = annotation.kind.span_seconds();

            for second in start..start.saturating_add(span) {
                buckets.entry(second).or_default().push(Arc::clone(annotation));
                memberships += 1;
            }
        }

        debug!(
            "Built time index: {} annotations, {} buckets, {} memberships",
            set.len(),
            buckets.len(),
            memberships
        );

        Self {
            buckets,
            memberships,
        }
    }

    /// Annotations occupying `second` (empty when none)
    #[must_use]
    pub fn bucket(&self, second: u64) -> &[Arc<Annotation>] {
        self.buckets.get(&second).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Seconds with at least one annotation, ascending
    pub fn occupied_seconds(&self) -> impl Iterator<Item = u64> + '_ {
        self.buckets.keys().copied()
    }

    /// Non-empty buckets, ascending
    pub fn iter(&self) -> impl Iterator<Item = (u64, &[Arc<Annotation>])> {
        self.buckets.iter().map(|(second, items)| (*second, items.as_slice()))
    }

    /// Number of non-empty buckets
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total (annotation, second) pairs across all buckets
    #[must_use]
    pub fn membership_count(&self) -> usize {
        self.memberships
    }

    /// Highest occupied second
    #[must_use]
    pub fn last_second(&self) -> Option<u64> {
        self.buckets.keys().next_back().copied()
    }
}
