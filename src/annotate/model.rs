//! Annotation data model
//!
//! Predictions and ground-truth labels share one [`Annotation`] shape once
//! loaded. Whether an annotation is an instant or an interval is carried by
//! the explicit [`AnnotationKind`] tag, assigned once by the loader.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Model name given to ground-truth labels when merged with predictions
pub const GROUND_TRUTH_MODEL: &str = "Ground-Truth";

/// Box in the primary engine's native (intrinsic) coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    /// Zero means "marker only"
    pub width: f64,
    /// Zero means "marker only"
    pub height: f64,
}

impl Region {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// `true` when the region should be drawn as a box rather than a marker
    #[must_use]
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Timeline shape of an annotation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnnotationKind {
    /// A single instant, optionally with a spatial box (video-style)
    Point {
        #[serde(skip_serializing_if = "Option::is_none")]
        region: Option<Region>,
    },
    /// An interval of `duration_ms` milliseconds (audio-style)
    Segment { duration_ms: u64 },
}

impl AnnotationKind {
    /// Number of one-second buckets the annotation occupies
    #[must_use]
    pub fn span_seconds(&self) -> u64 {
        match self {
            Self::Point { .. } => 1,
            Self::Segment { duration_ms } => duration_ms.div_ceil(1000),
        }
    }

    /// Short name used in listings
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Point { .. } => "point",
            Self::Segment { .. } => "segment",
        }
    }
}

/// Where an annotation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Classifier output
    Prediction,
    /// Ground truth
    Label,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prediction => f.write_str("prediction"),
            Self::Label => f.write_str("label"),
        }
    }
}

/// A classified event anchored to the media timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub classifier: String,
    /// Start time in milliseconds
    pub time_ms: u64,
    #[serde(flatten)]
    pub kind: AnnotationKind,
    /// Source-dependent scale (`0..=1` or `0..=100`), kept as received
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub origin: Origin,
}

impl Annotation {
    /// Create a point annotation predicted with full confidence
    #[must_use]
    pub fn point(classifier: impl Into<String>, time_ms: u64) -> Self {
        Self {
            classifier: classifier.into(),
            time_ms,
            kind: AnnotationKind::Point { region: None },
            confidence: 1.0,
            model: None,
            origin: Origin::Prediction,
        }
    }

    /// Create a segment annotation predicted with full confidence
    #[must_use]
    pub fn segment(classifier: impl Into<String>, time_ms: u64, duration_ms: u64) -> Self {
        Self {
            kind: AnnotationKind::Segment { duration_ms },
            ..Self::point(classifier, time_ms)
        }
    }

    /// Set the source model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the confidence
    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Attach a native-coordinate region (point annotations only)
    #[must_use]
    pub fn with_region(mut self, region: Region) -> Self {
        if let AnnotationKind::Point { region: slot } = &mut self.kind {
            *slot = Some(region);
        }
        self
    }

    #[must_use]
    pub fn is_segment(&self) -> bool {
        matches!(self.kind, AnnotationKind::Segment { .. })
    }

    /// Region of a point annotation, if any
    #[must_use]
    pub fn region(&self) -> Option<Region> {
        match self.kind {
            AnnotationKind::Point { region } => region,
            AnnotationKind::Segment { .. } => None,
        }
    }

    /// End of the annotation in milliseconds (equal to start for points)
    #[must_use]
    pub fn end_ms(&self) -> u64 {
        match self.kind {
            AnnotationKind::Point { .. } => self.time_ms,
            AnnotationKind::Segment { duration_ms } => self.time_ms.saturating_add(duration_ms),
        }
    }

    /// Model name as a string slice
    #[must_use]
    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref()
    }
}

/// Merged, time-sorted sequence of every prediction and label in a session
///
/// Entries are shared allocations: the time index and the filter engine hand
/// out clones of the same `Arc`, never copies of the annotation.
#[derive(Debug, Clone, Default)]
pub struct AnnotationSet {
    annotations: Vec<Arc<Annotation>>,
    classifiers: BTreeSet<String>,
    models: BTreeSet<String>,
}

impl AnnotationSet {
    /// Build a set from already-validated annotations.
    ///
    /// Sorting is stable, so annotations with equal `time_ms` keep the order
    /// they were supplied in.
    #[must_use]
    pub fn from_annotations(mut annotations: Vec<Annotation>) -> Self {
        annotations.sort_by_key(|a| a.time_ms);

        let mut classifiers = BTreeSet::new();
        let mut models = BTreeSet::new();
        for annotation in &annotations {
            classifiers.insert(annotation.classifier.clone());
            if let Some(model) = annotation.model.as_deref().filter(|m| !m.is_empty()) {
                models.insert(model.to_string());
            }
        }

        Self {
            annotations: annotations.into_iter().map(Arc::new).collect(),
            classifiers,
            models,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Annotation>> {
        self.annotations.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Arc<Annotation>] {
        &self.annotations
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Arc<Annotation>> {
        self.annotations.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Distinct classifier names, sorted
    #[must_use]
    pub fn classifiers(&self) -> &BTreeSet<String> {
        &self.classifiers
    }

    /// Distinct non-empty model names, sorted
    #[must_use]
    pub fn models(&self) -> &BTreeSet<String> {
        &self.models
    }

    /// Latest end time across all annotations, in milliseconds
    #[must_use]
    pub fn end_ms(&self) -> u64 {
        self.annotations.iter().map(|a| a.end_ms()).max().unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a AnnotationSet {
    type Item = &'a Arc<Annotation>;
    type IntoIter = std::slice::Iter<'a, Arc<Annotation>>;

    fn into_iter(self) -> Self::IntoIter {
        self.annotations.iter()
    }
}
