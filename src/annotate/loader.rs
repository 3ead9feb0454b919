//! Annotation loading
//!
//! Turns the two raw input lists (predictions and optional ground-truth
//! labels) into one validated [`AnnotationSet`]. This is the only place the
//! point/segment kind is decided; everything downstream matches on the tag.

use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

use super::model::{Annotation, AnnotationKind, AnnotationSet, Origin, Region, GROUND_TRUTH_MODEL};
use super::{AnnotationError, Result};

/// Longest accepted segment (24 hours)
pub const MAX_DURATION_MS: u64 = 24 * 60 * 60 * 1000;

/// Highest accepted confidence (percent-scaled sources)
pub const MAX_CONFIDENCE: f64 = 100.0;

/// Explicit kind tag in raw input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawKind {
    Point,
    Segment,
}

/// One record as supplied by the annotation source
///
/// Every field is optional here so that missing values surface as a
/// [`AnnotationError::Malformed`] with the record position instead of a
/// generic deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    pub classifier: Option<String>,
    /// Milliseconds
    pub time: Option<f64>,
    pub confidence: Option<f64>,
    pub model: Option<String>,
    pub kind: Option<RawKind>,
    /// Milliseconds
    pub duration: Option<f64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl RawRecord {
    /// Minimal prediction record
    #[must_use]
    pub fn prediction(classifier: &str, time_ms: f64, confidence: f64) -> Self {
        Self {
            classifier: Some(classifier.to_string()),
            time: Some(time_ms),
            confidence: Some(confidence),
            ..Default::default()
        }
    }

    /// Minimal label record
    #[must_use]
    pub fn label(classifier: &str, time_ms: f64) -> Self {
        Self {
            classifier: Some(classifier.to_string()),
            time: Some(time_ms),
            ..Default::default()
        }
    }
}

/// Parse a JSON array of raw records
pub fn parse_records(json: &str) -> Result<Vec<RawRecord>> {
    Ok(serde_json::from_str(json)?)
}

/// Read predictions (and optionally labels) from JSON files and load them
pub fn load_files(predictions: &Path, labels: Option<&Path>) -> Result<AnnotationSet> {
    let predictions = parse_records(&std::fs::read_to_string(predictions)?)?;
    let labels = match labels {
        Some(path) => Some(parse_records(&std::fs::read_to_string(path)?)?),
        None => None,
    };

    load(&predictions, labels.as_deref())
}

/// Merge predictions and labels into one stably time-sorted set.
///
/// Labels become predictions of model [`GROUND_TRUTH_MODEL`] with confidence
/// `1.0`. The first invalid record aborts the load.
pub fn load(predictions: &[RawRecord], labels: Option<&[RawRecord]>) -> Result<AnnotationSet> {
    let label_count = labels.map_or(0, <[RawRecord]>::len);
    let mut annotations = Vec::with_capacity(predictions.len() + label_count);

    for (index, raw) in predictions.iter().enumerate() {
        annotations.push(convert(raw, Origin::Prediction, index)?);
    }
    for (index, raw) in labels.unwrap_or_default().iter().enumerate() {
        annotations.push(convert(raw, Origin::Label, index)?);
    }

    let set = AnnotationSet::from_annotations(annotations);
    info!(
        "Loaded {} annotations ({} predictions, {} labels), {} classifiers, {} models",
        set.len(),
        predictions.len(),
        label_count,
        set.classifiers().len(),
        set.models().len()
    );

    Ok(set)
}

fn convert(raw: &RawRecord, origin: Origin, index: usize) -> Result<Annotation> {
    let malformed = |reason: String| AnnotationError::Malformed {
        origin,
        index,
        reason,
    };

    let classifier = raw
        .classifier
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| malformed("missing classifier".to_string()))?;

    let time_ms = millis(raw.time, "time").map_err(malformed)?;

    let is_segment = match raw.kind {
        Some(RawKind::Segment) => true,
        Some(RawKind::Point) => false,
        None => raw.duration.is_some(),
    };

    let kind = if is_segment {
        let duration_ms = millis(raw.duration, "duration").map_err(malformed)?;
        if duration_ms == 0 {
            return Err(malformed("duration must be positive".to_string()));
        }
        if duration_ms > MAX_DURATION_MS {
            return Err(malformed(format!(
                "duration {duration_ms}ms exceeds maximum of {MAX_DURATION_MS}ms"
            )));
        }
        AnnotationKind::Segment { duration_ms }
    } else {
        AnnotationKind::Point {
            region: region(raw).map_err(malformed)?,
        }
    };

    let (model, confidence) = match origin {
        Origin::Label => (Some(GROUND_TRUTH_MODEL.to_string()), 1.0),
        Origin::Prediction => {
            let confidence = raw
                .confidence
                .ok_or_else(|| malformed("missing confidence".to_string()))?;
            if !confidence.is_finite() || !(0.0..=MAX_CONFIDENCE).contains(&confidence) {
                return Err(malformed(format!(
                    "confidence must be between 0 and {MAX_CONFIDENCE}, got {confidence}"
                )));
            }
            let model = raw
                .model
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string);
            (model, confidence)
        }
    };

    debug!("{origin} #{index}: {classifier} @ {time_ms}ms ({})", kind.as_str());

    Ok(Annotation {
        classifier: classifier.to_string(),
        time_ms,
        kind,
        confidence,
        model,
        origin,
    })
}

/// Validate a whole, non-negative millisecond value
fn millis(value: Option<f64>, field: &str) -> std::result::Result<u64, String> {
    let value = value.ok_or_else(|| format!("missing {field}"))?;
    if !value.is_finite() {
        return Err(format!("{field} must be a finite number"));
    }
    if value < 0.0 {
        return Err(format!("{field} must not be negative, got {value}"));
    }
    if value.fract() != 0.0 {
        return Err(format!("{field} must be whole milliseconds, got {value}"));
    }
    if value > u64::MAX as f64 {
        return Err(format!("{field} is out of range"));
    }
    Ok(value as u64)
}

fn region(raw: &RawRecord) -> std::result::Result<Option<Region>, String> {
    let (x, y) = match (raw.x, raw.y) {
        (Some(x), Some(y)) => (x, y),
        (None, None) if raw.width.is_none() && raw.height.is_none() => return Ok(None),
        _ => return Err("region needs both x and y".to_string()),
    };

    let width = raw.width.unwrap_or(0.0);
    let height = raw.height.unwrap_or(0.0);
    for (name, value) in [("x", x), ("y", y), ("width", width), ("height", height)] {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("{name} must be a finite, non-negative number"));
        }
    }

    Ok(Some(Region::new(x, y, width, height)))
}
