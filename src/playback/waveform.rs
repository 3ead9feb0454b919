//! Secondary-engine index: waveform points and segments
//!
//! Point annotations become timeline markers at their exact time; segment
//! annotations become regions whose start is floored to the whole second
//! (the region view snaps to seconds, unlike the rounded time index).

use serde::Serialize;

use crate::annotate::{color_of, AnnotationKind, AnnotationSet};

/// Marker on the waveform
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaveformPoint {
    pub id: String,
    /// Seconds
    pub time: f64,
    pub label: String,
    /// `#RRGGBB`
    pub color: String,
}

/// Region on the waveform
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaveformSegment {
    pub id: String,
    /// Seconds, floored
    pub start_time: f64,
    /// Seconds
    pub end_time: f64,
    pub label: String,
    /// `#RRGGBB`
    pub color: String,
}

/// Everything the secondary engine needs to draw annotations
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WaveformIndex {
    pub points: Vec<WaveformPoint>,
    pub segments: Vec<WaveformSegment>,
}

impl WaveformIndex {
    /// Derive points and segments from the session's annotation set
    #[must_use]
    pub fn build(set: &AnnotationSet) -> Self {
        let mut index = Self::default();

        for (i, annotation) in set.iter().enumerate() {
            let color = color_of(annotation).to_hex();
            let label = annotation.classifier.clone();

            match annotation.kind {
                AnnotationKind::Point { .. } => index.points.push(WaveformPoint {
                    id: format!("point-{i}"),
                    time: annotation.time_ms as f64 / 1000.0,
                    label,
                    color,
                }),
                AnnotationKind::Segment { duration_ms } => {
                    let start_time = (annotation.time_ms / 1000) as f64;
                    index.segments.push(WaveformSegment {
                        id: format!("segment-{i}"),
                        start_time,
                        end_time: start_time + duration_ms as f64 / 1000.0,
                        label,
                        color,
                    });
                }
            }
        }

        index
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.segments.is_empty()
    }
}
