//! Tabular annotation listing
//!
//! Builds the rows a table view shows next to the overlay, and renders them
//! as JSON, Markdown or plain text.

use serde::{Deserialize, Serialize};
use std::fmt::Write as FmtWrite;
use std::sync::Arc;

use super::color::color_of;
use super::filter::FilterState;
use super::index::bucket_for_millis;
use super::model::{Annotation, AnnotationKind, AnnotationSet};
use super::Result;

/// Listing output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingFormat {
    /// JSON array (machine-readable)
    Json,
    /// Markdown table
    Markdown,
    /// Aligned plain text (default)
    #[default]
    Text,
}

/// One row of the annotation table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingRow {
    /// `HH:MM:SS.mmm`
    pub timestamp: String,
    pub time_ms: u64,
    /// Bucket the row is highlighted in during playback
    pub second: u64,
    pub classifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub confidence: f64,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// `#RRGGBB`, same as the overlay
    pub color: String,
}

impl ListingRow {
    #[must_use]
    pub fn from_annotation(annotation: &Annotation) -> Self {
        let duration_ms = match annotation.kind {
            AnnotationKind::Segment { duration_ms } => Some(duration_ms),
            AnnotationKind::Point { .. } => None,
        };

        Self {
            timestamp: format_timestamp(annotation.time_ms),
            time_ms: annotation.time_ms,
            second: bucket_for_millis(annotation.time_ms),
            classifier: annotation.classifier.clone(),
            model: annotation.model.clone(),
            confidence: annotation.confidence,
            kind: annotation.kind.as_str(),
            duration_ms,
            color: color_of(annotation).to_hex(),
        }
    }
}

/// Listing generator
pub struct Listing;

impl Listing {
    /// Rows for every annotation in the set that passes `filters`
    #[must_use]
    pub fn rows(set: &AnnotationSet, filters: &FilterState) -> Vec<ListingRow> {
        set.iter()
            .filter(|a| filters.is_active(a))
            .map(|a| ListingRow::from_annotation(a))
            .collect()
    }

    /// Rows for an already-filtered slice (e.g. one bucket)
    #[must_use]
    pub fn rows_for(active: &[Arc<Annotation>]) -> Vec<ListingRow> {
        active.iter().map(|a| ListingRow::from_annotation(a)).collect()
    }

    /// Render rows in the given format
    pub fn render(rows: &[ListingRow], format: ListingFormat) -> Result<String> {
        match format {
            ListingFormat::Json => Self::to_json(rows),
            ListingFormat::Markdown => Self::to_markdown(rows),
            ListingFormat::Text => Self::to_text(rows),
        }
    }

    fn to_json(rows: &[ListingRow]) -> Result<String> {
        Ok(serde_json::to_string_pretty(rows)?)
    }

    fn to_markdown(rows: &[ListingRow]) -> Result<String> {
        let mut md = String::new();

        writeln!(md, "| Time | Classifier | Model | Confidence | Kind | Color |")?;
        writeln!(md, "|------|------------|-------|------------|------|-------|")?;
        for row in rows {
            let kind = match row.duration_ms {
                Some(d) => format!("{} ({d}ms)", row.kind),
                None => row.kind.to_string(),
            };
            writeln!(
                md,
                "| {} | {} | {} | {} | {kind} | `{}` |",
                row.timestamp,
                row.classifier,
                row.model.as_deref().unwrap_or("-"),
                row.confidence,
                row.color
            )?;
        }
        writeln!(md, "\n_{} annotations_", rows.len())?;

        Ok(md)
    }

    fn to_text(rows: &[ListingRow]) -> Result<String> {
        let mut text = String::new();

        let width = rows
            .iter()
            .map(|r| r.classifier.len())
            .max()
            .unwrap_or(0)
            .max("CLASSIFIER".len());

        writeln!(
            text,
            "{:<12}  {:<width$}  {:<16}  {:>10}  KIND",
            "TIME", "CLASSIFIER", "MODEL", "CONFIDENCE"
        )?;
        for row in rows {
            writeln!(
                text,
                "{:<12}  {:<width$}  {:<16}  {:>10}  {}",
                row.timestamp,
                row.classifier,
                row.model.as_deref().unwrap_or("-"),
                row.confidence,
                row.kind
            )?;
        }

        Ok(text)
    }
}

/// Format milliseconds as `HH:MM:SS.mmm`
#[must_use]
pub fn format_timestamp(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let millis = ms % 1000;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}
