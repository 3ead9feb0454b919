//! Overlay projection for box-bearing annotations
//!
//! Annotation geometry is stored in the primary engine's native (intrinsic)
//! coordinates. The projector derives one scale transform for the whole
//! drawing layer from native vs. displayed dimensions, and turns the active
//! annotations of a bucket into boxes or markers.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::color::{color_of, Rgba};
use super::model::{Annotation, Region};
use super::{AnnotationError, Result};

/// Width/height pair in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both sides finite and positive
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Parse `WIDTHxHEIGHT` (e.g. `1920x1080`)
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let (w, h) = s.trim().split_once(['x', 'X'])?;
        let dims = Self::new(w.trim().parse().ok()?, h.trim().parse().ok()?);
        dims.is_known().then_some(dims)
    }
}

/// Native → display scale, applied once to the whole drawing layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scale {
    pub x: f64,
    pub y: f64,
}

impl Scale {
    /// Map a native region into display coordinates
    #[must_use]
    pub fn apply(&self, region: Region) -> Region {
        Region::new(
            region.x * self.x,
            region.y * self.y,
            region.width * self.x,
            region.height * self.y,
        )
    }

    /// CSS transform for the drawing layer
    #[must_use]
    pub fn to_css_transform(&self) -> String {
        format!("scale({}, {})", self.x, self.y)
    }
}

/// Drawing parameters shared by every shape on the layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayStyle {
    /// Box outline width in native pixels
    pub stroke_width: f64,
    /// Marker radius in native pixels
    pub marker_radius: f64,
    /// Draw classifier/model text next to each shape
    pub show_labels: bool,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            stroke_width: 2.0,
            marker_radius: 6.0,
            show_labels: true,
        }
    }
}

/// One drawable shape, in native coordinates
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Shape {
    /// Bounding box with positive width and height
    Box {
        region: Region,
        color: Rgba,
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    /// Location marker for zero-area regions
    Marker {
        x: f64,
        y: f64,
        color: Rgba,
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
}

impl Shape {
    #[must_use]
    pub fn color(&self) -> Rgba {
        match self {
            Self::Box { color, .. } | Self::Marker { color, .. } => *color,
        }
    }
}

/// Everything the renderer needs to draw one second of overlay
#[derive(Debug, Clone, Serialize)]
pub struct OverlayFrame {
    pub second: u64,
    pub scale: Scale,
    pub style: OverlayStyle,
    pub shapes: Vec<Shape>,
}

/// Computes the layer transform and per-bucket shapes
#[derive(Debug, Clone, Default)]
pub struct OverlayProjector {
    native: Option<Dimensions>,
    displayed: Option<Dimensions>,
    style: OverlayStyle,
}

impl OverlayProjector {
    /// Create a projector with no dimensions known yet
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set style
    #[must_use]
    pub fn with_style(mut self, style: OverlayStyle) -> Self {
        self.style = style;
        self
    }

    /// Record the media's intrinsic size (after metadata loads)
    pub fn set_native(&mut self, native: Option<Dimensions>) {
        self.native = native;
    }

    /// Record the currently displayed size (after layout or resize)
    pub fn set_displayed(&mut self, displayed: Option<Dimensions>) {
        self.displayed = displayed;
    }

    /// Layer transform, or [`AnnotationError::DimensionsUnavailable`] until
    /// both native and displayed sizes are positive
    pub fn scale(&self) -> Result<Scale> {
        match (self.native, self.displayed) {
            (Some(native), Some(displayed)) if native.is_known() && displayed.is_known() => {
                Ok(Scale {
                    x: displayed.width / native.width,
                    y: displayed.height / native.height,
                })
            }
            _ => Err(AnnotationError::DimensionsUnavailable),
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.scale().is_ok()
    }

    /// Shapes for the active annotations of one bucket.
    ///
    /// Only point annotations with a region are drawn; everything else is
    /// listing-only.
    pub fn project(&self, second: u64, active: &[Arc<Annotation>]) -> Result<OverlayFrame> {
        let scale = self.scale()?;

        let shapes: Vec<Shape> = active
            .iter()
            .filter_map(|annotation| {
                let region = annotation.region()?;
                let color = color_of(annotation);
                let label = self.style.show_labels.then(|| shape_label(annotation));
                Some(if region.has_area() {
                    Shape::Box {
                        region,
                        color,
                        label,
                    }
                } else {
                    Shape::Marker {
                        x: region.x,
                        y: region.y,
                        color,
                        label,
                    }
                })
            })
            .collect();

        debug!("Projected {} shapes for second {second}", shapes.len());

        Ok(OverlayFrame {
            second,
            scale,
            style: self.style.clone(),
            shapes,
        })
    }
}

fn shape_label(annotation: &Annotation) -> String {
    match annotation.model_name() {
        Some(model) => format!("{} [{model}]", annotation.classifier),
        None => annotation.classifier.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::color::color;

    fn ready_projector() -> OverlayProjector {
        let mut projector = OverlayProjector::new();
        projector.set_native(Some(Dimensions::new(1920.0, 1080.0)));
        projector.set_displayed(Some(Dimensions::new(960.0, 540.0)));
        projector
    }

    #[test]
    fn test_scale_factors() {
        let scale = ready_projector().scale().unwrap();
        assert_eq!(scale, Scale { x: 0.5, y: 0.5 });
        assert_eq!(scale.to_css_transform(), "scale(0.5, 0.5)");
    }

    #[test]
    fn test_not_ready_without_native_dimensions() {
        let mut projector = OverlayProjector::new();
        projector.set_displayed(Some(Dimensions::new(960.0, 540.0)));
        assert!(matches!(projector.scale(), Err(AnnotationError::DimensionsUnavailable)));
        assert!(!projector.is_ready());
    }

    #[test]
    fn test_zero_dimensions_are_not_ready() {
        let mut projector = ready_projector();
        projector.set_native(Some(Dimensions::new(0.0, 0.0)));
        assert!(projector.scale().is_err());

        let active = vec![Arc::new(
            Annotation::point("face", 0).with_region(Region::new(1.0, 1.0, 1.0, 1.0)),
        )];
        assert!(projector.project(0, &active).is_err());
    }

    #[test]
    fn test_box_versus_marker() {
        let active: Vec<Arc<Annotation>> = vec![
            Arc::new(
                Annotation::point("face", 3000)
                    .with_model("modelA")
                    .with_region(Region::new(100.0, 50.0, 40.0, 30.0)),
            ),
            Arc::new(Annotation::point("gun", 3000).with_region(Region::new(10.0, 20.0, 0.0, 0.0))),
            Arc::new(Annotation::point("speech", 3000)),
            Arc::new(Annotation::segment("music", 3000, 2000)),
        ];

        let frame = ready_projector().project(3, &active).unwrap();

        assert_eq!(frame.second, 3);
        assert_eq!(frame.shapes.len(), 2);
        match &frame.shapes[0] {
            Shape::Box { region, color: c, label } => {
                assert_eq!(*region, Region::new(100.0, 50.0, 40.0, 30.0));
                assert_eq!(*c, color("face", Some("modelA")));
                assert_eq!(label.as_deref(), Some("face [modelA]"));
            }
            other => panic!("expected box, got {other:?}"),
        }
        assert!(matches!(frame.shapes[1], Shape::Marker { x, y, .. } if x == 10.0 && y == 20.0));
    }

    #[test]
    fn test_labels_can_be_hidden() {
        let projector = ready_projector().with_style(OverlayStyle {
            show_labels: false,
            ..Default::default()
        });
        let active = vec![Arc::new(
            Annotation::point("face", 0).with_region(Region::new(1.0, 1.0, 2.0, 2.0)),
        )];

        let frame = projector.project(0, &active).unwrap();
        assert!(matches!(&frame.shapes[0], Shape::Box { label: None, .. }));
    }

    #[test]
    fn test_scale_apply() {
        let scale = Scale { x: 0.5, y: 2.0 };
        assert_eq!(
            scale.apply(Region::new(10.0, 10.0, 4.0, 4.0)),
            Region::new(5.0, 20.0, 2.0, 8.0)
        );
    }

    #[test]
    fn test_dimensions_parse() {
        assert_eq!(Dimensions::parse("1920x1080"), Some(Dimensions::new(1920.0, 1080.0)));
        assert_eq!(Dimensions::parse(" 640X360 "), Some(Dimensions::new(640.0, 360.0)));
        assert_eq!(Dimensions::parse("0x360"), None);
        assert_eq!(Dimensions::parse("wide"), None);
    }
}
