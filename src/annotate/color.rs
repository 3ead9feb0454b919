//! Deterministic annotation colors
//!
//! The overlay and the listing both key colors on `classifier + model`, so a
//! pair looks the same everywhere it is shown.

use serde::Serialize;

use super::model::Annotation;

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// RGBA color with 8-bit channels and a unit alpha
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    /// `#RRGGBB`
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// `rgba(r, g, b, a)`
    #[must_use]
    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Color for a classifier/model pair.
///
/// A missing model hashes as the empty string.
#[must_use]
pub fn color(classifier: &str, model: Option<&str>) -> Rgba {
    let mut hash = FNV_OFFSET;
    for byte in classifier.bytes().chain(model.unwrap_or_default().bytes()) {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    let [r, g, b, _] = avalanche(hash).to_le_bytes();

    Rgba { r, g, b, a: 1.0 }
}

/// Color for an annotation
#[must_use]
pub fn color_of(annotation: &Annotation) -> Rgba {
    color(&annotation.classifier, annotation.model_name())
}

// murmur3 finalizer: spreads single-character differences across all bytes
fn avalanche(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}
