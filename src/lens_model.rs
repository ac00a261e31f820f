//! # Parsed Lens Data Model
//!
//! This module defines the flat output record produced for every input lens
//! name. The field set mirrors the master inventory sheet: one column per
//! field, strings everywhere, empty string meaning "not determined".
//!
//! ## Core Concepts
//!
//! - **ParsedLens**: the value object emitted per input string
//! - **confidence_score**: coverage-based score in [0, 1]
//! - **needs_review**: set when the score falls below the review threshold
//!
//! ## Usage
//!
//! ```rust
//! use lensparse::lens_model::ParsedLens;
//!
//! let mut record = ParsedLens::new("Cooke S4/i 18mm T2.0");
//! record.manufacturer = "Cooke".to_string();
//! assert_eq!(record.original_name, "Cooke S4/i 18mm T2.0");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A structured lens record parsed from a free-text inventory name.
///
/// Every string field defaults to empty; fields the parsing core does not
/// compute (front diameter, weight, ...) are pass-through columns owned by
/// the surrounding pipeline and stay empty here. `original_name` is set once
/// at creation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedLens {
    /// Canonical manufacturer name (e.g., "Cooke", "Angenieux")
    pub manufacturer: String,

    /// Canonical series/family name (e.g., "S4/I", "Master Prime")
    pub series: String,

    /// Focal length token without unit, ranges kept (e.g., "18", "6.6-66", "100/150")
    pub focal_length: String,

    /// Aperture token with canonical prefix (e.g., "T2.0", "F2.8", "N/A")
    pub t_stop: String,

    /// "Prime", "Zoom", or "Special"
    pub lens_type: String,

    /// Sensor/film coverage (e.g., "S35", "FF", "16MM")
    pub format: String,

    /// Lens mount (e.g., "PL", "LPL", "E-MOUNT")
    pub mount: String,

    /// "Anamorphic" or "Spherical"
    pub anamorphic_spherical: String,

    /// Anamorphic squeeze factor (e.g., "1.8x", "2x")
    pub anamorphic_squeeze: String,

    /// Reserved column; intentionally never filled from lens names
    pub anamorphic_location: String,

    /// Rehousing brand, if one is named (e.g., "Zero Optik", "Tls")
    pub housing: String,

    // Pass-through columns owned by the surrounding pipeline.
    pub front_diameter: String,
    pub close_focus: String,
    pub length: String,
    pub film_compatibility: String,
    pub image_circle: String,
    pub iris_blade_count: String,
    pub extender: String,
    pub lds: String,
    pub idata: String,
    pub support_recommended: String,
    pub support_post_length: String,
    pub weight: String,
    pub manufacture_year: String,
    pub expander: String,
    pub heden_motor_size: String,
    pub size: String,

    /// Free-text leftovers: parenthesized note or residual descriptive text
    pub notes: String,

    /// Rendering character (e.g., "Vintage")
    pub look: String,

    /// Usage hint (e.g., "Macro")
    pub use_case: String,

    pub bokeh: String,

    /// Flare color derived from flare-family series names
    pub flare: String,

    pub focus_falloff: String,
    pub breathing: String,
    pub focus_scale: String,

    /// The raw input string, preserved verbatim
    pub original_name: String,

    /// True when the record should be routed to human review
    pub needs_review: bool,

    /// Coverage-based confidence in [0.0, 1.0]
    pub confidence_score: f32,
}

impl ParsedLens {
    /// Create an otherwise-empty record for the given raw name.
    pub fn new(original_name: &str) -> Self {
        Self {
            original_name: original_name.to_string(),
            ..Self::default()
        }
    }

    /// Set the confidence score, clamped to [0, 1], and derive the review flag.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence_score = confidence.clamp(0.0, 1.0);
        self.needs_review = self.confidence_score < crate::confidence::REVIEW_THRESHOLD;
        self
    }

    /// Check whether any identifying field was extracted.
    pub fn has_identification(&self) -> bool {
        !self.manufacturer.is_empty()
            || !self.series.is_empty()
            || !self.focal_length.is_empty()
            || !self.t_stop.is_empty()
    }
}

impl fmt::Display for ParsedLens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<&str> = Vec::new();
        for part in [
            &self.manufacturer,
            &self.series,
            &self.focal_length,
            &self.t_stop,
            &self.lens_type,
        ] {
            if !part.is_empty() {
                parts.push(part);
            }
        }

        if parts.is_empty() {
            write!(f, "<unparsed>")?;
        } else {
            write!(f, "{}", parts.join(" "))?;
        }

        write!(
            f,
            " ({:.0}% confidence{})",
            self.confidence_score * 100.0,
            if self.needs_review { ", needs review" } else { "" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_defaults() {
        let record = ParsedLens::new("Canon K-35 24mm T1.5");
        assert_eq!(record.original_name, "Canon K-35 24mm T1.5");
        assert_eq!(record.manufacturer, "");
        assert_eq!(record.anamorphic_location, "");
        assert_eq!(record.confidence_score, 0.0);
        assert!(!record.needs_review);
    }

    #[test]
    fn test_with_confidence_clamps_and_flags() {
        let record = ParsedLens::new("x").with_confidence(1.7);
        assert_eq!(record.confidence_score, 1.0);
        assert!(!record.needs_review);

        let record = ParsedLens::new("x").with_confidence(0.25);
        assert_eq!(record.confidence_score, 0.25);
        assert!(record.needs_review);

        let record = ParsedLens::new("x").with_confidence(-3.0);
        assert_eq!(record.confidence_score, 0.0);
        assert!(record.needs_review);
    }

    #[test]
    fn test_has_identification() {
        let mut record = ParsedLens::new("?");
        assert!(!record.has_identification());
        record.series = "Orion".to_string();
        assert!(record.has_identification());
    }

    #[test]
    fn test_display_formatting() {
        let mut record = ParsedLens::new("Cooke S4/i 18mm T2.0");
        record.manufacturer = "Cooke".to_string();
        record.focal_length = "18".to_string();
        record.confidence_score = 0.9;

        let display = format!("{}", record);
        assert!(display.contains("Cooke"));
        assert!(display.contains("18"));
        assert!(display.contains("90% confidence"));
    }

    #[test]
    fn test_serde_round_trip() {
        let mut record = ParsedLens::new("Zeiss Super Speed 50mm T1.3");
        record.manufacturer = "Zeiss".to_string();
        record.confidence_score = 0.8;

        let json = serde_json::to_string(&record).unwrap();
        let back: ParsedLens = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
