//! # Lens Parser
//!
//! The public parsing entry point. A [`LensParser`] owns an immutable
//! [`PatternRegistry`] built once at construction; every [`parse`] call is a
//! pure function of the input string and that registry, so a single parser
//! can be shared freely across threads.
//!
//! ## Usage
//!
//! ```rust
//! use lensparse::LensParser;
//!
//! let parser = LensParser::new();
//! let record = parser.parse("Cooke S4/i 18mm T2.0");
//! assert_eq!(record.manufacturer, "Cooke");
//! assert_eq!(record.focal_length, "18");
//! ```
//!
//! [`parse`]: LensParser::parse

use crate::confidence::coverage_score;
use crate::extractors::{self, FieldConfidences};
use crate::lens_model::ParsedLens;
use crate::pattern_registry::{LearnedPatterns, PatternRegistry};
use crate::resolution::{apply_rules, ResolutionState};
use crate::text_processing::normalize;
use log::debug;

/// Heuristic lens-name parser over an immutable pattern registry.
pub struct LensParser {
    registry: PatternRegistry,
}

impl LensParser {
    /// Parser over built-in patterns only.
    pub fn new() -> Self {
        Self { registry: PatternRegistry::builtin() }
    }

    /// Parser over built-in patterns augmented with a learned snapshot.
    pub fn with_learned(learned: &LearnedPatterns) -> Self {
        Self { registry: PatternRegistry::with_learned(learned) }
    }

    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    /// Parse one free-text lens name into a structured record.
    ///
    /// Never fails: empty or unrecognizable input yields an all-empty record
    /// at confidence 0 with the review flag set.
    pub fn parse(&self, name: &str) -> ParsedLens {
        let text = normalize(name);
        if text.is_empty() {
            return ParsedLens::new(name).with_confidence(0.0);
        }

        let mut record = ParsedLens::new(name);
        let mut scores = FieldConfidences::default();

        let manufacturer = extractors::manufacturer(&text, &self.registry);
        record.manufacturer = manufacturer.value;
        scores.manufacturer = manufacturer.confidence;

        let series = extractors::series(&text, &self.registry);
        record.series = series.value;
        scores.series = series.confidence;

        let focal_length = extractors::focal_length(&text);
        record.focal_length = focal_length.value;
        scores.focal_length = focal_length.confidence;

        let t_stop = extractors::t_stop(&text);
        record.t_stop = t_stop.value;
        scores.t_stop = t_stop.confidence;

        let lens_type = extractors::lens_type(&text, &record.focal_length);
        record.lens_type = lens_type.value;
        scores.lens_type = lens_type.confidence;

        let format = extractors::format(&text, &self.registry);
        record.format = format.value;
        scores.format = format.confidence;

        let mount = extractors::mount(&text, &self.registry);
        record.mount = mount.value;
        scores.mount = mount.confidence;

        let anamorphic = extractors::anamorphic_spherical(&text, &self.registry);
        record.anamorphic_spherical = anamorphic.value;
        scores.anamorphic = anamorphic.confidence;

        let squeeze = extractors::squeeze_factor(&text, &self.registry);
        record.anamorphic_squeeze = squeeze.value;
        scores.squeeze = squeeze.confidence;

        let housing = extractors::housing(&text);
        record.housing = housing.value;
        scores.housing = housing.confidence;

        let use_case = extractors::use_case(&text);
        record.use_case = use_case.value;
        scores.use_case = use_case.confidence;

        let look = extractors::look(&text);
        record.look = look.value;
        scores.look = look.confidence;

        let paren_note = extractors::paren_note(name);
        record.notes = paren_note.clone().unwrap_or_default();

        let mut state = ResolutionState {
            text,
            original: name.to_string(),
            record,
            scores,
        };
        apply_rules(&mut state);

        // Residual notes see the post-resolution field values, otherwise text
        // belonging to a rule-resolved component would leak into notes. Rule
        // annotations already present stay appended behind the leftovers.
        if paren_note.is_none() {
            let residual = extractors::residual_notes(&state.original, &state.record);
            if !residual.is_empty() {
                state.record.notes = if state.record.notes.is_empty() {
                    residual
                } else {
                    format!("{}; {}", residual, state.record.notes)
                };
            }
        }

        let confidence = coverage_score(&state.record);
        let record = state.record.with_confidence(confidence);
        debug!("parsed '{}' as {}", name, record);
        record
    }
}

impl Default for LensParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_zoom_full_coverage() {
        let parser = LensParser::new();
        let record = parser.parse("Canon 6.6-66mm T2.5 Zoom");

        assert_eq!(record.manufacturer, "Canon");
        assert_eq!(record.focal_length, "6.6-66");
        assert_eq!(record.t_stop, "T2.5");
        assert_eq!(record.lens_type, "Zoom");
        assert_eq!(record.confidence_score, 1.0);
        assert!(!record.needs_review);
    }

    #[test]
    fn test_parse_prime_with_series() {
        let parser = LensParser::new();
        let record = parser.parse("Cooke S4/i 18mm T2.0");

        assert_eq!(record.manufacturer, "Cooke");
        assert_eq!(record.series, "S4/I");
        assert_eq!(record.focal_length, "18");
        assert_eq!(record.t_stop, "T2.0");
        assert_eq!(record.lens_type, "Prime");
        assert!(!record.needs_review);
    }

    #[test]
    fn test_parse_empty_input_short_circuits() {
        let parser = LensParser::new();
        for input in ["", "   ", "\t\n"] {
            let record = parser.parse(input);
            assert_eq!(record.manufacturer, "");
            assert_eq!(record.confidence_score, 0.0);
            assert!(record.needs_review);
            assert_eq!(record.original_name, input);
        }
    }

    #[test]
    fn test_parse_original_name_preserved_verbatim() {
        let parser = LensParser::new();
        let record = parser.parse("  ARRI / Zeiss   Master Prime 50mm T1.3  ");
        assert_eq!(record.original_name, "  ARRI / Zeiss   Master Prime 50mm T1.3  ");
    }

    #[test]
    fn test_parse_is_deterministic() {
        let parser = LensParser::new();
        let a = parser.parse("Atlas Orion 40mm T2 Anamorphic 2x (PL)");
        let b = parser.parse("Atlas Orion 40mm T2 Anamorphic 2x (PL)");
        assert_eq!(a, b);
    }
}
