//! # Confidence Scorer
//!
//! Coverage-based scoring: how much of the original name is accounted for by
//! the fields that were extracted from it. This is the authoritative,
//! externally visible confidence; the per-field average kept in
//! [`crate::extractors::FieldConfidences`] is diagnostic only.

use crate::lens_model::ParsedLens;
use crate::text_processing::strip_separators;

/// Records scoring below this go to human review.
pub const REVIEW_THRESHOLD: f32 = 0.6;

/// Fraction of the cleaned original name covered by the extracted values,
/// clamped to [0, 1].
///
/// Both sides of the comparison are lower-cased and stripped of whitespace,
/// dashes, slashes, and parentheses, so formatting differences never count
/// against coverage. The focal length is stored without its unit, so it is
/// first retried with a trailing "mm" before the bare token.
pub fn coverage_score(record: &ParsedLens) -> f32 {
    let clean_original = strip_separators(&record.original_name.to_lowercase());
    if clean_original.is_empty() {
        return 0.0;
    }

    let mut matched_chars = 0usize;

    if !record.focal_length.is_empty() {
        let focal = strip_separators(&record.focal_length.to_lowercase());
        let with_unit = format!("{}mm", focal);
        if clean_original.contains(&with_unit) {
            matched_chars += with_unit.chars().count();
        } else if !focal.is_empty() && clean_original.contains(&focal) {
            matched_chars += focal.chars().count();
        }
    }

    for value in [
        &record.manufacturer,
        &record.series,
        &record.t_stop,
        &record.lens_type,
        &record.notes,
    ] {
        if value.is_empty() {
            continue;
        }
        let clean_value = strip_separators(&value.to_lowercase());
        if !clean_value.is_empty() && clean_original.contains(&clean_value) {
            matched_chars += clean_value.chars().count();
        }
    }

    let ratio = matched_chars as f32 / clean_original.chars().count() as f32;
    ratio.clamp(0.0, 1.0)
}
