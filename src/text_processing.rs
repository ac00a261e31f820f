//! # Text Processing Module
//!
//! Shared text utilities for the lens-name parser: input normalization,
//! Python-style title casing for canonical keys, separator stripping for the
//! coverage scorer, and the bounded-substring check that keeps short mount
//! aliases from matching inside longer tokens.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE_RUN: Regex =
        Regex::new(r"\s+").expect("whitespace pattern should be valid");
}

/// Normalize a raw lens name: lower-case, trim, collapse internal whitespace
/// runs to a single space.
///
/// Total and idempotent for any input, including empty strings.
///
/// # Examples
///
/// ```rust
/// use lensparse::text_processing::normalize;
///
/// assert_eq!(normalize("  Cooke   S4/i  18mm "), "cooke s4/i 18mm");
/// assert_eq!(normalize(""), "");
/// ```
pub fn normalize(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    WHITESPACE_RUN.replace_all(lowered.trim(), " ").into_owned()
}

/// Title-case a canonical key the way the pattern tables expect: the first
/// letter of every alphabetic run is upper-cased, the rest lower-cased, and
/// non-alphabetic characters start a new run.
///
/// This matters for keys with embedded punctuation: `"s4/i"` becomes
/// `"S4/I"`, `"k-35"` becomes `"K-35"`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

/// Strip whitespace, dashes, slashes, and parentheses from a string.
///
/// Used by the coverage scorer so that formatting differences between the
/// extracted values and the original name do not count against coverage.
pub fn strip_separators(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '/' | '(' | ')'))
        .collect()
}

/// Check whether `needle` occurs in `text` bounded by whitespace, parentheses,
/// punctuation, or a string edge on both sides.
///
/// Plain substring matching is wrong for aliases like `"pl"`, which occurs
/// inside `"lpl"`; a bounded occurrence is required instead.
pub fn bounded_match(text: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let mut search_from = 0;
    while let Some(rel) = text[search_from..].find(needle) {
        let start = search_from + rel;
        let end = start + needle.len();
        let before_ok = start == 0
            || text[..start]
                .chars()
                .next_back()
                .is_some_and(is_boundary_char);
        let after_ok = end == text.len()
            || text[end..].chars().next().is_some_and(is_boundary_char);
        if before_ok && after_ok {
            return true;
        }
        search_from = end;
    }
    false
}

fn is_boundary_char(c: char) -> bool {
    c.is_whitespace() || c.is_ascii_punctuation()
}
