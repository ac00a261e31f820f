//! # Field Extractors
//!
//! One extractor per output field. Every extractor is total over normalized
//! text: it returns an [`Extraction`] whose empty value and zero confidence
//! mean "no evidence found", never an error. Extractors are independent of
//! one another with a single exception: lens-type classification reads the
//! already-extracted focal length to spot zoom ranges.
//!
//! Pattern tables come from the [`PatternRegistry`]; purely numeric tokens
//! (focal length, T-stop, squeeze factor) are matched with compiled regexes
//! that follow the same ordered-fallback style as the registry lookups.

use crate::lens_model::ParsedLens;
use crate::pattern_registry::{Category, PatternRegistry};
use crate::text_processing::{bounded_match, title_case};
use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

/// A candidate field value with its local confidence in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub value: String,
    pub confidence: f32,
}

impl Extraction {
    pub fn new(value: impl Into<String>, confidence: f32) -> Self {
        Self { value: value.into(), confidence }
    }

    /// "No evidence found": empty value at zero confidence.
    pub fn none() -> Self {
        Self { value: String::new(), confidence: 0.0 }
    }

    pub fn is_none(&self) -> bool {
        self.value.is_empty() && self.confidence == 0.0
    }
}

/// Per-field local confidences, accumulated during one parse invocation.
///
/// The resolution engine bumps these when a rule confirms a field; the
/// average is a diagnostic quantity only — the externally visible score is
/// the coverage ratio computed in [`crate::confidence`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldConfidences {
    pub manufacturer: f32,
    pub series: f32,
    pub focal_length: f32,
    pub t_stop: f32,
    pub lens_type: f32,
    pub format: f32,
    pub mount: f32,
    pub anamorphic: f32,
    pub squeeze: f32,
    pub location: f32,
    pub housing: f32,
    pub use_case: f32,
    pub look: f32,
}

impl FieldConfidences {
    /// Average of all per-field local confidences.
    pub fn average(&self) -> f32 {
        let sum = self.manufacturer
            + self.series
            + self.focal_length
            + self.t_stop
            + self.lens_type
            + self.format
            + self.mount
            + self.anamorphic
            + self.squeeze
            + self.location
            + self.housing
            + self.use_case
            + self.look;
        sum / 13.0
    }
}

/// Compiled focal-length patterns, tried in order.
struct FocalPatterns {
    /// Dual-unit pair: "100mm/150mm"
    pair: Regex,
    /// Number or hyphenated range followed by "mm": "18mm", "6.6-66mm"
    range_mm: Regex,
    /// Bare numeric/dash/slash compound with no unit: "24-290/26-320/36-435"
    bare: Regex,
}

static FOCAL_PATTERNS: LazyLock<FocalPatterns> = LazyLock::new(|| FocalPatterns {
    pair: Regex::new(r"(\d+(?:\.\d+)?)\s*mm\s*/\s*(\d+(?:\.\d+)?)\s*mm")
        .expect("focal pair pattern should be valid"),
    range_mm: Regex::new(r"(\d+(?:\.\d+)?(?:-\d+(?:\.\d+)?)?)\s*mm")
        .expect("focal range pattern should be valid"),
    bare: Regex::new(r"(\d+(?:\.\d+)?(?:-\d+(?:\.\d+)?)?(?:/\d+(?:\.\d+)?(?:-\d+(?:\.\d+)?)?)*)")
        .expect("focal bare pattern should be valid"),
});

/// Compiled aperture patterns, tried in order.
struct ApertLikePatterns {
    t_prefix: Regex,
    f_prefix: Regex,
    f_slash: Regex,
}

static T_STOP_PATTERNS: LazyLock<ApertLikePatterns> = LazyLock::new(|| ApertLikePatterns {
    t_prefix: Regex::new(r"t(\d+(?:\.\d+)?(?:-\d+(?:\.\d+)?)?)")
        .expect("t-stop pattern should be valid"),
    f_prefix: Regex::new(r"f(\d+(?:\.\d+)?(?:-\d+(?:\.\d+)?)?)")
        .expect("f-stop pattern should be valid"),
    f_slash: Regex::new(r"f/(\d+(?:\.\d+)?(?:-\d+(?:\.\d+)?)?)")
        .expect("f-slash pattern should be valid"),
});

struct SqueezePatterns {
    suffix: Regex,
    prefix: Regex,
}

static SQUEEZE_PATTERNS: LazyLock<SqueezePatterns> = LazyLock::new(|| SqueezePatterns {
    suffix: Regex::new(r"(\d+(?:\.\d+)?)x").expect("squeeze suffix pattern should be valid"),
    prefix: Regex::new(r"x(\d+(?:\.\d+)?)").expect("squeeze prefix pattern should be valid"),
});

struct FormatGuards {
    range_before: Regex,
    range_after: Regex,
}

// "16mm" embedded in "12-16mm" or "16mm-40mm" is a focal-length boundary, not
// a film format.
static FORMAT_GUARDS: LazyLock<FormatGuards> = LazyLock::new(|| FormatGuards {
    range_before: Regex::new(r"\d+\s*-\s*16mm").expect("format guard should be valid"),
    range_after: Regex::new(r"16mm\s*-\s*\d+").expect("format guard should be valid"),
});

static PAREN_NOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((.*?)\)").expect("paren note pattern should be valid"));

static RESIDUAL_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\-_,;/]+").expect("separator pattern should be valid"));

/// Zoom indicators that classify a lens regardless of focal-length shape.
const ZOOM_KEYWORDS: &[&str] = &["zoom", "varotal", "cabrio", "servo", "cine-servo"];

/// Keywords marking non-standard optics.
const SPECIAL_KEYWORDS: &[&str] = &["tilt-shift", "shift", "swing", "lensbaby", "composer"];

/// Known rehousing brands, first hit wins.
const HOUSING_KEYWORDS: &[&str] = &[
    "original housing",
    "rehoused",
    "ancient optics",
    "zero optik",
    "tls",
    "works cameras",
    "whitepoint optics",
    "gl optics",
];

/// Literal series overrides tried before the alias table, in order. Each
/// carries its fixed canonical spelling (including the upper-case flare
/// family names) and short-circuits at 0.9.
const SERIES_OVERRIDES: &[(&str, &str)] = &[
    ("master anamorphic", "Master Anamorphic"),
    ("optimo ultra compact", "Optimo Ultra Compact"),
    ("optimo ultra", "Optimo Ultra"),
    ("optimo dp", "Optimo DP"),
    ("optimo prime", "Optimo Prime"),
    ("optimo style", "Optimo Style"),
    ("optimo vintage", "Optimo Vintage"),
    ("optimo hr", "Optimo HR"),
    ("optimo anamorphic", "Optimo Anamorphic"),
    ("optimo anamorphic hr", "Optimo Anamorphic HR"),
    ("chameleon sc/xc", "Chameleon SC/XC"),
    ("chameleon xc", "Chameleon XC"),
    ("chameleon uw sc", "Chameleon UW SC"),
    ("nanomorph", "Nanomorph"),
    ("genesis g35", "Genesis G35"),
    ("genesis g65", "Genesis G65"),
    ("vespid retro", "Vespid Retro"),
    ("pavo", "Pavo"),
    ("arles", "Arles"),
    ("x-tract", "X-Tract"),
    ("signature zoom", "Signature Zoom"),
    ("variable zoom", "Variable Zoom"),
    ("ranger", "Ranger"),
    ("orion", "Orion"),
    ("mercury", "Mercury"),
    ("silver edition", "Silver Edition"),
    ("ez-2", "EZ-2"),
    ("ez2", "EZ-2"),
    ("ez-1", "EZ-1"),
    ("ez1", "EZ-1"),
];

/// Overrides tried after the EBC guard, still before the alias table.
const SERIES_OVERRIDES_LATE: &[(&str, &str)] = &[
    ("shift and tilt", "Shift and Tilt"),
    ("cine orange flare", "CINE ORANGE FLARE"),
    ("cine blue flare", "CINE BLUE FLARE"),
    ("cine gold flare", "CINE GOLD FLARE"),
];

/// Best-scoring table lookup: every alias that occurs as a literal substring
/// scores `alias_len / text_len * 100`; the highest score wins, earlier table
/// entries winning ties.
fn best_table_match<'a>(text: &str, category: &'a Category) -> Option<(&'a str, f32)> {
    let text_len = text.chars().count();
    if text_len == 0 {
        return None;
    }
    let mut best: Option<(&str, f32)> = None;
    for (key, aliases) in category.iter() {
        for alias in aliases {
            if text.contains(alias.as_str()) {
                let score = alias.chars().count() as f32 / text_len as f32 * 100.0;
                if best.map_or(true, |(_, b)| score > b) {
                    best = Some((key, score));
                }
            }
        }
    }
    best
}

/// Identify the manufacturer via longest-alias scoring (accept at score >= 3).
pub fn manufacturer(text: &str, registry: &PatternRegistry) -> Extraction {
    match best_table_match(text, &registry.manufacturers) {
        Some((key, score)) if score >= 3.0 => {
            Extraction::new(title_case(key), (score / 100.0).min(0.9))
        }
        _ => Extraction::none(),
    }
}

/// Identify the series: literal overrides first, alias table as fallback
/// (accept at score >= 2).
pub fn series(text: &str, registry: &PatternRegistry) -> Extraction {
    for (needle, canonical) in SERIES_OVERRIDES {
        if text.contains(needle) {
            return Extraction::new(*canonical, 0.9);
        }
    }

    // EBC is ambiguous with Fujinon's lens coating label.
    if text.contains("ebc") && !text.contains("fuji") {
        return Extraction::new("EBC", 0.9);
    }

    for (needle, canonical) in SERIES_OVERRIDES_LATE {
        if text.contains(needle) {
            return Extraction::new(*canonical, 0.9);
        }
    }

    match best_table_match(text, &registry.series) {
        Some((key, score)) if score >= 2.0 => {
            Extraction::new(title_case(key), (score / 100.0).min(0.9))
        }
        _ => Extraction::none(),
    }
}

/// Extract the focal length token, ranges and dual values preserved, unit and
/// internal whitespace stripped.
pub fn focal_length(text: &str) -> Extraction {
    if let Some(caps) = FOCAL_PATTERNS.pair.captures(text) {
        return Extraction::new(format!("{}/{}", &caps[1], &caps[2]), 0.9);
    }
    for pattern in [&FOCAL_PATTERNS.range_mm, &FOCAL_PATTERNS.bare] {
        if let Some(caps) = pattern.captures(text) {
            let token: String = caps[1].chars().filter(|c| !c.is_whitespace()).collect();
            if !token.is_empty() {
                return Extraction::new(token, 0.9);
            }
        }
    }
    Extraction::none()
}

/// Extract the aperture token with a canonical "T"/"F" prefix, or "N/A".
pub fn t_stop(text: &str) -> Extraction {
    if let Some(caps) = T_STOP_PATTERNS.t_prefix.captures(text) {
        return Extraction::new(format!("T{}", &caps[1]), 0.9);
    }
    if let Some(caps) = T_STOP_PATTERNS.f_prefix.captures(text) {
        return Extraction::new(format!("F{}", &caps[1]), 0.9);
    }
    if let Some(caps) = T_STOP_PATTERNS.f_slash.captures(text) {
        return Extraction::new(format!("F{}", &caps[1]), 0.9);
    }
    if text.contains("n/a") {
        return Extraction::new("N/A", 0.9);
    }
    Extraction::none()
}

/// Classify Prime / Zoom / Special. Reads the already-extracted focal length:
/// a range separator there marks a zoom even without a zoom keyword.
pub fn lens_type(text: &str, focal_length: &str) -> Extraction {
    for keyword in ZOOM_KEYWORDS {
        if text.contains(keyword) {
            return Extraction::new("Zoom", 0.9);
        }
    }

    if !focal_length.is_empty() && (focal_length.contains('-') || focal_length.contains('/')) {
        return Extraction::new("Zoom", 0.9);
    }

    for keyword in SPECIAL_KEYWORDS {
        if text.contains(keyword) {
            return Extraction::new("Special", 0.9);
        }
    }

    // Weak default: most single-focal entries are primes.
    Extraction::new("Prime", 0.7)
}

/// Identify the sensor/film format.
pub fn format(text: &str, registry: &PatternRegistry) -> Extraction {
    // A negative assertion beats any keyword match.
    if text.contains("doesn't cover") {
        return Extraction::none();
    }

    if text.contains("ff") {
        return Extraction::new("FF", 0.9);
    }

    if (text.contains("16mm") || text.contains("16 mm"))
        && !FORMAT_GUARDS.range_before.is_match(text)
        && !FORMAT_GUARDS.range_after.is_match(text)
    {
        return Extraction::new("16MM", 0.9);
    }

    for (key, aliases) in registry.formats.iter() {
        if key == "ff" || key == "16mm" {
            continue; // handled above
        }
        for alias in aliases {
            if text.contains(alias.as_str()) {
                return Extraction::new(key.to_uppercase(), 0.9);
            }
        }
    }

    Extraction::none()
}

/// Identify the mount. Table order is semantic ("lpl" before "pl") and the
/// bare "pl" alias only matches bounded occurrences.
pub fn mount(text: &str, registry: &PatternRegistry) -> Extraction {
    for (key, aliases) in registry.mounts.iter() {
        for alias in aliases {
            let hit = if alias == "pl" {
                bounded_match(text, alias)
            } else {
                text.contains(alias.as_str())
            };
            if hit {
                return Extraction::new(key.to_uppercase(), 0.9);
            }
        }
    }
    Extraction::none()
}

/// Anamorphic or spherical; absent any keyword the weak default is Spherical.
pub fn anamorphic_spherical(text: &str, registry: &PatternRegistry) -> Extraction {
    for (key, aliases) in registry.anamorphic.iter() {
        for alias in aliases {
            if text.contains(alias.as_str()) {
                return Extraction::new(title_case(key), 0.9);
            }
        }
    }
    Extraction::new("Spherical", 0.5)
}

/// Extract the anamorphic squeeze factor. Only evaluated for anamorphic
/// names; only values in [1.0, 2.0] are plausible squeezes. The captured
/// token is canonicalized through the squeeze alias table when it matches a
/// known spelling.
pub fn squeeze_factor(text: &str, registry: &PatternRegistry) -> Extraction {
    if !text.contains("anamorphic") {
        return Extraction::none();
    }

    for pattern in [&SQUEEZE_PATTERNS.suffix, &SQUEEZE_PATTERNS.prefix] {
        if let Some(caps) = pattern.captures(text) {
            let raw = &caps[1];
            if let Ok(value) = raw.parse::<f64>() {
                if (1.0..=2.0).contains(&value) {
                    let token = format!("{}x", raw);
                    for (key, aliases) in registry.squeeze.iter() {
                        if aliases.iter().any(|a| a == &token || a == raw) {
                            return Extraction::new(key, 0.9);
                        }
                    }
                    return Extraction::new(token, 0.9);
                }
            }
        }
    }

    Extraction::none()
}

/// Detect a rehousing brand; absence asserts nothing.
pub fn housing(text: &str) -> Extraction {
    for keyword in HOUSING_KEYWORDS {
        if text.contains(keyword) {
            return Extraction::new(title_case(keyword), 0.8);
        }
    }
    Extraction::none()
}

pub fn use_case(text: &str) -> Extraction {
    if text.contains("macro") {
        return Extraction::new("Macro", 0.9);
    }
    Extraction::none()
}

pub fn look(text: &str) -> Extraction {
    if text.contains("vintage") {
        return Extraction::new("Vintage", 0.9);
    }
    Extraction::none()
}

/// The first parenthesized substring of the original, case-preserving text,
/// trimmed. Captured before resolution runs so later rules can append to it.
pub fn paren_note(original: &str) -> Option<String> {
    PAREN_NOTE
        .captures(original)
        .map(|caps| caps[1].trim().to_string())
}

/// Leftover descriptive text: the original name minus every recognized
/// component, so tails like "Rear Expander" survive into notes. Must be given
/// the post-resolution field values, otherwise text belonging to a
/// rule-resolved component would count as leftover.
pub fn residual_notes(original: &str, record: &ParsedLens) -> String {
    let mut residual = original.to_string();

    // Focal length first: the stored token has no unit and may be a range or
    // dual value, so every segment is removed with and without "mm".
    if !record.focal_length.is_empty() {
        remove_component(&mut residual, &format!("{}mm", record.focal_length));
        remove_component(&mut residual, &record.focal_length);
        for segment in record.focal_length.split(['-', '/']) {
            if !segment.is_empty() {
                remove_component(&mut residual, &format!("{}mm", segment));
                remove_component(&mut residual, segment);
            }
        }
    }

    let mut components: Vec<String> = Vec::new();
    for value in [
        &record.manufacturer,
        &record.series,
        &record.t_stop,
        &record.format,
        &record.housing,
        &record.anamorphic_spherical,
        &record.anamorphic_squeeze,
        &record.lens_type,
        &record.use_case,
        &record.look,
    ] {
        if !value.is_empty() {
            components.push(value.clone());
        }
    }
    if !record.mount.is_empty() {
        components.push(format!("{} mount", record.mount));
        components.push(record.mount.clone());
    }

    for component in &components {
        remove_component(&mut residual, component);
    }

    let residual = residual.replace(['(', ')', '[', ']', '+'], " ");
    let residual = RESIDUAL_SEPARATORS.replace_all(&residual, " ");
    residual.trim().to_string()
}

/// Remove every word-bounded, case-insensitive occurrence of `component`.
fn remove_component(residual: &mut String, component: &str) {
    let pattern = format!(r"\b{}\b", regex::escape(component));
    if let Ok(re) = RegexBuilder::new(&pattern).case_insensitive(true).build() {
        *residual = re.replace_all(residual, "").into_owned();
    }
}
