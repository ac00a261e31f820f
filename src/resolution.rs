//! # Resolution Rules
//!
//! Cross-field corrections applied after the per-field extractors have run.
//! Each rule is a named predicate/effect pair over the whole working state;
//! the rule table is fixed and ordered, and every rule whose predicate holds
//! fires exactly once, in table order. Later rules see the effects of earlier
//! ones, which is intentional: the brand-phrase rules, for example, must be
//! able to overturn the generic special-model classification.

use crate::extractors::FieldConfidences;
use crate::lens_model::ParsedLens;
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

/// Working state threaded through the rule table.
pub struct ResolutionState {
    /// Normalized (lower-cased, whitespace-collapsed) input text.
    pub text: String,
    /// Original input text, case preserved.
    pub original: String,
    /// The record under construction.
    pub record: ParsedLens,
    /// Local per-field confidences, bumped when a rule confirms a field.
    pub scores: FieldConfidences,
}

/// One correction: a name for logging, a predicate, and an effect.
pub struct ResolutionRule {
    pub name: &'static str,
    predicate: fn(&ResolutionState) -> bool,
    effect: fn(&mut ResolutionState),
}

/// Broadcast-zoom model codes that identify a Fujinon TV/ENG lens.
const FUJINON_BROADCAST_CODES: &[&str] = &[
    "ha25x16.5",
    "ha42x9.7",
    "ha13x4.5",
    "ha18x7.6",
    "ha22x7.8",
    "za12x4.5",
    "za17x7.6",
    "za22x7.6",
];

/// Model names that are one-off special optics rather than prime/zoom glass.
const SPECIAL_MODEL_NAMES: &[&str] = &[
    "snorricam",
    "peephole lens",
    "kish kaleidoscope lens",
    "rifle scope",
    "squishy lens",
    "image shaker",
    "astroscope night vision module",
    "keslow flow motion lens system",
    "kes-low angle mirror",
    "p+s technik skater scope",
    "t-rex lens",
    "century super wide low angle prism",
    "leica telephoto front module",
    "leica telephoto rear module",
    "optex excellence probe",
    "infiniprobe",
    "distortion lens",
    "swift 960 series microscope lens",
    "sim ethereal",
    "ethereal",
    "rodenstock münchen doppel anastigmat eurynar",
];

/// Series whose brand is unambiguous when the manufacturer is missing.
const SERIES_MAKERS: &[(&str, &str)] = &[("K-35", "Canon"), ("Master Anamorphic", "Arri")];

static FUJINON_MODEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)fujinon\s+(.+)").expect("fujinon model pattern should be valid")
});

/// The fixed, ordered rule table. Order is semantic: `sim-ethereal-brand`
/// must run after `special-model-list` so the brand phrase can revert the
/// Special classification, and `cooke-sf-code` must see the final
/// manufacturer.
pub static RULES: &[ResolutionRule] = &[
    ResolutionRule {
        name: "master-anamorphic-family",
        predicate: |s| s.record.series == "Master Anamorphic",
        effect: |s| {
            s.record.manufacturer = "Arri".to_string();
            s.record.anamorphic_spherical = "Anamorphic".to_string();
            s.record.format = "S35".to_string();
            s.scores.manufacturer = 0.9;
            s.scores.anamorphic = 0.9;
            s.scores.format = 0.9;
        },
    },
    ResolutionRule {
        name: "fujinon-broadcast-zoom",
        predicate: |s| {
            s.record.manufacturer == "Fujinon"
                && FUJINON_BROADCAST_CODES.iter().any(|code| s.text.contains(code))
        },
        effect: |s| {
            // The model code is the series, original casing preserved.
            if let Some(caps) = FUJINON_MODEL.captures(&s.original) {
                s.record.series = caps[1].trim().to_string();
                s.scores.series = 0.9;
            }
            s.record.lens_type = "Zoom".to_string();
            s.record.anamorphic_spherical = "Spherical".to_string();
            s.scores.lens_type = 0.9;
            s.scores.anamorphic = 0.9;
        },
    },
    ResolutionRule {
        name: "speed-primes-zeiss",
        predicate: |s| {
            (s.record.series == "Super Speed" || s.record.series == "Standard Speed")
                && s.record.manufacturer.is_empty()
        },
        effect: |s| {
            s.record.manufacturer = "Zeiss".to_string();
            s.scores.manufacturer = 0.8;
        },
    },
    ResolutionRule {
        name: "series-implies-manufacturer",
        predicate: |s| {
            s.record.manufacturer.is_empty()
                && SERIES_MAKERS.iter().any(|(series, _)| s.record.series == *series)
        },
        effect: |s| {
            if let Some((_, maker)) =
                SERIES_MAKERS.iter().find(|(series, _)| s.record.series == *series)
            {
                s.record.manufacturer = maker.to_string();
                s.scores.manufacturer = 0.9;
            }
        },
    },
    ResolutionRule {
        name: "leitz-brand-alias",
        predicate: |s| s.text.contains("leitz") && s.record.manufacturer.is_empty(),
        effect: |s| {
            s.record.manufacturer = "Leica".to_string();
            s.scores.manufacturer = 0.9;
        },
    },
    ResolutionRule {
        name: "special-model-list",
        predicate: |s| SPECIAL_MODEL_NAMES.iter().any(|name| s.text.contains(name)),
        effect: |s| {
            s.record.lens_type = "Special".to_string();
            s.scores.lens_type = 0.9;
        },
    },
    ResolutionRule {
        name: "sony-gm-code",
        predicate: |s| s.record.manufacturer == "Sony" && s.text.contains("gm"),
        effect: |s| {
            s.record.series = "GM".to_string();
            s.scores.series = 0.9;
        },
    },
    ResolutionRule {
        name: "sim-ethereal-brand",
        predicate: |s| s.text.contains("sim ethereal") || s.text.contains("ethereal"),
        effect: |s| {
            s.record.manufacturer = "SIM".to_string();
            s.record.series = "Ethereal".to_string();
            s.scores.manufacturer = 0.9;
            s.scores.series = 0.9;
            // The brand phrase is in the special-model list; these are
            // ordinary primes.
            if s.record.lens_type == "Special" {
                s.record.lens_type = "Prime".to_string();
                s.scores.lens_type = 0.7;
            }
        },
    },
    ResolutionRule {
        name: "swift-960-microscope",
        predicate: |s| s.text.contains("swift 960"),
        effect: |s| {
            s.record.manufacturer = "Swift 960".to_string();
            s.record.series = String::new();
            s.scores.manufacturer = 0.9;
        },
    },
    ResolutionRule {
        name: "ez2-angenieux",
        predicate: |s| s.record.series == "EZ-2",
        effect: |s| {
            s.record.manufacturer = "Angenieux".to_string();
            s.scores.manufacturer = 0.9;
        },
    },
    ResolutionRule {
        name: "ez1-angenieux",
        predicate: |s| s.record.series == "EZ-1",
        effect: |s| {
            s.record.manufacturer = "Angenieux".to_string();
            s.scores.manufacturer = 0.9;
        },
    },
    ResolutionRule {
        name: "cooke-sf-code",
        predicate: |s| s.record.manufacturer == "Cooke" && s.record.series == "SF",
        effect: |s| {
            s.record.series = "Special Flare".to_string();
            s.scores.series = 0.9;
        },
    },
    ResolutionRule {
        name: "cooke-anamorphic-sf",
        predicate: |s| s.record.manufacturer == "Cooke" && s.text.contains("anamorphic sf"),
        effect: |s| {
            s.record.series = "Special Flare".to_string();
            s.scores.series = 0.9;
        },
    },
    ResolutionRule {
        name: "cine-flare-color",
        predicate: |s| {
            let series = s.record.series.to_lowercase();
            series.contains("cine orange flare")
                || series.contains("cine blue flare")
                || series.contains("cine gold flare")
        },
        effect: |s| {
            let series = s.record.series.to_lowercase();
            s.record.flare = if series.contains("orange") {
                "Orange".to_string()
            } else if series.contains("blue") {
                "Blue".to_string()
            } else {
                "Gold".to_string()
            };
        },
    },
    ResolutionRule {
        name: "kooky-cooke-note",
        predicate: |s| s.text.contains("kooky cooke"),
        effect: |s| {
            if s.record.notes.is_empty() {
                s.record.notes = "Kooky Cooke".to_string();
            } else {
                s.record.notes = format!("{}; Kooky Cooke", s.record.notes);
            }
        },
    },
];

/// Run every rule in table order against the state.
pub fn apply_rules(state: &mut ResolutionState) {
    for rule in RULES {
        if (rule.predicate)(state) {
            debug!("resolution rule fired: {}", rule.name);
            (rule.effect)(state);
        }
    }
}
