//! # Pattern Registry Module
//!
//! Alias tables that drive the field extractors: per category, a mapping from
//! canonical output term to the literal substrings indicating its presence.
//! The registry is built once per parser from built-in tables, optionally
//! augmented with a learned-pattern snapshot mined from human corrections,
//! and is immutable afterwards.
//!
//! ## Core Concepts
//!
//! - **Category**: ordered canonical-key → alias-list table
//! - **Built-in precedence**: merging a snapshot only inserts keys absent from
//!   the built-ins, never rewrites an existing alias list
//! - **Ordering**: construction order is preserved; for mounts this is load
//!   bearing, since `lpl` must be tested before its substring `pl`

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// An ordered canonical-key → alias-list table for one pattern category.
///
/// Keys are unique; iteration yields entries in construction order. Aliases
/// are lower-case literal substrings matched against normalized text.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    entries: Vec<(String, Vec<String>)>,
}

impl Category {
    fn from_table(table: &[(&str, &[&str])]) -> Self {
        let mut category = Self { entries: Vec::with_capacity(table.len()) };
        for (key, aliases) in table {
            category.insert(key, aliases.iter().map(|a| a.to_string()).collect());
        }
        category
    }

    /// Insert a key with its alias list; a key already present is left
    /// untouched (first writer wins, which is what gives built-ins permanent
    /// precedence over learned entries).
    fn insert(&mut self, key: &str, aliases: Vec<String>) {
        if !self.contains_key(key) && !aliases.is_empty() {
            self.entries.push((key.to_string(), aliases));
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, aliases)| aliases.as_slice())
    }

    /// Iterate `(canonical_key, aliases)` in construction order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(k, aliases)| (k.as_str(), aliases.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Learned-pattern snapshot: per category, canonical term → occurrence count.
///
/// Counts are meaningful only to the offline tool that decides which terms to
/// emit; the parser uses key presence alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearnedPatterns {
    #[serde(default)]
    pub manufacturers: BTreeMap<String, u32>,
    #[serde(default)]
    pub series: BTreeMap<String, u32>,
    #[serde(default)]
    pub mounts: BTreeMap<String, u32>,
    #[serde(default)]
    pub formats: BTreeMap<String, u32>,
    #[serde(default)]
    pub anamorphic: BTreeMap<String, u32>,
    #[serde(default)]
    pub squeeze_factors: BTreeMap<String, u32>,
}

/// On-disk layout of the snapshot file produced by the corrections miner.
#[derive(Debug, Clone, Default, Deserialize)]
struct LearnedSnapshot {
    #[serde(default)]
    manual_patterns: LearnedPatterns,
}

impl LearnedPatterns {
    /// Parse a snapshot from its JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let snapshot: LearnedSnapshot = serde_json::from_str(json)?;
        Ok(snapshot.manual_patterns)
    }

    /// Load a snapshot file, treating any failure as soft: a missing or
    /// malformed file is logged and `None` is returned so the caller falls
    /// back to built-in patterns only.
    pub fn load(path: &Path) -> Option<Self> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) => {
                warn!("could not read learned patterns from {}: {}", path.display(), err);
                return None;
            }
        };
        match Self::from_json_str(&json) {
            Ok(learned) => {
                info!("loaded learned patterns from {}", path.display());
                Some(learned)
            }
            Err(err) => {
                warn!("could not parse learned patterns from {}: {}", path.display(), err);
                None
            }
        }
    }

    /// Total number of learned terms across all categories.
    pub fn term_count(&self) -> usize {
        self.manufacturers.len()
            + self.series.len()
            + self.mounts.len()
            + self.formats.len()
            + self.anamorphic.len()
            + self.squeeze_factors.len()
    }
}

/// Immutable-after-construction alias tables for all pattern categories.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternRegistry {
    pub manufacturers: Category,
    pub series: Category,
    pub formats: Category,
    pub mounts: Category,
    pub anamorphic: Category,
    pub squeeze: Category,
}

impl PatternRegistry {
    /// Build the registry from built-in tables only.
    pub fn builtin() -> Self {
        Self {
            manufacturers: Category::from_table(MANUFACTURERS),
            series: Category::from_table(SERIES),
            formats: Category::from_table(FORMATS),
            mounts: Category::from_table(MOUNTS),
            anamorphic: Category::from_table(ANAMORPHIC),
            squeeze: Category::from_table(SQUEEZE),
        }
    }

    /// Build the registry from built-ins plus a learned snapshot.
    pub fn with_learned(learned: &LearnedPatterns) -> Self {
        let mut registry = Self::builtin();
        registry.merge(learned);
        registry
    }

    /// Merge a learned snapshot: for each category, every term absent from the
    /// built-in table is inserted with a singleton alias list equal to the
    /// lower-cased term itself. Existing entries are never rewritten.
    fn merge(&mut self, learned: &LearnedPatterns) {
        let mut added = 0usize;
        for (category, terms) in [
            (&mut self.manufacturers, &learned.manufacturers),
            (&mut self.series, &learned.series),
            (&mut self.mounts, &learned.mounts),
            (&mut self.formats, &learned.formats),
            (&mut self.anamorphic, &learned.anamorphic),
            (&mut self.squeeze, &learned.squeeze_factors),
        ] {
            for term in terms.keys() {
                let term = term.to_lowercase();
                if !category.contains_key(&term) {
                    category.insert(&term, vec![term.clone()]);
                    added += 1;
                }
            }
        }
        info!("merged learned patterns: {} new terms", added);
    }
}

const MANUFACTURERS: &[(&str, &[&str])] = &[
    ("angenieux", &["angenieux"]),
    ("canon", &["canon"]),
    ("cooke", &["cooke"]),
    ("zeiss", &["zeiss", "arri/zeiss", "arri / zeiss"]),
    ("leica", &["leica"]),
    ("leitz", &["leitz"]),
    ("sigma", &["sigma"]),
    ("laowa", &["laowa"]),
    ("atlas", &["atlas"]),
    ("caldwell", &["caldwell"]),
    ("master", &["master"]),
    ("ancient optics", &["ancient optics"]),
    ("zero optik", &["zero optik"]),
    ("tls", &["tls"]),
    ("optex", &["optex"]),
    ("infinity", &["infinity"]),
    ("lindsey", &["lindsey"]),
    ("century", &["century"]),
    ("sony", &["sony"]),
    ("dzofilm", &["dzofilm", "dzofilms"]),
    ("gecko-cam", &["gecko-cam"]),
    ("kowa", &["kowa"]),
    ("scorpio", &["scorpio"]),
    ("masterbuilt", &["masterbuilt"]),
    ("tribe7", &["tribe7"]),
    ("hawk", &["hawk"]),
    ("petzval", &["petzval"]),
    ("fujinon", &["fujinon"]),
    ("lensbaby", &["lensbaby"]),
    ("cci", &["cci"]),
    ("lomo", &["lomo"]),
    ("arri", &["arri"]),
    ("optika", &["optika"]),
    ("konica", &["konica"]),
    ("fuji", &["fuji"]),
    ("duclos", &["duclos"]),
    ("nikon", &["nikon"]),
    ("swift 960", &["swift 960"]),
    ("schneider kreuznach", &["schneider kreuznach"]),
    ("p+s technik", &["p+s technik"]),
    ("astroscope", &["astroscope"]),
    ("nanmorph", &["nanmorph"]),
    ("infiniprobe", &["infiniprobe"]),
    ("rodenstock", &["rodenstock"]),
    ("kish", &["kish"]),
    ("keslow", &["keslow", "kes-low"]),
    ("second reef", &["second reef"]),
    ("ironglass", &["ironglass"]),
    ("lensworks", &["lensworks"]),
    ("xelmus", &["xelmus"]),
    ("voigtlander", &["voigtlander"]),
    ("praxis", &["praxis"]),
];

const SERIES: &[(&str, &[&str])] = &[
    ("master prime", &["master prime"]),
    ("ultra prime", &["ultra prime"]),
    ("super speed", &["super speed"]),
    ("standard speed", &["standard speed"]),
    ("signature prime", &["signature prime"]),
    ("s4/i", &["s4/i", "s4i"]),
    ("s5/i", &["s5/i", "s5i"]),
    ("s7/i", &["s7/i", "s7i"]),
    ("panchro/i", &["panchro/i", "panchroi"]),
    ("anamorphic/i", &["anamorphic/i", "anamorphici"]),
    ("anamorphic ff plus", &["anamorphic ff plus"]),
    ("anamorphic sf ff plus", &["anamorphic sf ff plus"]),
    ("sp3", &["sp3"]),
    ("optimo", &["optimo"]),
    ("optimo ultra", &["optimo ultra"]),
    ("optimo ultra compact", &["optimo ultra compact"]),
    ("optimo dp", &["optimo dp"]),
    ("optimo prime", &["optimo prime"]),
    ("optimo style", &["optimo style"]),
    ("optimo vintage", &["optimo vintage"]),
    ("optimo hr", &["optimo hr"]),
    ("optimo anamorphic", &["optimo anamorphic"]),
    ("optimo anamorphic hr", &["optimo anamorphic hr"]),
    ("ez-1", &["ez-1", "ez1"]),
    ("ez-2", &["ez-2", "ez2"]),
    ("a-2s", &["a-2s", "a2s"]),
    ("s2", &["s2"]),
    ("alura", &["alura"]),
    ("cabrio", &["cabrio"]),
    ("premier", &["premier"]),
    ("rangefinder", &["rangefinder"]),
    ("fd", &["fd"]),
    ("ef", &["ef"]),
    ("ef-s", &["ef-s", "efs"]),
    ("l series", &["l series"]),
    ("k-35", &["k-35", "k35"]),
    ("nikkor", &["nikkor"]),
    ("fisheye", &["fisheye"]),
    ("hawk 65", &["hawk 65"]),
    ("orion", &["orion"]),
    ("mercury", &["mercury"]),
    ("silver edition", &["silver edition"]),
    ("chameleon", &["chameleon"]),
    ("nanomorph", &["nanomorph"]),
    ("proteus", &["proteus"]),
    ("spherical primes", &["spherical primes"]),
    ("vintage primes", &["vintage primes"]),
    ("tegea", &["tegea"]),
    ("super cine", &["super cine"]),
    ("elite", &["elite"]),
    ("illumina", &["illumina"]),
    ("varopanchr", &["varopanchr"]),
    ("vario-sonnar", &["vario-sonnar"]),
    ("lwz.1", &["lwz.1", "lwz1"]),
    ("lwz.2", &["lwz.2", "lwz2"]),
    ("master zoom", &["master zoom"]),
    ("ultra wide zoom", &["ultra wide zoom"]),
    ("variable prime", &["variable prime"]),
    ("s16 zooms", &["s16 zooms"]),
    ("cinema zoom", &["cinema zoom"]),
    ("cine zoom", &["cine zoom"]),
    ("broadcast zoom", &["broadcast zoom"]),
    ("eng zoom", &["eng zoom"]),
    ("efp zoom", &["efp zoom"]),
    ("studio zoom", &["studio zoom"]),
    ("field zoom", &["field zoom"]),
    ("portrait", &["portrait"]),
    ("macro", &["macro"]),
    ("tilt-shift", &["tilt-shift", "tilt shift"]),
    ("lensbaby", &["lensbaby"]),
    ("holga", &["holga"]),
    ("diana", &["diana"]),
    ("lomo", &["lomo"]),
    ("summilux", &["summilux", "summilux c", "summilux-c"]),
    ("summicron", &["summicron", "summicron c", "summicron-c"]),
    ("varotal", &["varotal"]),
    ("sk4", &["sk4"]),
    ("s2000", &["s2000"]),
    ("fe", &["fe"]),
    ("gm", &["gm"]),
    ("vario-tessar", &["vario-tessar"]),
    ("genesis", &["genesis"]),
    ("vespid", &["vespid"]),
    ("pavo", &["pavo"]),
    ("arles", &["arles"]),
    ("x-tract", &["x-tract", "x tract"]),
    ("signature zoom", &["signature zoom"]),
    ("variable zoom", &["variable zoom"]),
    ("swing shift", &["swing shift"]),
    ("special flare", &["sf"]),
    ("gnosis", &["gnosis"]),
    ("pro2be", &["pro2be"]),
    ("shift and tilt", &["shift and tilt"]),
    ("phenix", &["phenix"]),
    ("petzvalux", &["petzvalux"]),
    ("compact zoom", &["compact zoom"]),
    ("supreme prime radiance", &["supreme prime radiance"]),
    ("supreme prime", &["supreme prime"]),
    ("hexanon", &["hexanon"]),
    ("compact prime cp2", &["compact prime cp2"]),
    ("compact prime cp3", &["compact prime cp3"]),
    ("ebc", &["ebc"]),
    ("optex", &["optex"]),
    ("chameleon sc/xc", &["chameleon sc/xc"]),
    ("chameleon xc", &["chameleon xc"]),
    ("chameleon uw sc", &["chameleon uw sc"]),
    ("vista one", &["vista one"]),
    ("vespid retro", &["vespid retro"]),
    ("t-rex", &["t-rex"]),
    ("one", &["one"]),
    ("genesis g35", &["genesis g35"]),
    ("genesis g65", &["genesis g65"]),
    ("cine orange flare", &["cine orange flare"]),
    ("cine blue flare", &["cine blue flare"]),
    ("cine gold flare", &["cine gold flare"]),
    ("coral", &["coral"]),
    ("neo-ao", &["neo-ao"]),
    ("hugo", &["hugo"]),
    ("v-lite", &["v-lite"]),
    ("thalia", &["thalia"]),
    ("snorricam", &["snorricam"]),
    ("peephole lens", &["peephole lens"]),
    ("kaleidoscope lens", &["kaleidoscope lens"]),
    ("rifle scope", &["rifle scope"]),
    ("squishy lens", &["squishy lens"]),
    ("image shaker", &["image shaker"]),
    ("flow motion lens system", &["flow motion lens system"]),
    ("low angle mirror", &["low angle mirror"]),
    ("sf", &["sf"]),
    ("apollo", &["apollo"]),
    ("noctilux", &["noctilux"]),
    ("pure reach periscope", &["pure reach periscope"]),
];

const FORMATS: &[(&str, &[&str])] = &[
    ("s35", &["s35", "super 35", "super35"]),
    ("full frame", &["full frame"]),
    ("s16", &["s16", "super 16", "super16"]),
    ("aps-c", &["aps-c", "apsc"]),
    ("m43", &["m43", "micro four thirds", "micro 4/3"]),
    ("vv", &["vv", "ff/vv"]),
    ("16mm", &["16mm", "16 mm"]),
    ("ff", &["ff"]),
];

// Order is semantic: "pl" is a substring of "lpl" and must be tested after it.
const MOUNTS: &[(&str, &[&str])] = &[
    ("lpl", &["lpl", "lpl mount", "(lpl)"]),
    ("pl", &["pl"]),
    ("ef", &["ef", "ef mount"]),
    ("rf", &["rf", "rf mount"]),
    ("e-mount", &["e-mount", "e mount", "sony e"]),
    ("z-mount", &["z-mount", "z mount", "nikon z"]),
    ("f-mount", &["f-mount", "f mount", "nikon f"]),
    ("bayonet", &["bayonet"]),
    ("m42", &["m42", "m42 mount"]),
    ("m39", &["m39", "m39 mount"]),
    ("eos", &["eos"]),
];

const ANAMORPHIC: &[(&str, &[&str])] = &[
    ("anamorphic", &["anamorphic", "ana"]),
    ("spherical", &["spherical", "sph"]),
];

const SQUEEZE: &[(&str, &[&str])] = &[
    ("1.3x", &["1.3x", "1.3"]),
    ("1.5x", &["1.5x", "1.5"]),
    ("1.8x", &["1.8x", "1.8"]),
    ("2x", &["2x", "2.0x", "2.0"]),
    ("2.4x", &["2.4x", "2.4"]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_categories_populated() {
        let registry = PatternRegistry::builtin();
        assert!(registry.manufacturers.len() > 40);
        assert!(registry.series.len() > 100);
        assert!(!registry.formats.is_empty());
        assert!(!registry.mounts.is_empty());
        assert_eq!(registry.anamorphic.len(), 2);
        assert_eq!(registry.squeeze.len(), 5);
    }

    #[test]
    fn test_mount_ordering_lpl_before_pl() {
        let registry = PatternRegistry::builtin();
        let keys: Vec<&str> = registry.mounts.iter().map(|(k, _)| k).collect();
        let lpl = keys.iter().position(|&k| k == "lpl").unwrap();
        let pl = keys.iter().position(|&k| k == "pl").unwrap();
        assert!(lpl < pl);
    }

    #[test]
    fn test_merge_adds_only_absent_keys() {
        let mut learned = LearnedPatterns::default();
        learned.manufacturers.insert("cooke".to_string(), 269);
        learned.manufacturers.insert("panavision".to_string(), 12);
        learned.series.insert("blackwing7".to_string(), 5);

        let registry = PatternRegistry::with_learned(&learned);

        // Existing built-in entry is untouched, character for character.
        assert_eq!(registry.manufacturers.get("cooke").unwrap(), &["cooke".to_string()]);
        assert_eq!(
            registry.manufacturers.get("zeiss").unwrap(),
            &["zeiss".to_string(), "arri/zeiss".to_string(), "arri / zeiss".to_string()]
        );

        // New keys land with a singleton alias list of the term itself.
        assert_eq!(
            registry.manufacturers.get("panavision").unwrap(),
            &["panavision".to_string()]
        );
        assert_eq!(registry.series.get("blackwing7").unwrap(), &["blackwing7".to_string()]);
    }

    #[test]
    fn test_merge_lowercases_learned_terms() {
        let mut learned = LearnedPatterns::default();
        learned.mounts.insert("XPL".to_string(), 3);

        let registry = PatternRegistry::with_learned(&learned);
        assert!(registry.mounts.contains_key("xpl"));
        assert_eq!(registry.mounts.get("xpl").unwrap(), &["xpl".to_string()]);
    }

    #[test]
    fn test_snapshot_parsing() {
        let json = r#"{
            "manual_patterns": {
                "manufacturers": {"panavision": 12},
                "series": {"blackwing7": 5},
                "mounts": {},
                "formats": {"65mm": 2}
            }
        }"#;
        let learned = LearnedPatterns::from_json_str(json).unwrap();
        assert_eq!(learned.manufacturers.get("panavision"), Some(&12));
        assert_eq!(learned.term_count(), 3);
    }

    #[test]
    fn test_snapshot_missing_sections_default_empty() {
        let learned = LearnedPatterns::from_json_str("{}").unwrap();
        assert_eq!(learned.term_count(), 0);
    }

    #[test]
    fn test_snapshot_malformed_is_error() {
        assert!(LearnedPatterns::from_json_str("not json at all").is_err());
        assert!(LearnedPatterns::from_json_str(r#"{"manual_patterns": []}"#).is_err());
    }

    #[test]
    fn test_load_missing_file_is_soft_failure() {
        let loaded = LearnedPatterns::load(Path::new("/nonexistent/learned_patterns.json"));
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_corrupt_file_is_soft_failure() {
        use std::io::Write;

        let mut temp_file = tempfile::NamedTempFile::new().unwrap();
        temp_file.write_all(b"{ this is not json").unwrap();
        temp_file.flush().unwrap();

        assert!(LearnedPatterns::load(temp_file.path()).is_none());
    }
}
