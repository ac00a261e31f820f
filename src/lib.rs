//! # Lensparse
//!
//! A heuristic parser that turns free-text cine lens names into structured
//! inventory records: pattern-table lookups per field, an ordered chain of
//! cross-field resolution rules, and a coverage-based confidence score that
//! flags low-quality results for human review.

pub mod confidence;
pub mod extractors;
pub mod lens_model;
pub mod lens_parser;
pub mod pattern_registry;
pub mod resolution;
pub mod text_processing;

pub use lens_model::ParsedLens;
pub use lens_parser::LensParser;
pub use pattern_registry::{LearnedPatterns, PatternRegistry};
