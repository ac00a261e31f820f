#[cfg(test)]
mod tests {
    use lensparse::confidence::{coverage_score, REVIEW_THRESHOLD};
    use lensparse::text_processing::normalize;
    use lensparse::{LearnedPatterns, LensParser, ParsedLens};

    fn create_parser() -> LensParser {
        LensParser::new()
    }

    #[test]
    fn test_zoom_with_full_coverage() {
        let parser = create_parser();
        let record = parser.parse("Canon 6.6-66mm T2.5 Zoom");

        assert_eq!(record.manufacturer, "Canon");
        assert_eq!(record.focal_length, "6.6-66");
        assert_eq!(record.t_stop, "T2.5");
        assert_eq!(record.lens_type, "Zoom");
        assert_eq!(record.confidence_score, 1.0);
        assert!(!record.needs_review);
    }

    #[test]
    fn test_prime_with_series_code() {
        let parser = create_parser();
        let record = parser.parse("Cooke S4/i 18mm T2.0");

        assert_eq!(record.manufacturer, "Cooke");
        assert_eq!(record.series, "S4/I");
        assert_eq!(record.focal_length, "18");
        assert_eq!(record.t_stop, "T2.0");
        assert_eq!(record.lens_type, "Prime");
        assert!(!record.needs_review);
    }

    #[test]
    fn test_empty_input_is_flagged() {
        let parser = create_parser();
        let record = parser.parse("");

        assert_eq!(record, ParsedLens {
            needs_review: true,
            ..ParsedLens::default()
        });
        assert_eq!(record.confidence_score, 0.0);
    }

    #[test]
    fn test_master_anamorphic_overrides_other_brand_tokens() {
        let parser = create_parser();
        let record = parser.parse("Zeiss Master Anamorphic 50mm T1.9");

        assert_eq!(record.manufacturer, "Arri");
        assert_eq!(record.series, "Master Anamorphic");
        assert_eq!(record.anamorphic_spherical, "Anamorphic");
        assert_eq!(record.format, "S35");
    }

    #[test]
    fn test_dual_focal_with_residual_notes() {
        let parser = create_parser();
        let record = parser.parse("100mm/150mm Caldwell Chameleon SC/XC - Rear Expander");

        assert_eq!(record.focal_length, "100/150");
        assert_eq!(record.series, "Chameleon SC/XC");
        assert_eq!(record.mount, "");
        assert_eq!(record.notes, "Rear Expander");
    }

    #[test]
    fn test_parenthesized_note_captured_verbatim() {
        let parser = create_parser();
        let record = parser.parse("Angenieux EZ-2 15-40mm T2 (Rear S35 Group)");

        assert_eq!(record.manufacturer, "Angenieux");
        assert_eq!(record.series, "EZ-2");
        assert_eq!(record.notes, "Rear S35 Group");
        assert_eq!(record.lens_type, "Zoom");
    }

    #[test]
    fn test_anamorphic_with_squeeze_and_mount() {
        let parser = create_parser();
        let record = parser.parse("Atlas Orion 40mm T2 Anamorphic 2x (PL)");

        assert_eq!(record.manufacturer, "Atlas");
        assert_eq!(record.series, "Orion");
        assert_eq!(record.anamorphic_spherical, "Anamorphic");
        assert_eq!(record.anamorphic_squeeze, "2x");
        assert_eq!(record.mount, "PL");
    }

    #[test]
    fn test_lpl_mount_not_shadowed_by_pl() {
        let parser = create_parser();
        let record = parser.parse("Canon Rangefinder - TLS - LPL Mount");
        assert_eq!(record.mount, "LPL");
        assert_eq!(record.housing, "Tls");
    }

    #[test]
    fn test_parsing_is_deterministic() {
        let parser = create_parser();
        let inputs = [
            "Canon 6.6-66mm T2.5 Zoom",
            "Zeiss Super Speed 50mm T1.3 Rehoused",
            "Fujinon HA25x16.5",
            "Kooky Cooke 32mm",
        ];
        for input in inputs {
            assert_eq!(parser.parse(input), parser.parse(input));
        }
    }

    #[test]
    fn test_normalization_is_idempotent() {
        for input in ["", "  Cooke  S4/i ", "ALREADY lower", "tabs\tand\nnewlines"] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_review_flag_matches_threshold() {
        let parser = create_parser();
        let inputs = [
            "Canon 6.6-66mm T2.5 Zoom",
            "Some Entirely Unknown Piece Of Glass",
            "Cooke S4/i 18mm T2.0",
            "50mm",
            "",
        ];
        for input in inputs {
            let record = parser.parse(input);
            assert!((0.0..=1.0).contains(&record.confidence_score));
            assert_eq!(record.needs_review, record.confidence_score < REVIEW_THRESHOLD);
        }
    }

    #[test]
    fn test_coverage_monotone_in_correct_fields() {
        let mut record = ParsedLens::new("Leica Summilux-C 40mm T1.4");
        record.focal_length = "40".to_string();
        let base = coverage_score(&record);

        record.manufacturer = "Leica".to_string();
        let with_manufacturer = coverage_score(&record);
        assert!(with_manufacturer >= base);

        record.t_stop = "T1.4".to_string();
        assert!(coverage_score(&record) >= with_manufacturer);
    }

    #[test]
    fn test_learned_patterns_extend_recognition() {
        let mut learned = LearnedPatterns::default();
        learned.manufacturers.insert("panavision".to_string(), 12);

        let builtin = LensParser::new();
        assert_eq!(builtin.parse("Panavision Primo 75mm T1.9").manufacturer, "");

        let parser = LensParser::with_learned(&learned);
        assert_eq!(parser.parse("Panavision Primo 75mm T1.9").manufacturer, "Panavision");
    }

    #[test]
    fn test_learned_patterns_never_rewrite_builtins() {
        let mut learned = LearnedPatterns::default();
        learned.manufacturers.insert("cooke".to_string(), 269);
        learned.mounts.insert("pl".to_string(), 500);

        let parser = LensParser::with_learned(&learned);
        assert_eq!(
            parser.registry().manufacturers.get("cooke").unwrap(),
            &["cooke".to_string()]
        );
        assert_eq!(parser.registry().mounts.get("pl").unwrap(), &["pl".to_string()]);

        // Behavior is unchanged too: the bare "pl" alias stays bounded.
        assert_eq!(parser.parse("TLS LPL Rehoused 35mm").mount, "LPL");
    }

    #[test]
    fn test_special_rig_routed_through_rules() {
        let parser = create_parser();
        let record = parser.parse("Snorricam Rig N/A");
        assert_eq!(record.lens_type, "Special");
        assert_eq!(record.t_stop, "N/A");
    }

    #[test]
    fn test_fujinon_broadcast_code() {
        let parser = create_parser();
        let record = parser.parse("Fujinon HA25x16.5 ENG Zoom");
        assert_eq!(record.manufacturer, "Fujinon");
        assert_eq!(record.series, "HA25x16.5 ENG Zoom");
        assert_eq!(record.lens_type, "Zoom");
        assert_eq!(record.anamorphic_spherical, "Spherical");
    }

    #[test]
    fn test_rule_resolved_series_leaves_no_residual_notes() {
        let parser = create_parser();

        // The broadcast model code becomes the series during resolution; it
        // must not additionally count as leftover text.
        let record = parser.parse("Fujinon HA25x16.5 ENG Zoom");
        assert_eq!(record.series, "HA25x16.5 ENG Zoom");
        assert_eq!(record.notes, "");

        let record = parser.parse("Fujinon HA42x9.7 Studio Zoom");
        assert_eq!(record.series, "HA42x9.7 Studio Zoom");
        assert_eq!(record.notes, "");
    }

    #[test]
    fn test_serialized_record_shape() {
        let parser = create_parser();
        let record = parser.parse("Cooke S4/i 18mm T2.0");
        let json = serde_json::to_string(&record).unwrap();

        assert!(json.contains("\"manufacturer\":\"Cooke\""));
        assert!(json.contains("\"needs_review\":false"));
        let back: ParsedLens = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
