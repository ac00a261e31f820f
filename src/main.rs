use anyhow::Result;
use lensparse::{LearnedPatterns, LensParser};
use log::{info, warn};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    info!("Starting lens name parser");

    // Optionally augment the built-in patterns with a learned snapshot
    let parser = match env::var("LEARNED_PATTERNS_PATH") {
        Ok(path) => match LearnedPatterns::load(Path::new(&path)) {
            Some(learned) => {
                info!("Using {} learned terms from {}", learned.term_count(), path);
                LensParser::with_learned(&learned)
            }
            None => {
                warn!("Falling back to built-in patterns only");
                LensParser::new()
            }
        },
        Err(_) => LensParser::new(),
    };

    // One lens name per input line, one JSON record per output line
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut total = 0usize;
    let mut flagged = 0usize;

    for line in stdin.lock().lines() {
        let line = line?;
        let record = parser.parse(&line);
        total += 1;
        if record.needs_review {
            flagged += 1;
        }
        serde_json::to_writer(&mut out, &record)?;
        writeln!(out)?;
    }

    info!("Parsed {} names, {} flagged for review", total, flagged);

    Ok(())
}
