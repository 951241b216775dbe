//! Buzzword list conversion.
//!
//! The curated review list lives as plain text, one `term = association`
//! per line, which is friendlier to edit than JSON. The homepage widget
//! wants JSON, so the build converts on every run.

use std::fs;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::BuildConfig;
use crate::error::Result;
use crate::page::gate;

/// One buzzword pairing as the homepage script consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buzzword {
    pub term: String,
    pub assoc: String,
}

/// Parse `term = association` lines. Blank lines and lines without an
/// equals sign are skipped; only the first equals sign splits.
pub fn parse_buzzwords(text: &str) -> Vec<Buzzword> {
    text.lines()
        .filter_map(|line| {
            let line = line.trim();
            let (term, assoc) = line.split_once('=')?;
            Some(Buzzword {
                term: term.trim().to_string(),
                assoc: assoc.trim().to_string(),
            })
        })
        .collect()
}

/// Convert the buzzword text file to JSON for the homepage. A missing
/// source file degrades to an empty list.
pub fn convert_buzzwords(config: &BuildConfig) -> Result<usize> {
    let buzzwords = match fs::read_to_string(&config.buzzwords_txt_path) {
        Ok(text) => parse_buzzwords(&text),
        Err(err) => {
            warn!(
                path = %config.buzzwords_txt_path.display(),
                error = %err,
                "buzzword list unavailable, writing empty set"
            );
            Vec::new()
        }
    };

    let json = serde_json::to_string_pretty(&buzzwords)?;
    gate::write_if_changed(&config.buzzwords_json_path, &json)?;
    info!(count = buzzwords.len(), "buzzwords converted");
    Ok(buzzwords.len())
}
