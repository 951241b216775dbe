//! Search index construction over the built pages.
//!
//! Runs after the page build so synonym matching sees final rendered
//! markup, not source fragments. Pages are scanned in sorted filename
//! order to keep the index deterministic.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::BuildConfig;
use crate::error::Result;
use crate::lexicon::Lexicon;
use crate::page::gate;
use crate::page::name::title_case;
use crate::search::TermExtractor;
use crate::table::{self, Table};

/// A term's running count must exceed this before suppression can kick in.
const OVERUSE_COUNT: usize = 5;
/// And the term must have appeared on more than this many distinct pages.
const OVERUSE_PAGES: usize = 3;

/// One searchable record: a term, the page it appears on, the page's
/// display section, and whether the term is a known medical phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub term: String,
    pub page: String,
    pub section: String,
    pub medical: bool,
}

/// Build the search index from every page under the output directory and
/// write it (content-gated) to the configured index path. Returns the
/// number of entries emitted.
///
/// Overuse suppression is monotonic: page terms fold into the running
/// global counts before the page's entries are emitted, so once a term
/// crosses both thresholds no further pages emit it, while entries
/// already emitted stay in the index.
pub fn build_search_index(config: &BuildConfig, lexicon: &Lexicon) -> Result<usize> {
    let extractor = TermExtractor::new(lexicon);
    let mut global_count: BTreeMap<String, usize> = BTreeMap::new();
    let mut term_pages: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut index: Vec<IndexEntry> = Vec::new();

    for path in built_pages(config)? {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let tables = table::parse_page_tables(&fs::read_to_string(&path)?);
        if tables.is_empty() {
            continue;
        }

        let mut page_terms: BTreeSet<String> = BTreeSet::new();
        for table in &tables {
            page_terms.extend(extractor.extract(table));
        }
        info!(page = %file_name, terms = page_terms.len(), "extracted table terms");

        for term in &page_terms {
            *global_count.entry(term.clone()).or_insert(0) += 1;
            term_pages
                .entry(term.clone())
                .or_default()
                .insert(file_name.to_string());
        }

        let section = section_name(&path);
        let page_text = rendered_table_text(&tables);

        for term in &page_terms {
            if global_count[term] > OVERUSE_COUNT && term_pages[term].len() > OVERUSE_PAGES {
                continue;
            }
            index.push(entry(term, file_name, &section, lexicon));

            // A synonym rides along only when the page actually shows it
            // and the extractor never counted it in its own right.
            if let Some(synonyms) = lexicon.synonyms_of(term) {
                for synonym in synonyms {
                    if page_text.contains(synonym.as_str()) && !global_count.contains_key(synonym)
                    {
                        index.push(entry(synonym, file_name, &section, lexicon));
                    }
                }
            }
        }
    }

    let json = serde_json::to_string_pretty(&index)?;
    gate::write_if_changed(&config.search_index_path, &json)?;
    info!(
        path = %config.search_index_path.display(),
        entries = index.len(),
        "search index written"
    );
    Ok(index.len())
}

fn entry(term: &str, file_name: &str, section: &str, lexicon: &Lexicon) -> IndexEntry {
    IndexEntry {
        term: term.to_string(),
        page: file_name.to_string(),
        section: section.to_string(),
        medical: lexicon.is_medical_phrase(term),
    }
}

/// Built page files in sorted order. A missing output directory scans as
/// empty, so the index can be (re)built on a fresh tree.
fn built_pages(config: &BuildConfig) -> Result<Vec<PathBuf>> {
    if !config.output_dir.exists() {
        return Ok(Vec::new());
    }
    let mut files: Vec<PathBuf> = fs::read_dir(&config.output_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "html"))
        .collect();
    files.sort();
    Ok(files)
}

/// Display section for a page: the file stem with hyphens opened up and
/// each word's first letter raised, e.g. `cd-markers.html` -> `Cd Markers`.
fn section_name(path: &Path) -> String {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    title_case(&stem.replace('-', " "))
}

/// Lowercased visible text of a page's tables, for verbatim synonym
/// matching.
fn rendered_table_text(tables: &[Table]) -> String {
    let mut pieces = Vec::new();
    for table in tables {
        for cell in table.cells() {
            if !cell.text.is_empty() {
                pieces.push(cell.text.to_lowercase());
            }
        }
    }
    pieces.join(" ")
}
