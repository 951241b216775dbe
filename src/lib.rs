//! # tablesmith
//!
//! Static page builder and search indexer for hand-authored HTML table
//! fragments.
//!
//! ## Features
//!
//! - Parse table fragments into a value model; annotate column indices,
//!   divider rows and section titles; compose rapid-review carousels
//! - Render full pages through a placeholder template with per-page
//!   flat and dropdown navigation
//! - Change-detection gate: rebuilds are idempotent, rewriting only
//!   outputs whose content actually changed (or everything, when the
//!   template or an embedded asset was touched)
//! - Extract clinical terms from built pages into a static search index
//! - Corpus statistics with derived data banks feeding back into
//!   extraction
//!
//! ## Quick Start
//!
//! ```no_run
//! use tablesmith::BuildConfig;
//! use tablesmith::page::build_pages;
//!
//! let config = BuildConfig::new("site");
//! let report = build_pages(&config).unwrap();
//! println!("built {} pages", report.manifest_count);
//! ```
//!
//! The full build (pages, search index, buzzwords, homepage, statistics)
//! is sequenced by the `tablesmith` binary.

pub mod config;
pub mod dom;
pub mod error;
pub mod lexicon;
pub mod page;
pub mod search;
pub mod stats;
pub mod table;
pub mod texts;

pub use config::BuildConfig;
pub use error::{Error, Result};
pub use page::{build_home, build_pages, resolve, PageName};
pub use search::{build_search_index, TermExtractor};
pub use table::{process_fragment, render_fragment};
