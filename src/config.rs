//! Build configuration: the directory layout of a table-site tree.
//!
//! All paths are resolved against a single root at construction time and the
//! resulting [`BuildConfig`] is passed down by reference. No process-wide
//! state, no re-reading of the environment mid-build.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Suffix that marks a file in the fragment directory as a table fragment.
pub const TABLE_SUFFIX: &str = ".table.html";

/// Resolved paths for one build tree.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub root: PathBuf,
    /// Source table fragments (`*.table.html`).
    pub table_dir: PathBuf,
    /// Built pages.
    pub output_dir: PathBuf,
    /// Per-page flat navigation fragments.
    pub nav_dir: PathBuf,
    /// Per-page dropdown navigation fragments.
    pub drop_nav_dir: PathBuf,
    /// Page template with the three required placeholders.
    pub template_path: PathBuf,
    pub manifest_path: PathBuf,
    /// Persisted aggregate hash of template + static assets.
    pub hash_state_path: PathBuf,
    pub summary_cards_path: PathBuf,
    pub build_summary_path: PathBuf,
    pub search_index_path: PathBuf,
    pub ontology_path: PathBuf,
    pub wordlist_path: PathBuf,
    pub data_banks_path: PathBuf,
    pub stats_path: PathBuf,
    pub buzzwords_txt_path: PathBuf,
    pub buzzwords_json_path: PathBuf,
    pub home_template_path: PathBuf,
    pub home_output_path: PathBuf,
    /// Stylesheets embedded by the page template, in hash order.
    pub style_paths: Vec<PathBuf>,
    /// Scripts embedded by the page template, in hash order.
    pub script_paths: Vec<PathBuf>,
}

impl BuildConfig {
    /// Default layout rooted at `root`.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let nav_dir = root.join("navs");
        Self {
            table_dir: root.join("subdex"),
            output_dir: root.join("pages"),
            drop_nav_dir: nav_dir.join("drop_navs"),
            nav_dir,
            template_path: root.join("static/BASE.html"),
            manifest_path: root.join("static/data/table.manifest.json"),
            hash_state_path: root.join("static/data/.base_hash.json"),
            summary_cards_path: root.join("static/data/summary_cards.json"),
            build_summary_path: root.join("build_summary.json"),
            search_index_path: root.join("assets/search_index.json"),
            ontology_path: root.join("assets/ontologies/hpo_terms.json"),
            wordlist_path: root.join("assets/wordlist.txt"),
            data_banks_path: root.join("assets/data_banks.json"),
            stats_path: root.join("table_stats.json"),
            buzzwords_txt_path: root.join("texts/buzzwords.txt"),
            buzzwords_json_path: root.join("static/data/buzzwords.json"),
            home_template_path: root.join("static/index_base.html"),
            home_output_path: root.join("index.html"),
            style_paths: vec![
                root.join("styles/style.css"),
                root.join("styles/table.css"),
                root.join("styles/nav.css"),
            ],
            script_paths: vec![
                root.join("scripts/static_search.js"),
                root.join("scripts/table_page_utils.js"),
            ],
            root,
        }
    }

    /// Default layout with environment overrides applied.
    ///
    /// Recognized variables (all resolved relative to `root`): `TABLE_DIR`,
    /// `OUTPUT_DIR`, `NAV_DIR`, `BASE_HTML`, `MANIFEST_PATH`.
    pub fn from_env<P: AsRef<Path>>(root: P) -> Self {
        let mut config = Self::new(root);
        if let Ok(dir) = env::var("TABLE_DIR") {
            config.table_dir = config.root.join(dir);
        }
        if let Ok(dir) = env::var("OUTPUT_DIR") {
            config.output_dir = config.root.join(dir);
        }
        if let Ok(dir) = env::var("NAV_DIR") {
            config.nav_dir = config.root.join(dir);
            config.drop_nav_dir = config.nav_dir.join("drop_navs");
        }
        if let Ok(path) = env::var("BASE_HTML") {
            config.template_path = config.root.join(path);
        }
        if let Ok(path) = env::var("MANIFEST_PATH") {
            config.manifest_path = config.root.join(path);
        }
        config
    }

    /// Table fragments in corpus iteration order: the sorted directory
    /// listing, filtered to `*.table.html`.
    ///
    /// Every consumer of the corpus (page build, navigation, stats) uses this
    /// order, so navigation link order matches build order.
    pub fn table_files(&self) -> Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = fs::read_dir(&self.table_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(TABLE_SUFFIX))
            })
            .collect();
        files.sort();
        Ok(files)
    }
}
