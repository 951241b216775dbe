//! Page assembly: naming, navigation, templating and the build loop.

pub mod build;
pub mod gate;
pub mod home;
pub mod name;
pub mod nav;
pub mod template;

pub use build::build_pages;
pub use home::build_home;
pub use name::{resolve, PageName};

use serde::{Deserialize, Serialize};

/// One manifest record. Entries keep fragment-processing order; sorting,
/// if wanted, happens downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    pub file: String,
}

/// One summary card for the homepage grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryCard {
    pub name: String,
    pub file: String,
    pub desc: String,
}

/// Outcome of a full page build, persisted as the build summary.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    /// Build completion time, RFC 3339.
    pub updated: String,
    /// Input filenames processed, in corpus order.
    pub pages_built: Vec<String>,
    pub manifest_count: usize,
    /// Gated writes that actually happened; zero on a no-change rerun.
    #[serde(skip)]
    pub files_written: usize,
}
