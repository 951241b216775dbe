//! Client-side search support: term extraction and the page index.
//!
//! Pages are static, so search runs entirely in the browser against a
//! prebuilt JSON index. The extraction engine mines candidate phrases
//! out of table cells; the index builder scans every built page, applies
//! cross-page overuse suppression and writes the flat entry list the
//! search script loads.

pub mod extract;
pub mod index;

pub use extract::TermExtractor;
pub use index::{build_search_index, IndexEntry};
