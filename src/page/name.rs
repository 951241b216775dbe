//! Label and slug resolution for table fragment filenames.

use crate::config::TABLE_SUFFIX;
use crate::error::{Error, Result};

/// Label overrides, keyed by the lowercased filename stem.
const LABEL_OVERRIDES: [(&str, &str); 5] = [
    ("cd-markers", "CD Markers"),
    ("hla", "HLA"),
    ("lab-tests", "Labs"),
    ("hemeonc", "Heme-Onc"),
    ("omm", "OMM"),
];

/// Display label plus the slug derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageName {
    pub label: String,
    pub slug: String,
}

impl PageName {
    /// Output filename for this page.
    pub fn output_file(&self) -> String {
        format!("{}.html", self.slug)
    }
}

/// Resolve a fragment filename into its page name.
///
/// The stem is matched against the override list first, then against two
/// keyword heuristics, then the `rapid_` prefix is dropped; whatever is
/// left is title-cased with underscores as spaces. The slug is always the
/// lowercased label with spaces as hyphens.
///
/// # Examples
///
/// ```
/// use tablesmith::page::resolve;
///
/// let name = resolve("cd-markers.table.html");
/// assert_eq!(name.label, "CD Markers");
/// assert_eq!(name.slug, "cd-markers");
///
/// let name = resolve("rapid_findings.table.html");
/// assert_eq!(name.label, "Findings");
/// assert_eq!(name.slug, "findings");
/// ```
pub fn resolve(filename: &str) -> PageName {
    let base = filename.replace(TABLE_SUFFIX, "").to_lowercase();

    let label = if let Some((_, label)) = LABEL_OVERRIDES.iter().find(|(key, _)| *key == base) {
        (*label).to_string()
    } else if base.contains("cd") && base.contains("marker") {
        String::from("CD Markers")
    } else if base.contains("lab") && base.contains("test") {
        String::from("Labs")
    } else if let Some(rest) = base.strip_prefix("rapid_") {
        title_case(&rest.replace('_', " "))
    } else {
        title_case(&base.replace('_', " "))
    };

    let slug = label.to_lowercase().replace(' ', "-");
    PageName { label, slug }
}

/// Resolve every filename, failing fast when two files produce one slug.
///
/// Without this check, colliding pages would silently overwrite each
/// other's output.
pub fn resolve_all<I, S>(filenames: I) -> Result<Vec<(String, PageName)>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut resolved: Vec<(String, PageName)> = Vec::new();
    for filename in filenames {
        let filename = filename.as_ref();
        let name = resolve(filename);
        if let Some((first, _)) = resolved.iter().find(|(_, seen)| seen.slug == name.slug) {
            return Err(Error::SlugCollision {
                slug: name.slug,
                first: first.clone(),
                second: filename.to_string(),
            });
        }
        resolved.push((filename.to_string(), name));
    }
    Ok(resolved)
}

/// Uppercase the first letter of every alphabetic run, lowercase the
/// rest, leaving non-letters as run boundaries.
pub(crate) fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_run = false;
    for ch in input.chars() {
        if ch.is_alphabetic() {
            if in_run {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_run = true;
        } else {
            out.push(ch);
            in_run = false;
        }
    }
    out
}
