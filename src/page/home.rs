//! Homepage assembly: nav links, summary cards and buzzword strip.

use std::fs;
use std::io::ErrorKind;

use chrono::Local;
use serde_json::Value;
use tracing::info;

use crate::config::BuildConfig;
use crate::dom;
use crate::error::{Error, Result};
use crate::page::gate;

/// Labels listed ahead of the rest in the homepage nav. Membership only;
/// order among pinned links follows the name sort.
pub const PINNED_LABELS: [&str; 4] = ["Glossary", "Associations", "Presentations", "Findings"];

/// Curated card copy, keyed by page label. Everything else gets a
/// generated placeholder description.
const CARD_DESCRIPTIONS: [(&str, &str); 10] = [
    (
        "Metabolism",
        "Includes glycolysis, glycogen storage, and fatty acid oxidation disorders",
    ),
    (
        "Hemeonc",
        "Summarizes hematologic malignancies, anemias, and blood-related findings",
    ),
    (
        "Chromosomes",
        "Genetic disorders and syndromes organized by chromosome number",
    ),
    (
        "Autoantibodies",
        "Autoimmune diseases and their associated antibodies",
    ),
    (
        "Glossary",
        "Relevant terms across pathology, genetics, and neuro — clearly explained with examples",
    ),
    (
        "Lab Tests",
        "High-yield lab tests for diagnosis and management, including tumor markers, infection assays, and metabolic workups",
    ),
    (
        "Associations",
        "Rapid-fire 'most common' and high-yield exam associations",
    ),
    (
        "Presentations",
        "Clinical buzzwords and presentation patterns linked to classic diagnoses — optimized for fast recall",
    ),
    (
        "Findings",
        "Diagnostic clues and lab/physical findings tied to conditions, covering exam associations",
    ),
    (
        "Pharm",
        "Work in progress, but go crazy with these Antibiotics and Immunologics",
    ),
];

/// Mount point the carousel script hydrates at load time.
const CAROUSEL_HTML: &str = "<div id=\"RapidCarousel\" class=\"carousel-wrapper\"></div>";

/// One manifest record as the homepage reads it: the name is the sort
/// key, an optional `label` key overrides the display text.
#[derive(Debug)]
struct HomeEntry {
    name: String,
    label: String,
    file: String,
}

/// Assemble `index.html` from the homepage template and the manifest.
///
/// Nav links are sorted by manifest name with pinned labels first. A
/// page gets a summary card only when its rendered HTML opts in with
/// `<meta name="summary-card" content="true">`. Reports whether the
/// homepage file actually changed.
pub fn build_home(config: &BuildConfig) -> Result<bool> {
    let template = match fs::read_to_string(&config.home_template_path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(Error::TemplateNotFound(config.home_template_path.clone()));
        }
        Err(err) => return Err(err.into()),
    };

    let manifest: Vec<Value> = serde_json::from_str(&fs::read_to_string(&config.manifest_path)?)?;
    let mut entries = Vec::with_capacity(manifest.len());
    for entry in &manifest {
        let name = entry.get("name").and_then(Value::as_str);
        let file = entry.get("file").and_then(Value::as_str);
        let (Some(name), Some(file)) = (name, file) else {
            return Err(Error::MalformedManifest(entry.to_string()));
        };
        let label = entry.get("label").and_then(Value::as_str).unwrap_or(name);
        entries.push(HomeEntry {
            name: name.to_string(),
            label: label.to_string(),
            file: file.to_string(),
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    let mut pinned: Vec<String> = Vec::new();
    let mut regular: Vec<String> = Vec::new();
    let mut cards: Vec<String> = Vec::new();

    for entry in &entries {
        let href = format!("pages/{}", entry.file);
        let link = format!("<a href=\"{href}\" class=\"home-nav-link\">{}</a>", entry.label);
        if PINNED_LABELS.contains(&entry.label.as_str()) {
            pinned.push(link);
        } else {
            regular.push(link);
        }

        if page_opts_into_card(&config.output_dir.join(&entry.file))? {
            let desc = CARD_DESCRIPTIONS
                .iter()
                .find(|(label, _)| *label == entry.label)
                .map(|(_, desc)| (*desc).to_string())
                .unwrap_or_else(|| {
                    format!("A high-yield summary table for {}.", entry.label.to_lowercase())
                });
            cards.push(format!(
                "<a class=\"summary-card\" href=\"{href}\">\n  \
                 <div class=\"card-title\">{}</div>\n  \
                 <div class=\"card-desc\">{desc}</div>\n</a>",
                entry.label
            ));
        }
    }

    let mut links = pinned;
    links.append(&mut regular);
    let nav_html = format!(
        "<nav style=\"margin: 20px 0 40px 0; text-align: center; font-size: 0.9em;\">\n\
         <div style=\"display: flex; flex-wrap: wrap; justify-content: center; gap: 8px;\">\n\
         {}\n</div>\n</nav>",
        links.join("\n")
    );

    let buzzwords = match fs::read_to_string(&config.buzzwords_txt_path) {
        Ok(text) => text.trim().replace('\n', "  "),
        Err(_) => String::new(),
    };

    let now = Local::now();
    let last_updated = format!(
        "<time datetime=\"{}\">{}</time>",
        now.format("%Y-%m-%d"),
        now.format("%B %d")
    );

    let html = template
        .replace("{{BUZZWORDS}}", &buzzwords)
        .replace("{{NAV_CONTENT}}", &nav_html)
        .replace("{{SUMMARY_CARDS}}", &cards.join("\n"))
        .replace("{{RAPID_REVIEW_CAROUSEL}}", CAROUSEL_HTML)
        .replace("{{LAST_UPDATED}}", &last_updated);

    let wrote = gate::write_if_changed(&config.home_output_path, &html)?;
    info!(links = links.len(), cards = cards.len(), wrote, "homepage assembled");
    Ok(wrote)
}

/// Whether a built page opts into the summary-card grid. A missing page
/// file, a missing meta tag, or any content other than `true`
/// (case-insensitive) all mean no card.
fn page_opts_into_card(page_path: &std::path::Path) -> Result<bool> {
    let html = match fs::read_to_string(page_path) {
        Ok(html) => html,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err.into()),
    };
    let document = dom::parse_html(&html);
    let opted = dom::find_elements_by_name(&document.document, "meta")
        .iter()
        .find(|meta| dom::get_attribute(meta, "name").as_deref() == Some("summary-card"))
        .and_then(|meta| dom::get_attribute(meta, "content"))
        .is_some_and(|content| content.to_lowercase() == "true");
    Ok(opted)
}
