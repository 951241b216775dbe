//! The page build loop: fragments in, finished pages out.

use std::collections::BTreeSet;
use std::fs;

use chrono::Local;
use tracing::{info, warn};

use crate::config::BuildConfig;
use crate::error::Result;
use crate::page::gate::WriteGate;
use crate::page::name::{resolve_all, PageName};
use crate::page::nav;
use crate::page::template::PageTemplate;
use crate::page::{BuildReport, ManifestEntry, SummaryCard};
use crate::table;

/// Build every page from the fragment corpus.
///
/// Per fragment: run the table pipeline, emit the flat nav, pull in the
/// pregenerated dropdown nav, render the template, and write the page
/// through the change gate. Afterwards stale pages are deleted, the
/// manifest and card list are written, and the aggregate hash is stored
/// for the next run's gate.
pub fn build_pages(config: &BuildConfig) -> Result<BuildReport> {
    fs::create_dir_all(&config.output_dir)?;
    fs::create_dir_all(&config.drop_nav_dir)?;

    let template = PageTemplate::load(config)?;
    let mut gate = WriteGate::new(config, template.text())?;

    let table_files = config.table_files()?;
    let file_names: Vec<String> = table_files
        .iter()
        .filter_map(|path| path.file_name().and_then(|n| n.to_str()))
        .map(str::to_string)
        .collect();
    let resolved = resolve_all(&file_names)?;
    let pages: Vec<PageName> = resolved.iter().map(|(_, page)| page.clone()).collect();

    write_drop_navs(config, &pages, &mut gate)?;

    let mut manifest: Vec<ManifestEntry> = Vec::new();
    let mut cards: Vec<SummaryCard> = Vec::new();

    for (path, (file_name, page)) in table_files.iter().zip(&resolved) {
        info!(file = %file_name, "processing fragment");
        let raw = fs::read_to_string(path)?;
        let table_html = table::render_fragment(&table::process_fragment(&raw));

        let flat = nav::flat_nav(page, &pages);
        let flat_path = config.nav_dir.join(format!("nav_{}.html", page.slug));
        gate.write_if_changed(&flat_path, &flat)?;

        let drop_path = config
            .drop_nav_dir
            .join(format!("drop_nav_{}.html", page.slug));
        // A missing dropdown fragment degrades to an empty substitution.
        let drop_nav = fs::read_to_string(&drop_path).unwrap_or_default();

        let final_html = template.render(&page.label, &table_html, &drop_nav);
        let output = config.output_dir.join(page.output_file());
        if gate.write_page(&output, &final_html)? {
            info!(page = %page.output_file(), "built page");
        }

        manifest.push(ManifestEntry {
            name: page.label.clone(),
            file: page.output_file(),
        });
        cards.push(SummaryCard {
            name: page.label.clone(),
            file: page.output_file(),
            desc: format!(
                "A high-yield summary table for {}.",
                page.label.to_lowercase()
            ),
        });
    }

    remove_orphans(config, &pages)?;

    if let Some(parent) = config.manifest_path.parent() {
        fs::create_dir_all(parent)?;
    }
    gate.write_if_changed(&config.manifest_path, &serde_json::to_string_pretty(&manifest)?)?;
    gate.write_if_changed(
        &config.summary_cards_path,
        &serde_json::to_string_pretty(&cards)?,
    )?;
    gate.store(config)?;

    let report = BuildReport {
        updated: Local::now().to_rfc3339(),
        pages_built: resolved.into_iter().map(|(file, _)| file).collect(),
        manifest_count: manifest.len(),
        files_written: gate.written(),
    };
    fs::write(&config.build_summary_path, serde_json::to_string_pretty(&report)?)?;
    info!(
        pages = report.manifest_count,
        writes = report.files_written,
        "page build complete"
    );
    Ok(report)
}

/// Pregenerate the dropdown nav fragment for every page. Done in one
/// pass before the page loop so every page, including the first, can
/// read its own fragment back.
fn write_drop_navs(config: &BuildConfig, pages: &[PageName], gate: &mut WriteGate) -> Result<()> {
    for page in pages {
        let drop = nav::drop_nav(page, pages);
        let path = config
            .drop_nav_dir
            .join(format!("drop_nav_{}.html", page.slug));
        gate.write_if_changed(&path, &drop)?;
    }
    Ok(())
}

/// Delete page outputs no current fragment resolves to. Unconditional,
/// logged per file.
fn remove_orphans(config: &BuildConfig, pages: &[PageName]) -> Result<()> {
    let expected: BTreeSet<String> = pages.iter().map(PageName::output_file).collect();

    for entry in fs::read_dir(&config.output_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.ends_with(".html") && !expected.contains(name) {
            fs::remove_file(entry.path())?;
            warn!(page = %name, "removed stale page");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "<html><head><title>{{PAGE_TITLE}}</title></head>\
                            <body>{{DROP_NAV_CONTENT}}\n{{TABLE_CONTENT}}</body></html>";

    fn fixture() -> (tempfile::TempDir, BuildConfig) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let config = BuildConfig::new(root);

        fs::create_dir_all(&config.table_dir).unwrap();
        fs::create_dir_all(config.template_path.parent().unwrap()).unwrap();
        fs::write(&config.template_path, TEMPLATE).unwrap();
        for path in config.style_paths.iter().chain(config.script_paths.iter()) {
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "/* asset */").unwrap();
        }
        (dir, config)
    }

    fn write_fragment(config: &BuildConfig, name: &str, html: &str) {
        fs::write(config.table_dir.join(name), html).unwrap();
    }

    #[test]
    fn test_build_renders_pages_and_manifest() {
        let (_dir, config) = fixture();
        write_fragment(
            &config,
            "hla.table.html",
            "<table class=\"table1\"><tr><th>Allele</th></tr><tr><td>B27</td></tr></table>",
        );
        write_fragment(
            &config,
            "glossary.table.html",
            "<table><tr><td>term</td></tr></table>",
        );

        let report = build_pages(&config).unwrap();
        assert_eq!(report.manifest_count, 2);
        assert_eq!(
            report.pages_built,
            vec!["glossary.table.html", "hla.table.html"]
        );

        let page = fs::read_to_string(config.output_dir.join("hla.html")).unwrap();
        assert!(page.contains("<title>HLA</title>"));
        assert!(page.contains("th-menu-wrapper"));
        assert!(page.contains("nav_dropdown_container"));

        let manifest: Vec<ManifestEntry> = serde_json::from_str(
            &fs::read_to_string(&config.manifest_path).unwrap(),
        )
        .unwrap();
        assert_eq!(manifest[0].name, "Glossary");
        assert_eq!(manifest[1].file, "hla.html");

        let cards: Vec<SummaryCard> = serde_json::from_str(
            &fs::read_to_string(&config.summary_cards_path).unwrap(),
        )
        .unwrap();
        assert_eq!(cards[1].desc, "A high-yield summary table for hla.");
    }

    #[test]
    fn test_second_run_writes_nothing() {
        let (_dir, config) = fixture();
        write_fragment(
            &config,
            "omm.table.html",
            "<table><tr><td>Chapman point</td></tr></table>",
        );

        let first = build_pages(&config).unwrap();
        assert!(first.files_written > 0);

        let second = build_pages(&config).unwrap();
        assert_eq!(second.files_written, 0);
    }

    #[test]
    fn test_template_touch_forces_page_rewrite() {
        let (_dir, config) = fixture();
        write_fragment(&config, "omm.table.html", "<table><tr><td>x</td></tr></table>");
        build_pages(&config).unwrap();

        fs::write(&config.template_path, format!("{TEMPLATE}<!-- v2 -->")).unwrap();
        let report = build_pages(&config).unwrap();
        assert!(report.files_written >= 1);

        let page = fs::read_to_string(config.output_dir.join("omm.html")).unwrap();
        assert!(page.contains("<!-- v2 -->"));
    }

    #[test]
    fn test_orphan_pages_are_removed() {
        let (_dir, config) = fixture();
        write_fragment(&config, "hla.table.html", "<table><tr><td>a</td></tr></table>");

        fs::create_dir_all(&config.output_dir).unwrap();
        fs::write(config.output_dir.join("stale.html"), "old").unwrap();
        fs::write(config.output_dir.join("notes.txt"), "kept").unwrap();

        build_pages(&config).unwrap();
        assert!(!config.output_dir.join("stale.html").exists());
        assert!(config.output_dir.join("notes.txt").exists());
        assert!(config.output_dir.join("hla.html").exists());
    }

    #[test]
    fn test_missing_placeholder_is_fatal() {
        let (_dir, config) = fixture();
        fs::write(&config.template_path, "<html>{{PAGE_TITLE}} only</html>").unwrap();
        write_fragment(&config, "hla.table.html", "<table><tr><td>a</td></tr></table>");

        let err = build_pages(&config).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("{{TABLE_CONTENT}}"));
        assert!(message.contains("{{DROP_NAV_CONTENT}}"));
    }

    #[test]
    fn test_slug_collision_is_fatal() {
        let (_dir, config) = fixture();
        // Hyphenated and underscored stems both slug to "pharm-agents".
        write_fragment(&config, "pharm-agents.table.html", "<table><tr><td>a</td></tr></table>");
        write_fragment(&config, "pharm_agents.table.html", "<table><tr><td>b</td></tr></table>");

        let err = build_pages(&config).unwrap_err();
        assert!(err.to_string().contains("pharm-agents"));
    }

    #[test]
    fn test_page_excludes_own_nav_link() {
        let (_dir, config) = fixture();
        write_fragment(&config, "hla.table.html", "<table><tr><td>a</td></tr></table>");
        write_fragment(&config, "pharm.table.html", "<table><tr><td>b</td></tr></table>");

        build_pages(&config).unwrap();

        let own_nav = fs::read_to_string(config.nav_dir.join("nav_hla.html")).unwrap();
        assert!(!own_nav.contains("hla.html"));
        assert!(own_nav.contains("pharm.html"));

        let own_drop = fs::read_to_string(config.drop_nav_dir.join("drop_nav_hla.html")).unwrap();
        assert!(!own_drop.contains("hla.html"));
        assert!(own_drop.contains("pharm.html"));
    }
}
