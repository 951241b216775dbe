//! End-to-end build tests: a fragment corpus in a temp site tree runs
//! through the full pipeline (pages, navigation, manifest, search index,
//! buzzwords, homepage, statistics), with idempotence and cleanup
//! behavior checked across repeat runs.

use std::fs;

use tablesmith::config::BuildConfig;
use tablesmith::lexicon::Lexicon;
use tablesmith::page::{build_home, build_pages, BuildReport};
use tablesmith::search::build_search_index;
use tablesmith::stats::write_stats;
use tablesmith::texts::convert_buzzwords;
use tempfile::TempDir;

const PAGE_TEMPLATE: &str = "<html><head><title>{{PAGE_TITLE}}</title>\
    <meta name=\"summary-card\" content=\"true\"></head>\
    <body>{{DROP_NAV_CONTENT}}\n<main>{{TABLE_CONTENT}}</main></body></html>";

const HOME_TEMPLATE: &str = "<html><body>{{NAV_CONTENT}}\n\
    <section>{{SUMMARY_CARDS}}</section>\n{{RAPID_REVIEW_CAROUSEL}}\n\
    <p>{{BUZZWORDS}}</p>\n<footer>{{LAST_UPDATED}}</footer></body></html>";

const CHROMOSOMES_FRAGMENT: &str = "<table class=\"table1\">\n\
    <tr><th>Deletion</th><th>Features</th></tr>\n\
    <tr><td>22q11.2 deletion syndrome (DiGeorge syndrome)</td><td>CATCH-22 features</td></tr>\n\
    <tr><td>5p deletion (cri du chat)</td><td>High-pitched cry</td></tr>\n\
    </table>";

const FINDINGS_FRAGMENT: &str = "<div class=\"rr-assoc\">\
    <div class=\"carousel-item\">Most common cause of achalasia\
    <div class=\"answer\">Idiopathic degeneration</div></div></div>\n\
    <table class=\"table2\">\n\
    <tr><th>Finding</th><th>Diagnosis</th></tr>\n\
    <tr><td>achalasia</td><td>Bird-beak esophagus on barium swallow</td></tr>\n\
    </table>";

/// Lay out a minimal site tree: templates, embedded assets, lexicon
/// inputs, buzzwords, and an empty fragment corpus.
fn site() -> (TempDir, BuildConfig) {
    let dir = TempDir::new().expect("temp site dir");
    let config = BuildConfig::new(dir.path());

    fs::create_dir_all(&config.table_dir).unwrap();
    fs::create_dir_all(config.template_path.parent().unwrap()).unwrap();
    fs::write(&config.template_path, PAGE_TEMPLATE).unwrap();
    fs::write(&config.home_template_path, HOME_TEMPLATE).unwrap();
    for asset in config.style_paths.iter().chain(config.script_paths.iter()) {
        fs::create_dir_all(asset.parent().unwrap()).unwrap();
        fs::write(asset, "/* asset */").unwrap();
    }

    fs::create_dir_all(config.buzzwords_txt_path.parent().unwrap()).unwrap();
    fs::write(
        &config.buzzwords_txt_path,
        "rose spots = typhoid fever\nslapped cheeks = parvovirus B19\n",
    )
    .unwrap();

    fs::create_dir_all(config.ontology_path.parent().unwrap()).unwrap();
    fs::write(
        &config.ontology_path,
        r#"[{"lbl": "22q11.2 deletion syndrome", "meta": {"synonyms": [{"val": "DiGeorge syndrome"}]}}]"#,
    )
    .unwrap();
    fs::write(&config.wordlist_path, "achalasia\npheochromocytoma\n").unwrap();

    (dir, config)
}

fn write_fragment(config: &BuildConfig, name: &str, html: &str) {
    fs::write(config.table_dir.join(name), html).unwrap();
}

/// The binary's full-build sequence, returning the page build report.
fn run_pipeline(config: &BuildConfig) -> BuildReport {
    let report = build_pages(config).expect("page build");
    let lexicon = Lexicon::load(config);
    build_search_index(config, &lexicon).expect("search index");
    convert_buzzwords(config).expect("buzzword conversion");
    build_home(config).expect("homepage");
    write_stats(config).expect("statistics");
    report
}

// ============================================================================
// Full pipeline
// ============================================================================

#[test]
fn test_full_build_produces_every_artifact() {
    let (_dir, config) = site();
    write_fragment(&config, "chromosomes.table.html", CHROMOSOMES_FRAGMENT);
    write_fragment(&config, "rapid_findings.table.html", FINDINGS_FRAGMENT);

    let report = run_pipeline(&config);
    assert_eq!(report.manifest_count, 2);
    assert_eq!(
        report.pages_built,
        vec!["chromosomes.table.html", "rapid_findings.table.html"]
    );

    // Pages: templated title, dropdown nav, annotated table content.
    let chromosomes = fs::read_to_string(config.output_dir.join("chromosomes.html")).unwrap();
    assert!(chromosomes.contains("<title>Chromosomes</title>"));
    assert!(chromosomes.contains("nav_dropdown_container"));
    assert!(chromosomes.contains("data-col="));

    // The rapid-review fragment gets its carousel ahead of the table,
    // with the answer hidden.
    let findings = fs::read_to_string(config.output_dir.join("findings.html")).unwrap();
    let carousel = findings.find("carousel-container").expect("carousel present");
    let table = findings.find("<table").expect("table present");
    assert!(carousel < table);
    assert!(findings.contains("style=\"display:none;\""));

    // Navigation fragments persisted per slug.
    assert!(config.nav_dir.join("nav_chromosomes.html").exists());
    assert!(config.drop_nav_dir.join("drop_nav_findings.html").exists());

    // Manifest and summary cards in corpus order.
    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config.manifest_path).unwrap()).unwrap();
    assert_eq!(manifest[0]["name"], "Chromosomes");
    assert_eq!(manifest[1]["file"], "findings.html");
    assert!(config.summary_cards_path.exists());

    // Search index holds the coded term extracted from the built page.
    let index = fs::read_to_string(&config.search_index_path).unwrap();
    assert!(index.contains("\"22q11.2 deletion\""));
    assert!(index.contains("\"section\": \"Chromosomes\""));

    // Buzzwords converted to JSON records.
    let buzzwords: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config.buzzwords_json_path).unwrap()).unwrap();
    assert_eq!(buzzwords.as_array().unwrap().len(), 2);
    assert_eq!(buzzwords[0]["term"], "rose spots");

    // Homepage: every page opted into a card via the template meta tag.
    let home = fs::read_to_string(&config.home_output_path).unwrap();
    assert!(home.contains("class=\"home-nav-link\">Chromosomes</a>"));
    assert!(home.contains("<div class=\"card-title\">Findings</div>"));
    assert!(home.contains("id=\"RapidCarousel\""));
    assert!(home.contains("rose spots = typhoid fever  slapped cheeks = parvovirus B19"));

    // Statistics and derived banks.
    let stats: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config.stats_path).unwrap()).unwrap();
    assert_eq!(stats["total_tables"], 2);
    assert!(config.data_banks_path.exists());

    // Build summary records the processed inputs.
    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config.build_summary_path).unwrap()).unwrap();
    assert_eq!(summary["manifest_count"], 2);
    assert_eq!(summary["pages_built"][0], "chromosomes.table.html");
}

// ============================================================================
// Idempotence and incremental behavior
// ============================================================================

#[test]
fn test_rebuild_with_no_changes_writes_nothing() {
    let (_dir, config) = site();
    write_fragment(&config, "chromosomes.table.html", CHROMOSOMES_FRAGMENT);
    write_fragment(&config, "rapid_findings.table.html", FINDINGS_FRAGMENT);

    run_pipeline(&config);
    let hash_before = fs::read_to_string(&config.hash_state_path).unwrap();

    let report = build_pages(&config).expect("second page build");
    assert_eq!(report.files_written, 0, "no gated write on identical rerun");

    let lexicon = Lexicon::load(&config);
    build_search_index(&config, &lexicon).expect("second index build");
    convert_buzzwords(&config).expect("second buzzword conversion");
    assert!(!build_home(&config).expect("second homepage"), "homepage unchanged");
    write_stats(&config).expect("second statistics");

    assert_eq!(fs::read_to_string(&config.hash_state_path).unwrap(), hash_before);
}

#[test]
fn test_fragment_edit_rewrites_only_that_page() {
    let (_dir, config) = site();
    write_fragment(&config, "chromosomes.table.html", CHROMOSOMES_FRAGMENT);
    write_fragment(&config, "rapid_findings.table.html", FINDINGS_FRAGMENT);
    build_pages(&config).expect("first build");

    write_fragment(
        &config,
        "chromosomes.table.html",
        "<table class=\"table1\"><tr><td>45,X (Turner)</td></tr></table>",
    );
    let report = build_pages(&config).expect("second build");
    assert_eq!(report.files_written, 1);

    let page = fs::read_to_string(config.output_dir.join("chromosomes.html")).unwrap();
    assert!(page.contains("Turner"));
}

#[test]
fn test_template_touch_forces_every_page() {
    let (_dir, config) = site();
    write_fragment(&config, "chromosomes.table.html", CHROMOSOMES_FRAGMENT);
    write_fragment(&config, "rapid_findings.table.html", FINDINGS_FRAGMENT);
    build_pages(&config).expect("first build");

    fs::write(&config.template_path, format!("{PAGE_TEMPLATE}<!-- rev -->")).unwrap();
    let report = build_pages(&config).expect("forced build");
    // Both page outputs rewritten, nothing else changed.
    assert_eq!(report.files_written, 2);
}

#[test]
fn test_removed_fragment_prunes_page_and_manifest() {
    let (_dir, config) = site();
    write_fragment(&config, "chromosomes.table.html", CHROMOSOMES_FRAGMENT);
    write_fragment(&config, "rapid_findings.table.html", FINDINGS_FRAGMENT);
    run_pipeline(&config);
    assert!(config.output_dir.join("findings.html").exists());

    fs::remove_file(config.table_dir.join("rapid_findings.table.html")).unwrap();
    let report = run_pipeline(&config);

    assert_eq!(report.manifest_count, 1);
    assert!(!config.output_dir.join("findings.html").exists());

    let manifest = fs::read_to_string(&config.manifest_path).unwrap();
    assert!(!manifest.contains("findings.html"));

    // The surviving page's nav no longer links the removed page.
    let nav = fs::read_to_string(config.nav_dir.join("nav_chromosomes.html")).unwrap();
    assert!(!nav.contains("findings.html"));
}

// ============================================================================
// Search index wiring
// ============================================================================

#[test]
fn test_synonym_rides_along_when_page_shows_it() {
    let (_dir, config) = site();
    write_fragment(&config, "chromosomes.table.html", CHROMOSOMES_FRAGMENT);

    build_pages(&config).expect("page build");
    let lexicon = Lexicon::load(&config);
    build_search_index(&config, &lexicon).expect("search index");

    let index: Vec<serde_json::Value> =
        serde_json::from_str(&fs::read_to_string(&config.search_index_path).unwrap()).unwrap();

    // The accepted ontology label pulls its synonym in, because the cell
    // text shows "DiGeorge syndrome" verbatim.
    let synonym = index
        .iter()
        .find(|entry| entry["term"] == "digeorge syndrome")
        .expect("synonym entry emitted");
    assert_eq!(synonym["page"], "chromosomes.html");
    assert_eq!(synonym["section"], "Chromosomes");
}

#[test]
fn test_medical_flag_follows_the_wordlist() {
    let (_dir, config) = site();
    write_fragment(&config, "rapid_findings.table.html", FINDINGS_FRAGMENT);

    build_pages(&config).expect("page build");
    let lexicon = Lexicon::load(&config);
    build_search_index(&config, &lexicon).expect("search index");

    let index: Vec<serde_json::Value> =
        serde_json::from_str(&fs::read_to_string(&config.search_index_path).unwrap()).unwrap();

    let achalasia = index
        .iter()
        .find(|entry| entry["term"] == "achalasia")
        .expect("single medical word accepted");
    assert_eq!(achalasia["medical"], true);
    assert_eq!(achalasia["section"], "Findings");
}

// ============================================================================
// Failure modes
// ============================================================================

#[test]
fn test_missing_placeholder_aborts_before_output() {
    let (_dir, config) = site();
    fs::write(&config.template_path, "<html>{{PAGE_TITLE}}</html>").unwrap();
    write_fragment(&config, "chromosomes.table.html", CHROMOSOMES_FRAGMENT);

    let err = build_pages(&config).unwrap_err();
    assert!(err.to_string().contains("{{TABLE_CONTENT}}"));
    assert!(!config.output_dir.join("chromosomes.html").exists());
}

#[test]
fn test_home_build_surfaces_malformed_manifest() {
    let (_dir, config) = site();
    fs::create_dir_all(config.manifest_path.parent().unwrap()).unwrap();
    fs::write(&config.manifest_path, r#"[{"name": "Orphan"}]"#).unwrap();

    let err = build_home(&config).unwrap_err();
    assert!(err.to_string().contains("Orphan"));
}
