//! Structural statistics over the source fragments.
//!
//! The stats file is a maintenance report: class usage, table shapes,
//! header conventions, frequent cell vocabulary. From it the data banks
//! are derived and written back for the next build's lexicon, closing
//! the feedback loop that keeps overused corpus words out of the search
//! index. The derivation is threshold-driven and intentionally coarse.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::BuildConfig;
use crate::error::Result;
use crate::lexicon::DataBanks;
use crate::page::gate;
use crate::table::{parse_page_tables, Row, Table};

const TOP_WORDS: usize = 50;
/// A row label must recur in at least this many files to count as shared.
const ROW_LABEL_MIN_FILES: usize = 2;
/// A non-header word must appear at least this often to count as overused.
const WORD_FREQ_MIN: usize = 50;
const DEPRECATED_CLASSES: [&str; 3] = ["table_old", "unstyled", "legacy"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableStats {
    pub total_tables: usize,
    /// Tables carrying at least one divider-classed data cell.
    pub tables_with_sections: usize,
    pub tables_with_no_class: usize,
    pub tables_with_multiple_classes: usize,
    pub tables_with_deprecated_class: usize,
    /// Class usage grouped by leading alphabetic prefix.
    pub class_counts: BTreeMap<String, BTreeMap<String, ClassUsage>>,
    pub file_classes: BTreeMap<String, Vec<String>>,
    pub unique_classes: Vec<String>,
    pub total_rows: usize,
    /// Column count estimated from each table's first row.
    pub total_cols: usize,
    pub tables_with_header_row: usize,
    pub tables_with_span: usize,
    pub avg_rows_per_table: f64,
    pub avg_cols_per_table: f64,
    pub common_column_headers: BTreeMap<String, usize>,
    pub common_row_labels: BTreeMap<String, usize>,
    pub row_structure: RowStructure,
    pub th_usage: ThUsage,
    pub avg_words_per_cell: f64,
    pub max_table_dimensions: Dimensions,
    pub avg_row_dividers_per_table: f64,
    /// First-cell labels and how many distinct files they appear in.
    pub row_labels_in_multiple_files: BTreeMap<String, usize>,
    pub frequent_non_header_words: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassUsage {
    pub count: usize,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RowStructure {
    pub rows_with_exactly_2_cols: usize,
    /// Rows whose cell count differs from their table's first row.
    pub rows_with_mixed_col_counts: usize,
    pub tables_with_inconsistent_row_lengths: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThUsage {
    pub tables_with_no_th: usize,
    pub tables_with_only_th_in_col1: usize,
    /// Header cells sitting past the first column, counted per cell.
    pub th_cells_not_in_first_col: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub rows: usize,
    pub cols: usize,
}

/// Collect statistics over `(file name, raw fragment markup)` pairs.
pub fn collect_stats(files: &[(String, String)]) -> TableStats {
    let mut collector = Collector::new();
    for (file_name, contents) in files {
        collector.file(file_name, contents);
    }
    collector.finish()
}

/// Running counters for one analysis pass.
struct Collector {
    stats: TableStats,
    word: Regex,
    class_counter: BTreeMap<String, usize>,
    class_files: BTreeMap<String, BTreeSet<String>>,
    column_headers: BTreeMap<String, usize>,
    row_labels: BTreeMap<String, usize>,
    label_files: BTreeMap<String, BTreeSet<String>>,
    non_header_words: BTreeMap<String, usize>,
    total_words: usize,
    total_cells: usize,
    divider_rows: usize,
}

impl Collector {
    fn new() -> Self {
        Collector {
            stats: TableStats::default(),
            word: Regex::new(r"\w+").expect("valid pattern"),
            class_counter: BTreeMap::new(),
            class_files: BTreeMap::new(),
            column_headers: BTreeMap::new(),
            row_labels: BTreeMap::new(),
            label_files: BTreeMap::new(),
            non_header_words: BTreeMap::new(),
            total_words: 0,
            total_cells: 0,
            divider_rows: 0,
        }
    }

    fn file(&mut self, file_name: &str, contents: &str) {
        let tables = parse_page_tables(contents);
        self.stats.total_tables += tables.len();

        let mut classes_in_file: BTreeSet<String> = BTreeSet::new();
        for table in &tables {
            self.table(file_name, table);
            classes_in_file.extend(table.classes.iter().cloned());
        }
        self.stats
            .file_classes
            .insert(file_name.to_string(), classes_in_file.into_iter().collect());
    }

    fn table(&mut self, file_name: &str, table: &Table) {
        let rows: Vec<&Row> = table
            .sections
            .iter()
            .flat_map(|section| section.rows.iter())
            .collect();

        self.stats.total_rows += rows.len();
        self.stats.max_table_dimensions.rows = self.stats.max_table_dimensions.rows.max(rows.len());
        self.divider_rows += rows
            .iter()
            .filter(|row| {
                row.cells
                    .iter()
                    .any(|cell| cell.classes.iter().any(|c| c == "row-divider"))
            })
            .count();

        if table.cells().any(|cell| cell.is_header()) {
            self.stats.tables_with_header_row += 1;
        }
        if table
            .cells()
            .any(|cell| cell.col_span.is_some() || cell.row_span.is_some())
        {
            self.stats.tables_with_span += 1;
        }
        if table
            .cells()
            .any(|cell| !cell.is_header() && cell.classes.iter().any(|c| c == "row-divider"))
        {
            self.stats.tables_with_sections += 1;
        }

        if let Some(first) = rows.first() {
            self.stats.total_cols += first.cells.len();
            self.stats.max_table_dimensions.cols =
                self.stats.max_table_dimensions.cols.max(first.cells.len());
            for cell in &first.cells {
                let header = cell.text.to_lowercase();
                if !header.is_empty() {
                    *self.column_headers.entry(header).or_insert(0) += 1;
                }
            }
        }

        if table.classes.is_empty() {
            self.stats.tables_with_no_class += 1;
        }
        if table.classes.len() > 1 {
            self.stats.tables_with_multiple_classes += 1;
        }
        if table
            .classes
            .iter()
            .any(|c| DEPRECATED_CLASSES.contains(&c.as_str()))
        {
            self.stats.tables_with_deprecated_class += 1;
        }
        for class in &table.classes {
            *self.class_counter.entry(class.clone()).or_insert(0) += 1;
            self.class_files
                .entry(class.clone())
                .or_default()
                .insert(file_name.to_string());
        }

        self.rows(file_name, &rows);
        self.headers(table);
    }

    fn rows(&mut self, file_name: &str, rows: &[&Row]) {
        let first_width = rows.first().map_or(0, |row| row.cells.len());
        let mut widths: BTreeSet<usize> = BTreeSet::new();

        for (index, row) in rows.iter().enumerate() {
            self.total_cells += row.cells.len();
            widths.insert(row.cells.len());

            for cell in &row.cells {
                self.total_words += cell.text.split_whitespace().count();
                if index > 0 {
                    let lowered = cell.text.to_lowercase();
                    for hit in self.word.find_iter(&lowered) {
                        let token = hit.as_str();
                        if token.chars().count() > 2 {
                            *self.non_header_words.entry(token.to_string()).or_insert(0) += 1;
                        }
                    }
                }
            }

            if let Some(cell) = row.cells.first() {
                let label = cell.text.to_lowercase();
                if !label.is_empty() {
                    *self.row_labels.entry(label.clone()).or_insert(0) += 1;
                    self.label_files
                        .entry(label)
                        .or_default()
                        .insert(file_name.to_string());
                }
            }

            if row.cells.len() == 2 {
                self.stats.row_structure.rows_with_exactly_2_cols += 1;
            }
            if index > 0 && row.cells.len() != first_width {
                self.stats.row_structure.rows_with_mixed_col_counts += 1;
            }
        }

        if widths.len() > 1 {
            self.stats.row_structure.tables_with_inconsistent_row_lengths += 1;
        }
    }

    fn headers(&mut self, table: &Table) {
        let mut has_th = false;
        let mut th_outside_first = 0usize;

        for section in &table.sections {
            for row in &section.rows {
                for (position, cell) in row.cells.iter().enumerate() {
                    if cell.is_header() {
                        has_th = true;
                        if position > 0 {
                            th_outside_first += 1;
                        }
                    }
                }
            }
        }

        if !has_th {
            self.stats.th_usage.tables_with_no_th += 1;
        } else if th_outside_first == 0 {
            self.stats.th_usage.tables_with_only_th_in_col1 += 1;
        }
        self.stats.th_usage.th_cells_not_in_first_col += th_outside_first;
    }

    fn finish(mut self) -> TableStats {
        for (class, count) in &self.class_counter {
            let files: Vec<String> = self
                .class_files
                .get(class)
                .map(|set| set.iter().cloned().collect())
                .unwrap_or_default();
            self.stats
                .class_counts
                .entry(class_prefix(class))
                .or_default()
                .insert(class.clone(), ClassUsage { count: *count, files });
        }
        self.stats.unique_classes = self.class_counter.keys().cloned().collect();

        if self.stats.total_tables > 0 {
            let tables = self.stats.total_tables as f64;
            self.stats.avg_rows_per_table = round2(self.stats.total_rows as f64 / tables);
            self.stats.avg_cols_per_table = round2(self.stats.total_cols as f64 / tables);
            self.stats.avg_row_dividers_per_table = round2(self.divider_rows as f64 / tables);
        }
        if self.total_cells > 0 {
            self.stats.avg_words_per_cell =
                round2(self.total_words as f64 / self.total_cells as f64);
        }

        self.stats.common_column_headers = top_n(&self.column_headers, TOP_WORDS);
        self.stats.common_row_labels = top_n(&self.row_labels, TOP_WORDS);
        self.stats.row_labels_in_multiple_files = self
            .label_files
            .into_iter()
            .filter(|(_, files)| files.len() >= ROW_LABEL_MIN_FILES)
            .map(|(label, files)| (label, files.len()))
            .collect();
        self.stats.frequent_non_header_words = top_n(&self.non_header_words, TOP_WORDS);

        self.stats
    }
}

/// Derive the data banks the lexicon reads on the next build.
pub fn derive_banks(stats: &TableStats) -> DataBanks {
    let shared_row_labels = stats
        .row_labels_in_multiple_files
        .iter()
        .filter(|(label, files)| {
            **files >= ROW_LABEL_MIN_FILES && label.split_whitespace().count() <= 4
        })
        .map(|(label, _)| label.to_lowercase())
        .collect();

    let overused_words = stats
        .frequent_non_header_words
        .iter()
        .filter(|(word, count)| **count >= WORD_FREQ_MIN && word.chars().count() > 3)
        .map(|(word, _)| word.to_lowercase())
        .collect();

    let genomic_keywords = stats
        .frequent_non_header_words
        .keys()
        .filter(|word| {
            let lowered = word.to_lowercase();
            lowered.contains("chromosome") || lowered.contains("trisomy")
        })
        .map(|word| word.to_lowercase())
        .collect();

    let potential_tag_roots = stats
        .common_column_headers
        .keys()
        .filter(|header| header.split_whitespace().count() <= 3)
        .map(|header| header.to_lowercase())
        .collect();

    DataBanks {
        shared_row_labels,
        overused_words,
        genomic_keywords,
        potential_tag_roots,
    }
}

/// Analyze every source fragment, write the stats report, then derive and
/// write the data banks. Both writes are content-gated.
pub fn write_stats(config: &BuildConfig) -> Result<TableStats> {
    let mut files = Vec::new();
    if config.table_dir.exists() {
        for path in config.table_files()? {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            files.push((name.to_string(), fs::read_to_string(&path)?));
        }
    }

    let stats = collect_stats(&files);
    let json = serde_json::to_string_pretty(&stats)?;
    gate::write_if_changed(&config.stats_path, &json)?;
    info!(path = %config.stats_path.display(), tables = stats.total_tables, "table stats written");

    let banks = derive_banks(&stats);
    let json = serde_json::to_string_pretty(&banks)?;
    gate::write_if_changed(&config.data_banks_path, &json)?;
    info!(path = %config.data_banks_path.display(), "data banks written");

    Ok(stats)
}

fn class_prefix(name: &str) -> String {
    let prefix: String = name
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if prefix.is_empty() {
        String::from("other")
    } else {
        prefix
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Top `n` by count, ties broken alphabetically.
fn top_n(counter: &BTreeMap<String, usize>, n: usize) -> BTreeMap<String, usize> {
    let mut items: Vec<(&String, &usize)> = counter.iter().collect();
    items.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    items
        .into_iter()
        .take(n)
        .map(|(word, count)| (word.clone(), *count))
        .collect()
}
