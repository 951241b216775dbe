//! Value model for hand-authored table fragments.
//!
//! A fragment file parses into an ordered list of [`Block`]s. Tables become
//! structured sections, rows and cells; rapid-association blocks are lifted
//! out as raw markup for carousel composition; anything else passes through
//! untouched. The pipeline stages ([`annotate`] and [`compose`]) are pure
//! functions from value to value, so no stage observes another stage's
//! partial mutation.

pub mod annotate;
pub mod compose;
pub mod parse;
pub mod render;

pub use annotate::annotate;
pub use compose::compose;
pub use parse::{parse_fragment, parse_page_tables};
pub use render::render_fragment;

/// Run a fragment through the full pipeline: parse, annotate every table,
/// compose. The result is ready for [`render_fragment`].
pub fn process_fragment(html: &str) -> Fragment {
    let fragment = parse_fragment(html);
    let blocks = fragment
        .blocks
        .into_iter()
        .map(|block| match block {
            Block::Table(table) => Block::Table(annotate(table)),
            other => other,
        })
        .collect();
    compose(Fragment { blocks })
}

/// One top-level piece of a fragment file, in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// A `<table>` element, fully modeled.
    Table(Table),
    /// A rapid-association block (`div.rr-assoc`), kept as raw markup.
    RapidAssoc(String),
    /// Any other top-level markup, passed through verbatim.
    Markup(String),
}

/// A parsed fragment: the unit the page builder renders into a template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    pub blocks: Vec<Block>,
}

/// A modeled `<table>`: its class list, the attributes the pipeline does
/// not interpret, and its row sections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub classes: Vec<String>,
    /// Attributes other than `class`, in source order.
    pub attrs: Vec<(String, String)>,
    pub sections: Vec<Section>,
}

/// Row-group kind. The parser always materializes one: html5ever wraps
/// bare rows in an implicit `<tbody>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Head,
    Body,
    Foot,
}

/// A `<thead>`/`<tbody>`/`<tfoot>` group of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub kind: SectionKind,
    /// Attributes verbatim, in source order.
    pub attrs: Vec<(String, String)>,
    pub rows: Vec<Row>,
}

/// A `<tr>` and its cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub classes: Vec<String>,
    /// Attributes other than `class`, in source order.
    pub attrs: Vec<(String, String)>,
    pub cells: Vec<Cell>,
}

/// Header/data distinction for a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Header,
    Data,
}

/// Marker applied to column-spanning cells by the annotator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellMark {
    /// In-table separator; composed pages drop these rows entirely.
    Divider,
    /// The one title group per table, promoted from the first spanning row.
    Title,
}

/// Column-visibility toggle widget attached to a span-less header cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColToggle {
    /// Zero-based column index the control hides.
    pub col: usize,
    /// Lowercased header text, exposed as the label's `data-title`.
    pub title: String,
}

/// A single `<td>` or `<th>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub kind: CellKind,
    pub classes: Vec<String>,
    /// Attributes other than `class`/`colspan`/`rowspan`, in source order.
    pub attrs: Vec<(String, String)>,
    pub col_span: Option<u32>,
    pub row_span: Option<u32>,
    /// Annotation outcome; a cell never carries both divider and title.
    pub mark: Option<CellMark>,
    /// Zero-based position among this row's cells, set by the annotator.
    pub col: Option<usize>,
    /// Toggle widget, set by the annotator on span-less headers.
    pub toggle: Option<ColToggle>,
    /// Inner markup, verbatim.
    pub content: String,
    /// Visible text, whitespace-normalized.
    pub text: String,
}

impl Fragment {
    /// The modeled tables of this fragment, in document order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Table(table) => Some(table),
            _ => None,
        })
    }
}

impl Table {
    /// All cells across all sections, in document order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.sections
            .iter()
            .flat_map(|section| section.rows.iter())
            .flat_map(|row| row.cells.iter())
    }
}

impl SectionKind {
    pub fn tag(self) -> &'static str {
        match self {
            SectionKind::Head => "thead",
            SectionKind::Body => "tbody",
            SectionKind::Foot => "tfoot",
        }
    }

    /// Head and foot rows are exempt from divider/title marking.
    pub fn markable(self) -> bool {
        matches!(self, SectionKind::Body)
    }
}

impl CellKind {
    pub fn tag(self) -> &'static str {
        match self {
            CellKind::Header => "th",
            CellKind::Data => "td",
        }
    }
}

impl CellMark {
    /// Class token the mark renders as.
    pub fn class(self) -> &'static str {
        match self {
            CellMark::Divider => "row-divider",
            CellMark::Title => "table-title",
        }
    }
}

impl Cell {
    pub fn new(kind: CellKind) -> Self {
        Cell {
            kind,
            classes: Vec::new(),
            attrs: Vec::new(),
            col_span: None,
            row_span: None,
            mark: None,
            col: None,
            toggle: None,
            content: String::new(),
            text: String::new(),
        }
    }

    /// Whether the cell announces a column span (`colspan` present).
    pub fn spans_columns(&self) -> bool {
        self.col_span.is_some()
    }

    pub fn is_header(&self) -> bool {
        self.kind == CellKind::Header
    }
}
