//! Fragment parsing: DOM tree into the value model.

use markup5ever_rcdom::Handle;

use super::{Block, Cell, CellKind, Fragment, Row, Section, SectionKind, Table};
use crate::dom;

/// Parse a fragment file's markup into the value model.
///
/// Rapid-association blocks are lifted out of their surrounding markup
/// into standalone blocks so composition can move them as a unit instead
/// of copying them.
pub fn parse_fragment(html: &str) -> Fragment {
    let tree = dom::parse_html(html);
    let mut blocks = Vec::new();

    for child in dom::body_children(&tree) {
        if dom::is_blank_text(&child) {
            continue;
        }
        if is_rapid_assoc(&child) {
            blocks.push(Block::RapidAssoc(dom::serialize_node(&child)));
            continue;
        }
        if dom::element_name(&child) == Some("table") {
            blocks.push(Block::Table(parse_table(&child)));
            continue;
        }
        let lifted = lift_rapid_assocs(&child);
        blocks.push(Block::Markup(dom::serialize_node(&child)));
        blocks.extend(lifted.into_iter().map(Block::RapidAssoc));
    }

    Fragment { blocks }
}

/// Model every `<table>` found anywhere in a full HTML document.
///
/// Built pages wrap their tables in layout markup, so unlike
/// [`parse_fragment`] this walks the whole tree instead of only the
/// top-level body children.
pub fn parse_page_tables(html: &str) -> Vec<Table> {
    let tree = dom::parse_html(html);
    dom::find_elements_by_name(&tree.document, "table")
        .iter()
        .map(parse_table)
        .collect()
}

fn is_rapid_assoc(node: &Handle) -> bool {
    dom::element_name(node) == Some("div") && dom::has_class(node, "rr-assoc")
}

/// Detach nested rapid-association divs from arbitrary markup, returning
/// their serialized forms in document order.
fn lift_rapid_assocs(node: &Handle) -> Vec<String> {
    let mut lifted = Vec::new();
    for found in dom::find_elements_with_class(node, "rr-assoc") {
        if dom::element_name(&found) == Some("div") {
            lifted.push(dom::serialize_node(&found));
            dom::detach(&found);
        }
    }
    lifted
}

fn parse_table(node: &Handle) -> Table {
    let mut table = Table {
        classes: dom::element_classes(node),
        attrs: attrs_except(node, &["class"]),
        sections: Vec::new(),
    };

    for child in node.children.borrow().iter() {
        let kind = match dom::element_name(child) {
            Some("thead") => SectionKind::Head,
            Some("tbody") => SectionKind::Body,
            Some("tfoot") => SectionKind::Foot,
            _ => continue,
        };
        table.sections.push(parse_section(child, kind));
    }

    table
}

fn parse_section(node: &Handle, kind: SectionKind) -> Section {
    let mut rows = Vec::new();
    for child in node.children.borrow().iter() {
        if dom::element_name(child) == Some("tr") {
            rows.push(parse_row(child));
        }
    }
    Section {
        kind,
        attrs: dom::attributes(node),
        rows,
    }
}

fn parse_row(node: &Handle) -> Row {
    let mut row = Row {
        classes: dom::element_classes(node),
        attrs: attrs_except(node, &["class"]),
        cells: Vec::new(),
    };

    for child in node.children.borrow().iter() {
        match dom::element_name(child) {
            Some("td") => row.cells.push(parse_cell(child, CellKind::Data)),
            Some("th") => row.cells.push(parse_cell(child, CellKind::Header)),
            _ => {}
        }
    }

    row
}

fn parse_cell(node: &Handle, kind: CellKind) -> Cell {
    Cell {
        kind,
        classes: dom::element_classes(node),
        attrs: attrs_except(node, &["class", "colspan", "rowspan"]),
        col_span: span_attribute(node, "colspan"),
        row_span: span_attribute(node, "rowspan"),
        mark: None,
        col: None,
        toggle: None,
        content: dom::serialize_children(node),
        text: dom::text_content(node),
    }
}

/// A span attribute counts as present even when unparseable; HTML treats
/// an invalid span value as 1.
fn span_attribute(node: &Handle, name: &str) -> Option<u32> {
    dom::get_attribute(node, name).map(|value| value.trim().parse().unwrap_or(1))
}

fn attrs_except(node: &Handle, skip: &[&str]) -> Vec<(String, String)> {
    dom::attributes(node)
        .into_iter()
        .filter(|(name, _)| !skip.contains(&name.as_str()))
        .collect()
}
