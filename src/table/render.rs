//! Markup synthesis: the value model back to HTML.

use std::fmt::Write;

use super::{Block, Cell, ColToggle, Fragment, Row, Section, Table};
use crate::dom::escape_html;

/// Render a composed fragment, blocks separated by newlines.
pub fn render_fragment(fragment: &Fragment) -> String {
    let parts: Vec<String> = fragment
        .blocks
        .iter()
        .map(|block| match block {
            Block::Table(table) => render_table(table),
            Block::RapidAssoc(markup) | Block::Markup(markup) => markup.clone(),
        })
        .collect();
    parts.join("\n")
}

/// Render one table with two-space indentation per nesting level.
pub fn render_table(table: &Table) -> String {
    let mut ctx = RenderContext {
        out: String::new(),
        indent_level: 0,
    };
    ctx.table(table);
    ctx.out
}

struct RenderContext {
    out: String,
    indent_level: usize,
}

impl RenderContext {
    fn indent(&mut self) {
        for _ in 0..self.indent_level {
            self.out.push_str("  ");
        }
    }

    fn table(&mut self, table: &Table) {
        self.indent();
        self.out.push_str("<table");
        if !table.classes.is_empty() {
            write!(
                self.out,
                " class=\"{}\"",
                escape_html(&table.classes.join(" "))
            )
            .unwrap();
        }
        self.attrs(&table.attrs);
        self.out.push_str(">\n");

        self.indent_level += 1;
        for section in &table.sections {
            self.section(section);
        }
        self.indent_level -= 1;

        self.indent();
        self.out.push_str("</table>");
    }

    fn section(&mut self, section: &Section) {
        self.indent();
        write!(self.out, "<{}", section.kind.tag()).unwrap();
        self.attrs(&section.attrs);
        self.out.push_str(">\n");

        self.indent_level += 1;
        for row in &section.rows {
            self.row(row);
        }
        self.indent_level -= 1;

        self.indent();
        writeln!(self.out, "</{}>", section.kind.tag()).unwrap();
    }

    fn row(&mut self, row: &Row) {
        self.indent();
        self.out.push_str("<tr");
        if !row.classes.is_empty() {
            write!(
                self.out,
                " class=\"{}\"",
                escape_html(&row.classes.join(" "))
            )
            .unwrap();
        }
        self.attrs(&row.attrs);
        self.out.push_str(">\n");

        self.indent_level += 1;
        for cell in &row.cells {
            self.cell(cell);
        }
        self.indent_level -= 1;

        self.indent();
        self.out.push_str("</tr>\n");
    }

    fn cell(&mut self, cell: &Cell) {
        let tag = cell.kind.tag();

        self.indent();
        write!(self.out, "<{}", tag).unwrap();

        let classes = cell_classes(cell);
        if !classes.is_empty() {
            write!(self.out, " class=\"{}\"", escape_html(&classes.join(" "))).unwrap();
        }
        if let Some(span) = cell.col_span {
            write!(self.out, " colspan=\"{}\"", span).unwrap();
        }
        if let Some(span) = cell.row_span {
            write!(self.out, " rowspan=\"{}\"", span).unwrap();
        }
        self.attrs(&cell.attrs);
        if let Some(col) = cell.col {
            write!(self.out, " data-col=\"{}\"", col).unwrap();
        }
        self.out.push('>');

        match &cell.toggle {
            Some(toggle) => self.toggle_widget(cell, toggle),
            None => self.out.push_str(&cell.content),
        }

        writeln!(self.out, "</{}>", tag).unwrap();
    }

    /// Header widget: a label span wrapping the original inner markup,
    /// plus a dropdown holding the column-hide control.
    fn toggle_widget(&mut self, cell: &Cell, toggle: &ColToggle) {
        write!(
            self.out,
            "<div class=\"th-menu-wrapper\">\
             <span class=\"col-title\" data-title=\"{}\">{}</span>\
             <div class=\"th-dropdown\">\
             <a href=\"#\" onclick=\"toggleColumn({}); return false;\" \
             class=\"col-toggle\" role=\"button\" \
             aria-label=\"Toggle column visibility\" \
             title=\"Toggle this column\">Toggle Hide</a>\
             </div></div>",
            escape_html(&toggle.title),
            cell.content,
            toggle.col
        )
        .unwrap();
    }

    fn attrs(&mut self, attrs: &[(String, String)]) {
        for (name, value) in attrs {
            write!(self.out, " {}=\"{}\"", name, escape_html(value)).unwrap();
        }
    }
}

/// Class tokens a cell renders with: its own classes plus the class its
/// annotation mark maps to, deduplicated.
fn cell_classes(cell: &Cell) -> Vec<String> {
    let mut classes = cell.classes.clone();
    if let Some(mark) = cell.mark {
        let class = mark.class();
        if !classes.iter().any(|existing| existing == class) {
            classes.push(class.to_string());
        }
    }
    classes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::process_fragment;

    fn pipeline(html: &str) -> String {
        render_fragment(&process_fragment(html))
    }

    #[test]
    fn test_render_plain_table_layout() {
        let rendered = pipeline("<table class=\"table1\"><tr><td>CD4</td><td>Helper</td></tr></table>");
        assert_eq!(
            rendered,
            "<table class=\"table1\">\n\
             \x20\x20<tbody>\n\
             \x20\x20\x20\x20<tr>\n\
             \x20\x20\x20\x20\x20\x20<td data-col=\"0\">CD4</td>\n\
             \x20\x20\x20\x20\x20\x20<td data-col=\"1\">Helper</td>\n\
             \x20\x20\x20\x20</tr>\n\
             \x20\x20</tbody>\n\
             </table>"
        );
    }

    #[test]
    fn test_render_title_and_span_attributes() {
        let rendered = pipeline(
            "<table>\
             <tr><th colspan=\"2\">Band</th></tr>\
             <tr><td>a</td><td rowspan=\"2\">b</td></tr>\
             </table>",
        );
        assert!(rendered.contains("<th class=\"table-title\" colspan=\"2\" data-col=\"0\">Band</th>"));
        assert!(rendered.contains("<td rowspan=\"2\" data-col=\"1\">b</td>"));
    }

    #[test]
    fn test_render_toggle_widget() {
        let rendered = pipeline("<table class=\"table3\"><tr><th>CD <b>Marker</b></th></tr></table>");

        assert!(rendered.contains("<th class=\"col-toggleable\" data-col=\"0\">"));
        assert!(rendered.contains(
            "<span class=\"col-title\" data-title=\"cd marker\">CD <b>Marker</b></span>"
        ));
        assert!(rendered.contains("onclick=\"toggleColumn(0); return false;\""));
        assert!(rendered.contains(">Toggle Hide</a>"));
    }

    #[test]
    fn test_widget_keeps_original_header_markup_in_label() {
        let rendered = pipeline("<table><tr><th>Antibody</th></tr></table>");
        assert!(
            rendered.contains("<span class=\"col-title\" data-title=\"antibody\">Antibody</span>")
        );
    }

    #[test]
    fn test_render_escapes_attribute_values() {
        let rendered = pipeline("<table><tr><th>A &amp; B</th></tr></table>");
        assert!(rendered.contains("data-title=\"a &amp; b\""));
    }

    #[test]
    fn test_render_keeps_unknown_attributes() {
        let rendered = pipeline("<table id=\"main\"><tr><td style=\"color: red;\">x</td></tr></table>");
        assert!(rendered.contains("<table id=\"main\">"));
        assert!(rendered.contains("style=\"color: red;\""));
    }
}
