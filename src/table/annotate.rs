//! Table annotation: divider/title marking, column indices, toggle widgets.

use super::{Cell, CellMark, ColToggle, Table};

/// Tables whose class list opts their headers into column toggling.
pub const TOGGLE_TABLES: [&str; 3] = ["table1", "table2", "table3"];

/// Annotate one table.
///
/// Scanning body rows in document order, every column-spanning cell is
/// marked as a divider, except in the first spanning row encountered:
/// that row's spanning cells become the table's title group. One title
/// promotion per table, first match wins. Head and foot rows are never
/// marked. Every cell in every section receives its row-local column
/// index, and span-less header cells gain a [`ColToggle`] widget for
/// that index. When the table's classes intersect [`TOGGLE_TABLES`],
/// toggle-bearing headers also carry the `col-toggleable` class.
pub fn annotate(mut table: Table) -> Table {
    let toggleable = table
        .classes
        .iter()
        .any(|class| TOGGLE_TABLES.contains(&class.as_str()));

    let mut title_assigned = false;

    for section in &mut table.sections {
        let markable = section.kind.markable();
        for row in &mut section.rows {
            if markable && row.cells.iter().any(Cell::spans_columns) {
                let mark = if title_assigned {
                    CellMark::Divider
                } else {
                    title_assigned = true;
                    CellMark::Title
                };
                for cell in row.cells.iter_mut().filter(|cell| cell.spans_columns()) {
                    cell.mark = Some(mark);
                }
            }

            for (idx, cell) in row.cells.iter_mut().enumerate() {
                cell.col = Some(idx);

                if cell.is_header() && !cell.spans_columns() {
                    cell.toggle = Some(ColToggle {
                        col: idx,
                        title: cell.text.to_lowercase(),
                    });
                    if toggleable && !cell.classes.iter().any(|c| c == "col-toggleable") {
                        cell.classes.push(String::from("col-toggleable"));
                    }
                }
            }
        }
    }

    table
}
