//! Fragment composition: divider-row removal and carousel assembly.

use super::{Block, CellMark, Fragment, Row};
use crate::dom;

/// Compose an annotated fragment for final rendering.
///
/// Divider rows are dropped from every table. Rapid-association blocks,
/// if any, are wrapped into a carousel that becomes the fragment's first
/// block, ahead of the table content.
pub fn compose(fragment: Fragment) -> Fragment {
    let mut rapid = Vec::new();
    let mut blocks = Vec::new();

    for block in fragment.blocks {
        match block {
            Block::Table(mut table) => {
                for section in &mut table.sections {
                    section.rows.retain(|row| !is_divider_row(row));
                }
                blocks.push(Block::Table(table));
            }
            Block::RapidAssoc(markup) => rapid.push(markup),
            other => blocks.push(other),
        }
    }

    if !rapid.is_empty() {
        blocks.insert(0, Block::Markup(build_carousel(&rapid)));
    }

    Fragment { blocks }
}

/// A row leaves the page when the annotator marked a divider cell in it,
/// or when the source markup tagged the row itself as a divider.
fn is_divider_row(row: &Row) -> bool {
    row.classes.iter().any(|class| class == "row-divider")
        || row
            .cells
            .iter()
            .any(|cell| cell.mark == Some(CellMark::Divider))
}

/// Wrap rapid-association blocks into a carousel container. The first
/// item stays visible while every later item starts hidden; answers
/// start hidden in every item so the prompt shows before the reveal.
fn build_carousel(items: &[String]) -> String {
    let mut html = vec![String::from("<div class=\"carousel-container\">")];

    for (position, item) in items.iter().enumerate() {
        let tree = dom::parse_html(item);
        if position > 0 {
            for node in dom::find_elements_with_class(&tree.document, "carousel-item") {
                dom::set_attribute(&node, "style", "display:none;");
            }
        }
        for node in dom::find_elements_with_class(&tree.document, "answer") {
            dom::set_attribute(&node, "style", "display:none;");
        }

        let rendered: String = dom::body_children(&tree)
            .iter()
            .map(dom::serialize_node)
            .collect();
        html.push(rendered);
    }

    html.push(String::from("</div>"));
    html.join("\n")
}
