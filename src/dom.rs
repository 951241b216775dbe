//! HTML parsing and manipulation built on html5ever.
//!
//! Table fragments arrive as hand-authored HTML without a surrounding
//! document. html5ever wraps them in the standard html/head/body shell
//! during parsing, so fragment content is read back out of `<body>`.
//! Note that the parser also normalizes tables: bare `<tr>` rows are
//! wrapped in an implicit `<tbody>`, and non-table elements nested
//! inside a `<table>` are hoisted out in front of it.

use std::default::Default;
use std::rc::Rc;

use html5ever::parse_document;
use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{namespace_url, ns, Attribute, LocalName, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

/// Parse HTML content into a DOM tree.
pub fn parse_html(html: &str) -> RcDom {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: true,
            ..Default::default()
        },
        ..Default::default()
    };

    parse_document(RcDom::default(), opts)
        .from_utf8()
        .one(html.as_bytes())
}

/// Top-level nodes of a parsed fragment (the children of `<body>`).
pub fn body_children(dom: &RcDom) -> Vec<Handle> {
    match find_first_element(&dom.document, "body") {
        Some(body) => body.children.borrow().iter().cloned().collect(),
        None => Vec::new(),
    }
}

/// Serialize a node and its children to an HTML string.
pub fn serialize_node(handle: &Handle) -> String {
    serialize_with_scope(handle, TraversalScope::IncludeNode)
}

/// Serialize only the children of a node (its inner HTML).
pub fn serialize_children(handle: &Handle) -> String {
    serialize_with_scope(handle, TraversalScope::ChildrenOnly(None))
}

fn serialize_with_scope(handle: &Handle, scope: TraversalScope) -> String {
    let mut bytes = Vec::new();
    let serializable: SerializableHandle = handle.clone().into();

    let opts = SerializeOpts {
        traversal_scope: scope,
        ..Default::default()
    };

    serialize(&mut bytes, &serializable, opts).expect("serialization failed");

    String::from_utf8(bytes).unwrap_or_default()
}

/// Find elements by local name in a DOM tree.
pub fn find_elements_by_name(handle: &Handle, name: &str) -> Vec<Handle> {
    let mut results = Vec::new();
    find_elements_recursive(handle, name, &mut results);
    results
}

fn find_elements_recursive(handle: &Handle, name: &str, results: &mut Vec<Handle>) {
    if let NodeData::Element { name: ref qname, .. } = handle.data {
        if qname.local.as_ref() == name {
            results.push(handle.clone());
        }
    }

    for child in handle.children.borrow().iter() {
        find_elements_recursive(child, name, results);
    }
}

/// Get the first element with the given local name.
pub fn find_first_element(handle: &Handle, name: &str) -> Option<Handle> {
    if let NodeData::Element { name: ref qname, .. } = handle.data {
        if qname.local.as_ref() == name {
            return Some(handle.clone());
        }
    }

    for child in handle.children.borrow().iter() {
        if let Some(found) = find_first_element(child, name) {
            return Some(found);
        }
    }

    None
}

/// Find all elements carrying the given class token.
pub fn find_elements_with_class(handle: &Handle, class: &str) -> Vec<Handle> {
    let mut results = Vec::new();
    find_class_recursive(handle, class, &mut results);
    results
}

fn find_class_recursive(handle: &Handle, class: &str, results: &mut Vec<Handle>) {
    if has_class(handle, class) {
        results.push(handle.clone());
    }

    for child in handle.children.borrow().iter() {
        find_class_recursive(child, class, results);
    }
}

/// Local name of an element node, if this is one.
pub fn element_name(handle: &Handle) -> Option<&str> {
    if let NodeData::Element { ref name, .. } = handle.data {
        Some(name.local.as_ref())
    } else {
        None
    }
}

/// Get an attribute value from an element.
pub fn get_attribute(handle: &Handle, attr_name: &str) -> Option<String> {
    if let NodeData::Element { ref attrs, .. } = handle.data {
        for attr in attrs.borrow().iter() {
            if attr.name.local.as_ref() == attr_name {
                return Some(attr.value.to_string());
            }
        }
    }
    None
}

/// Set an attribute on an element, replacing any existing value.
pub fn set_attribute(handle: &Handle, attr_name: &str, value: &str) {
    if let NodeData::Element { ref attrs, .. } = handle.data {
        let mut attrs_mut = attrs.borrow_mut();

        for attr in attrs_mut.iter_mut() {
            if attr.name.local.as_ref() == attr_name {
                attr.value = value.into();
                return;
            }
        }

        attrs_mut.push(Attribute {
            name: QualName::new(None, ns!(), LocalName::from(attr_name)),
            value: value.into(),
        });
    }
}

/// All attributes of an element as `(local name, value)` pairs, in
/// source order.
pub fn attributes(handle: &Handle) -> Vec<(String, String)> {
    if let NodeData::Element { ref attrs, .. } = handle.data {
        attrs
            .borrow()
            .iter()
            .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
            .collect()
    } else {
        Vec::new()
    }
}

/// Class tokens of an element, in document order.
pub fn element_classes(handle: &Handle) -> Vec<String> {
    match get_attribute(handle, "class") {
        Some(value) => value.split_whitespace().map(str::to_string).collect(),
        None => Vec::new(),
    }
}

/// Whether an element carries the given class token.
pub fn has_class(handle: &Handle, class: &str) -> bool {
    match get_attribute(handle, "class") {
        Some(value) => value.split_whitespace().any(|token| token == class),
        None => false,
    }
}

/// Remove a node from its parent's child list.
pub fn detach(handle: &Handle) {
    if let Some(weak) = handle.parent.take() {
        if let Some(parent) = weak.upgrade() {
            parent
                .children
                .borrow_mut()
                .retain(|child| !Rc::ptr_eq(child, handle));
        }
    }
}

/// Visible text of a subtree: each text run trimmed and joined with a
/// single space, so markup boundaries never glue words together.
pub fn text_content(handle: &Handle) -> String {
    let mut pieces = Vec::new();
    collect_text(handle, &mut pieces);
    pieces.join(" ")
}

fn collect_text(handle: &Handle, pieces: &mut Vec<String>) {
    if let NodeData::Text { ref contents } = handle.data {
        let text = contents.borrow();
        if !text.trim().is_empty() {
            pieces.push(text.split_whitespace().collect::<Vec<_>>().join(" "));
        }
    }

    for child in handle.children.borrow().iter() {
        collect_text(child, pieces);
    }
}

/// Whether this node is a text node containing only whitespace.
pub fn is_blank_text(handle: &Handle) -> bool {
    if let NodeData::Text { ref contents } = handle.data {
        contents.borrow().trim().is_empty()
    } else {
        false
    }
}

/// Escape HTML special characters for text and attribute positions.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
