//! HTML serialization of the document tree.
//!
//! Produces HTML5 fragments suitable for embedding into a page body.

use crate::tree::{Document, Element, Node};

/// Elements that have no closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Attributes written without a value when empty.
const BOOLEAN_ATTRIBUTES: &[&str] = &["checked", "disabled"];

/// Serialize a whole document.
#[must_use]
pub fn to_html(document: &Document) -> String {
    let mut out = String::with_capacity(4096);
    for node in &document.children {
        write_node(node, &mut out);
    }
    out
}

/// Serialize a single node and its descendants.
#[must_use]
pub fn node_to_html(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(value) => out.push_str(&escape_html(value)),
        Node::Element(element) => write_element(element, out),
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag);
    for (name, value) in element.attrs.iter() {
        out.push(' ');
        out.push_str(name);
        if value.is_empty() && BOOLEAN_ATTRIBUTES.contains(&name) {
            continue;
        }
        out.push_str("=\"");
        out.push_str(&escape_html(value));
        out.push('"');
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&element.tag.as_str()) {
        return;
    }

    for child in &element.children {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(&element.tag);
    out.push('>');
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
