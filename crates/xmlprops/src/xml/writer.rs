//! XML serialization

use crate::xml::model::{Content, Document, Element};

const DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";

/// Serialize a document compactly, prefixed with an XML declaration
pub fn to_xml(doc: &Document) -> String {
    let mut output = String::from(DECLARATION);
    serialize_element(&doc.root, &mut output);
    output
}

/// Serialize one element and its subtree without a declaration
pub fn element_to_string(element: &Element) -> String {
    let mut output = String::new();
    serialize_element(element, &mut output);
    output
}

/// Serialize a document with one element per line, nested by `indent` spaces.
///
/// Elements holding text are written on a single line so their text is not
/// padded with indentation whitespace.
pub fn to_pretty_xml(doc: &Document, indent: usize) -> String {
    let mut output = String::from(DECLARATION);
    output.push('\n');
    pretty_element(&doc.root, indent, 0, &mut output);
    output
}

fn serialize_element(element: &Element, output: &mut String) {
    open_tag(element, output);

    if element.children.is_empty() {
        output.push_str("/>");
        return;
    }

    output.push('>');
    for child in &element.children {
        match child {
            Content::Element(child) => serialize_element(child, output),
            Content::Text(text) => output.push_str(&escape_text(text)),
            Content::Comment(text) => push_comment(text, output),
        }
    }
    close_tag(element, output);
}

fn pretty_element(element: &Element, indent: usize, level: usize, output: &mut String) {
    let pad = " ".repeat(indent * level);
    output.push_str(&pad);

    let has_text = element
        .children
        .iter()
        .any(|child| matches!(child, Content::Text(_)));
    if element.children.is_empty() || has_text {
        serialize_element(element, output);
        output.push('\n');
        return;
    }

    open_tag(element, output);
    output.push_str(">\n");
    for child in &element.children {
        match child {
            Content::Element(child) => pretty_element(child, indent, level + 1, output),
            Content::Comment(text) => {
                output.push_str(&" ".repeat(indent * (level + 1)));
                push_comment(text, output);
                output.push('\n');
            }
            Content::Text(_) => {}
        }
    }
    output.push_str(&pad);
    close_tag(element, output);
    output.push('\n');
}

fn open_tag(element: &Element, output: &mut String) {
    output.push('<');
    output.push_str(&element.name);
    for (key, value) in &element.attributes {
        output.push(' ');
        output.push_str(key);
        output.push_str("=\"");
        output.push_str(&escape_attr(value));
        output.push('"');
    }
}

fn close_tag(element: &Element, output: &mut String) {
    output.push_str("</");
    output.push_str(&element.name);
    output.push('>');
}

fn push_comment(text: &str, output: &mut String) {
    output.push_str("<!--");
    output.push_str(text);
    output.push_str("-->");
}

/// Escape character data
pub fn escape_text(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape an attribute value for a double-quoted attribute
pub fn escape_attr(input: &str) -> String {
    escape_text(input).replace('"', "&quot;")
}
