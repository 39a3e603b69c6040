//! Diagnostic views of a document tree

use std::fmt;

use tracing::debug;

use crate::error::{Error, ErrorKind, Result, Span};
use crate::xml::model::{Content, Element};

/// Deepest nesting [`find_attribute`] descends to
pub const MAX_SEARCH_DEPTH: u16 = 100;

/// One line of a [`walk`] listing
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalkEntry {
    Node { path: String },
    Attribute { path: String, name: String, value: String },
    Text { path: String, text: String },
}

impl fmt::Display for WalkEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node { path } => write!(f, "NODE {path}"),
            Self::Attribute { path, name, value } => {
                write!(f, "ATTRIBUTE {path}.{name}: {value}")
            }
            Self::Text { path, text } => write!(f, "NODE {path}: {text}"),
        }
    }
}

/// List every element, attribute and text node under `root`, depth first,
/// each labelled with its dotted path
pub fn walk(root: &Element) -> Vec<WalkEntry> {
    let mut entries = Vec::new();
    walk_element(root, root.name.clone(), &mut entries);
    for entry in &entries {
        debug!("{entry}");
    }
    entries
}

fn walk_element(element: &Element, path: String, entries: &mut Vec<WalkEntry>) {
    entries.push(WalkEntry::Node { path: path.clone() });
    for (name, value) in &element.attributes {
        entries.push(WalkEntry::Attribute {
            path: path.clone(),
            name: name.clone(),
            value: value.clone(),
        });
    }
    for child in &element.children {
        match child {
            Content::Element(child) => {
                walk_element(child, format!("{path}.{}", child.name), entries);
            }
            Content::Text(text) => entries.push(WalkEntry::Text {
                path: path.clone(),
                text: text.clone(),
            }),
            Content::Comment(_) => {}
        }
    }
}

/// An element found by [`find_attribute`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Found {
    /// Value of the searched attribute
    pub value: String,
    /// Whitespace-collapsed inner text of the element
    pub text: String,
}

impl fmt::Display for Found {
    /// `value,"text"`, one CSV row
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.value, quote(&self.text))
    }
}

/// Find the outermost descendants of `root` that carry `attribute`.
///
/// Once an element with the attribute is found its subtree is not searched
/// any further.
pub fn find_attribute(root: &Element, attribute: &str) -> Result<Vec<Found>> {
    let mut found = Vec::new();
    find_in(root, attribute, 0, &mut found)?;
    Ok(found)
}

fn find_in(element: &Element, attribute: &str, depth: u16, found: &mut Vec<Found>) -> Result<()> {
    if depth > MAX_SEARCH_DEPTH {
        return Err(Error::with_message(
            ErrorKind::MaxDepthExceeded {
                max: MAX_SEARCH_DEPTH,
            },
            Span::empty(),
            format!("exiting attribute search at depth {depth}"),
        ));
    }
    for child in element.elements() {
        match child.attribute(attribute) {
            Some(value) => found.push(Found {
                value: value.to_string(),
                text: smash(&inner_text(child)),
            }),
            None => find_in(child, attribute, depth + 1, found)?,
        }
    }
    Ok(())
}

/// Concatenated text of every descendant text node
pub fn inner_text(element: &Element) -> String {
    let mut text = String::new();
    collect_text(element, &mut text);
    text
}

fn collect_text(element: &Element, out: &mut String) {
    for child in &element.children {
        match child {
            Content::Text(text) => out.push_str(text),
            Content::Element(child) => collect_text(child, out),
            Content::Comment(_) => {}
        }
    }
}

/// Collapse runs of whitespace into single spaces and trim the ends
pub fn smash(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Wrap in double quotes, escaping backslashes and quotes
pub fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}
