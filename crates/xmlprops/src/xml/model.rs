//! XML data model

use indexmap::IndexMap;

/// XML document owning a single root element
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub root: Element,
}

impl Document {
    pub const fn new(root: Element) -> Self {
        Self { root }
    }
}

/// XML element
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<Content>,
}

/// XML content node
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Element(Element),
    Text(String),
    Comment(String),
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Builder-style child appender
    #[must_use]
    pub fn with_child(mut self, child: impl Into<Content>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Child elements in document order, skipping text and comments
    pub fn elements(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(|child| match child {
            Content::Element(element) => Some(element),
            _ => None,
        })
    }

    /// First text child, if any
    pub fn text(&self) -> Option<&str> {
        self.children.iter().find_map(|child| match child {
            Content::Text(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Replace the element's text with `value`.
    ///
    /// The first text child keeps its position and takes the new value; any
    /// later text children are dropped. Elements and comments are untouched.
    pub fn set_text(&mut self, value: impl Into<String>) {
        let value = value.into();
        let mut replaced = false;
        self.children.retain_mut(|child| match child {
            Content::Text(text) if !replaced => {
                *text = value.clone();
                replaced = true;
                true
            }
            Content::Text(_) => false,
            _ => true,
        });
        if !replaced {
            self.children.push(Content::Text(value));
        }
    }
}

impl From<Element> for Content {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}
