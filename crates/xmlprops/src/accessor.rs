//! Read and write element values through dotted paths
//!
//! Traversal is a single-path, first-match walk: at every step the first
//! child element whose tag (and predicate attribute, if any) matches wins.
//! Reads never touch the tree. Writes create each missing element on the
//! way down and append it after its existing siblings.

use std::fmt;

use tracing::{debug, instrument, warn};

use crate::error::{Error, ErrorKind, Result, Span};
use crate::path::{Path, Predicate, PredicateValue, Segment};
use crate::xml::model::{Content, Document, Element};

/// Rendering of [`Lookup::NoValue`]
pub const NO_VALUE: &str = "[no value]";

/// Result of a read
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup {
    /// Attribute value, or the first text child of the resolved element
    Value(String),
    /// The path resolved to an element without a text child
    NoValue,
    /// No element or attribute matched the path
    Absent,
}

impl Lookup {
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.write_str(value),
            Self::NoValue => f.write_str(NO_VALUE),
            Self::Absent => Ok(()),
        }
    }
}

/// Starting point of a read
#[derive(Clone, Copy, Debug)]
pub enum Root<'a> {
    Document(&'a Document),
    Element(&'a Element),
}

impl<'a> From<&'a Document> for Root<'a> {
    fn from(doc: &'a Document) -> Self {
        Self::Document(doc)
    }
}

impl<'a> From<&'a Element> for Root<'a> {
    fn from(element: &'a Element) -> Self {
        Self::Element(element)
    }
}

/// Starting point of a write
#[derive(Debug)]
pub enum RootMut<'a> {
    Document(&'a mut Document),
    Element(&'a mut Element),
}

impl<'a> From<&'a mut Document> for RootMut<'a> {
    fn from(doc: &'a mut Document) -> Self {
        Self::Document(doc)
    }
}

impl<'a> From<&'a mut Element> for RootMut<'a> {
    fn from(element: &'a mut Element) -> Self {
        Self::Element(element)
    }
}

/// Caller-supplied identifiers handed out, in order, to `*` predicates
#[derive(Clone, Debug)]
pub struct UniqueIds<'a> {
    ids: &'a [&'a str],
    next: usize,
}

impl<'a> UniqueIds<'a> {
    pub const fn new(ids: &'a [&'a str]) -> Self {
        Self { ids, next: 0 }
    }

    /// Take the next unused identifier
    pub fn take(&mut self) -> Result<&'a str> {
        let Some(id) = self.ids.get(self.next).copied() else {
            return Err(Error::new(
                ErrorKind::WildcardExhausted {
                    needed: self.next + 1,
                    supplied: self.ids.len(),
                },
                Span::empty(),
            ));
        };
        self.next += 1;
        Ok(id)
    }
}

/// Read the value at `path`.
///
/// The unique-ID pool is not consulted; it mirrors [`set`] so callers can pass the
/// same arguments to both. A `*` predicate on read matches any element that
/// carries the attribute.
pub fn get<'a>(root: impl Into<Root<'a>>, path: &str, _unique_ids: &[&str]) -> Result<Lookup> {
    let path = Path::parse(path)?;
    Ok(get_path(root, &path))
}

/// Read the value at an already parsed path
pub fn get_path<'a>(root: impl Into<Root<'a>>, path: &Path) -> Lookup {
    let (mut current, mut segments) = match root.into() {
        Root::Document(doc) => {
            let segments = path.segments();
            match segments.split_first() {
                Some((first, rest)) if satisfied_by(&doc.root, first) => (&doc.root, rest),
                _ => (&doc.root, segments),
            }
        }
        Root::Element(element) => (element, path.segments()),
    };

    while let Some((segment, rest)) = segments.split_first() {
        segments = rest;
        debug!(%segment, "looking for");
        match segment {
            Segment::Attribute(name) => {
                return match current.attribute(name) {
                    Some(value) => Lookup::Value(value.to_string()),
                    None => {
                        debug!(attribute = %name, "no such attribute");
                        Lookup::Absent
                    }
                };
            }
            Segment::Tag { name, predicate } => {
                let found = current
                    .elements()
                    .find(|child| matches_read(child, name, predicate.as_ref()));
                match found {
                    Some(child) => current = child,
                    None => return Lookup::Absent,
                }
            }
        }
    }

    current
        .text()
        .map_or(Lookup::NoValue, |text| Lookup::Value(text.to_string()))
}

/// Write `value` at `path`, creating missing elements along the way.
///
/// A terminal `:attr` segment sets that attribute. Otherwise the resolved
/// element's text is replaced: the first text child takes the new value and
/// any further text children are removed. Each `*` predicate takes the next
/// entry of `unique_ids`, left to right; a path with more wildcards than
/// identifiers fails before anything is modified.
#[instrument(level = "debug", skip(root, unique_ids))]
pub fn set<'a>(
    root: impl Into<RootMut<'a>>,
    path: &str,
    value: &str,
    unique_ids: &[&str],
) -> Result<()> {
    let path = Path::parse(path)?;
    set_path(root, &path, value, unique_ids)
}

/// Write `value` at an already parsed path
pub fn set_path<'a>(
    root: impl Into<RootMut<'a>>,
    path: &Path,
    value: &str,
    unique_ids: &[&str],
) -> Result<()> {
    let needed = path.wildcard_count();
    if needed > unique_ids.len() {
        return Err(Error::new(
            ErrorKind::WildcardExhausted {
                needed,
                supplied: unique_ids.len(),
            },
            Span::empty(),
        )
        .context(format!("cannot write {path}")));
    }

    let mut current: &mut Element = match root.into() {
        RootMut::Document(doc) => &mut doc.root,
        RootMut::Element(element) => element,
    };
    let mut ids = UniqueIds::new(unique_ids);

    let mut segments = path.segments();
    if let Some((first, rest)) = segments.split_first() {
        if satisfied_by(current, first) {
            debug!(root = %current.name, "root node is first element");
            segments = rest;
        }
    }

    while let Some((segment, rest)) = segments.split_first() {
        segments = rest;
        match segment {
            Segment::Attribute(name) => {
                if !rest.is_empty() {
                    warn!(%path, attribute = %name, "ignoring segments after attribute");
                }
                current.set_attribute(name.as_str(), value);
                return Ok(());
            }
            Segment::Tag { name, predicate } => {
                let filter = match predicate {
                    Some(predicate) => Some(resolve(predicate, &mut ids)?),
                    None => None,
                };
                current = descend_or_create(current, name, filter)?;
            }
        }
    }

    current.set_text(value);
    Ok(())
}

/// Whether the first segment just names the element traversal starts from
fn satisfied_by(element: &Element, segment: &Segment) -> bool {
    match segment {
        Segment::Tag { name, predicate } if *name == element.name => match predicate {
            None => true,
            Some(Predicate {
                attribute,
                value: PredicateValue::Literal(value),
            }) => element.attribute(attribute) == Some(value.as_str()),
            Some(Predicate {
                value: PredicateValue::Wildcard,
                ..
            }) => false,
        },
        _ => false,
    }
}

fn matches_read(element: &Element, name: &str, predicate: Option<&Predicate>) -> bool {
    if element.name != name {
        return false;
    }
    match predicate {
        None => true,
        Some(Predicate {
            attribute,
            value: PredicateValue::Wildcard,
        }) => element.attributes.contains_key(attribute),
        Some(Predicate {
            attribute,
            value: PredicateValue::Literal(value),
        }) => element.attribute(attribute) == Some(value.as_str()),
    }
}

/// Concrete `(attribute, value)` filter for a write, drawing wildcards from `ids`
fn resolve<'p>(predicate: &'p Predicate, ids: &mut UniqueIds<'p>) -> Result<(&'p str, &'p str)> {
    let value = match &predicate.value {
        PredicateValue::Literal(value) => value.as_str(),
        PredicateValue::Wildcard => ids.take()?,
    };
    debug!(attribute = %predicate.attribute, value, "attribute filter");
    Ok((predicate.attribute.as_str(), value))
}

fn descend_or_create<'e>(
    parent: &'e mut Element,
    name: &str,
    filter: Option<(&str, &str)>,
) -> Result<&'e mut Element> {
    let matches = |element: &Element| {
        element.name == name
            && filter.is_none_or(|(attribute, value)| element.attribute(attribute) == Some(value))
    };

    let existing = parent
        .children
        .iter()
        .position(|child| matches!(child, Content::Element(element) if matches(element)));

    let index = match existing {
        Some(index) => index,
        None => {
            debug!(element = name, parent = %parent.name, "creating element");
            let mut element = Element::new(name);
            if let Some((attribute, value)) = filter {
                element.set_attribute(attribute, value);
            }
            parent.children.push(Content::Element(element));
            parent.children.len() - 1
        }
    };

    match parent.children.get_mut(index) {
        Some(Content::Element(element)) => Ok(element),
        _ => Err(Error::plain(
            ErrorKind::InvalidPath,
            format!("lost track of element {name}"),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::from_xml_str;
    use crate::xml::writer::element_to_string;

    fn doc(xml: &str) -> Document {
        from_xml_str(xml).unwrap()
    }

    #[test]
    fn test_get_attribute() -> Result<()> {
        let doc = doc("<deployment><cluster hostcount=\"1\"/></deployment>");
        assert_eq!(
            get(&doc, "cluster.:hostcount", &[])?,
            Lookup::Value("1".to_string())
        );
        assert_eq!(
            get(&doc, "deployment.cluster.:hostcount", &[])?,
            Lookup::Value("1".to_string())
        );
        assert_eq!(get(&doc, "cluster.:kfactor", &[])?, Lookup::Absent);
        Ok(())
    }

    #[test]
    fn test_get_text_no_value_and_absent() -> Result<()> {
        let doc = doc("<deployment><cluster><schema>ddl.sql</schema></cluster></deployment>");
        assert_eq!(
            get(&doc, "cluster.schema", &[])?,
            Lookup::Value("ddl.sql".to_string())
        );
        assert_eq!(get(&doc, "cluster", &[])?, Lookup::NoValue);
        assert_eq!(get(&doc, "cluster.procedures.procedure", &[])?, Lookup::Absent);
        assert_ne!(Lookup::NoValue, Lookup::Absent);
        Ok(())
    }

    #[test]
    fn test_get_attribute_short_circuits() -> Result<()> {
        let doc = doc("<deployment><cluster hostcount=\"3\"/></deployment>");
        assert_eq!(
            get(&doc, "cluster.:hostcount.ignored", &[])?,
            Lookup::Value("3".to_string())
        );
        Ok(())
    }

    #[test]
    fn test_get_first_match_wins() -> Result<()> {
        let doc = doc("<d><user>first</user><user>second</user></d>");
        assert_eq!(get(&doc, "user", &[])?, Lookup::Value("first".to_string()));
        Ok(())
    }

    #[test]
    fn test_get_with_predicate() -> Result<()> {
        let doc = doc(
            "<deployment><users><user name=\"a\">1</user><user name=\"b\">2</user></users></deployment>",
        );
        assert_eq!(
            get(&doc, "users.user:name(b)", &[])?,
            Lookup::Value("2".to_string())
        );
        assert_eq!(get(&doc, "users.user:name(B)", &[])?, Lookup::Absent);
        assert_eq!(
            get(&doc, "users.user:name(*)", &[])?,
            Lookup::Value("1".to_string())
        );
        assert_eq!(get(&doc, "users.user:role(*)", &[])?, Lookup::Absent);
        Ok(())
    }

    #[test]
    fn test_get_from_element_does_not_skip_root() -> Result<()> {
        let doc = doc("<deployment><cluster hostcount=\"1\"/></deployment>");
        assert_eq!(
            get(&doc.root, "deployment.cluster.:hostcount", &[])?,
            Lookup::Absent
        );
        assert_eq!(
            get(&doc.root, "cluster.:hostcount", &[])?,
            Lookup::Value("1".to_string())
        );
        Ok(())
    }

    #[test]
    fn test_get_skips_text_and_comments() -> Result<()> {
        let doc = doc("<d>text<!-- c --><a>v</a></d>");
        assert_eq!(get(&doc, "a", &[])?, Lookup::Value("v".to_string()));
        Ok(())
    }

    #[test]
    fn test_set_creates_missing_element() -> Result<()> {
        let mut doc = doc("<deployment><cluster/></deployment>");
        set(&mut doc, "cluster.schema", "ddl", &[])?;
        assert_eq!(
            element_to_string(&doc.root),
            "<deployment><cluster><schema>ddl</schema></cluster></deployment>"
        );
        Ok(())
    }

    #[test]
    fn test_set_with_wildcard() -> Result<()> {
        let mut doc = doc("<deployment/>");
        set(&mut doc, "users.user:name(*)", "x", &["u1"])?;
        assert_eq!(
            element_to_string(&doc.root),
            "<deployment><users><user name=\"u1\">x</user></users></deployment>"
        );
        Ok(())
    }

    #[test]
    fn test_set_wildcards_consumed_in_order() -> Result<()> {
        let mut doc = doc("<deployment/>");
        set(&mut doc, "a:id(*).b:id(*)", "v", &["first", "second", "unused"])?;
        assert_eq!(
            element_to_string(&doc.root),
            "<deployment><a id=\"first\"><b id=\"second\">v</b></a></deployment>"
        );
        Ok(())
    }

    #[test]
    fn test_set_wildcard_exhausted_leaves_tree_untouched() {
        let mut doc = doc("<deployment/>");
        let err = set(&mut doc, "a:id(*).b:id(*)", "v", &["only"]).unwrap_err();
        assert_eq!(
            err.kind(),
            &ErrorKind::WildcardExhausted {
                needed: 2,
                supplied: 1
            }
        );
        assert!(doc.root.children.is_empty());
    }

    #[test]
    fn test_set_skips_root_tag() -> Result<()> {
        let mut doc = doc("<deployment><cluster/></deployment>");
        set(&mut doc, "deployment.cluster.:hostcount", "2", &[])?;
        assert_eq!(
            element_to_string(&doc.root),
            "<deployment><cluster hostcount=\"2\"/></deployment>"
        );
        Ok(())
    }

    #[test]
    fn test_set_attribute_creates_no_text() -> Result<()> {
        let mut doc = doc("<deployment/>");
        set(&mut doc, "cluster.:kfactor", "1", &[])?;
        assert_eq!(
            element_to_string(&doc.root),
            "<deployment><cluster kfactor=\"1\"/></deployment>"
        );
        Ok(())
    }

    #[test]
    fn test_set_matches_existing_predicate() -> Result<()> {
        let mut doc = doc(
            "<deployment><users><user name=\"a\"/><user name=\"b\"/></users></deployment>",
        );
        set(&mut doc, "users.user:name(b).:roles", "admin", &[])?;
        set(&mut doc, "users.user:name(c)", "new", &[])?;
        assert_eq!(
            element_to_string(&doc.root),
            "<deployment><users><user name=\"a\"/><user name=\"b\" roles=\"admin\"/>\
             <user name=\"c\">new</user></users></deployment>"
        );
        Ok(())
    }

    #[test]
    fn test_set_overwrites_text() -> Result<()> {
        let mut doc = doc("<deployment/>");
        set(&mut doc, "cluster.schema", "one", &[])?;
        set(&mut doc, "cluster.schema", "two", &[])?;
        assert_eq!(get(&doc, "cluster.schema", &[])?, Lookup::Value("two".to_string()));
        assert_eq!(
            element_to_string(&doc.root),
            "<deployment><cluster><schema>two</schema></cluster></deployment>"
        );
        Ok(())
    }

    #[test]
    fn test_set_preserves_sibling_order() -> Result<()> {
        let mut doc = doc("<deployment><a/><c/></deployment>");
        set(&mut doc, "b", "x", &[])?;
        let names: Vec<&str> = doc.root.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c", "b"]);
        Ok(())
    }

    #[test]
    fn test_set_on_element_root() -> Result<()> {
        let mut cluster = Element::new("cluster");
        set(&mut cluster, "cluster.:hostcount", "4", &[])?;
        set(&mut cluster, "schema", "ddl", &[])?;
        assert_eq!(
            element_to_string(&cluster),
            "<cluster hostcount=\"4\"><schema>ddl</schema></cluster>"
        );
        Ok(())
    }

    #[test]
    fn test_set_invalid_path() {
        let mut doc = doc("<deployment/>");
        let err = set(&mut doc, "users.user:name(x", "v", &[]).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnmatchedParenthesis);
        assert!(doc.root.children.is_empty());
    }

    #[test]
    fn test_unique_ids() {
        let pool = ["a", "b"];
        let mut ids = UniqueIds::new(&pool);
        assert_eq!(ids.take().unwrap(), "a");
        assert_eq!(ids.take().unwrap(), "b");
        let err = ids.take().unwrap_err();
        assert_eq!(
            err.kind(),
            &ErrorKind::WildcardExhausted {
                needed: 3,
                supplied: 2
            }
        );
    }

    #[test]
    fn test_lookup_display() {
        assert_eq!(Lookup::Value("1".to_string()).to_string(), "1");
        assert_eq!(Lookup::NoValue.to_string(), NO_VALUE);
        assert_eq!(Lookup::Absent.to_string(), "");
        assert!(Lookup::Absent.is_absent());
        assert!(!Lookup::NoValue.is_absent());
    }
}
