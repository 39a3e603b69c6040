//! Dotted path grammar
//!
//! ```text
//! path       := segment ("." segment)*
//! segment    := attrRef | tagMatch
//! attrRef    := ":" identifier                      # terminal only
//! tagMatch   := identifier [ ":" identifier "(" attrValue ")" ]
//! attrValue  := "*" | literalString
//! ```
//!
//! `cluster.:hostcount` names the `hostcount` attribute of the `cluster`
//! element, `users.user:name(admin)` names the `user` element whose `name`
//! attribute is `admin`, and `users.user:name(*)` takes the attribute value
//! from the caller's pool of unique IDs when writing.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::error::{Error, ErrorKind, Result, Span};
use crate::xml::name::is_valid_name;

/// Maximum number of segments in a path
pub const MAX_PATH_DEPTH: u16 = 100;

/// Predicate value standing in for the next unique ID
pub const WILDCARD: &str = "*";

/// A parsed dotted path
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path {
    segments: Vec<Segment>,
}

/// One dot-delimited unit of a path
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    /// `name` or `name:attr(value)`
    Tag {
        name: String,
        predicate: Option<Predicate>,
    },
    /// `:attr`
    Attribute(String),
}

/// Inline attribute filter on a tag segment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Predicate {
    pub attribute: String,
    pub value: PredicateValue,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PredicateValue {
    /// `*`, replaced by the next unique ID on write
    Wildcard,
    Literal(String),
}

impl Path {
    pub fn parse(input: &str) -> Result<Self> {
        if input.is_empty() {
            return Err(Error::plain(ErrorKind::InvalidPath, "empty path"));
        }

        let segments = split_segments(input)
            .into_iter()
            .map(|raw| parse_segment(raw, input))
            .collect::<Result<Vec<_>>>()?;

        if segments.len() > usize::from(MAX_PATH_DEPTH) {
            return Err(Error::with_message(
                ErrorKind::MaxDepthExceeded {
                    max: MAX_PATH_DEPTH,
                },
                Span::empty(),
                format!(
                    "path has {} segments, at most {MAX_PATH_DEPTH} allowed",
                    segments.len()
                ),
            ));
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of unique IDs a write through this path consumes: the `*`
    /// predicates up to the first attribute segment, where a write stops
    pub fn wildcard_count(&self) -> usize {
        self.segments
            .iter()
            .take_while(|segment| !matches!(segment, Segment::Attribute(_)))
            .filter(|segment| {
                matches!(
                    segment,
                    Segment::Tag {
                        predicate: Some(Predicate {
                            value: PredicateValue::Wildcard,
                            ..
                        }),
                        ..
                    }
                )
            })
            .count()
    }
}

impl FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attribute(name) => write!(f, ":{name}"),
            Self::Tag {
                name,
                predicate: None,
            } => write!(f, "{name}"),
            Self::Tag {
                name,
                predicate: Some(predicate),
            } => write!(f, "{name}:{}({})", predicate.attribute, predicate.value),
        }
    }
}

impl fmt::Display for PredicateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wildcard => f.write_str(WILDCARD),
            Self::Literal(value) => f.write_str(value),
        }
    }
}

/// Split on dots that are not inside a predicate's parentheses
fn split_segments(input: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_parens = false;

    for (i, ch) in input.char_indices() {
        match ch {
            '(' => in_parens = true,
            ')' => in_parens = false,
            '.' if !in_parens => {
                segments.push(input.get(start..i).unwrap_or_default());
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(input.get(start..).unwrap_or_default());
    segments
}

fn parse_segment(raw: &str, path: &str) -> Result<Segment> {
    if raw.is_empty() {
        return Err(Error::plain(
            ErrorKind::InvalidPath,
            format!("empty segment in path {path}"),
        ));
    }

    if let Some(attribute) = raw.strip_prefix(':') {
        if attribute.is_empty() {
            return Err(Error::plain(
                ErrorKind::InvalidPath,
                format!("missing attribute name in path {path}"),
            ));
        }
        check_name(attribute, "attribute", path)?;
        return Ok(Segment::Attribute(attribute.to_string()));
    }

    let Some((name, filter)) = raw.split_once(':') else {
        check_name(raw, "tag", path)?;
        return Ok(Segment::Tag {
            name: raw.to_string(),
            predicate: None,
        });
    };

    if name.is_empty() {
        return Err(Error::plain(
            ErrorKind::InvalidPath,
            format!("missing tag name before '{filter}' in path {path}"),
        ));
    }

    let Some((attribute, rest)) = filter.split_once('(') else {
        return Err(Error::plain(
            ErrorKind::UnmatchedParenthesis,
            format!("expected '(' after attribute {filter} in path {path}"),
        ));
    };
    let Some((value, trailing)) = rest.split_once(')') else {
        return Err(Error::plain(
            ErrorKind::UnmatchedParenthesis,
            format!("unmatched parenthesis in segment {raw} of path {path}"),
        ));
    };

    if attribute.is_empty() {
        return Err(Error::plain(
            ErrorKind::InvalidPath,
            format!("missing attribute name in segment {raw} of path {path}"),
        ));
    }
    check_name(name, "tag", path)?;
    check_name(attribute, "attribute", path)?;
    if !trailing.is_empty() {
        warn!(segment = raw, ignored = trailing, "ignoring text after attribute value");
    }

    let value = if value == WILDCARD {
        PredicateValue::Wildcard
    } else {
        PredicateValue::Literal(value.to_string())
    };

    Ok(Segment::Tag {
        name: name.to_string(),
        predicate: Some(Predicate {
            attribute: attribute.to_string(),
            value,
        }),
    })
}

/// Reject names a parsed document could not contain
fn check_name(name: &str, what: &str, path: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(Error::plain(
            ErrorKind::InvalidPath,
            format!("invalid {what} name {name:?} in path {path}"),
        ))
    }
}
