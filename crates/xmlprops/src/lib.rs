//! xmlprops - read and write deployment XML through dotted paths
//!
//! # Quick Start
//!
//! ```
//! use xmlprops::{from_xml_str, get, set, Lookup};
//! # fn main() -> Result<(), xmlprops::Error> {
//! let mut doc = from_xml_str(r#"<deployment><cluster hostcount="1"/></deployment>"#)?;
//! assert_eq!(get(&doc, "cluster.:hostcount", &[])?, Lookup::Value("1".to_string()));
//!
//! set(&mut doc, "users.user:name(*)", "secret", &["admin"])?;
//! assert_eq!(
//!     get(&doc, "users.user:name(admin)", &[])?,
//!     Lookup::Value("secret".to_string())
//! );
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

use std::path::Path as FsPath;

use tracing::{debug, instrument};

pub mod error;
pub use error::{Error, ErrorKind, Pos, Result, Span};

pub mod input;
pub use input::Input;

pub mod xml;
pub use xml::{Config, Content, Document, Element, Parser};

pub mod path;
pub use path::{Path, Predicate, PredicateValue, Segment, MAX_PATH_DEPTH};

pub mod accessor;
pub use accessor::{get, get_path, set, set_path, Lookup, Root, RootMut, UniqueIds, NO_VALUE};

pub mod inspect;
pub mod properties;
pub use properties::Properties;

pub mod context;
pub use context::Context;

/// Parse an XML document from a string
pub fn from_xml_str(s: &str) -> Result<Document> {
    parse_input(Input::from(s), Config::default())
}

/// Parse an XML document from bytes
pub fn from_xml_bytes(bytes: &[u8]) -> Result<Document> {
    parse_input(Input::new(bytes), Config::default())
}

/// Parse an input with custom configuration; errors name the input's file
pub fn parse_input(input: Input<'_>, config: Config) -> Result<Document> {
    debug!(source = input.name(), "reading deployment");
    Parser::with_config(input.bytes(), config)
        .parse()
        .map_err(|e| e.context(format!("cannot parse {}", input.name())))
}

/// Read and parse an XML file
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_file(path: impl AsRef<FsPath>) -> Result<Document> {
    let path = path.as_ref();
    let name = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|e| {
        Error::plain(ErrorKind::Io, format!("cannot read {name}: {e}"))
    })?;
    parse_input(Input::new(&bytes).named(&name), Config::default())
}

/// Serialize a document and write it to `path`
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn save_file(doc: &Document, path: impl AsRef<FsPath>) -> Result<()> {
    let path = path.as_ref();
    debug!("writing deployment file");
    std::fs::write(path, xml::to_xml(doc)).map_err(|e| {
        Error::plain(
            ErrorKind::Io,
            format!("cannot write {}: {e}", path.display()),
        )
    })
}
