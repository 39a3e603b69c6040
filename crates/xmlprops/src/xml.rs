//! XML parsing, data model and serialization

pub mod cursor;
pub mod model;
pub mod name;
pub mod parser;
pub mod writer;

pub use model::{Content, Document, Element};
pub use parser::{Config, Parser};
pub use writer::{element_to_string, escape_attr, escape_text, to_pretty_xml, to_xml};
