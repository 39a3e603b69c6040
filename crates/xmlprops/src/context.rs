//! Per-session state for deployment editing
//!
//! A [`Context`] carries the last failure message and the loaded property
//! definitions between calls, so callers can report what went wrong after an
//! operation that only returns success or failure.

use std::path::Path as FsPath;

use tracing::{debug, error, info};

use crate::accessor::set;
use crate::error::{Error, ErrorKind, Result, Span};
use crate::properties::Properties;
use crate::xml::model::Document;

/// Message reported when no failure has been recorded
pub const UNKNOWN_ERROR: &str = "Unknown internal error";

/// Path of the host count attribute in a deployment document
pub const HOSTCOUNT_PATH: &str = "cluster.:hostcount";

#[derive(Clone, Debug, Default)]
pub struct Context {
    message: Option<String>,
    definitions: Properties,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_definitions(definitions: Properties) -> Self {
        Self {
            message: None,
            definitions,
        }
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    /// Last recorded failure, or a generic message if none was recorded
    pub fn message(&self) -> &str {
        match self.message.as_deref() {
            Some(message) if !message.is_empty() => message,
            _ => UNKNOWN_ERROR,
        }
    }

    /// Load the property definition set: property name to dotted path
    pub fn load_definitions(&mut self, path: impl AsRef<FsPath>) -> Result<()> {
        self.definitions = Properties::load(path)?;
        info!(count = self.definitions.len(), "loaded property definitions");
        Ok(())
    }

    pub fn definitions(&self) -> &Properties {
        &self.definitions
    }

    /// Path a named property is stored at
    pub fn path_of(&self, name: &str) -> Result<&str> {
        self.definitions.get(name).ok_or_else(|| {
            let defined: Vec<&str> = self
                .definitions
                .iter()
                .map(|(key, _)| key.as_str())
                .collect();
            Error::with_message(
                ErrorKind::UnknownProperty {
                    name: name.to_string(),
                },
                Span::empty(),
                format!("unknown property: {name} (defined: {})", defined.join(", ")),
            )
        })
    }

    /// Write a named property into `doc` at the path its definition gives
    pub fn apply(
        &self,
        doc: &mut Document,
        name: &str,
        value: &str,
        unique_ids: &[&str],
    ) -> Result<()> {
        let path = self.path_of(name)?;
        debug!(property = name, path, "applying property");
        set(doc, path, value, unique_ids)
    }

    /// Parse `xml`, optionally stamp the cluster host count, and write it to
    /// `path`.
    ///
    /// Returns `false` on any failure; the reason is logged and kept as
    /// [`Context::message`].
    pub fn write_deployment_file(
        &mut self,
        xml: &str,
        path: impl AsRef<FsPath>,
        hostcount: Option<u32>,
    ) -> bool {
        self.clear_message();
        if xml.trim().is_empty() {
            self.fail("no XML to write as deployment file");
            return false;
        }

        match stamp_and_save(xml, path.as_ref(), hostcount) {
            Ok(()) => true,
            Err(e) => {
                self.fail(format!("cannot write deployment file: {e}"));
                false
            }
        }
    }

    fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        error!("{message}");
        self.set_message(message);
    }
}

fn stamp_and_save(xml: &str, path: &FsPath, hostcount: Option<u32>) -> Result<()> {
    let mut doc = crate::from_xml_str(xml)?;
    if let Some(count) = hostcount {
        set(&mut doc, HOSTCOUNT_PATH, &count.to_string(), &[])?;
    }
    crate::save_file(&doc, path)
}
