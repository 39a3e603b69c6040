//! Simple `key=value` properties files
//!
//! Used to load property definition sets, which map a property name to the
//! dotted path it is stored at:
//!
//! ```text
//! # deployment properties
//! hostcount = cluster.:hostcount
//! schema    = cluster.schema
//! user      = users.user:name(*)
//! ```

use std::path::Path as FsPath;

use indexmap::IndexMap;
use indexmap::map::Iter;
use tracing::{debug, instrument};

use crate::error::{Error, ErrorKind, Result};

/// Ordered property set
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Properties(IndexMap<String, String>);

impl Properties {
    /// Parse properties text.
    ///
    /// Each non-blank line is `key=value` or `key: value`, split at the first
    /// separator. Lines starting with `#` or `!` are comments. Later keys
    /// override earlier ones.
    pub fn parse(text: &str) -> Result<Self> {
        let mut props = IndexMap::new();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }

            let Some(split) = line.find(['=', ':']) else {
                return Err(Error::plain(
                    ErrorKind::InvalidProperty { line: index + 1 },
                    format!("line {}: expected key=value, found {line:?}", index + 1),
                ));
            };
            let (key, value) = line.split_at(split);
            let key = key.trim();
            let value = value.get(1..).unwrap_or_default().trim();
            if key.is_empty() {
                return Err(Error::plain(
                    ErrorKind::InvalidProperty { line: index + 1 },
                    format!("line {}: missing key", index + 1),
                ));
            }
            props.insert(key.to_string(), value.to_string());
        }
        Ok(Self(props))
    }

    /// Load and parse a properties file
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<FsPath>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::plain(
                ErrorKind::Io,
                format!("cannot read properties {}: {e}", path.display()),
            )
        })?;
        let props = Self::parse(&text).map_err(|e| e.context(path.display()))?;
        debug!(count = props.len(), "loaded properties");
        Ok(props)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> Iter<'_, String, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_separators_and_comments() -> Result<()> {
        let props = Properties::parse(
            "# comment\n\
             ! also a comment\n\
             \n\
             hostcount = cluster.:hostcount\n\
             schema: cluster.schema\n\
             user=users.user:name(*)\n",
        )?;
        assert_eq!(props.len(), 3);
        assert_eq!(props.get("hostcount"), Some("cluster.:hostcount"));
        assert_eq!(props.get("schema"), Some("cluster.schema"));
        // first separator wins, so the ':' inside the path stays in the value
        assert_eq!(props.get("user"), Some("users.user:name(*)"));
        Ok(())
    }

    #[test]
    fn test_later_keys_override() -> Result<()> {
        let props = Properties::parse("a=1\nb=2\na=3")?;
        let keys: Vec<&String> = props.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(props.get("a"), Some("3"));
        Ok(())
    }

    #[test]
    fn test_empty_value_allowed() -> Result<()> {
        let props = Properties::parse("empty=")?;
        assert_eq!(props.get("empty"), Some(""));
        Ok(())
    }

    #[test]
    fn test_line_without_separator() {
        let err = Properties::parse("a=1\njunk\n").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidProperty { line: 2 });
    }

    #[test]
    fn test_missing_key() {
        let err = Properties::parse("=value").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidProperty { line: 1 });
    }

    #[test]
    fn test_load_file() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xml_property_set.conf");
        std::fs::write(&path, "schema=cluster.schema\n").unwrap();
        let props = Properties::load(&path)?;
        assert!(props.contains_key("schema"));

        let err = Properties::load(dir.path().join("missing.conf")).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Io);
        Ok(())
    }
}
