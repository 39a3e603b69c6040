//! Document source: raw bytes plus the name diagnostics refer to them by

/// Name reported for documents parsed from memory
pub const UNNAMED: &str = "<configuration text>";

/// Bytes to parse and the name parse errors are prefixed with
#[derive(Clone, Copy, Debug)]
pub struct Input<'a> {
    bytes: &'a [u8],
    name: &'a str,
}

impl<'a> Input<'a> {
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            name: UNNAMED,
        }
    }

    /// Report errors against `name`, usually the file the bytes came from
    #[must_use]
    pub const fn named(mut self, name: &'a str) -> Self {
        self.name = name;
        self
    }

    pub const fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub const fn name(&self) -> &'a str {
        self.name
    }
}

impl<'a> From<&'a str> for Input<'a> {
    fn from(text: &'a str) -> Self {
        Self::new(text.as_bytes())
    }
}
