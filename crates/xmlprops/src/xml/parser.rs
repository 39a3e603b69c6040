//! XML parser implementation

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{Error, ErrorKind, Pos, Result, Span};
use crate::xml::cursor::Cursor;
use crate::xml::model::{Content, Document, Element};
use crate::xml::name::{is_name_char, is_name_start};

/// Configuration for the XML parser
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum element nesting depth (0 means unlimited)
    pub max_depth: u16,
    /// Maximum input size in bytes (0 means unlimited)
    pub max_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: 128,
            max_size: 10 * 1024 * 1024, // 10 MB default
        }
    }
}

impl Config {
    /// Create a new config with unlimited depth and size
    pub const fn unlimited() -> Self {
        Self {
            max_depth: 0,
            max_size: 0,
        }
    }

    /// Create a new config with specific limits
    pub const fn new(max_depth: u16, max_size: usize) -> Self {
        Self {
            max_depth,
            max_size,
        }
    }
}

/// XML parser
#[derive(Debug)]
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    config: Config,
    input_len: usize,
}

impl<'a> Parser<'a> {
    /// Create a new XML parser with default configuration
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_config(input, Config::default())
    }

    /// Create a new XML parser with custom configuration
    pub const fn with_config(input: &'a [u8], config: Config) -> Self {
        Self {
            cursor: Cursor::new(input),
            config,
            input_len: input.len(),
        }
    }

    /// Parse an XML document
    pub fn parse(&mut self) -> Result<Document> {
        if self.config.max_size > 0 && self.input_len > self.config.max_size {
            return Err(Error::at(
                ErrorKind::MaxSizeExceeded {
                    max: self.config.max_size,
                },
                0,
                1,
                1,
            ));
        }

        self.skip_misc()?;
        if self.cursor.starts_with(b"<!DOCTYPE") {
            self.skip_doctype()?;
            self.skip_misc()?;
        }

        if self.cursor.is_eof() {
            return Err(self.error_here("missing root element"));
        }

        let root = self.parse_element(1)?;
        self.skip_misc()?;

        if !self.cursor.is_eof() {
            return Err(self.error_here("unexpected content after root element"));
        }

        debug!(root = %root.name, "parsed xml document");
        Ok(Document { root })
    }

    /// Skip whitespace, processing instructions and comments outside the root
    fn skip_misc(&mut self) -> Result<()> {
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.starts_with(b"<?") {
                self.cursor.advance_by(2);
                self.skip_until(b"?>")?;
            } else if self.cursor.starts_with(b"<!--") {
                self.cursor.advance_by(4);
                self.skip_until(b"-->")?;
            } else {
                return Ok(());
            }
        }
    }

    fn skip_doctype(&mut self) -> Result<()> {
        // an internal subset may contain '>' so track brackets
        let mut in_subset = false;
        while let Some(b) = self.cursor.current() {
            self.cursor.advance();
            match b {
                b'[' => in_subset = true,
                b']' => in_subset = false,
                b'>' if !in_subset => return Ok(()),
                _ => {}
            }
        }
        Err(self.error_here("unterminated doctype"))
    }

    fn parse_element(&mut self, depth: u16) -> Result<Element> {
        if self.config.max_depth > 0 && depth > self.config.max_depth {
            let pos = self.cursor.position();
            return Err(Error::at(
                ErrorKind::MaxDepthExceeded {
                    max: self.config.max_depth,
                },
                pos.offset,
                pos.line,
                pos.col,
            ));
        }

        self.expect_byte(b'<')?;

        if self.cursor.current() == Some(b'/') {
            return Err(self.error_here("unexpected closing tag"));
        }

        let name = self.parse_name()?;
        let attributes = self.parse_attributes()?;

        if self.cursor.consume(b'/') {
            self.expect_byte(b'>')?;
            return Ok(Element {
                name,
                attributes,
                children: Vec::new(),
            });
        }

        self.expect_byte(b'>')?;

        let mut children = Vec::new();
        loop {
            if self.cursor.starts_with(b"</") {
                self.cursor.advance_by(2);
                let close_name = self.parse_name()?;
                if close_name != name {
                    return Err(self.error_here(&format!(
                        "mismatched closing tag: expected </{name}>, found </{close_name}>"
                    )));
                }
                self.cursor.skip_whitespace();
                self.expect_byte(b'>')?;
                break;
            }

            if self.cursor.starts_with(b"<!--") {
                self.cursor.advance_by(4);
                let text = self.take_until(b"-->")?;
                children.push(Content::Comment(text));
                continue;
            }

            if self.cursor.starts_with(b"<![CDATA[") {
                self.cursor.advance_by(9);
                let text = self.take_until(b"]]>")?;
                children.push(Content::Text(text));
                continue;
            }

            if self.cursor.starts_with(b"<?") {
                self.cursor.advance_by(2);
                self.skip_until(b"?>")?;
                continue;
            }

            if self.cursor.current() == Some(b'<') {
                let child = self.parse_element(depth.saturating_add(1))?;
                children.push(Content::Element(child));
                continue;
            }

            if self.cursor.is_eof() {
                return Err(self.error_here(&format!("unterminated element <{name}>")));
            }

            let text = self.parse_text()?;
            children.push(Content::Text(text));
        }

        // whitespace between child elements is layout, not a value
        if children.iter().any(|child| matches!(child, Content::Element(_))) {
            children.retain(|child| {
                !matches!(child, Content::Text(text) if text.trim().is_empty())
            });
        } else if children.is_empty() {
            // `<a></a>` holds an empty value, `<a/>` holds none
            children.push(Content::Text(String::new()));
        }

        Ok(Element {
            name,
            attributes,
            children,
        })
    }

    fn parse_attributes(&mut self) -> Result<IndexMap<String, String>> {
        let mut attrs = IndexMap::new();

        loop {
            self.cursor.skip_whitespace();
            match self.cursor.current() {
                Some(b'/') | Some(b'>') => break,
                Some(_) => {}
                None => return Err(self.error_here("unexpected end of input")),
            }

            let name = self.parse_name()?;
            self.cursor.skip_whitespace();
            self.expect_byte(b'=')?;
            self.cursor.skip_whitespace();
            let value = self.parse_attribute_value()?;

            if attrs.contains_key(&name) {
                return Err(self.error_here(&format!("duplicate attribute {name}")));
            }
            attrs.insert(name, value);
        }

        Ok(attrs)
    }

    fn parse_attribute_value(&mut self) -> Result<String> {
        let quote = match self.cursor.current() {
            Some(b'"') => b'"',
            Some(b'\'') => b'\'',
            _ => return Err(self.error_here("expected quoted attribute value")),
        };
        self.cursor.advance();

        let start = self.cursor.offset();
        while let Some(b) = self.cursor.current() {
            if b == quote {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance();
                let text = bytes_to_string(raw)?;
                return decode_entities(&text);
            }
            if b == b'<' {
                return Err(self.error_here("'<' not allowed in attribute value"));
            }
            self.cursor.advance();
        }

        Err(self.error_here("unterminated attribute value"))
    }

    fn parse_text(&mut self) -> Result<String> {
        let start = self.cursor.offset();
        while let Some(b) = self.cursor.current() {
            if b == b'<' {
                break;
            }
            self.cursor.advance();
        }

        let raw = self.cursor.slice_from(start);
        let text = bytes_to_string(raw)?;
        decode_entities(&text)
    }

    fn parse_name(&mut self) -> Result<String> {
        let start = self.cursor.offset();

        let Some(first) = self.cursor.current() else {
            return Err(self.error_here("expected name"));
        };
        if !is_name_start(first) {
            return Err(self.error_here("invalid name"));
        }

        self.cursor.advance();
        while let Some(b) = self.cursor.current() {
            if is_name_char(b) {
                self.cursor.advance();
            } else {
                break;
            }
        }

        let raw = self.cursor.slice_from(start);
        bytes_to_string(raw)
    }

    fn take_until(&mut self, pattern: &[u8]) -> Result<String> {
        let start = self.cursor.offset();
        while !self.cursor.is_eof() {
            if self.cursor.starts_with(pattern) {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance_by(pattern.len());
                return bytes_to_string(raw);
            }
            self.cursor.advance();
        }
        Err(self.error_here("unterminated markup"))
    }

    fn skip_until(&mut self, pattern: &[u8]) -> Result<()> {
        self.take_until(pattern).map(|_| ())
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        if self.cursor.consume(expected) {
            Ok(())
        } else {
            let expected = char::from(expected);
            Err(self.error_here(&format!("expected '{expected}'")))
        }
    }

    fn error_here(&self, message: &str) -> Error {
        let pos = self.cursor.position();
        Error::with_message(
            ErrorKind::InvalidToken,
            Span::new(Pos::new(pos.offset, pos.line, pos.col), pos),
            message.to_string(),
        )
    }
}

fn bytes_to_string(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|_| Error::plain(ErrorKind::InvalidToken, "invalid utf-8"))
}

fn decode_entities(input: &str) -> Result<String> {
    if !input.contains('&') {
        return Ok(input.to_string());
    }

    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch != '&' {
            result.push(ch);
            continue;
        }

        let mut entity = String::new();
        let mut terminated = false;
        for next in chars.by_ref() {
            if next == ';' {
                terminated = true;
                break;
            }
            entity.push(next);
        }

        let decoded = if terminated {
            match entity.as_str() {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => decode_numeric_entity(&entity),
            }
        } else {
            None
        };

        match decoded {
            Some(ch) => result.push(ch),
            None => {
                return Err(Error::plain(
                    ErrorKind::InvalidToken,
                    format!("invalid xml entity &{entity}"),
                ));
            }
        }
    }

    Ok(result)
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        None
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Document> {
        Parser::new(input.as_bytes()).parse()
    }

    #[test]
    fn test_parse_simple_element() -> Result<()> {
        let doc = parse("<deployment/>")?;
        assert_eq!(doc.root.name, "deployment");
        assert!(doc.root.children.is_empty());
        Ok(())
    }

    #[test]
    fn test_open_close_pair_holds_empty_text() -> Result<()> {
        let doc = parse("<deployment></deployment>")?;
        assert_eq!(doc.root.children, vec![Content::Text(String::new())]);
        assert_eq!(doc.root.text(), Some(""));
        Ok(())
    }

    #[test]
    fn test_whitespace_only_leaf_text_is_kept() -> Result<()> {
        let doc = parse("<deployment><schema> </schema><path>\n\t</path></deployment>")?;
        let texts: Vec<Option<&str>> = doc.root.elements().map(Element::text).collect();
        assert_eq!(texts, vec![Some(" "), Some("\n\t")]);
        Ok(())
    }

    #[test]
    fn test_parse_with_declaration_and_attributes() -> Result<()> {
        let doc = parse(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <deployment><cluster hostcount=\"2\" kfactor='1'/></deployment>",
        )?;
        let cluster = doc.root.elements().next().unwrap();
        assert_eq!(cluster.attribute("hostcount"), Some("2"));
        assert_eq!(cluster.attribute("kfactor"), Some("1"));
        Ok(())
    }

    #[test]
    fn test_parse_nested_text() -> Result<()> {
        let doc = parse("<deployment><paths><voltdbroot path=\"/tmp\">root</voltdbroot></paths></deployment>")?;
        let paths = doc.root.elements().next().unwrap();
        let root = paths.elements().next().unwrap();
        assert_eq!(root.text(), Some("root"));
        Ok(())
    }

    #[test]
    fn test_whitespace_between_elements_is_dropped() -> Result<()> {
        let doc = parse("<deployment>\n  <cluster/>\n  <!-- c -->\n</deployment>")?;
        assert_eq!(doc.root.children.len(), 2);
        assert_eq!(doc.root.text(), None);
        Ok(())
    }

    #[test]
    fn test_comments_and_cdata() -> Result<()> {
        let doc = parse("<!-- head --><a><!-- keep --><![CDATA[<raw>]]></a>")?;
        assert_eq!(
            doc.root.children,
            vec![
                Content::Comment(" keep ".to_string()),
                Content::Text("<raw>".to_string()),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_doctype_is_skipped() -> Result<()> {
        let doc = parse("<!DOCTYPE a [<!ENTITY x \"y\">]><a/>")?;
        assert_eq!(doc.root.name, "a");
        Ok(())
    }

    #[test]
    fn test_entities_are_decoded() -> Result<()> {
        let doc = parse("<a v=\"&lt;&#65;&#x42;\">&amp;&quot;</a>")?;
        assert_eq!(doc.root.attribute("v"), Some("<AB"));
        assert_eq!(doc.root.text(), Some("&\""));
        Ok(())
    }

    #[test]
    fn test_mismatched_tag_is_error() {
        let err = parse("<a><b></a>").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidToken);
        assert!(err.message().contains("mismatched closing tag"));
    }

    #[test]
    fn test_duplicate_attribute_is_error() {
        assert!(parse("<a x=\"1\" x=\"2\"/>").is_err());
    }

    #[test]
    fn test_trailing_content_is_error() {
        assert!(parse("<a/><b/>").is_err());
    }

    #[test]
    fn test_unknown_entity_is_error() {
        assert!(parse("<a>&nope;</a>").is_err());
    }

    #[test]
    fn test_empty_input_is_error() {
        assert!(parse("   ").is_err());
    }

    #[test]
    fn test_max_depth() {
        let input = "<a><a><a></a></a></a>";
        let mut parser = Parser::with_config(input.as_bytes(), Config::new(2, 0));
        let err = parser.parse().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MaxDepthExceeded { max: 2 });

        let mut parser = Parser::with_config(input.as_bytes(), Config::unlimited());
        assert!(parser.parse().is_ok());
    }

    #[test]
    fn test_max_size() {
        let input = "<deployment/>";
        let mut parser = Parser::with_config(input.as_bytes(), Config::new(0, 4));
        let err = parser.parse().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MaxSizeExceeded { max: 4 });
    }
}
