//! XML name rules shared by the parser and the path grammar

/// Whether `b` may start an element or attribute name
pub const fn is_name_start(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

/// Whether `b` may continue an element or attribute name
pub const fn is_name_char(b: u8) -> bool {
    is_name_start(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}

/// Whether the whole of `name` is a name the parser would accept
pub fn is_valid_name(name: &str) -> bool {
    match name.as_bytes().split_first() {
        Some((&first, rest)) => is_name_start(first) && rest.iter().all(|&b| is_name_char(b)),
        None => false,
    }
}
