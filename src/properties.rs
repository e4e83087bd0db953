//! Ordered property tables and the classic properties-file grammar
//!
//! [`Properties`] is an insertion-ordered string table with the
//! line-oriented `key=value` persistence format: `#`/`!` comments,
//! backslash line continuation, `=`/`:`/whitespace key terminators, and
//! `\t \n \f \r \uXXXX \\` escapes. Byte streams use the legacy
//! single-byte charset (Latin-1) with `\uXXXX` escapes covering the rest
//! of Unicode; text-side operations work on already-decoded data and
//! perform no charset step.
//!
//! Streams are never closed here; lifecycle stays with the caller.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use std::fmt;
use std::io::{Read, Write};

/// Insertion-ordered string-to-string property table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: IndexMap<String, String>,
}

impl Properties {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a property value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|s| s.as_str())
    }

    /// Insert or overwrite a property, returning the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// Remove a property, returning its value
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.shift_remove(key)
    }

    /// Whether a key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|s| s.as_str())
    }

    /// Load entries from a byte stream
    ///
    /// Bytes are decoded with the legacy single-byte charset (each byte
    /// is its code point); `\uXXXX` escapes supply everything else.
    /// Existing keys are overwritten.
    pub fn load<R: Read>(&mut self, mut reader: R) -> Result<()> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let text: String = bytes.iter().map(|&b| b as char).collect();
        self.load_from_str(&text)
    }

    /// Load entries from already-decoded text
    ///
    /// Same grammar as [`load`](Properties::load) with no charset step.
    pub fn load_from_str(&mut self, text: &str) -> Result<()> {
        let mut lines = text.lines();
        while let Some(line) = lines.next() {
            let trimmed = trim_leading(line);
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                continue;
            }

            // A line with an odd number of trailing backslashes continues
            // onto the next natural line, leading whitespace dropped
            let mut logical = trimmed.to_string();
            while has_continuation(&logical) {
                logical.pop();
                match lines.next() {
                    Some(next) => logical.push_str(trim_leading(next)),
                    None => break,
                }
            }

            let (key, value) = split_key_value(&logical);
            self.entries.insert(unescape(key)?, unescape(value)?);
        }
        Ok(())
    }

    /// Serialize all entries to a byte stream
    ///
    /// Each entry is written on its own `key=value` line; the optional
    /// header comment comes first, `#`-prefixed per line. Characters
    /// outside printable ASCII become `\uXXXX` escapes, so the output is
    /// pure ASCII.
    pub fn store<W: Write>(&self, mut writer: W, comment: Option<&str>) -> Result<()> {
        let mut out = String::new();
        self.format_entries(&mut out, comment, true);
        writer.write_all(out.as_bytes())?;
        Ok(())
    }

    /// Serialize all entries to a text sink
    ///
    /// Identical layout to [`store`](Properties::store), but the sink is
    /// already-decoded text so non-ASCII characters are written verbatim.
    pub fn store_to_fmt<W: fmt::Write>(&self, mut writer: W, comment: Option<&str>) -> Result<()> {
        let mut out = String::new();
        self.format_entries(&mut out, comment, false);
        writer.write_str(&out)?;
        Ok(())
    }

    fn format_entries(&self, out: &mut String, comment: Option<&str>, escape_unicode: bool) {
        if let Some(comment) = comment {
            write_comment(out, comment, escape_unicode);
        }
        for (key, value) in &self.entries {
            out.push_str(&escape(key, true, escape_unicode));
            out.push('=');
            out.push_str(&escape(value, false, escape_unicode));
            out.push('\n');
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Strip leading spaces, tabs and form feeds
fn trim_leading(line: &str) -> &str {
    line.trim_start_matches([' ', '\t', '\x0c'])
}

/// Whether a logical line ends with an odd number of backslashes
fn has_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Split a logical line into raw (still escaped) key and value
///
/// The key ends at the first unescaped `=`, `:` or whitespace; whitespace
/// around a single `=`/`:` separator is consumed.
fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut split = None;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' | ' ' | '\t' | '\x0c' => {
                split = Some((i, c));
                break;
            }
            _ => {}
        }
    }

    match split {
        None => (line, ""),
        Some((i, separator)) => {
            let key = &line[..i];
            let mut rest = trim_leading(&line[i + separator.len_utf8()..]);
            if separator != '=' && separator != ':' {
                // Whitespace terminator; an explicit separator may still follow
                if rest.starts_with('=') || rest.starts_with(':') {
                    rest = trim_leading(&rest[1..]);
                }
            }
            (key, rest)
        }
    }
}

/// Decode the escape sequences of a raw key or value
fn unescape(raw: &str) -> Result<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('f') => out.push('\x0c'),
            Some('r') => out.push('\r'),
            Some('u') => {
                let unit = read_hex4(&mut chars)?;
                if (0xD800..0xDC00).contains(&unit) {
                    // High surrogate; a low surrogate escape must follow
                    match (chars.next(), chars.next()) {
                        (Some('\\'), Some('u')) => {
                            let low = read_hex4(&mut chars)?;
                            if !(0xDC00..0xE000).contains(&low) {
                                return Err(Error::Malformed(
                                    "unpaired surrogate in \\u escape".to_string(),
                                ));
                            }
                            let value = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                            let c = char::from_u32(value).ok_or_else(|| {
                                Error::Malformed("invalid \\u escape".to_string())
                            })?;
                            out.push(c);
                        }
                        _ => {
                            return Err(Error::Malformed(
                                "unpaired surrogate in \\u escape".to_string(),
                            ))
                        }
                    }
                } else if (0xDC00..0xE000).contains(&unit) {
                    return Err(Error::Malformed(
                        "unpaired surrogate in \\u escape".to_string(),
                    ));
                } else {
                    // Non-surrogate BMP unit is always a valid char
                    out.push(char::from_u32(unit).expect("non-surrogate BMP code point"));
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    Ok(out)
}

/// Read four hex digits of a `\uXXXX` escape
fn read_hex4(chars: &mut std::str::Chars) -> Result<u32> {
    let mut value = 0u32;
    for _ in 0..4 {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or_else(|| Error::Malformed("malformed \\uxxxx encoding".to_string()))?;
        value = value * 16 + digit;
    }
    Ok(value)
}

/// Encode a key or value for output
///
/// Keys escape every space; values only a leading one. With
/// `escape_unicode`, anything outside printable ASCII becomes `\uXXXX`
/// escapes (UTF-16 units).
fn escape(text: &str, escape_space: bool, escape_unicode: bool) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for (i, c) in text.chars().enumerate() {
        match c {
            ' ' => {
                if i == 0 || escape_space {
                    out.push('\\');
                }
                out.push(' ');
            }
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            c if escape_unicode && !('\x20'..='\x7e').contains(&c) => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04X}", unit));
                }
            }
            c => out.push(c),
        }
    }
    out
}

/// Write a header comment, one `#`-prefixed line per input line
fn write_comment(out: &mut String, comment: &str, escape_unicode: bool) {
    for line in comment.lines() {
        if !line.starts_with('#') && !line.starts_with('!') {
            out.push('#');
        }
        if escape_unicode {
            for c in line.chars() {
                if ('\x20'..='\x7e').contains(&c) {
                    out.push(c);
                } else {
                    let mut units = [0u16; 2];
                    for unit in c.encode_utf16(&mut units) {
                        out.push_str(&format!("\\u{:04X}", unit));
                    }
                }
            }
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_load() {
        let mut props = Properties::new();
        props
            .load_from_str("k1=v1\nk2: v2\nk3 v3\n")
            .unwrap();
        assert_eq!(props.get("k1"), Some("v1"));
        assert_eq!(props.get("k2"), Some("v2"));
        assert_eq!(props.get("k3"), Some("v3"));
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let mut props = Properties::new();
        props
            .load_from_str("# comment\n! also a comment\n\n   \nkey=value\n")
            .unwrap();
        assert_eq!(props.len(), 1);
        assert_eq!(props.get("key"), Some("value"));
    }

    #[test]
    fn test_separator_whitespace() {
        let mut props = Properties::new();
        props.load_from_str("key    =    value with spaces\n").unwrap();
        assert_eq!(props.get("key"), Some("value with spaces"));
    }

    #[test]
    fn test_key_only_line() {
        let mut props = Properties::new();
        props.load_from_str("cheeses\n").unwrap();
        assert_eq!(props.get("cheeses"), Some(""));
    }

    #[test]
    fn test_continuation_lines() {
        let mut props = Properties::new();
        props
            .load_from_str("fruits    apple, banana, pear, \\\n     cantaloupe, watermelon\n")
            .unwrap();
        assert_eq!(
            props.get("fruits"),
            Some("apple, banana, pear, cantaloupe, watermelon")
        );
    }

    #[test]
    fn test_even_trailing_backslashes_do_not_continue() {
        let mut props = Properties::new();
        props.load_from_str("path=C\\\\\nnext=1\n").unwrap();
        assert_eq!(props.get("path"), Some("C\\"));
        assert_eq!(props.get("next"), Some("1"));
    }

    #[test]
    fn test_escaped_separators_in_key() {
        let mut props = Properties::new();
        props.load_from_str("a\\=b\\:c\\ d=value\n").unwrap();
        assert_eq!(props.get("a=b:c d"), Some("value"));
    }

    #[test]
    fn test_unicode_escapes() {
        let mut props = Properties::new();
        props.load_from_str("greeting=caf\\u00E9\n").unwrap();
        assert_eq!(props.get("greeting"), Some("café"));

        // Surrogate pair
        let mut props = Properties::new();
        props.load_from_str("emoji=\\uD83D\\uDE00\n").unwrap();
        assert_eq!(props.get("emoji"), Some("😀"));
    }

    #[test]
    fn test_malformed_unicode_escape() {
        let mut props = Properties::new();
        assert!(matches!(
            props.load_from_str("bad=\\u12G4\n"),
            Err(Error::Malformed(_))
        ));
        assert!(matches!(
            props.load_from_str("bad=\\u12\n"),
            Err(Error::Malformed(_))
        ));
        assert!(matches!(
            props.load_from_str("bad=\\uD800 alone\n"),
            Err(Error::Malformed(_))
        ));
    }

    #[test]
    fn test_latin1_byte_load() {
        let mut props = Properties::new();
        // "café" in Latin-1: 0x63 0x61 0x66 0xE9
        let bytes: &[u8] = &[0x6b, 0x3d, 0x63, 0x61, 0x66, 0xE9, 0x0a];
        props.load(bytes).unwrap();
        assert_eq!(props.get("k"), Some("café"));
    }

    #[test]
    fn test_store_layout() {
        let props: Properties = [("k1", "v1"), ("k2", "v2")].into_iter().collect();
        let mut out = Vec::new();
        props.store(&mut out, Some("my header")).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "#my header\nk1=v1\nk2=v2\n");
    }

    #[test]
    fn test_store_escapes_specials() {
        let props: Properties = [("a key", " leading and inner spaces")].into_iter().collect();
        let mut out = Vec::new();
        props.store(&mut out, None).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "a\\ key=\\ leading and inner spaces\n");
    }

    #[test]
    fn test_store_escapes_unicode_on_byte_streams_only() {
        let props: Properties = [("greeting", "café")].into_iter().collect();

        let mut bytes = Vec::new();
        props.store(&mut bytes, None).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "greeting=caf\\u00E9\n");

        let mut text = String::new();
        props.store_to_fmt(&mut text, None).unwrap();
        assert_eq!(text, "greeting=café\n");
    }

    #[test]
    fn test_round_trip() {
        let original: Properties = [
            ("plain", "value"),
            ("spaced key", "  padded value  "),
            ("specials", "a=b:c#d!e\\f"),
            ("control", "tab\there\nnewline"),
            ("unicode", "caf\u{e9} \u{1F600}"),
        ]
        .into_iter()
        .collect();

        let mut bytes = Vec::new();
        original.store(&mut bytes, Some("header")).unwrap();

        let mut reloaded = Properties::new();
        reloaded.load(&bytes[..]).unwrap();
        assert_eq!(reloaded, original);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut props = Properties::new();
        props.load_from_str("z=1\na=2\nm=3\n").unwrap();
        let keys: Vec<&str> = props.keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_duplicate_keys_overwrite() {
        let mut props = Properties::new();
        props.load_from_str("k=first\nk=second\n").unwrap();
        assert_eq!(props.len(), 1);
        assert_eq!(props.get("k"), Some("second"));
    }

    #[test]
    fn test_multiline_header_comment() {
        let props: Properties = [("k", "v")].into_iter().collect();
        let mut out = Vec::new();
        props.store(&mut out, Some("line one\nline two\n#already marked")).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "#line one\n#line two\n#already marked\nk=v\n");
    }
}
