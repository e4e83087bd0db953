//! Properties persistence contract
//!
//! [`PropertiesPersister`] presents a caller-supplied-stream contract for
//! property tables; [`DefaultPropertiesPersister`] fulfills it by strict
//! delegation to the [`Properties`] primitives. Key ordering, escaping
//! rules and comment syntax are entirely the table's; nothing is
//! reimplemented here.

use crate::error::Result;
use crate::properties::Properties;
use std::fmt;
use std::io::{Read, Write};

/// Strategy for persisting property tables
///
/// The table is owned by the caller before and after every operation, as
/// are the streams; no operation closes a stream or retains state.
pub trait PropertiesPersister {
    /// Load entries from a byte stream
    fn load(&self, props: &mut Properties, reader: &mut dyn Read) -> Result<()>;

    /// Load entries from already-decoded text
    fn load_from_str(&self, props: &mut Properties, text: &str) -> Result<()>;

    /// Store entries to a byte stream, with an optional header comment
    fn store(
        &self,
        props: &Properties,
        writer: &mut dyn Write,
        header: Option<&str>,
    ) -> Result<()>;

    /// Store entries to a text sink, with an optional header comment
    fn store_to_fmt(
        &self,
        props: &Properties,
        writer: &mut dyn fmt::Write,
        header: Option<&str>,
    ) -> Result<()>;

    /// Load entries from an XML properties document
    fn load_from_xml(&self, props: &mut Properties, reader: &mut dyn Read) -> Result<()>;

    /// Store entries as an XML properties document
    fn store_to_xml(
        &self,
        props: &Properties,
        writer: &mut dyn Write,
        header: Option<&str>,
    ) -> Result<()>;

    /// Store entries as an XML properties document with an explicit
    /// encoding declaration
    fn store_to_xml_with_encoding(
        &self,
        props: &Properties,
        writer: &mut dyn Write,
        header: Option<&str>,
        encoding: &str,
    ) -> Result<()>;
}

/// Default [`PropertiesPersister`]: each operation delegates to the
/// corresponding [`Properties`] primitive
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPropertiesPersister;

impl DefaultPropertiesPersister {
    /// Create a new persister
    pub fn new() -> Self {
        Self
    }
}

impl PropertiesPersister for DefaultPropertiesPersister {
    fn load(&self, props: &mut Properties, reader: &mut dyn Read) -> Result<()> {
        props.load(reader)
    }

    fn load_from_str(&self, props: &mut Properties, text: &str) -> Result<()> {
        props.load_from_str(text)
    }

    fn store(
        &self,
        props: &Properties,
        writer: &mut dyn Write,
        header: Option<&str>,
    ) -> Result<()> {
        props.store(writer, header)
    }

    fn store_to_fmt(
        &self,
        props: &Properties,
        writer: &mut dyn fmt::Write,
        header: Option<&str>,
    ) -> Result<()> {
        props.store_to_fmt(writer, header)
    }

    fn load_from_xml(&self, props: &mut Properties, reader: &mut dyn Read) -> Result<()> {
        props.load_xml(reader)
    }

    fn store_to_xml(
        &self,
        props: &Properties,
        writer: &mut dyn Write,
        header: Option<&str>,
    ) -> Result<()> {
        props.store_xml(writer, header, None)
    }

    fn store_to_xml_with_encoding(
        &self,
        props: &Properties,
        writer: &mut dyn Write,
        header: Option<&str>,
        encoding: &str,
    ) -> Result<()> {
        props.store_xml(writer, header, Some(encoding))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delegated_round_trip() {
        let persister = DefaultPropertiesPersister::new();
        let props: Properties = [("k1", "v1"), ("k2", "v2")].into_iter().collect();

        let mut bytes: Vec<u8> = Vec::new();
        persister.store(&props, &mut bytes, Some("my header")).unwrap();

        let mut reloaded = Properties::new();
        persister.load(&mut reloaded, &mut &bytes[..]).unwrap();
        assert_eq!(reloaded, props);
    }

    #[test]
    fn test_text_sink_delegation() {
        let persister = DefaultPropertiesPersister::new();
        let props: Properties = [("k", "café")].into_iter().collect();

        let mut text = String::new();
        persister.store_to_fmt(&props, &mut text, None).unwrap();
        assert_eq!(text, "k=café\n");

        let mut reloaded = Properties::new();
        persister.load_from_str(&mut reloaded, &text).unwrap();
        assert_eq!(reloaded, props);
    }

    #[test]
    fn test_xml_delegation() {
        let persister = DefaultPropertiesPersister::new();
        let props: Properties = [("k", "v")].into_iter().collect();

        let mut bytes: Vec<u8> = Vec::new();
        persister
            .store_to_xml_with_encoding(&props, &mut bytes, Some("hdr"), "US-ASCII")
            .unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains("encoding=\"US-ASCII\""));

        let mut reloaded = Properties::new();
        persister.load_from_xml(&mut reloaded, &mut &bytes[..]).unwrap();
        assert_eq!(reloaded, props);
    }
}
