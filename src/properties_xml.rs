//! XML properties document format
//!
//! Reads and writes the XML variant of the properties format:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8" standalone="no"?>
//! <!DOCTYPE properties SYSTEM "http://java.sun.com/dtd/properties.dtd">
//! <properties>
//! <comment>text</comment>
//! <entry key="k">v</entry>
//! </properties>
//! ```

use crate::error::{Error, Result};
use crate::properties::Properties;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::{BufReader, Read, Write};

/// System identifier of the properties document type
pub const PROPERTIES_DTD_SYSTEM_ID: &str = "http://java.sun.com/dtd/properties.dtd";

const ROOT_TAG: &str = "properties";
const COMMENT_TAG: &str = "comment";
const ENTRY_TAG: &str = "entry";
const KEY_ATTRIBUTE: &str = "key";

impl Properties {
    /// Load entries from an XML properties document
    ///
    /// The `<comment>` element is ignored; every `<entry>` must carry a
    /// `key` attribute. Elements outside the document type are a schema
    /// violation. Existing keys are overwritten.
    pub fn load_xml<R: Read>(&mut self, reader: R) -> Result<()> {
        let mut reader = Reader::from_reader(BufReader::new(reader));
        let mut buf = Vec::new();

        let mut saw_root = false;
        let mut in_comment = false;
        let mut current: Option<(String, String)> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let tag = decode_tag(e.name().as_ref())?;
                    match tag.as_str() {
                        ROOT_TAG if !saw_root => saw_root = true,
                        COMMENT_TAG if saw_root && current.is_none() => in_comment = true,
                        ENTRY_TAG if saw_root && current.is_none() && !in_comment => {
                            current = Some((entry_key(&e)?, String::new()));
                        }
                        other => {
                            return Err(Error::Malformed(format!(
                                "unexpected element <{}> in properties document",
                                other
                            )))
                        }
                    }
                }
                Ok(Event::Empty(e)) => {
                    let tag = decode_tag(e.name().as_ref())?;
                    match tag.as_str() {
                        COMMENT_TAG if saw_root && current.is_none() => {}
                        ENTRY_TAG if saw_root && current.is_none() && !in_comment => {
                            self.insert(entry_key(&e)?, String::new());
                        }
                        other => {
                            return Err(Error::Malformed(format!(
                                "unexpected element <{}> in properties document",
                                other
                            )))
                        }
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some((_, value)) = current.as_mut() {
                        let text = e
                            .unescape()
                            .map_err(|e| Error::Xml(format!("Failed to unescape text: {}", e)))?;
                        value.push_str(&text);
                    }
                    // Text outside entries (layout whitespace, comments) is
                    // not significant
                }
                Ok(Event::End(e)) => {
                    let tag = decode_tag(e.name().as_ref())?;
                    match tag.as_str() {
                        ENTRY_TAG => {
                            if let Some((key, value)) = current.take() {
                                self.insert(key, value);
                            }
                        }
                        COMMENT_TAG => in_comment = false,
                        _ => {}
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!(
                        "Error parsing XML at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {} // Declaration, doctype and comments carry no entries
            }
            buf.clear();
        }

        if !saw_root {
            return Err(Error::Malformed(
                "missing <properties> root element".to_string(),
            ));
        }
        Ok(())
    }

    /// Serialize all entries to an XML properties document
    ///
    /// The declaration carries the overridden encoding name (default
    /// `UTF-8`); bytes are always produced as UTF-8, so only
    /// ASCII-compatible encoding names stay faithful.
    pub fn store_xml<W: Write>(
        &self,
        writer: W,
        comment: Option<&str>,
        encoding: Option<&str>,
    ) -> Result<()> {
        let mut xml = Writer::new(writer);
        let encoding = encoding.unwrap_or("UTF-8");

        write_event(
            &mut xml,
            Event::Decl(BytesDecl::new("1.0", Some(encoding), Some("no"))),
        )?;
        newline(&mut xml)?;
        write_event(
            &mut xml,
            Event::DocType(BytesText::from_escaped(format!(
                "{} SYSTEM \"{}\"",
                ROOT_TAG, PROPERTIES_DTD_SYSTEM_ID
            ))),
        )?;
        newline(&mut xml)?;

        write_event(&mut xml, Event::Start(BytesStart::new(ROOT_TAG)))?;
        newline(&mut xml)?;

        if let Some(comment) = comment {
            write_event(&mut xml, Event::Start(BytesStart::new(COMMENT_TAG)))?;
            write_event(&mut xml, Event::Text(BytesText::new(comment)))?;
            write_event(&mut xml, Event::End(BytesEnd::new(COMMENT_TAG)))?;
            newline(&mut xml)?;
        }

        for (key, value) in self.iter() {
            let mut entry = BytesStart::new(ENTRY_TAG);
            entry.push_attribute((KEY_ATTRIBUTE, key));
            write_event(&mut xml, Event::Start(entry))?;
            write_event(&mut xml, Event::Text(BytesText::new(value)))?;
            write_event(&mut xml, Event::End(BytesEnd::new(ENTRY_TAG)))?;
            newline(&mut xml)?;
        }

        write_event(&mut xml, Event::End(BytesEnd::new(ROOT_TAG)))?;
        newline(&mut xml)
    }
}

fn decode_tag(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(|s| s.to_string())
        .map_err(|e| Error::Xml(format!("Invalid element name: {}", e)))
}

/// Extract the mandatory key attribute of an entry element
fn entry_key(entry: &BytesStart) -> Result<String> {
    for attr_result in entry.attributes() {
        let attr =
            attr_result.map_err(|e| Error::Xml(format!("Failed to parse attribute: {}", e)))?;
        if attr.key.as_ref() == KEY_ATTRIBUTE.as_bytes() {
            let value = attr
                .unescape_value()
                .map_err(|e| Error::Xml(format!("Failed to unescape attribute value: {}", e)))?;
            return Ok(value.to_string());
        }
    }
    Err(Error::Malformed(
        "entry element without key attribute".to_string(),
    ))
}

fn write_event<W: Write>(xml: &mut Writer<W>, event: Event) -> Result<()> {
    xml.write_event(event)
        .map_err(|e| Error::Xml(format!("Failed to write XML: {}", e)))
}

fn newline<W: Write>(xml: &mut Writer<W>) -> Result<()> {
    write_event(xml, Event::Text(BytesText::from_escaped("\n")))
}
