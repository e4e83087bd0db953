//! Streaming parse-callback source
//!
//! [`SaxParser`] reads XML text with quick-xml and drives any
//! [`ContentHandler`] with the ordered callback sequence: document
//! start/end, element start/end with the namespace context in scope,
//! character data, and processing instructions.

use crate::error::{Error, Result};
use crate::events::SimpleLocator;
use crate::handler::{ContentHandler, SaxAttribute};
use crate::namespaces::{NamespaceContext, QName};
use crate::XMLNS_ATTRIBUTE;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Push parser driving a [`ContentHandler`]
#[derive(Debug, Clone, Default)]
pub struct SaxParser {
    /// Report whitespace-only text through `ignorable_whitespace`
    whitespace_as_ignorable: bool,
    /// System identifier reported through the document locator
    system_id: Option<String>,
}

impl SaxParser {
    /// Create a parser with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Report whitespace-only text nodes through `ignorable_whitespace`
    /// instead of `characters`
    pub fn with_whitespace_as_ignorable(mut self, ignorable: bool) -> Self {
        self.whitespace_as_ignorable = ignorable;
        self
    }

    /// Set the system identifier handed to the handler's locator
    pub fn with_system_id(mut self, system_id: impl Into<String>) -> Self {
        self.system_id = Some(system_id.into());
        self
    }

    /// Parse a document and invoke the handler's callbacks in document
    /// order
    pub fn parse_str<H: ContentHandler>(&self, xml: &str, handler: &mut H) -> Result<()> {
        let mut reader = Reader::from_reader(xml.as_bytes());
        let mut scopes: Vec<NamespaceContext> = Vec::new();
        let mut buf = Vec::new();

        if let Some(system_id) = &self.system_id {
            let locator = SimpleLocator::new(1, 1).with_system_id(system_id.clone());
            handler.set_document_locator(&locator);
        }
        handler.start_document()?;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    self.handle_start(&e, &mut scopes, handler)?;
                }
                Ok(Event::End(e)) => {
                    let raw = decode_name(e.name().as_ref())?;
                    let scope = scopes
                        .last()
                        .ok_or_else(|| Error::Xml(format!("Unexpected closing tag: {}", raw)))?;
                    let name = resolve_element_qname(&raw, scope)?;
                    handler.end_element(&name, Some(scope))?;
                    scopes.pop();
                }
                Ok(Event::Empty(e)) => {
                    self.handle_start(&e, &mut scopes, handler)?;
                    let raw = decode_name(e.name().as_ref())?;
                    // Scope pushed by handle_start is still on top
                    let scope = scopes.last().expect("scope pushed for empty element");
                    let name = resolve_element_qname(&raw, scope)?;
                    handler.end_element(&name, Some(scope))?;
                    scopes.pop();
                }
                Ok(Event::Text(e)) => {
                    let text = e
                        .unescape()
                        .map_err(|e| Error::Xml(format!("Failed to unescape text: {}", e)))?;
                    if self.whitespace_as_ignorable && text.trim().is_empty() {
                        handler.ignorable_whitespace(&text)?;
                    } else {
                        handler.characters(&text)?;
                    }
                }
                Ok(Event::CData(e)) => {
                    let text = std::str::from_utf8(&e)
                        .map_err(|e| Error::Xml(format!("Invalid CDATA content: {}", e)))?;
                    handler.characters(text)?;
                }
                Ok(Event::PI(e)) => {
                    let content = std::str::from_utf8(&e).map_err(|e| {
                        Error::Xml(format!("Invalid processing instruction: {}", e))
                    })?;
                    let (target, data) = split_pi(content);
                    handler.processing_instruction(target, data)?;
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!(
                        "Error parsing XML at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {} // Declarations, comments and doctype produce no callback
            }
            buf.clear();
        }

        if !scopes.is_empty() {
            return Err(Error::Xml("Unexpected end of document".to_string()));
        }
        handler.end_document()
    }

    /// Open an element: extend the namespace scope with this element's
    /// declarations, resolve its name, and fire `start_element`
    fn handle_start<H: ContentHandler>(
        &self,
        start: &BytesStart,
        scopes: &mut Vec<NamespaceContext>,
        handler: &mut H,
    ) -> Result<()> {
        let mut scope = scopes.last().cloned().unwrap_or_default();
        let mut raw_attributes: Vec<(String, String)> = Vec::new();

        for attr_result in start.attributes() {
            let attr = attr_result
                .map_err(|e| Error::Xml(format!("Failed to parse attribute: {}", e)))?;
            let key = decode_name(attr.key.as_ref())?;
            let value = attr
                .unescape_value()
                .map_err(|e| Error::Xml(format!("Failed to unescape attribute value: {}", e)))?
                .to_string();

            // Declarations extend the scope before any name is resolved
            if key == XMLNS_ATTRIBUTE {
                if value.is_empty() {
                    scope.clear_default_namespace();
                } else {
                    scope.set_default_namespace(&value);
                }
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                scope.add_prefix(prefix, &value);
            }
            raw_attributes.push((key, value));
        }

        let mut attributes = Vec::with_capacity(raw_attributes.len());
        for (key, value) in raw_attributes {
            let uri = attribute_uri(&key, &scope)?;
            attributes.push(SaxAttribute::new(uri, key, value));
        }

        let raw = decode_name(start.name().as_ref())?;
        let name = resolve_element_qname(&raw, &scope)?;

        scopes.push(scope);
        let scope = scopes.last().expect("scope just pushed");
        handler.start_element(&name, &attributes, Some(scope))
    }
}

fn decode_name(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(|s| s.to_string())
        .map_err(|e| Error::Xml(format!("Invalid name: {}", e)))
}

/// Resolve an element's raw lexical name against its scope
///
/// Unprefixed element names live in the default namespace.
fn resolve_element_qname(raw: &str, scope: &NamespaceContext) -> Result<QName> {
    match raw.split_once(':') {
        Some((prefix, _)) => {
            let uri = scope
                .get_namespace(prefix)
                .ok_or_else(|| Error::Xml(format!("Unbound namespace prefix: {}", prefix)))?;
            QName::from_uri_and_qualified(uri, raw)
        }
        None => QName::from_uri_and_qualified(scope.get_default_namespace().unwrap_or(""), raw),
    }
}

/// Namespace URI of a raw attribute name
///
/// Namespace declarations report the reserved xmlns namespace; prefixed
/// attributes resolve through the scope; unprefixed attributes carry no
/// namespace (the default namespace does not apply to attributes).
fn attribute_uri(key: &str, scope: &NamespaceContext) -> Result<String> {
    if key == XMLNS_ATTRIBUTE || key.starts_with("xmlns:") {
        return Ok(crate::XMLNS_NAMESPACE.to_string());
    }
    match key.split_once(':') {
        Some((prefix, _)) => scope
            .get_namespace(prefix)
            .map(|uri| uri.to_string())
            .ok_or_else(|| Error::Xml(format!("Unbound namespace prefix: {}", prefix))),
        None => Ok(String::new()),
    }
}

/// Split processing-instruction content into target and data
fn split_pi(content: &str) -> (&str, &str) {
    match content.find(|c: char| c.is_ascii_whitespace()) {
        Some(idx) => {
            let data = content[idx..].trim_start_matches(|c: char| c.is_ascii_whitespace());
            (&content[..idx], data)
        }
        None => (content, ""),
    }
}
