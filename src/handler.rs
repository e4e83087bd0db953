//! SAX-style callback handling and event translation
//!
//! [`ContentHandler`] is the push-callback surface a streaming parser
//! drives. [`XmlEventHandler`] implements it by turning every callback
//! into one structured [`XmlEvent`] and forwarding it to an
//! [`XmlEventConsumer`], in callback order, with no buffering.

use crate::error::Result;
use crate::events::{
    Attribute, Location, Locator, NamespaceBinding, XmlEvent, XmlEventConsumer, XmlEventFactory,
};
use crate::namespaces::{NamespaceContext, QName};
use crate::XMLNS_ATTRIBUTE;

/// One raw attribute as delivered by a SAX-style parser
///
/// The URI may be empty and the qualified name is the raw `prefix:local`
/// lexical form. Namespace declarations arrive here like any other
/// attribute; consumers decide whether to keep them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaxAttribute {
    /// Namespace URI, or empty when the attribute has none
    pub uri: String,
    /// Raw qualified name as written in the document
    pub qualified_name: String,
    /// Attribute value
    pub value: String,
}

impl SaxAttribute {
    /// Create a new raw attribute
    pub fn new(
        uri: impl Into<String>,
        qualified_name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            qualified_name: qualified_name.into(),
            value: value.into(),
        }
    }
}

/// Ordered callback surface driven by a streaming parser
///
/// Callbacks arrive in document order. Every method defaults to a no-op
/// so implementors override only what they need. Well-formedness is the
/// parser's responsibility, not the handler's.
pub trait ContentHandler {
    /// Receive the source-location provider; invoked at most once, before
    /// any other callback
    fn set_document_locator(&mut self, _locator: &dyn Locator) {}

    /// Start of the document
    fn start_document(&mut self) -> Result<()> {
        Ok(())
    }

    /// End of the document
    fn end_document(&mut self) -> Result<()> {
        Ok(())
    }

    /// Start of an element, with its raw attribute list and the namespace
    /// context in scope (absent when the parser tracks none)
    fn start_element(
        &mut self,
        _name: &QName,
        _attributes: &[SaxAttribute],
        _namespace_context: Option<&NamespaceContext>,
    ) -> Result<()> {
        Ok(())
    }

    /// End of an element, with the namespace context active at close
    fn end_element(
        &mut self,
        _name: &QName,
        _namespace_context: Option<&NamespaceContext>,
    ) -> Result<()> {
        Ok(())
    }

    /// Character data
    fn characters(&mut self, _text: &str) -> Result<()> {
        Ok(())
    }

    /// Whitespace the parser classified as ignorable
    fn ignorable_whitespace(&mut self, _text: &str) -> Result<()> {
        Ok(())
    }

    /// Processing instruction
    fn processing_instruction(&mut self, _target: &str, _data: &str) -> Result<()> {
        Ok(())
    }

    /// Entity the parser skipped
    fn skipped_entity(&mut self, _name: &str) -> Result<()> {
        Ok(())
    }
}

/// `ContentHandler` that transforms callbacks into [`XmlEvent`]s and
/// writes them to an [`XmlEventConsumer`]
///
/// Stateless apart from the configured factory and its once-set location:
/// each callback constructs exactly one event (none for skipped entities)
/// and hands it to the consumer immediately. Consumer failures propagate
/// to the caller unmodified.
#[derive(Debug)]
pub struct XmlEventHandler<C: XmlEventConsumer> {
    event_factory: XmlEventFactory,
    event_consumer: C,
}

impl<C: XmlEventConsumer> XmlEventHandler<C> {
    /// Create a handler writing to the given consumer, with a default
    /// event factory
    pub fn new(consumer: C) -> Self {
        Self {
            event_factory: XmlEventFactory::new(),
            event_consumer: consumer,
        }
    }

    /// Create a handler that uses the given factory to construct events
    pub fn with_factory(consumer: C, factory: XmlEventFactory) -> Self {
        Self {
            event_factory: factory,
            event_consumer: consumer,
        }
    }

    /// Borrow the consumer
    pub fn consumer(&self) -> &C {
        &self.event_consumer
    }

    /// Borrow the consumer mutably
    pub fn consumer_mut(&mut self) -> &mut C {
        &mut self.event_consumer
    }

    /// Unwrap the handler, returning the consumer
    pub fn into_consumer(self) -> C {
        self.event_consumer
    }

    fn consume_event(&mut self, event: XmlEvent) -> Result<()> {
        self.event_consumer.add(event)
    }

    /// Build the event attribute list, excluding namespace declarations
    ///
    /// Any attribute whose qualified name has `xmlns` as its local part or
    /// prefix is a namespace declaration and never appears as an event
    /// attribute.
    fn event_attributes(&self, attributes: &[SaxAttribute]) -> Result<Vec<Attribute>> {
        let mut list = Vec::new();
        for attribute in attributes {
            let name = QName::from_uri_and_qualified(&attribute.uri, &attribute.qualified_name)?;
            if name.local_name != XMLNS_ATTRIBUTE && name.prefix_str() != XMLNS_ATTRIBUTE {
                list.push(
                    self.event_factory
                        .create_attribute(name, attribute.value.as_str()),
                );
            }
        }
        Ok(list)
    }

    /// Build the namespace-binding list from the context
    ///
    /// Absent context yields `None`. A non-empty default namespace comes
    /// first; bound prefixes follow in the context's enumeration order.
    fn create_namespaces(
        &self,
        namespace_context: Option<&NamespaceContext>,
    ) -> Option<Vec<NamespaceBinding>> {
        let context = namespace_context?;

        let mut namespaces = Vec::new();
        if let Some(default_uri) = context.get_default_namespace() {
            if !default_uri.is_empty() {
                namespaces.push(self.event_factory.create_namespace(default_uri));
            }
        }
        for prefix in context.bound_prefixes() {
            let uri = context.get_namespace(prefix).unwrap_or_default();
            namespaces.push(self.event_factory.create_prefixed_namespace(prefix, uri));
        }
        Some(namespaces)
    }
}

impl<C: XmlEventConsumer> ContentHandler for XmlEventHandler<C> {
    fn set_document_locator(&mut self, locator: &dyn Locator) {
        self.event_factory
            .set_location(Location::from_locator(locator));
    }

    fn start_document(&mut self) -> Result<()> {
        let event = self.event_factory.create_start_document();
        self.consume_event(event)
    }

    fn end_document(&mut self) -> Result<()> {
        let event = self.event_factory.create_end_document();
        self.consume_event(event)
    }

    fn start_element(
        &mut self,
        name: &QName,
        attributes: &[SaxAttribute],
        namespace_context: Option<&NamespaceContext>,
    ) -> Result<()> {
        let attributes = self.event_attributes(attributes)?;
        let namespaces = self.create_namespaces(namespace_context);
        let event = self
            .event_factory
            .create_start_element(name.clone(), attributes, namespaces);
        self.consume_event(event)
    }

    fn end_element(
        &mut self,
        name: &QName,
        namespace_context: Option<&NamespaceContext>,
    ) -> Result<()> {
        let namespaces = self.create_namespaces(namespace_context);
        let event = self
            .event_factory
            .create_end_element(name.clone(), namespaces);
        self.consume_event(event)
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        let event = self.event_factory.create_characters(text);
        self.consume_event(event)
    }

    fn ignorable_whitespace(&mut self, text: &str) -> Result<()> {
        let event = self.event_factory.create_ignorable_whitespace(text);
        self.consume_event(event)
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<()> {
        let event = self
            .event_factory
            .create_processing_instruction(target, data);
        self.consume_event(event)
    }

    // Intentionally not represented as an event
    fn skipped_entity(&mut self, _name: &str) -> Result<()> {
        Ok(())
    }
}
