//! Structured XML events
//!
//! This module defines the immutable event values produced by the bridge:
//! one event per parse callback, handed to a consumer in callback order.
//! Events are constructed through an [`XmlEventFactory`], which carries
//! the optional source location installed before parsing begins.

use crate::namespaces::QName;
use crate::error::Result;

/// Source location attached to events
///
/// Built once from a [`Locator`] before parsing begins. The character
/// offset is never tracked and is always `-1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Line number, or -1 if unavailable
    pub line: i64,
    /// Column number, or -1 if unavailable
    pub column: i64,
    /// Character offset; always -1
    pub character_offset: i64,
    /// Public identifier of the document entity
    pub public_id: Option<String>,
    /// System identifier of the document entity
    pub system_id: Option<String>,
}

impl Location {
    /// Snapshot a locator into a Location
    pub fn from_locator(locator: &dyn Locator) -> Self {
        Self {
            line: locator.line_number(),
            column: locator.column_number(),
            character_offset: -1,
            public_id: locator.public_id().map(|s| s.to_string()),
            system_id: locator.system_id().map(|s| s.to_string()),
        }
    }
}

/// Source-location provider supplied by a parser
///
/// Line and column numbers are 1-based; `-1` means unavailable.
pub trait Locator {
    /// Current line number
    fn line_number(&self) -> i64;
    /// Current column number
    fn column_number(&self) -> i64;
    /// Public identifier of the document entity
    fn public_id(&self) -> Option<&str>;
    /// System identifier of the document entity
    fn system_id(&self) -> Option<&str>;
}

/// Owned, caller-populated [`Locator`]
#[derive(Debug, Clone)]
pub struct SimpleLocator {
    line: i64,
    column: i64,
    public_id: Option<String>,
    system_id: Option<String>,
}

impl SimpleLocator {
    /// Create a locator reporting the given line and column
    pub fn new(line: i64, column: i64) -> Self {
        Self {
            line,
            column,
            public_id: None,
            system_id: None,
        }
    }

    /// Set the public identifier
    pub fn with_public_id(mut self, public_id: impl Into<String>) -> Self {
        self.public_id = Some(public_id.into());
        self
    }

    /// Set the system identifier
    pub fn with_system_id(mut self, system_id: impl Into<String>) -> Self {
        self.system_id = Some(system_id.into());
        self
    }
}

impl Locator for SimpleLocator {
    fn line_number(&self) -> i64 {
        self.line
    }

    fn column_number(&self) -> i64 {
        self.column
    }

    fn public_id(&self) -> Option<&str> {
        self.public_id.as_deref()
    }

    fn system_id(&self) -> Option<&str> {
        self.system_id.as_deref()
    }
}

/// An element attribute carried by a StartElement event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified attribute name
    pub name: QName,
    /// Attribute value
    pub value: String,
}

impl Attribute {
    /// Create a new attribute
    pub fn new(name: QName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// A prefix-to-URI namespace binding active in some element scope
///
/// `prefix == None` is the default (unprefixed) binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceBinding {
    /// Bound prefix (None for the default binding)
    pub prefix: Option<String>,
    /// Namespace URI
    pub uri: String,
}

impl NamespaceBinding {
    /// Create a default (unprefixed) binding
    pub fn default_binding(uri: impl Into<String>) -> Self {
        Self {
            prefix: None,
            uri: uri.into(),
        }
    }

    /// Create a prefixed binding
    pub fn prefixed(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            uri: uri.into(),
        }
    }

    /// Whether this is the default binding
    pub fn is_default(&self) -> bool {
        self.prefix.is_none()
    }
}

/// The closed set of event variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEventKind {
    /// Start of the document
    StartDocument,
    /// End of the document
    EndDocument,
    /// Start of an element
    StartElement {
        /// Qualified element name
        name: QName,
        /// Attributes, in parser order, with namespace declarations excluded
        attributes: Vec<Attribute>,
        /// Namespace bindings active at the element; None when no context
        /// was supplied
        namespaces: Option<Vec<NamespaceBinding>>,
    },
    /// End of an element
    EndElement {
        /// Qualified element name
        name: QName,
        /// Namespace bindings active at close; None when no context was
        /// supplied
        namespaces: Option<Vec<NamespaceBinding>>,
    },
    /// Character data
    Characters(String),
    /// Whitespace the parser classified as ignorable
    IgnorableWhitespace(String),
    /// Processing instruction
    ProcessingInstruction {
        /// Instruction target
        target: String,
        /// Instruction data
        data: String,
    },
}

/// One unit of XML document structure
///
/// Immutable once constructed; ownership transfers to the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlEvent {
    /// The event variant and its payload
    pub kind: XmlEventKind,
    /// Source location, if one was installed on the factory
    pub location: Option<Location>,
}

impl XmlEvent {
    /// Check if this is a start document event
    pub fn is_start_document(&self) -> bool {
        matches!(self.kind, XmlEventKind::StartDocument)
    }

    /// Check if this is an end document event
    pub fn is_end_document(&self) -> bool {
        matches!(self.kind, XmlEventKind::EndDocument)
    }

    /// Check if this is a start element event
    pub fn is_start_element(&self) -> bool {
        matches!(self.kind, XmlEventKind::StartElement { .. })
    }

    /// Check if this is an end element event
    pub fn is_end_element(&self) -> bool {
        matches!(self.kind, XmlEventKind::EndElement { .. })
    }

    /// Check if this is a characters event
    pub fn is_characters(&self) -> bool {
        matches!(self.kind, XmlEventKind::Characters(_))
    }

    /// Get the element name if this is a start or end element event
    pub fn element_name(&self) -> Option<&QName> {
        match &self.kind {
            XmlEventKind::StartElement { name, .. } => Some(name),
            XmlEventKind::EndElement { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Event-construction collaborator
///
/// Produces each event variant given its semantic fields. A location set
/// via [`set_location`](XmlEventFactory::set_location) is applied to every
/// subsequently constructed event; the factory's lifetime is tied to one
/// document's translation.
#[derive(Debug, Clone, Default)]
pub struct XmlEventFactory {
    location: Option<Location>,
}

impl XmlEventFactory {
    /// Create a new factory with no location
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the location applied to subsequently constructed events
    pub fn set_location(&mut self, location: Location) {
        self.location = Some(location);
    }

    /// The currently installed location
    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    fn event(&self, kind: XmlEventKind) -> XmlEvent {
        XmlEvent {
            kind,
            location: self.location.clone(),
        }
    }

    /// Create a StartDocument event
    pub fn create_start_document(&self) -> XmlEvent {
        self.event(XmlEventKind::StartDocument)
    }

    /// Create an EndDocument event
    pub fn create_end_document(&self) -> XmlEvent {
        self.event(XmlEventKind::EndDocument)
    }

    /// Create a StartElement event
    pub fn create_start_element(
        &self,
        name: QName,
        attributes: Vec<Attribute>,
        namespaces: Option<Vec<NamespaceBinding>>,
    ) -> XmlEvent {
        self.event(XmlEventKind::StartElement {
            name,
            attributes,
            namespaces,
        })
    }

    /// Create an EndElement event
    pub fn create_end_element(
        &self,
        name: QName,
        namespaces: Option<Vec<NamespaceBinding>>,
    ) -> XmlEvent {
        self.event(XmlEventKind::EndElement { name, namespaces })
    }

    /// Create a Characters event
    pub fn create_characters(&self, data: impl Into<String>) -> XmlEvent {
        self.event(XmlEventKind::Characters(data.into()))
    }

    /// Create an IgnorableWhitespace event
    pub fn create_ignorable_whitespace(&self, data: impl Into<String>) -> XmlEvent {
        self.event(XmlEventKind::IgnorableWhitespace(data.into()))
    }

    /// Create a ProcessingInstruction event
    pub fn create_processing_instruction(
        &self,
        target: impl Into<String>,
        data: impl Into<String>,
    ) -> XmlEvent {
        self.event(XmlEventKind::ProcessingInstruction {
            target: target.into(),
            data: data.into(),
        })
    }

    /// Create an attribute
    pub fn create_attribute(&self, name: QName, value: impl Into<String>) -> Attribute {
        Attribute::new(name, value)
    }

    /// Create a default namespace binding
    pub fn create_namespace(&self, uri: impl Into<String>) -> NamespaceBinding {
        NamespaceBinding::default_binding(uri)
    }

    /// Create a prefixed namespace binding
    pub fn create_prefixed_namespace(
        &self,
        prefix: impl Into<String>,
        uri: impl Into<String>,
    ) -> NamespaceBinding {
        NamespaceBinding::prefixed(prefix, uri)
    }
}

/// Downstream sink for events
///
/// Accepts one event per call, in submission order. A failure aborts
/// further processing for the document.
pub trait XmlEventConsumer {
    /// Accept ownership of one event
    fn add(&mut self, event: XmlEvent) -> Result<()>;
}

impl XmlEventConsumer for Vec<XmlEvent> {
    fn add(&mut self, event: XmlEvent) -> Result<()> {
        self.push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedLocator;

    impl Locator for FixedLocator {
        fn line_number(&self) -> i64 {
            12
        }
        fn column_number(&self) -> i64 {
            34
        }
        fn public_id(&self) -> Option<&str> {
            Some("-//TEST//EN")
        }
        fn system_id(&self) -> Option<&str> {
            Some("file:///doc.xml")
        }
    }

    #[test]
    fn test_location_from_locator() {
        let loc = Location::from_locator(&FixedLocator);
        assert_eq!(loc.line, 12);
        assert_eq!(loc.column, 34);
        assert_eq!(loc.character_offset, -1);
        assert_eq!(loc.public_id.as_deref(), Some("-//TEST//EN"));
        assert_eq!(loc.system_id.as_deref(), Some("file:///doc.xml"));
    }

    #[test]
    fn test_factory_without_location() {
        let factory = XmlEventFactory::new();
        let event = factory.create_start_document();
        assert!(event.is_start_document());
        assert!(event.location.is_none());
    }

    #[test]
    fn test_factory_stamps_location() {
        let mut factory = XmlEventFactory::new();
        factory.set_location(Location::from_locator(&FixedLocator));

        let event = factory.create_characters("hi");
        let loc = event.location.expect("location should be stamped");
        assert_eq!(loc.line, 12);
        assert_eq!(loc.character_offset, -1);
    }

    #[test]
    fn test_event_accessors() {
        let factory = XmlEventFactory::new();
        let event = factory.create_start_element(
            QName::namespaced("urn:a", "root"),
            vec![factory.create_attribute(QName::local("id"), "1")],
            Some(vec![factory.create_namespace("urn:a")]),
        );
        assert!(event.is_start_element());
        assert!(!event.is_end_element());
        assert_eq!(event.element_name().unwrap().local_name, "root");
    }

    #[test]
    fn test_namespace_binding() {
        let binding = NamespaceBinding::default_binding("urn:a");
        assert!(binding.is_default());

        let binding = NamespaceBinding::prefixed("p", "urn:b");
        assert!(!binding.is_default());
        assert_eq!(binding.prefix.as_deref(), Some("p"));
    }

    #[test]
    fn test_vec_consumer() {
        let mut sink: Vec<XmlEvent> = Vec::new();
        let factory = XmlEventFactory::new();
        sink.add(factory.create_start_document()).unwrap();
        sink.add(factory.create_end_document()).unwrap();
        assert_eq!(sink.len(), 2);
        assert!(sink[0].is_start_document());
        assert!(sink[1].is_end_document());
    }
}
