//! # saxbridge
//!
//! Utilities for bridging SAX-style push parsing into structured XML
//! event streams, plus a persister for the classic properties-file
//! format and its XML variant.
//!
//! ## Features
//!
//! - `ContentHandler` callback surface with a driver built on quick-xml
//! - Translation of callbacks into immutable `XmlEvent` values, forwarded
//!   to any `XmlEventConsumer` in callback order
//! - Namespace-aware qualified names and prefix bindings
//! - Ordered property tables with the line-oriented `key=value` grammar
//!   (comments, continuations, escapes) and the XML properties document
//!   format
//!
//! ## Example
//!
//! ```rust,ignore
//! use saxbridge::{SaxParser, XmlEventHandler};
//!
//! let mut handler = XmlEventHandler::new(Vec::new());
//! SaxParser::new().parse_str("<root>hi</root>", &mut handler)?;
//! let events = handler.into_consumer();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules: foundation
pub mod error;
pub mod names;
pub mod namespaces;

// Event bridge
pub mod events;
pub mod handler;
pub mod sax;

// Properties persistence
pub mod persister;
pub mod properties;
pub mod properties_xml;

// Re-exports for convenience
pub use error::{Error, Result};
pub use events::{
    Attribute, Location, Locator, NamespaceBinding, SimpleLocator, XmlEvent, XmlEventConsumer,
    XmlEventFactory, XmlEventKind,
};
pub use handler::{ContentHandler, SaxAttribute, XmlEventHandler};
pub use namespaces::{NamespaceContext, QName};
pub use persister::{DefaultPropertiesPersister, PropertiesPersister};
pub use properties::Properties;
pub use sax::SaxParser;

/// Version of the saxbridge library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// XML namespace
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// XMLNS namespace
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// Reserved attribute name/prefix for namespace declarations
pub const XMLNS_ATTRIBUTE: &str = "xmlns";
