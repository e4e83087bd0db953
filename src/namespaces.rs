//! XML namespace handling
//!
//! This module provides utilities for working with XML namespaces,
//! qualified names (QNames), and namespace prefix mappings.

use crate::error::{Error, Result};
use crate::names;
use indexmap::IndexMap;
use std::fmt;

/// XML Namespace URI
pub type NamespaceUri = String;

/// Namespace prefix
pub type Prefix = String;

/// Qualified name (QName) - namespace URI, local name, and optional prefix
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace URI (None for no namespace)
    pub namespace_uri: Option<NamespaceUri>,
    /// Local name
    pub local_name: String,
    /// Prefix the name was written with (None for unprefixed names)
    pub prefix: Option<Prefix>,
}

impl QName {
    /// Create a new QName
    pub fn new(
        namespace_uri: Option<impl Into<String>>,
        local_name: impl Into<String>,
        prefix: Option<impl Into<String>>,
    ) -> Self {
        Self {
            namespace_uri: namespace_uri.map(|s| s.into()),
            local_name: local_name.into(),
            prefix: prefix.map(|s| s.into()),
        }
    }

    /// Create a QName without a namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace_uri: None,
            local_name: local_name.into(),
            prefix: None,
        }
    }

    /// Create an unprefixed QName with a namespace
    pub fn namespaced(namespace_uri: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace_uri: Some(namespace_uri.into()),
            local_name: local_name.into(),
            prefix: None,
        }
    }

    /// Create a prefixed QName with a namespace
    pub fn prefixed(
        namespace_uri: impl Into<String>,
        prefix: impl Into<String>,
        local_name: impl Into<String>,
    ) -> Self {
        Self {
            namespace_uri: Some(namespace_uri.into()),
            local_name: local_name.into(),
            prefix: Some(prefix.into()),
        }
    }

    /// Build a QName from a namespace URI (possibly empty) and a raw
    /// `prefix:local` lexical form as reported by a parser.
    pub fn from_uri_and_qualified(uri: &str, qualified: &str) -> Result<Self> {
        names::validate_qname(qualified)?;
        let (prefix, local) = names::split_qname(qualified);
        let namespace_uri = if uri.is_empty() {
            None
        } else {
            Some(uri.to_string())
        };
        Ok(Self {
            namespace_uri,
            local_name: local.to_string(),
            prefix: prefix.map(|p| p.to_string()),
        })
    }

    /// Prefix as written, or the empty string for unprefixed names
    pub fn prefix_str(&self) -> &str {
        self.prefix.as_deref().unwrap_or("")
    }
}

impl fmt::Display for QName {
    /// Clark notation: `{uri}local`, or just `local` without a namespace
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace_uri {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}

/// Namespace context for resolving prefixes
///
/// Bound prefixes enumerate in insertion order; re-binding an existing
/// prefix keeps its original position.
#[derive(Debug, Clone, Default)]
pub struct NamespaceContext {
    /// Mapping from prefix to namespace URI
    prefixes: IndexMap<Prefix, NamespaceUri>,
    /// Default namespace (no prefix)
    default_namespace: Option<NamespaceUri>,
}

impl NamespaceContext {
    /// Create a new empty namespace context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a namespace prefix mapping
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace_uri: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace_uri.into());
    }

    /// Remove a namespace prefix mapping
    pub fn remove_prefix(&mut self, prefix: &str) {
        self.prefixes.shift_remove(prefix);
    }

    /// Set the default namespace
    pub fn set_default_namespace(&mut self, namespace_uri: impl Into<String>) {
        self.default_namespace = Some(namespace_uri.into());
    }

    /// Clear the default namespace
    pub fn clear_default_namespace(&mut self) {
        self.default_namespace = None;
    }

    /// Get the namespace for a prefix
    pub fn get_namespace(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(|s| s.as_str())
    }

    /// Get the default namespace
    pub fn get_default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// Enumerate the explicitly bound prefixes, in insertion order
    pub fn bound_prefixes(&self) -> impl Iterator<Item = &str> {
        self.prefixes.keys().map(|s| s.as_str())
    }

    /// Number of explicitly bound prefixes
    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// Whether the context has no bindings at all
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty() && self.default_namespace.is_none()
    }

    /// Resolve a prefixed name to a QName
    pub fn resolve(&self, prefixed_name: &str) -> Result<QName> {
        if let Some((prefix, local)) = prefixed_name.split_once(':') {
            let namespace_uri = self
                .get_namespace(prefix)
                .ok_or_else(|| Error::Name(format!("Unknown prefix: {}", prefix)))?;
            Ok(QName::prefixed(namespace_uri, prefix, local))
        } else {
            Ok(QName::new(
                self.default_namespace.clone(),
                prefixed_name,
                None::<String>,
            ))
        }
    }
}
