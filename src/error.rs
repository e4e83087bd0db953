//! Error types for saxbridge
//!
//! This module defines the error taxonomy shared by the event bridge and
//! the properties persister. Failures are propagated to the immediate
//! caller without translation, retry, or partial rollback.

use thiserror::Error;

/// Result type alias using saxbridge Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for saxbridge operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error on an underlying byte stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Write error on an underlying text sink
    #[error("format error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Failure constructing or forwarding an XML event
    #[error("stream error: {0}")]
    Stream(String),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// Malformed properties input (bad escape sequence or schema violation)
    #[error("malformed input: {0}")]
    Malformed(String),

    /// Name error (invalid XML name)
    #[error("name error: {0}")]
    Name(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_display() {
        let err = Error::Stream("consumer rejected event".to_string());
        assert_eq!(format!("{}", err), "stream error: consumer rejected event");

        let err = Error::Malformed("bad \\u escape".to_string());
        assert!(format!("{}", err).starts_with("malformed input:"));
    }
}
