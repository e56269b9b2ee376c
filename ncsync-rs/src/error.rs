//! Error types for ncsync.

use thiserror::Error;

/// Result type alias for ncsync operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing or building configuration trees.
#[derive(Error, Debug)]
pub enum Error {
    /// XML parsing error.
    #[error("XML parse error: {0}")]
    Parse(String),

    /// A leaf value did not conform to its declared type.
    #[error("Invalid value: {0}")]
    Value(String),

    /// Malformed path expression.
    #[error("Path error: {0}")]
    Path(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML error from quick-xml.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}
