//! Error types for the vmfleet client

use thiserror::Error;

/// Errors that can occur when talking to the management API
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed (connect, TLS, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// API returned an error status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Fault detail from the server, or the status reason
        message: String,
    },

    /// Response body is not a usable XML document
    #[error("Invalid response: {0}")]
    InvalidResponse(#[from] DocumentError),
}

/// Errors raised by the XML response document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// Body could not be parsed as XML
    #[error("malformed XML: {0}")]
    Parse(String),

    /// Strict lookup of an element path failed
    #[error("missing element: {0}")]
    MissingElement(String),

    /// Strict lookup of an attribute failed
    #[error("element <{element}> has no '{attribute}' attribute")]
    MissingAttribute {
        /// Element the attribute was looked up on
        element: String,
        /// Attribute name
        attribute: String,
    },

    /// Document could not be serialized
    #[error("failed to render document: {0}")]
    Render(String),
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
