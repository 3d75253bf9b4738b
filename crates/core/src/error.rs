//! Error types for fieldsnap
//!
//! This module defines the error type shared by every crate in the workspace.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Import failures are deliberately NOT represented here: an import reports a
//! boolean outcome plus its event log. These errors cover everything around
//! that: document parsing, structure validation, configuration and I/O.

use std::io;
use thiserror::Error;

/// Result type alias for fieldsnap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for fieldsnap
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (reading snapshots, site fixtures, config files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Snapshot document has the wrong shape
    #[error("Invalid document: {reason}")]
    InvalidDocument {
        /// What was wrong with the document
        reason: String,
    },

    /// Owner id is not a positive integer
    #[error("Invalid owner id: {raw:?}")]
    InvalidOwnerId {
        /// The id exactly as it appeared in the document
        raw: String,
    },

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument supplied by a caller
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Build an `InvalidDocument` error
    pub fn invalid_document(reason: impl Into<String>) -> Self {
        Error::InvalidDocument {
            reason: reason.into(),
        }
    }

    /// Build a `Config` error
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Build an `InvalidInput` error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput(message.into())
    }

    /// True if the error was caused by malformed JSON syntax rather than shape
    pub fn is_syntax(&self) -> bool {
        matches!(self, Error::Serialization(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        use serde_json::error::Category;
        match e.classify() {
            Category::Data => Error::invalid_document(e.to_string()),
            Category::Io => Error::Io(io::Error::new(io::ErrorKind::Other, e.to_string())),
            Category::Syntax | Category::Eof => Error::Serialization(e.to_string()),
        }
    }
}
