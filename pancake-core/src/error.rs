//! Error types for page model operations.

use thiserror::Error;

/// Result type for page model operations.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Errors that can occur while manipulating a [`Document`](crate::Document).
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Element not found in the document.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Invalid tree operation (wrong parent, cycle, detached reference).
    #[error("Invalid operation on element: {0}")]
    InvalidOperation(String),

    /// Document serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A deserialized tree has broken links.
    #[error("Inconsistent document tree: {0}")]
    InconsistentTree(String),

    /// Markup could not be imported.
    #[error("Markup error: {0}")]
    Markup(String),
}
