//! Renderer error types.

use pancake_core::DocumentError;
use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while flattening an element.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No resolvable source element, or no attached replace target.
    #[error("No valid element or element ID supplied: {0}")]
    InvalidInput(String),

    /// The source element is neither `<svg>` nor `<canvas>`.
    #[error("Supplied element must be a <canvas> or <svg> element, got <{0}>")]
    UnsupportedElement(String),

    /// The rasterizer could not paint the markup.
    #[error("Rasterization failed: {0}")]
    Rasterization(String),

    /// The image encoder failed.
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// A data URI or other resource could not be read.
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Page model error.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Filesystem error while saving a download.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
