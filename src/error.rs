//! Error types for the signage pipeline

use thiserror::Error;

/// Result type alias for signage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while editing, rendering, exporting or persisting signage
#[derive(Error, Debug)]
pub enum Error {
    /// User input was rejected before any state was touched
    #[error("Invalid input: {0}")]
    ValidationError(String),

    /// Failed to lay out or rasterize a signage frame
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Failed to encode or deliver an export artifact
    #[error("Export failed: {0}")]
    ExportError(String),

    /// A persisted value could not be read or written
    #[error("Storage error for key `{key}`: {message}")]
    StorageError { key: String, message: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// An embedded image could not be decoded or encoded
    #[error("Image error: {0}")]
    ImageError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn storage(key: &str, message: impl ToString) -> Self {
        Error::StorageError {
            key: key.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::ImageError(err.to_string())
    }
}

#[cfg(feature = "pdf")]
impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::ExportError(format!("PDF: {}", err))
    }
}
