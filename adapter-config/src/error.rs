//! Error types for adapter configuration.

use thiserror::Error;

/// Result type alias for adapter configuration operations.
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Errors raised while binding configuration or building adapters.
#[derive(Error, Debug)]
pub enum AdapterError {
    /// A required attribute is missing or an attribute value cannot be
    /// converted to the property's type.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No builder is registered for the tag.
    #[error("unknown adapter type: {0}")]
    UnknownAdapterType(String),

    /// A builder is already registered for the tag.
    #[error("adapter type already registered: {0}")]
    DuplicateAdapterType(String),

    /// File source error.
    #[error("file source error: {0}")]
    Source(#[from] conduit_file_source::SourceError),
}
