//! Error types for the Gatehouse library.

use thiserror::Error;

/// Main error type for Gatehouse operations.
///
/// Admission checks themselves are infallible; errors arise only while
/// loading configuration.
#[derive(Error, Debug)]
pub enum GatehouseError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Gatehouse operations.
pub type Result<T> = std::result::Result<T, GatehouseError>;
