//! Errors raised by the cache building blocks in this crate
//!
//! Adapters in other crates convert these into their own error type at the
//! boundary rather than matching on messages.

use thiserror::Error;

/// Result type alias using `CommonError`
pub type CommonResult<T> = Result<T, CommonError>;

/// Failures shared by caches and cache stores
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommonError {
    /// Cached bytes could not be encoded or decoded
    #[error("Serialization error ({format}): {message}")]
    Serialization { format: String, message: String },

    /// Operation the backend cannot perform, such as pattern deletes on a
    /// store without key enumeration
    #[error("Operation '{operation}' is not supported by '{backend}'")]
    Unsupported { operation: String, backend: String },

    /// Malformed input, such as an invalid key pattern
    #[error("Validation failed for '{field}': {message}")]
    Validation { field: String, message: String },
}

impl CommonError {
    pub fn serialization<F: Into<String>, S: Into<String>>(format: F, message: S) -> Self {
        Self::Serialization { format: format.into(), message: message.into() }
    }

    pub fn unsupported<O: Into<String>, B: Into<String>>(operation: O, backend: B) -> Self {
        Self::Unsupported { operation: operation.into(), backend: backend.into() }
    }

    pub fn validation<F: Into<String>, S: Into<String>>(field: F, message: S) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }
}

impl From<serde_json::Error> for CommonError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization("JSON", err.to_string())
    }
}
