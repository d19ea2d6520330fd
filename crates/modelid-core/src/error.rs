//! Error types for the model identity library.
//!
//! Failures are split along the stages of the resolution chain so callers
//! can tell "no such model" apart from "the file could not be read" and
//! from "the remote service was unreachable".

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for model identity operations.
#[derive(Debug, Error)]
pub enum ModelIdError {
    // Network errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        /// Optional cause description
        cause: Option<String>,
    },

    #[error("Request timeout after {0:?}")]
    Timeout(std::time::Duration),

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    /// The logical name did not resolve to an existing file under any
    /// configured root. This is an expected outcome, not an I/O failure.
    #[error("Model not found: {name}")]
    ModelNotFound { name: String },

    #[error("Unknown model category: {category}")]
    UnknownCategory { category: String },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for model identity operations.
pub type Result<T> = std::result::Result<T, ModelIdError>;

// Conversion implementations for common error types

impl From<std::io::Error> for ModelIdError {
    fn from(err: std::io::Error) -> Self {
        ModelIdError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for ModelIdError {
    fn from(err: serde_json::Error) -> Self {
        ModelIdError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for ModelIdError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ModelIdError::Timeout(crate::config::NetworkConfig::REQUEST_TIMEOUT)
        } else {
            ModelIdError::Network {
                message: err.to_string(),
                cause: Some(err.to_string()),
            }
        }
    }
}

impl ModelIdError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        ModelIdError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// True for the "no model under any root" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ModelIdError::ModelNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModelIdError::ModelNotFound {
            name: "model.safetensors".into(),
        };
        assert_eq!(err.to_string(), "Model not found: model.safetensors");
    }

    #[test]
    fn test_io_with_path_keeps_path() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ModelIdError::io_with_path(io, "/models/a.safetensors");
        match err {
            ModelIdError::Io { path, .. } => {
                assert_eq!(path.unwrap(), PathBuf::from("/models/a.safetensors"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_not_found_classification() {
        assert!(ModelIdError::ModelNotFound { name: "x".into() }.is_not_found());
        assert!(!ModelIdError::Other("x".into()).is_not_found());
    }
}
