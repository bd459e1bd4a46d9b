//! Error types for ACCTREG

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main error type for ACCTREG
#[derive(Error, Debug)]
pub enum RegistryError {
    // ============ Request Errors ============
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid pagination request: {0}")]
    InvalidPagination(String),

    // ============ Lookup Errors ============
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    // ============ State Errors ============
    #[error("State corruption detected: {0}")]
    StateCorruption(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    // ============ Codec Errors ============
    #[error("Serialization failed: {0}")]
    SerializationError(String),

    #[error("Deserialization failed: {0}")]
    DeserializationError(String),

    // ============ Configuration Errors ============
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // ============ General Errors ============
    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RegistryError {
    /// Status class reported to remote callers.
    ///
    /// Only request and lookup errors are user-correctable; everything else
    /// means the store or a codec is in an inconsistent state.
    pub fn code(&self) -> StatusCode {
        match self {
            RegistryError::InvalidArgument(_)
            | RegistryError::InvalidAddress(_)
            | RegistryError::InvalidPagination(_) => StatusCode::InvalidArgument,
            RegistryError::NotFound(_) | RegistryError::ModuleNotFound(_) => StatusCode::NotFound,
            _ => StatusCode::Internal,
        }
    }

    /// True for errors that indicate corrupt state or a broken codec
    pub fn is_fatal(&self) -> bool {
        self.code() == StatusCode::Internal
    }
}

/// Status codes surfaced by the query layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCode {
    InvalidArgument,
    NotFound,
    Internal,
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatusCode::InvalidArgument => "InvalidArgument",
            StatusCode::NotFound => "NotFound",
            StatusCode::Internal => "Internal",
        };
        f.write_str(s)
    }
}

impl From<std::io::Error> for RegistryError {
    fn from(err: std::io::Error) -> Self {
        RegistryError::StorageError(err.to_string())
    }
}

impl From<bincode::Error> for RegistryError {
    fn from(err: bincode::Error) -> Self {
        RegistryError::SerializationError(err.to_string())
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::SerializationError(err.to_string())
    }
}
