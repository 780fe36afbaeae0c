// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for inventory operations

use thiserror::Error;

/// Errors that can occur while building an inventory
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A source could not be reached or rejected the request; that source
    /// is skipped
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// A source answered with something we could not understand
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A single VM record could not be normalized; only that record is lost
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for inventory operations
pub type InventoryResult<T> = Result<T, InventoryError>;

impl From<serde_json::Error> for InventoryError {
    fn from(err: serde_json::Error) -> Self {
        InventoryError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for InventoryError {
    fn from(err: serde_yaml::Error) -> Self {
        InventoryError::Configuration(err.to_string())
    }
}

#[cfg(feature = "opennebula")]
impl From<reqwest::Error> for InventoryError {
    fn from(err: reqwest::Error) -> Self {
        InventoryError::SourceUnavailable(err.to_string())
    }
}

#[cfg(feature = "opennebula")]
impl From<quick_xml::Error> for InventoryError {
    fn from(err: quick_xml::Error) -> Self {
        InventoryError::MalformedResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_error_is_configuration() {
        let err = serde_yaml::from_str::<Vec<String>>("{not: [a list").unwrap_err();
        let err: InventoryError = err.into();
        assert!(matches!(err, InventoryError::Configuration(_)));
    }
}
