// Copyright (c) 2025 - Cowboy AI, Inc.
//! VM Name Value Object
//!
//! The name is the identity of a VM across every source, so it is put into
//! canonical form (trimmed, lower-cased) exactly once, at ingestion.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// VM name validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VmNameError {
    #[error("VM name is empty")]
    Empty,
}

/// Canonical VM name
///
/// # Examples
///
/// ```rust
/// use cim_inventory::domain::VmName;
///
/// let name = VmName::new("  Web-01.Cluster.Local ").unwrap();
/// assert_eq!(name.as_str(), "web-01.cluster.local");
///
/// assert!(VmName::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VmName(String);

impl VmName {
    /// Create a canonical name
    ///
    /// # Invariants
    /// - Non-empty after trimming
    /// - Lower-case
    pub fn new(name: impl AsRef<str>) -> Result<Self, VmNameError> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(VmNameError::Empty);
        }
        Ok(Self(name.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

}

impl fmt::Display for VmName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for VmName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for VmName {
    type Error = VmNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for VmName {
    type Error = VmNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VmName> for String {
    fn from(name: VmName) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_form() {
        assert_eq!(VmName::new("WEB01").unwrap().as_str(), "web01");
        assert_eq!(VmName::new("\tdb-02 \n").unwrap().as_str(), "db-02");
        assert_eq!(VmName::new("web01").unwrap(), VmName::new(" WEB01 ").unwrap());
    }

    #[test]
    fn test_empty_names() {
        assert_eq!(VmName::new(""), Err(VmNameError::Empty));
        assert_eq!(VmName::new("   "), Err(VmNameError::Empty));
    }

    #[test]
    fn test_serde_validates() {
        let name: VmName = serde_json::from_str("\"Api01\"").unwrap();
        assert_eq!(name.as_str(), "api01");
        assert!(serde_json::from_str::<VmName>("\"  \"").is_err());
    }
}
