// Copyright (c) 2025 - Cowboy AI, Inc.
//! Canonical VM Entity
//!
//! Everything downstream of the collector works on [`Vm`]: every field is
//! present and every attribute value is already a string.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::VmName;

/// Canonical VM ready for classification
///
/// # Invariants
/// - `name` is canonical (trimmed, lower-cased, non-empty)
/// - `port` is never zero
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vm {
    pub name: VmName,

    /// Address used to reach the machine
    pub address: String,

    pub port: u16,

    /// Raw comma separated labels
    #[serde(default)]
    pub labels: String,

    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Vm {
    /// Port used when the source does not provide a usable one
    pub const DEFAULT_SSH_PORT: u16 = 22;

    pub fn new(name: VmName, address: impl Into<String>) -> Self {
        Self {
            name,
            address: address.into(),
            port: Self::DEFAULT_SSH_PORT,
            labels: String::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_labels(mut self, labels: impl Into<String>) -> Self {
        self.labels = labels.into();
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Non-empty, trimmed labels in the order they were written
    pub fn label_list(&self) -> impl Iterator<Item = &str> {
        self.labels
            .split(',')
            .map(str::trim)
            .filter(|label| !label.is_empty())
    }
}
