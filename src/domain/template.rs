// Copyright (c) 2025 - Cowboy AI, Inc.
//! Raw VM Records as Returned by a Source
//!
//! OpenNebula templates are loosely typed: a key may hold text, a nested
//! vector attribute, or appear several times (one `NIC` per interface).
//! [`Template`] keeps entries in document order and never merges repeated
//! keys, so "one interface" and "a list of interfaces" are the same shape:
//! a sequence that happens to have one element.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Value of a single template entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateValue {
    /// Plain text attribute (`MEMORY = "1024"`)
    Text(String),
    /// Vector attribute (`NIC = [ IP = "10.0.0.1", ... ]`)
    Nested(Template),
}

impl TemplateValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TemplateValue::Text(text) => Some(text),
            TemplateValue::Nested(_) => None,
        }
    }

    pub fn as_nested(&self) -> Option<&Template> {
        match self {
            TemplateValue::Nested(template) => Some(template),
            TemplateValue::Text(_) => None,
        }
    }
}

/// Ordered, multi-valued template body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Template {
    entries: Vec<(String, TemplateValue)>,
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, keeping earlier entries with the same key
    pub fn push(&mut self, key: impl Into<String>, value: TemplateValue) {
        self.entries.push((key.into(), value));
    }

    /// Builder-style text entry
    pub fn with_text(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, TemplateValue::Text(value.into()));
        self
    }

    /// Builder-style nested entry
    pub fn with_nested(mut self, key: impl Into<String>, value: Template) -> Self {
        self.push(key, TemplateValue::Nested(value));
        self
    }

    /// First value stored under `key`
    pub fn get(&self, key: &str) -> Option<&TemplateValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// First text value stored under `key`
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(TemplateValue::as_text)
    }

    /// Every nested value stored under `key`, in document order
    pub fn nested_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Template> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| k == key)
            .filter_map(|(_, v)| v.as_nested())
    }

    /// Text entries only, in document order
    pub fn text_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_text().map(|text| (k.as_str(), text)))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// OpenNebula VM state (the `STATE` field, not `LCM_STATE`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VmState {
    Init,
    Pending,
    Hold,
    Active,
    Stopped,
    Suspended,
    Done,
    Failed,
    Poweroff,
    Undeployed,
    Cloning,
    CloningFailure,
    Unknown(i64),
}

impl VmState {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => VmState::Init,
            1 => VmState::Pending,
            2 => VmState::Hold,
            3 => VmState::Active,
            4 => VmState::Stopped,
            5 => VmState::Suspended,
            6 => VmState::Done,
            7 => VmState::Failed,
            8 => VmState::Poweroff,
            9 => VmState::Undeployed,
            10 => VmState::Cloning,
            11 => VmState::CloningFailure,
            other => VmState::Unknown(other),
        }
    }

    /// Only ACTIVE machines are reachable
    pub fn is_running(&self) -> bool {
        matches!(self, VmState::Active)
    }
}

impl fmt::Display for VmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmState::Init => write!(f, "INIT"),
            VmState::Pending => write!(f, "PENDING"),
            VmState::Hold => write!(f, "HOLD"),
            VmState::Active => write!(f, "ACTIVE"),
            VmState::Stopped => write!(f, "STOPPED"),
            VmState::Suspended => write!(f, "SUSPENDED"),
            VmState::Done => write!(f, "DONE"),
            VmState::Failed => write!(f, "FAILED"),
            VmState::Poweroff => write!(f, "POWEROFF"),
            VmState::Undeployed => write!(f, "UNDEPLOYED"),
            VmState::Cloning => write!(f, "CLONING"),
            VmState::CloningFailure => write!(f, "CLONING_FAILURE"),
            VmState::Unknown(code) => write!(f, "UNKNOWN({})", code),
        }
    }
}

/// One VM as reported by a source, before normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawVmRecord {
    pub id: i64,
    pub name: String,
    pub state: VmState,
    #[serde(default)]
    pub template: Template,
    #[serde(default)]
    pub user_template: Template,
}

impl RawVmRecord {
    pub fn new(id: i64, name: impl Into<String>, state: VmState) -> Self {
        Self {
            id,
            name: name.into(),
            state,
            template: Template::new(),
            user_template: Template::new(),
        }
    }

    pub fn with_template(mut self, template: Template) -> Self {
        self.template = template;
        self
    }

    pub fn with_user_template(mut self, user_template: Template) -> Self {
        self.user_template = user_template;
        self
    }
}
