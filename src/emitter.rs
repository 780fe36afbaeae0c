// Copyright (c) 2025 - Cowboy AI, Inc.
//! Document Emitter
//!
//! Serializes an [`Inventory`] in the shape Ansible expects from a script
//! inventory:
//!
//! ```text
//! {
//!   "<group>": {"hosts": [...], "vars": {}, "children": []},
//!   "_meta": {"hostvars": {"<vm>": {"ansible_host": "...", "ansible_port": 22}}},
//!   "all": {"hosts": [...], "children": [...]}
//! }
//! ```
//!
//! Groups come first in lexicographic order, followed by `_meta` and `all`.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::errors::InventoryResult;
use crate::inventory::{HostVars, Inventory};

#[derive(Serialize)]
struct Meta<'a> {
    hostvars: &'a BTreeMap<String, HostVars>,
}

impl Serialize for Inventory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len() + 2))?;
        for (name, group) in &self.groups {
            map.serialize_entry(name, group)?;
        }
        map.serialize_entry(
            "_meta",
            &Meta {
                hostvars: &self.hostvars,
            },
        )?;
        map.serialize_entry("all", &self.all)?;
        map.end()
    }
}

/// Pretty-printed `--list` response
pub fn emit(inventory: &Inventory) -> InventoryResult<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(inventory)?)
}

/// `--host <name>` response
///
/// Host variables already live in `_meta.hostvars`, so this is always an
/// empty object.
pub fn emit_empty_host_vars() -> InventoryResult<Vec<u8>> {
    Ok(serde_json::to_vec(&serde_json::Map::new())?)
}
