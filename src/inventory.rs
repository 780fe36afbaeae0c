// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inventory Builder
//!
//! Classifies canonical VMs into groups along three axes that share one
//! group namespace:
//!
//! - **name**: the VM name through the VM rule set
//! - **labels**: every comma separated label through the label rule set
//! - **attributes**: configured attribute values through their own rule sets
//!
//! Group iteration order is lexicographic; hosts inside a group keep the
//! order in which they were first added.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, error, trace, warn};

use crate::domain::Vm;
use crate::rules::{AttributeRuleSet, RuleSet};

/// Keys the document uses for itself
pub const RESERVED_GROUPS: [&str; 2] = ["all", "_meta"];

/// Named bucket of hosts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Group {
    pub hosts: Vec<String>,
    pub vars: BTreeMap<String, serde_json::Value>,
    pub children: Vec<String>,
}

impl Group {
    /// Add a host unless it is already a member
    pub fn add_host(&mut self, host: &str) -> bool {
        if self.hosts.iter().any(|h| h == host) {
            return false;
        }
        self.hosts.push(host.to_string());
        true
    }
}

/// Connection variables for one host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostVars {
    pub ansible_host: String,
    pub ansible_port: u16,
}

/// The synthetic `all` group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AllGroup {
    pub hosts: Vec<String>,
    pub children: Vec<String>,
}

/// Complete grouping document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    pub groups: BTreeMap<String, Group>,
    pub hostvars: BTreeMap<String, HostVars>,
    pub all: AllGroup,
}

impl Inventory {
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }
}

/// Builds an [`Inventory`] from canonical VMs
#[derive(Debug, Clone, Default)]
pub struct InventoryBuilder {
    vm_rules: Option<RuleSet>,
    label_rules: Option<RuleSet>,
    attribute_rules: Vec<AttributeRuleSet>,
}

impl InventoryBuilder {
    pub fn new(
        vm_rules: RuleSet,
        label_rules: RuleSet,
        attribute_rules: Vec<AttributeRuleSet>,
    ) -> Self {
        Self {
            vm_rules: Some(vm_rules),
            label_rules: Some(label_rules),
            attribute_rules,
        }
    }

    /// Builder without any classification axis
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_vm_rules(mut self, rules: RuleSet) -> Self {
        self.vm_rules = Some(rules);
        self
    }

    pub fn with_label_rules(mut self, rules: RuleSet) -> Self {
        self.label_rules = Some(rules);
        self
    }

    pub fn with_attribute_rules(mut self, rules: AttributeRuleSet) -> Self {
        self.attribute_rules.push(rules);
        self
    }

    /// Classify every VM and finalize the document
    pub fn build(&self, vms: &[Vm]) -> Inventory {
        let mut groups: BTreeMap<String, Group> = BTreeMap::new();
        let mut hostvars = BTreeMap::new();

        for vm in vms {
            let host = vm.name.as_str();
            let address = vm.address.trim();
            if address.is_empty() {
                error!(vm = host, "Failed to fetch VM info: missing address");
                continue;
            }

            hostvars.insert(
                host.to_string(),
                HostVars {
                    ansible_host: address.to_string(),
                    ansible_port: vm.port,
                },
            );

            match self.vm_rules.as_ref().and_then(|rules| rules.sanitize(host)) {
                Some(key) => assign(&mut groups, key, host),
                None => debug!(vm = host, "No VM group"),
            }

            for label in vm.label_list() {
                match self.label_rules.as_ref().and_then(|rules| rules.sanitize(label)) {
                    Some(key) => assign(&mut groups, key, host),
                    None => debug!(vm = host, label, "No label group"),
                }
            }

            for axis in &self.attribute_rules {
                let Some(value) = vm.attributes.get(&axis.attribute) else {
                    trace!(vm = host, attribute = %axis.attribute, "Attribute not set");
                    continue;
                };
                match axis.rules.sanitize(value) {
                    Some(key) => assign(&mut groups, key, host),
                    None => debug!(
                        vm = host,
                        attribute = %axis.attribute,
                        value = %value,
                        "No attribute group"
                    ),
                }
            }
        }

        let all = AllGroup {
            hosts: hostvars
                .keys()
                .cloned()
                .chain(groups.values().flat_map(|group| group.hosts.iter().cloned()))
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            children: groups.keys().cloned().collect(),
        };

        Inventory {
            groups,
            hostvars,
            all,
        }
    }
}

fn assign(groups: &mut BTreeMap<String, Group>, key: String, host: &str) {
    if RESERVED_GROUPS.contains(&key.as_str()) {
        warn!(vm = host, group = %key, "Derived group name is reserved, skipping");
        return;
    }
    groups.entry(key).or_default().add_host(host);
}
