// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-inventory
//!
//! Deterministic rule sets, raw records and in-memory sources shared by the
//! integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cim_inventory::domain::{RawVmRecord, Template, VmState};
use cim_inventory::{
    AttributeRuleSet, InventoryError, InventoryResult, RuleDefinition, RuleSet, Vm, VmName,
    VmSource,
};

/// The `vm_default` rule set from the sample configuration
pub fn vm_default_rules() -> RuleSet {
    RuleSet::new(
        "vm_",
        &[
            RuleDefinition::new(r"^([a-zA-Z]+)\..*", "$1"),
            RuleDefinition::new("[-0-9].*", ""),
            RuleDefinition::new("-", "_"),
        ],
    )
    .expect("Invalid vm_default fixture")
}

/// The `label_default` rule set from the sample configuration
pub fn label_default_rules() -> RuleSet {
    RuleSet::new("label_", &[RuleDefinition::new(r"[\-\.]", "_")])
        .expect("Invalid label_default fixture")
}

pub fn port_rules() -> AttributeRuleSet {
    AttributeRuleSet::new("port_group", "SSH_PORT", RuleSet::prefixed("port_"))
}

pub fn role_rules() -> AttributeRuleSet {
    AttributeRuleSet::new(
        "role_group",
        "ROLE",
        RuleSet::new(
            "role_",
            &[
                RuleDefinition::new("^db", "database"),
                RuleDefinition::new(r"[\-\.]", "_"),
            ],
        )
        .expect("Invalid role fixture"),
    )
}

pub fn vm(name: &str, address: &str) -> Vm {
    Vm::new(VmName::new(name).expect("Invalid VM name in fixture"), address)
}

/// Running VM with one interface and the given user template entries
pub fn running_record(id: i64, name: &str, ip: &str, user: &[(&str, &str)]) -> RawVmRecord {
    let user_template = user
        .iter()
        .fold(Template::new(), |t, (k, v)| t.with_text(*k, *v));
    RawVmRecord::new(id, name, VmState::Active)
        .with_template(
            Template::new()
                .with_text("CPU", "1")
                .with_text("MEMORY", "1024")
                .with_nested("NIC", Template::new().with_text("IP", ip)),
        )
        .with_user_template(user_template)
}

/// Source answering with a fixed list of records
pub struct StaticSource {
    name: String,
    records: Vec<RawVmRecord>,
    delay: Duration,
    calls: AtomicUsize,
}

impl StaticSource {
    pub fn new(name: &str, records: Vec<RawVmRecord>) -> Self {
        Self {
            name: name.to_string(),
            records,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn shared(self) -> Arc<dyn VmSource> {
        Arc::new(self)
    }
}

#[async_trait]
impl VmSource for StaticSource {
    async fn fetch(&self) -> InventoryResult<Vec<RawVmRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.records.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Source that always fails the way an unreachable endpoint does
pub struct FailingSource;

impl FailingSource {
    pub fn shared() -> Arc<dyn VmSource> {
        Arc::new(FailingSource)
    }
}

#[async_trait]
impl VmSource for FailingSource {
    async fn fetch(&self) -> InventoryResult<Vec<RawVmRecord>> {
        Err(InventoryError::SourceUnavailable(
            "connection refused".to_string(),
        ))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Source whose task panics
pub struct PanickingSource;

#[async_trait]
impl VmSource for PanickingSource {
    async fn fetch(&self) -> InventoryResult<Vec<RawVmRecord>> {
        panic!("source exploded");
    }

    fn name(&self) -> &str {
        "panicking"
    }
}

pub const SAMPLE_CONFIG: &str = r#"
vm_rule_set: vm_default
label_rule_set: label_default
attribute_rule_sets:
  - name: port_group
    attribute: SSH_PORT
    prefix: port_
    value_rules: []
sanitization_rules:
  vm_default:
    prefix: vm_
    name_rules:
      - pattern: '^([a-zA-Z]+)\..*'
        replacement: '$1'
      - pattern: '[-0-9].*'
        replacement: ''
      - pattern: '-'
        replacement: '_'
  label_default:
    prefix: label_
    name_rules:
      - pattern: '[\-\.]'
        replacement: '_'
servers:
  - endpoint: http://one-a.example.com
    port: 2633
    user: oneadmin
    password: secret
  - endpoint: http://one-b.example.com
    port: 2633
    user: oneadmin
    password: secret
allowed_networks:
  - 172.20.0.0/16
timeout_secs: 10
"#;
