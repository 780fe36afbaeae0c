// Copyright (c) 2025 - Cowboy AI, Inc.
//! VM Collector
//!
//! Queries every source concurrently, normalizes raw records into canonical
//! [`Vm`]s and returns the deduplicated union.
//!
//! # Architecture
//!
//! ```text
//! source 0 ──task──┐
//! source 1 ──task──┼──> Mutex<Vec<Collected>> ──join──> order + dedup ──> Vec<Vm>
//! source n ──task──┘
//! ```
//!
//! A failing source is logged and contributes nothing; it never aborts the
//! others. The lock is taken per append, never across a network call. Once
//! every task has been joined, entries are ordered by (source, record) and
//! the first occurrence of each name wins.

use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::domain::{AddressPolicy, RawVmRecord, Template, Vm, VmName};
use crate::errors::{InventoryError, InventoryResult};

/// Template keys never copied into the attribute map
const BULK_KEYS: [&str; 3] = ["NIC", "DISK", "CONTEXT"];

/// A remote provider of VM records
#[async_trait]
pub trait VmSource: Send + Sync {
    /// Fetch every VM record visible to this source
    async fn fetch(&self) -> InventoryResult<Vec<RawVmRecord>>;

    /// Human readable identifier used in logs
    fn name(&self) -> &str;
}

/// Normalize one raw record
///
/// Returns `Ok(None)` for machines that are not running; those are skipped
/// without a warning.
pub fn normalize_record(record: &RawVmRecord, policy: &AddressPolicy) -> InventoryResult<Option<Vm>> {
    if !record.state.is_running() {
        debug!(vm_id = record.id, state = %record.state, "Skipping VM that is not running");
        return Ok(None);
    }

    let name = VmName::new(&record.name).map_err(|e| {
        InventoryError::InvalidRecord(format!("VM ID {}: {}", record.id, e))
    })?;

    let address = first_usable_address(&record.template, policy).ok_or_else(|| {
        InventoryError::InvalidRecord(format!("VM {} (ID {}): no usable network interface", name, record.id))
    })?;

    let port = ssh_port(&name, record.user_template.text("SSH_PORT"));

    let labels = record.user_template.text("LABELS").unwrap_or_default();
    if labels.trim().is_empty() {
        debug!(vm = %name, "No labels found");
    }

    let mut vm = Vm::new(name, address).with_port(port).with_labels(labels);
    for (key, value) in record.user_template.text_entries() {
        if !BULK_KEYS.contains(&key) {
            vm.attributes
                .entry(key.to_string())
                .or_insert_with(|| value.to_string());
        }
    }
    // Capacity fields (CPU, VCPU, MEMORY) from the template body
    for (key, value) in record.template.text_entries() {
        if !BULK_KEYS.contains(&key) {
            vm.attributes
                .entry(key.to_string())
                .or_insert_with(|| value.to_string());
        }
    }

    Ok(Some(vm))
}

/// First interface (in template order) whose address passes the policy
fn first_usable_address(template: &Template, policy: &AddressPolicy) -> Option<String> {
    template
        .nested_all("NIC")
        .filter_map(|nic| nic.text("IP"))
        .find_map(|ip| policy.usable(ip))
        .map(str::to_string)
}

fn ssh_port(name: &VmName, raw: Option<&str>) -> u16 {
    match raw.map(str::trim) {
        None => {
            warn!(vm = %name, "SSH_PORT not set, using {}", Vm::DEFAULT_SSH_PORT);
            Vm::DEFAULT_SSH_PORT
        }
        Some(value) => match value.parse::<u16>() {
            Ok(port) if port > 0 => port,
            _ => {
                warn!(vm = %name, value, "Invalid SSH_PORT, using {}", Vm::DEFAULT_SSH_PORT);
                Vm::DEFAULT_SSH_PORT
            }
        },
    }
}

/// Keep the first VM seen for every name, preserving order
pub fn deduplicate(vms: impl IntoIterator<Item = Vm>) -> Vec<Vm> {
    let mut seen = HashSet::new();
    vms.into_iter()
        .filter(|vm| {
            let first = seen.insert(vm.name.clone());
            if !first {
                debug!(vm = %vm.name, "Discarding duplicate VM");
            }
            first
        })
        .collect()
}

/// A normalized VM tagged with where it came from
#[derive(Debug)]
struct Collected {
    source: usize,
    sequence: usize,
    vm: Vm,
}

/// Concurrent, fault-isolated collector
#[derive(Debug, Clone, Default)]
pub struct VmCollector {
    policy: AddressPolicy,
}

impl VmCollector {
    pub fn new(policy: AddressPolicy) -> Self {
        Self { policy }
    }

    /// Collect from every source and return the deduplicated union
    pub async fn collect(&self, sources: &[Arc<dyn VmSource>]) -> Vec<Vm> {
        let collected: Arc<Mutex<Vec<Collected>>> = Arc::new(Mutex::new(Vec::new()));

        let tasks = sources.iter().enumerate().map(|(index, source)| {
            let source = Arc::clone(source);
            let sink = Arc::clone(&collected);
            let policy = self.policy.clone();
            tokio::spawn(async move { collect_source(index, source, sink, policy).await })
        });

        for (index, joined) in join_all(tasks).await.into_iter().enumerate() {
            if let Err(e) = joined {
                error!(source = sources[index].name(), "Collection task aborted: {}", e);
            }
        }

        let mut entries = std::mem::take(&mut *collected.lock().await);
        entries.sort_by_key(|entry| (entry.source, entry.sequence));

        let vms = deduplicate(entries.into_iter().map(|entry| entry.vm));
        info!("Collected {} VMs from {} sources", vms.len(), sources.len());
        vms
    }
}

async fn collect_source(
    index: usize,
    source: Arc<dyn VmSource>,
    sink: Arc<Mutex<Vec<Collected>>>,
    policy: AddressPolicy,
) {
    let records = match source.fetch().await {
        Ok(records) => records,
        Err(e) => {
            error!(source = source.name(), "Error fetching VMs: {}", e);
            return;
        }
    };

    if records.is_empty() {
        warn!(source = source.name(), "No VMs found");
        return;
    }

    let mut accepted = 0usize;
    for (sequence, record) in records.iter().enumerate() {
        match normalize_record(record, &policy) {
            Ok(Some(vm)) => {
                sink.lock().await.push(Collected {
                    source: index,
                    sequence,
                    vm,
                });
                accepted += 1;
            }
            Ok(None) => {}
            Err(e) => warn!(source = source.name(), "Skipping VM: {}", e),
        }
    }

    debug!(
        source = source.name(),
        "Accepted {} of {} records",
        accepted,
        records.len()
    );
}
