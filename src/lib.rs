//! Dynamic Ansible inventory for OpenNebula clusters
//!
//! Collects running VMs from any number of OpenNebula front-ends and
//! classifies them into groups with regex rewrite rules.
//!
//! ```text
//! sources ──> collector ──> Vec<Vm> ──> inventory builder ──> emitter ──> JSON
//!                                            │
//!                                        rule engine
//! ```

pub mod adapters;
pub mod collector;
pub mod config;
pub mod domain;
pub mod emitter;
pub mod errors;
pub mod inventory;
pub mod rules;

// Re-export commonly used types
pub use collector::{VmCollector, VmSource};
pub use config::{InventoryConfig, InventorySettings, SourceDescriptor};
pub use domain::{RawVmRecord, Vm, VmName};
pub use errors::{InventoryError, InventoryResult};
pub use inventory::{Inventory, InventoryBuilder};
pub use rules::{AttributeRuleSet, RuleDefinition, RuleSet};
