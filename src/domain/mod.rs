// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inventory Domain Models
//!
//! Value objects and entities shared by the collector and the inventory
//! builder.
//!
//! # Value Objects with Invariants
//!
//! - [`VmName`] - canonical (trimmed, lower-cased) VM identity
//! - [`NetworkRange`] - IPv4/IPv6 range in CIDR notation
//! - [`AddressPolicy`] - which interface addresses are usable
//!
//! # Records and Entities
//!
//! - [`RawVmRecord`] - a VM exactly as a source reported it
//! - [`Vm`] - canonical VM ready for classification

pub mod network;
pub mod template;
pub mod vm;
pub mod vm_name;

pub use network::{AddressPolicy, NetworkError, NetworkRange};
pub use template::{RawVmRecord, Template, TemplateValue, VmState};
pub use vm::Vm;
pub use vm_name::{VmName, VmNameError};
