// Copyright (c) 2025 - Cowboy AI, Inc.

//! Source adapter implementations
//!
//! Concrete implementations of the [`VmSource`](crate::collector::VmSource)
//! trait for remote VM providers.

#[cfg(feature = "opennebula")]
pub mod opennebula;

#[cfg(feature = "opennebula")]
pub mod xmlrpc;

#[cfg(feature = "opennebula")]
pub use opennebula::OneRpcSource;
