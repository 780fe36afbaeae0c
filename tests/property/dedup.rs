// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Collector Deduplication

use cim_inventory::collector::deduplicate;
use cim_inventory::{Vm, VmName};
use proptest::prelude::*;
use std::collections::HashSet;

/// VMs drawn from a small name pool so duplicates are common
fn vm_list() -> impl Strategy<Value = Vec<Vm>> {
    prop::collection::vec(("(web|db|cache)0[1-3]", 0u8..=255), 0..40).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(name, octet)| {
                Vm::new(VmName::new(&name).unwrap(), format!("10.0.0.{}", octet))
            })
            .collect()
    })
}

proptest! {
    /// Property: one VM per distinct name survives
    #[test]
    fn prop_unique_count_matches_distinct_names(vms in vm_list()) {
        let distinct: HashSet<_> = vms.iter().map(|vm| vm.name.clone()).collect();
        let unique = deduplicate(vms.clone());
        prop_assert_eq!(unique.len(), distinct.len());
    }

    /// Property: the survivor is the first occurrence, in first-seen order
    #[test]
    fn prop_first_occurrence_wins(vms in vm_list()) {
        let unique = deduplicate(vms.clone());

        let mut seen = HashSet::new();
        let expected: Vec<_> = vms
            .iter()
            .filter(|vm| seen.insert(vm.name.clone()))
            .cloned()
            .collect();
        prop_assert_eq!(unique, expected);
    }
}
