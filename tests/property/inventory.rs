// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for the Inventory Builder

use cim_inventory::{InventoryBuilder, RuleSet, Vm, VmName};
use proptest::prelude::*;
use std::collections::BTreeSet;

use crate::fixtures::{label_default_rules, port_rules, role_rules, vm_default_rules};

fn arbitrary_vm() -> impl Strategy<Value = Vm> {
    (
        "[a-z0-9]{1,6}(-[0-9]{1,2})?(\\.[a-z]{2,5})?",
        1u8..=254,
        prop::collection::vec("[a-z]{0,4}", 0..4),
        prop::option::of("(db|web|cache)[a-z-]{0,6}"),
        prop::option::of(1u16..=65535),
    )
        .prop_map(|(name, octet, labels, role, port)| {
            let mut vm = Vm::new(VmName::new(&name).unwrap(), format!("10.1.0.{}", octet))
                .with_labels(labels.join(","));
            if let Some(role) = role {
                vm = vm.with_attribute("ROLE", role);
            }
            if let Some(port) = port {
                vm = vm.with_port(port).with_attribute("SSH_PORT", port.to_string());
            }
            vm
        })
}

fn builder() -> InventoryBuilder {
    InventoryBuilder::new(
        vm_default_rules(),
        label_default_rules(),
        vec![port_rules(), role_rules()],
    )
}

proptest! {
    /// Property: `all.hosts` is the sorted union of grouped and ungrouped hosts
    #[test]
    fn prop_all_hosts_is_sorted_union(vms in prop::collection::vec(arbitrary_vm(), 0..20)) {
        let inventory = builder().build(&vms);

        let union: BTreeSet<_> = inventory
            .groups
            .values()
            .flat_map(|group| group.hosts.iter().cloned())
            .chain(inventory.hostvars.keys().cloned())
            .collect();
        prop_assert_eq!(inventory.all.hosts.clone(), union.into_iter().collect::<Vec<_>>());

        let names: Vec<_> = inventory.groups.keys().cloned().collect();
        prop_assert_eq!(inventory.all.children.clone(), names);
    }

    /// Property: every host with variables is listed in `all`
    ///
    /// Names with a leading digit are erased by the VM rules, so some hosts
    /// land in no group at all.
    #[test]
    fn prop_hostvars_are_in_all(vms in prop::collection::vec(arbitrary_vm(), 0..20)) {
        let inventory = builder().build(&vms);
        for host in inventory.hostvars.keys() {
            prop_assert!(inventory.all.hosts.contains(host));
        }
        prop_assert_eq!(inventory.all.hosts.len(), inventory.hostvars.len());
    }

    /// Property: an unclassifiable VM is still part of `all`
    #[test]
    fn prop_ungrouped_vm_is_in_all(name in "[0-9]{1,3}(-[a-z]{1,4})?", octet in 1u8..=254) {
        let vm = Vm::new(VmName::new(&name).unwrap(), format!("10.2.0.{}", octet));
        let inventory = builder().build(&[vm]);

        prop_assert!(inventory.groups.is_empty());
        prop_assert_eq!(inventory.all.hosts.clone(), vec![name]);
    }

    /// Property: no group lists the same host twice
    #[test]
    fn prop_membership_has_no_duplicates(vms in prop::collection::vec(arbitrary_vm(), 0..20)) {
        let inventory = builder().build(&vms);
        for group in inventory.groups.values() {
            let unique: BTreeSet<_> = group.hosts.iter().collect();
            prop_assert_eq!(unique.len(), group.hosts.len());
        }
    }

    /// Property: identical input gives identical output
    #[test]
    fn prop_build_is_deterministic(vms in prop::collection::vec(arbitrary_vm(), 0..20)) {
        prop_assert_eq!(builder().build(&vms), builder().build(&vms));
    }

    /// Property: labels produce exactly one group per distinct label
    #[test]
    fn prop_label_groups_match_distinct_labels(labels in prop::collection::vec("[a-z]{1,4}", 1..8)) {
        let vm = Vm::new(VmName::new("host").unwrap(), "10.0.0.1").with_labels(labels.join(","));
        let inventory = InventoryBuilder::empty()
            .with_label_rules(RuleSet::prefixed("label_"))
            .build(&[vm]);

        let expected: BTreeSet<_> = labels.iter().map(|l| format!("label_{}", l)).collect();
        let actual: BTreeSet<_> = inventory.groups.keys().cloned().collect();
        prop_assert_eq!(actual, expected);
    }
}
