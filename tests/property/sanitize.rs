// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for the Pattern Rule Engine

use cim_inventory::{RuleDefinition, RuleSet};
use proptest::prelude::*;

/// Rule sets whose replacements can never re-trigger their own pattern
fn stable_rule_set() -> impl Strategy<Value = RuleSet> {
    prop_oneof![
        Just(RuleSet::prefixed("")),
        Just(RuleSet::new("", &[RuleDefinition::new(r"[\-\.]", "_")]).unwrap()),
        Just(
            RuleSet::new(
                "",
                &[
                    RuleDefinition::new(r"^([a-zA-Z]+)\..*", "$1"),
                    RuleDefinition::new("[-0-9].*", ""),
                    RuleDefinition::new("-", "_"),
                ]
            )
            .unwrap()
        ),
        Just(RuleSet::new("", &[RuleDefinition::new(r"\s+", "")]).unwrap()),
    ]
}

fn raw_name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9.-]{0,24}"
}

fn spaced_name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .-]{0,24}"
}

proptest! {
    /// Property: a fully reduced key is a fixed point of its rule set
    #[test]
    fn prop_sanitize_is_stable(rules in stable_rule_set(), raw in raw_name()) {
        if let Some(once) = rules.sanitize(&raw) {
            prop_assert_eq!(rules.sanitize(&once), Some(once.clone()));
        }
    }

    /// Property: present results carry the prefix and are trimmed lower-case
    #[test]
    fn prop_sanitized_keys_are_normalized(raw in spaced_name(), prefix in "[a-z]{0,5}_?") {
        let rules = RuleSet::new(prefix.clone(), &[RuleDefinition::new(r"[\-\.]", "_")]).unwrap();
        if let Some(key) = rules.sanitize(&raw) {
            prop_assert!(key.starts_with(&prefix));
            prop_assert_eq!(key.trim(), key.as_str());
            prop_assert_eq!(key.to_lowercase(), key.clone());
            prop_assert!(!key.contains('-') && !key.contains('.'));
        }
    }

    /// Property: a prefix never rescues a value the rules reduced to nothing
    #[test]
    fn prop_empty_after_rules_is_absent(raw in "[0-9-]{1,12}") {
        let rules = RuleSet::new("vm_", &[RuleDefinition::new("[-0-9].*", "")]).unwrap();
        prop_assert_eq!(rules.sanitize(&raw), None);
    }
}
