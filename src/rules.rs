// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pattern Rule Engine
//!
//! Derives group keys from free text. A [`RuleSet`] is an ordered list of
//! regex substitutions plus a prefix:
//!
//! ```text
//! "web-03.cluster.local"
//!   ─ ^([a-zA-Z]+)\..*  → $1  ─→ "web-03.cluster.local"   (no match)
//!   ─ [-0-9].*          → ""  ─→ "web"
//!   ─ -                 → _   ─→ "web"
//!   ─ prefix "vm_", trim, lower-case ─→ "vm_web"
//! ```
//!
//! Each substitution replaces every non-overlapping match and runs on the
//! output of the previous one. Replacements may reference capture groups
//! (`$1`, `${name}`).

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Rule validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("Invalid regex pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// A substitution rule as written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub pattern: String,
    #[serde(default)]
    pub replacement: String,
}

impl RuleDefinition {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }
}

/// Compiled substitution rule
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: Regex,
    replacement: String,
}

impl Rule {
    pub fn compile(definition: &RuleDefinition) -> Result<Self, RuleError> {
        let pattern = Regex::new(&definition.pattern).map_err(|e| RuleError::InvalidPattern {
            pattern: definition.pattern.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            pattern,
            replacement: definition.replacement.clone(),
        })
    }

    /// Replace every match in `input`
    pub fn apply(&self, input: &str) -> String {
        self.pattern
            .replace_all(input, self.replacement.as_str())
            .into_owned()
    }
}

/// Ordered rewrite rules plus a prefix
///
/// Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    prefix: String,
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Compile every definition, failing on the first invalid pattern
    pub fn new(prefix: impl Into<String>, definitions: &[RuleDefinition]) -> Result<Self, RuleError> {
        let rules = definitions
            .iter()
            .map(Rule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            prefix: prefix.into(),
            rules,
        })
    }

    /// Compile what can be compiled; invalid patterns are logged and dropped
    pub fn lenient(prefix: impl Into<String>, definitions: &[RuleDefinition]) -> Self {
        let rules = definitions
            .iter()
            .filter_map(|definition| match Rule::compile(definition) {
                Ok(rule) => Some(rule),
                Err(e) => {
                    warn!("Skipping rule: {}", e);
                    None
                }
            })
            .collect();
        Self {
            prefix: prefix.into(),
            rules,
        }
    }

    /// Prefix-only rule set
    pub fn prefixed(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            rules: Vec::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Run the substitutions only (no prefix, no case folding)
    pub fn rewrite(&self, raw: &str) -> String {
        self.rules
            .iter()
            .fold(raw.to_string(), |current, rule| rule.apply(&current))
    }

    /// Derive a group key from `raw`
    ///
    /// Returns `None` when `raw` is empty or the rules reduce it to
    /// whitespace. Emptiness is judged before the prefix is added, so a
    /// non-empty prefix never turns an empty value into a group.
    pub fn sanitize(&self, raw: &str) -> Option<String> {
        if raw.is_empty() {
            return None;
        }
        let rewritten = self.rewrite(raw);
        if rewritten.trim().is_empty() {
            return None;
        }
        Some(format!("{}{}", self.prefix, rewritten).trim().to_lowercase())
    }
}

/// Sanitize against an optional rule set
pub fn sanitize(raw: &str, rule_set: Option<&RuleSet>) -> Option<String> {
    rule_set.and_then(|rules| rules.sanitize(raw))
}

/// Rule set bound to one VM attribute
#[derive(Debug, Clone)]
pub struct AttributeRuleSet {
    pub name: String,
    pub attribute: String,
    pub rules: RuleSet,
}

impl AttributeRuleSet {
    pub fn new(name: impl Into<String>, attribute: impl Into<String>, rules: RuleSet) -> Self {
        Self {
            name: name.into(),
            attribute: attribute.into(),
            rules,
        }
    }
}
