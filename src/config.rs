// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inventory Configuration
//!
//! The YAML file is read into [`InventoryConfig`] and then validated into
//! [`InventorySettings`], which holds compiled rule sets and source
//! descriptors. Every validation failure is a configuration error and is
//! reported before any network activity.
//!
//! ```yaml
//! vm_rule_set: vm_default
//! label_rule_set: label_default
//! attribute_rule_sets:
//!   - name: port_group
//!     attribute: SSH_PORT
//!     prefix: port_
//!     value_rules: []
//! sanitization_rules:
//!   vm_default:
//!     prefix: vm_
//!     name_rules:
//!       - pattern: '[-0-9].*'
//!         replacement: ''
//! servers:
//!   - endpoint: http://opennebula.example.com
//!     port: 2633
//!     user: oneadmin
//!     password: secret
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::collector::VmCollector;
use crate::domain::{AddressPolicy, NetworkRange};
use crate::errors::{InventoryError, InventoryResult};
use crate::inventory::InventoryBuilder;
use crate::rules::{AttributeRuleSet, RuleDefinition, RuleSet};

/// Used when neither `--config` nor `CONFIG_PATH` is given
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

fn default_vm_rule_set() -> String {
    "vm_default".to_string()
}

fn default_label_rule_set() -> String {
    "label_default".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// One OpenNebula endpoint as written in the file
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("endpoint", &self.endpoint)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Named rule set used for VM names and labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSetConfig {
    pub prefix: String,
    pub name_rules: Vec<RuleDefinition>,
}

/// Rule set bound to a VM attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRuleSetConfig {
    pub name: String,
    pub attribute: String,
    pub prefix: String,
    pub value_rules: Vec<RuleDefinition>,
}

/// The configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    #[serde(default = "default_vm_rule_set")]
    pub vm_rule_set: String,

    #[serde(default = "default_label_rule_set")]
    pub label_rule_set: String,

    #[serde(default)]
    pub attribute_rule_sets: Vec<AttributeRuleSetConfig>,

    #[serde(default)]
    pub sanitization_rules: BTreeMap<String, RuleSetConfig>,

    #[serde(default)]
    pub servers: Vec<ServerConfig>,

    /// Only addresses inside these CIDR ranges are used (empty: any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_networks: Vec<String>,

    /// Per-request timeout for every source
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Connection details for one source
#[derive(Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    pub endpoint: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl SourceDescriptor {
    /// XML-RPC URL (`{endpoint}:{port}/RPC2`)
    pub fn rpc_url(&self) -> String {
        format!("{}:{}/RPC2", self.endpoint.trim_end_matches('/'), self.port)
    }

    /// OpenNebula session string (`user:password`)
    pub fn session(&self) -> String {
        format!("{}:{}", self.user, self.password)
    }
}

impl fmt::Debug for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceDescriptor")
            .field("endpoint", &self.endpoint)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.endpoint, self.port)
    }
}

/// Validated configuration
#[derive(Debug, Clone)]
pub struct InventorySettings {
    pub sources: Vec<SourceDescriptor>,
    pub vm_rules: RuleSet,
    pub label_rules: RuleSet,
    pub attribute_rules: Vec<AttributeRuleSet>,
    pub address_policy: AddressPolicy,
    pub timeout: Duration,
}

impl InventorySettings {
    pub fn builder(&self) -> InventoryBuilder {
        InventoryBuilder::new(
            self.vm_rules.clone(),
            self.label_rules.clone(),
            self.attribute_rules.clone(),
        )
    }

    pub fn collector(&self) -> VmCollector {
        VmCollector::new(self.address_policy.clone())
    }
}

impl InventoryConfig {
    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> InventoryResult<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| InventoryError::Configuration(format!("Error parsing YAML: {}", e)))
    }

    /// Read and parse a YAML file
    pub fn load(path: &Path) -> InventoryResult<Self> {
        if !path.exists() {
            return Err(InventoryError::Configuration(format!(
                "Config file not found: {}. Run with --generate-config to create a sample config.",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            InventoryError::Configuration(format!("Cannot read {}: {}", path.display(), e))
        })?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_yaml_str(&content).map_err(|e| match e {
            InventoryError::Configuration(msg) => {
                InventoryError::Configuration(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Load and validate in one step
    pub fn load_settings(path: &Path) -> InventoryResult<InventorySettings> {
        Self::load(path)?.validate()
    }

    /// Check every field and compile the rule sets
    pub fn validate(&self) -> InventoryResult<InventorySettings> {
        let compile = |set_name: &str, prefix: &str, rules: &[RuleDefinition]| {
            RuleSet::new(prefix, rules).map_err(|e| {
                InventoryError::Configuration(format!("Rule set {}: {}", set_name, e))
            })
        };

        let mut compiled = BTreeMap::new();
        for (name, rule_set) in &self.sanitization_rules {
            compiled.insert(
                name.as_str(),
                compile(name, &rule_set.prefix, &rule_set.name_rules)?,
            );
        }

        let lookup = |field: &str, name: &str| {
            compiled.get(name).cloned().ok_or_else(|| {
                InventoryError::Configuration(format!(
                    "{} '{}' not found in sanitization_rules",
                    field, name
                ))
            })
        };
        let vm_rules = lookup("vm_rule_set", &self.vm_rule_set)?;
        let label_rules = lookup("label_rule_set", &self.label_rule_set)?;

        let attribute_rules = self
            .attribute_rule_sets
            .iter()
            .map(|set| {
                if set.attribute.trim().is_empty() {
                    return Err(InventoryError::Configuration(format!(
                        "Attribute rule set {} has an empty attribute",
                        set.name
                    )));
                }
                let rules = compile(&set.name, &set.prefix, &set.value_rules)?;
                Ok(AttributeRuleSet::new(&set.name, &set.attribute, rules))
            })
            .collect::<InventoryResult<Vec<_>>>()?;

        let ranges = self
            .allowed_networks
            .iter()
            .map(|cidr| {
                NetworkRange::new(cidr).map_err(|e| {
                    InventoryError::Configuration(format!("allowed_networks: {}", e))
                })
            })
            .collect::<InventoryResult<Vec<_>>>()?;

        let sources = self
            .servers
            .iter()
            .enumerate()
            .map(|(idx, server)| server.validate(idx + 1))
            .collect::<InventoryResult<Vec<_>>>()?;
        if sources.is_empty() {
            return Err(InventoryError::Configuration(
                "Config file must contain at least one server configuration".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(InventoryError::Configuration(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(InventorySettings {
            sources,
            vm_rules,
            label_rules,
            attribute_rules,
            address_policy: AddressPolicy::within(ranges),
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }

    /// Sample configuration written by `--generate-config`
    pub fn sample() -> Self {
        let rule = RuleDefinition::new;
        let mut sanitization_rules = BTreeMap::new();
        sanitization_rules.insert(
            "vm_default".to_string(),
            RuleSetConfig {
                prefix: "vm_".to_string(),
                name_rules: vec![
                    rule(r"^([a-zA-Z]+)\..*", "$1"),
                    rule("[-0-9].*", ""),
                    rule("-", "_"),
                ],
            },
        );
        sanitization_rules.insert(
            "label_default".to_string(),
            RuleSetConfig {
                prefix: "label_".to_string(),
                name_rules: vec![rule(r"[\-\.]", "_")],
            },
        );
        sanitization_rules.insert(
            "vm_db".to_string(),
            RuleSetConfig {
                prefix: "db_".to_string(),
                name_rules: vec![rule("^([a-zA-Z0-9]+)-.*", "$1"), rule("_+", "_")],
            },
        );

        Self {
            vm_rule_set: default_vm_rule_set(),
            label_rule_set: default_label_rule_set(),
            attribute_rule_sets: vec![
                AttributeRuleSetConfig {
                    name: "port_group".to_string(),
                    attribute: "SSH_PORT".to_string(),
                    prefix: "port_".to_string(),
                    value_rules: vec![],
                },
                AttributeRuleSetConfig {
                    name: "role_group".to_string(),
                    attribute: "ROLE".to_string(),
                    prefix: "role_".to_string(),
                    value_rules: vec![rule("^db", "database"), rule(r"[\-\.]", "_")],
                },
            ],
            sanitization_rules,
            servers: vec![ServerConfig {
                endpoint: Some("http://your-opennebula-server".to_string()),
                port: Some(2633),
                user: Some("your_username".to_string()),
                password: Some("your_password".to_string()),
            }],
            allowed_networks: vec![],
            timeout_secs: default_timeout(),
        }
    }

    pub fn to_yaml(&self) -> InventoryResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| InventoryError::Serialization(format!("Error writing YAML: {}", e)))
    }

    /// Write the sample configuration, refusing to overwrite a file
    pub fn write_sample(path: &Path) -> InventoryResult<()> {
        let yaml = Self::sample().to_yaml()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => InventoryError::Configuration(format!(
                    "Refusing to overwrite existing file {}",
                    path.display()
                )),
                _ => InventoryError::Io(e),
            })?;
        file.write_all(yaml.as_bytes())?;
        debug!("Wrote sample configuration to {}", path.display());
        Ok(())
    }
}

impl ServerConfig {
    fn validate(&self, idx: usize) -> InventoryResult<SourceDescriptor> {
        let present = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        match (
            present(&self.endpoint),
            self.port.filter(|p| *p > 0),
            present(&self.user),
            present(&self.password),
        ) {
            (Some(endpoint), Some(port), Some(user), Some(password)) => Ok(SourceDescriptor {
                endpoint,
                port,
                user,
                password,
            }),
            _ => Err(InventoryError::Configuration(format!(
                "Server configuration {} missing required fields: endpoint, user, password, or port",
                idx
            ))),
        }
    }
}
