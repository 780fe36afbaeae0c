// Copyright (c) 2025 - Cowboy AI, Inc.

//! OpenNebula VM Source
//!
//! Implements [`VmSource`] on top of the OpenNebula XML-RPC API.
//!
//! # Protocol
//!
//! ```text
//! POST {endpoint}:{port}/RPC2
//!   one.vmpool.infoextended(session, -2, -1, -1, -1)
//!     -2  every VM the session user may see
//!     -1  from the first ID
//!     -1  to the last ID
//!     -1  in any state except DONE
//!
//! → [success: boolean, body: string, error code: int, ...]
//! ```
//!
//! On success the body is a `<VM_POOL>` document; otherwise it is the error
//! message.
//!
//! # Example
//!
//! ```rust,no_run
//! use cim_inventory::adapters::OneRpcSource;
//! use cim_inventory::collector::VmSource;
//! use cim_inventory::config::SourceDescriptor;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = OneRpcSource::new(
//!         SourceDescriptor {
//!             endpoint: "http://opennebula.example.com".to_string(),
//!             port: 2633,
//!             user: "oneadmin".to_string(),
//!             password: "secret".to_string(),
//!         },
//!         Duration::from_secs(30),
//!     )?;
//!
//!     for record in source.fetch().await? {
//!         println!("{} {}", record.id, record.name);
//!     }
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::xmlrpc::{self, Param, XmlNode};
use crate::collector::VmSource;
use crate::config::SourceDescriptor;
use crate::domain::{RawVmRecord, Template, TemplateValue, VmState};
use crate::errors::{InventoryError, InventoryResult};

const VMPOOL_METHOD: &str = "one.vmpool.infoextended";

/// Every VM visible to the session user
const FILTER_ALL: i32 = -2;

/// Open-ended ID range / any state
const ANY: i32 = -1;

/// Build the `one.vmpool.infoextended` request body
pub fn vmpool_request(session: &str) -> String {
    xmlrpc::method_call(
        VMPOOL_METHOD,
        &[
            Param::Str(session),
            Param::Int(FILTER_ALL),
            Param::Int(ANY),
            Param::Int(ANY),
            Param::Int(ANY),
        ],
    )
}

/// Extract the VM pool document from a `methodResponse`
///
/// A `false` success flag carries OpenNebula's error message (bad
/// credentials, missing permissions) and is reported as the source being
/// unavailable.
pub fn vmpool_body(response: &str) -> InventoryResult<String> {
    let values = xmlrpc::method_response(response)?;

    let success = values
        .first()
        .map(xmlrpc::value_text)
        .ok_or_else(|| InventoryError::MalformedResponse("empty result array".to_string()))?;
    let body = values
        .get(1)
        .map(xmlrpc::value_text)
        .ok_or_else(|| InventoryError::MalformedResponse("result array without body".to_string()))?;

    match success.trim() {
        "1" | "true" => Ok(body.to_string()),
        _ => Err(InventoryError::SourceUnavailable(format!(
            "OpenNebula error: {}",
            body
        ))),
    }
}

/// Parse a `<VM_POOL>` document
///
/// VM elements that cannot be read are logged and skipped; the rest of the
/// pool is still returned.
pub fn parse_vm_pool(xml: &str) -> InventoryResult<Vec<RawVmRecord>> {
    let root = xmlrpc::parse_tree(xml)?;
    if root.name != "VM_POOL" {
        return Err(InventoryError::MalformedResponse(format!(
            "expected VM_POOL, found {}",
            root.name
        )));
    }

    Ok(root
        .children_named("VM")
        .filter_map(|vm| match parse_vm(vm) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping VM: {}", e);
                None
            }
        })
        .collect())
}

fn parse_vm(vm: &XmlNode) -> InventoryResult<RawVmRecord> {
    let id = vm
        .child_text("ID")
        .and_then(|id| id.trim().parse::<i64>().ok())
        .ok_or_else(|| InventoryError::InvalidRecord("VM without a numeric ID".to_string()))?;

    let state = vm
        .child_text("STATE")
        .and_then(|state| state.trim().parse::<i64>().ok())
        .map(VmState::from_code)
        .ok_or_else(|| InventoryError::InvalidRecord(format!("VM ID {}: invalid STATE", id)))?;

    let name = vm.child_text("NAME").unwrap_or_default();

    let mut record = RawVmRecord::new(id, name, state);
    if let Some(template) = vm.child("TEMPLATE") {
        record.template = to_template(template);
    }
    if let Some(user_template) = vm.child("USER_TEMPLATE") {
        record.user_template = to_template(user_template);
    }
    Ok(record)
}

fn to_template(node: &XmlNode) -> Template {
    let mut template = Template::new();
    for child in &node.children {
        let value = if child.children.is_empty() {
            TemplateValue::Text(child.text.clone())
        } else {
            TemplateValue::Nested(to_template(child))
        };
        template.push(&child.name, value);
    }
    template
}

/// [`VmSource`] backed by one OpenNebula front-end
pub struct OneRpcSource {
    descriptor: SourceDescriptor,
    client: Client,
    name: String,
}

impl OneRpcSource {
    pub fn new(descriptor: SourceDescriptor, timeout: Duration) -> InventoryResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            InventoryError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;
        let name = descriptor.to_string();
        Ok(Self {
            descriptor,
            client,
            name,
        })
    }
}

#[async_trait]
impl VmSource for OneRpcSource {
    async fn fetch(&self) -> InventoryResult<Vec<RawVmRecord>> {
        let url = self.descriptor.rpc_url();
        debug!(source = %self.name, "Calling {} at {}", VMPOOL_METHOD, url);

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "text/xml")
            .body(vmpool_request(&self.descriptor.session()))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(InventoryError::SourceUnavailable(format!(
                "{} returned {}",
                url, status
            )));
        }

        let records = parse_vm_pool(&vmpool_body(&text)?)?;
        info!(source = %self.name, "Fetched {} VM records", records.len());
        Ok(records)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
