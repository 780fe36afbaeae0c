// Copyright (c) 2025 - Cowboy AI, Inc.
//! OpenNebula Dynamic Inventory
//!
//! Ansible script inventory backed by one or more OpenNebula front-ends.
//!
//! Run with: cargo run --bin one-inventory -- --list
//!
//! - `--list` prints every group, `_meta.hostvars` and `all`
//! - `--host <NAME>` prints `{}` (host variables are already in `--list`)
//! - `--generate-config` writes a sample configuration
//!
//! The configuration path comes from `--config`, then `CONFIG_PATH`, then
//! `config.yaml`. Logs go to stderr and are filtered with `RUST_LOG`
//! (default `warn`).

use anyhow::{Context, Result};
use cim_inventory::{
    adapters::OneRpcSource, emitter, InventoryConfig, VmSource,
};
use clap::{ArgGroup, Parser};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "one-inventory", version, about = "OpenNebula dynamic inventory for Ansible")]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["list", "host", "generate_config"]),
))]
struct Cli {
    /// Print the full inventory
    #[arg(long)]
    list: bool,

    /// Print variables for a single host
    #[arg(long, value_name = "NAME")]
    host: Option<String>,

    /// Write a sample configuration file to the config path
    #[arg(long)]
    generate_config: bool,

    /// Path to the YAML configuration
    #[arg(long, env = "CONFIG_PATH", default_value = cim_inventory::config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the inventory document, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.generate_config {
        InventoryConfig::write_sample(&cli.config)
            .with_context(|| format!("Failed to generate {}", cli.config.display()))?;
        eprintln!("Sample configuration generated at {}", cli.config.display());
        return Ok(());
    }

    if let Some(host) = cli.host {
        info!("Host query for {}", host);
        return print(&emitter::emit_empty_host_vars()?);
    }

    let settings = InventoryConfig::load_settings(&cli.config)
        .with_context(|| format!("Invalid configuration {}", cli.config.display()))?;
    info!("Loaded {} sources from {}", settings.sources.len(), cli.config.display());

    let sources = settings
        .sources
        .iter()
        .map(|descriptor| {
            OneRpcSource::new(descriptor.clone(), settings.timeout)
                .map(|source| Arc::new(source) as Arc<dyn VmSource>)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let vms = settings.collector().collect(&sources).await;
    let inventory = settings.builder().build(&vms);
    info!(
        "Built inventory: {} groups, {} hosts",
        inventory.groups.len(),
        inventory.hostvars.len()
    );

    let document = emitter::emit(&inventory).context("Error serializing inventory to JSON")?;
    print(&document)
}

fn print(bytes: &[u8]) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(bytes)?;
    stdout.write_all(b"\n")?;
    stdout.flush()?;
    Ok(())
}
