//! `omnigate providers` — show the provider catalog and what the current
//! configuration enables.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use omnigate_core::config::{get_config_path, load_config};
use omnigate_core::{Pluggable, Properties};
use omnigate_providers::{HttpProvider, ProviderSpec, PROVIDERS};

/// Run the providers command.
pub fn run(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let shown_path = config_path.map(Path::to_path_buf).unwrap_or_else(get_config_path);

    println!();
    println!("{}", "Omnigate Providers".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        shown_path.display(),
        if shown_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found, using defaults)".red().to_string()
        }
    );
    println!("  {:<18} {}", "Listen:".bold(), config.bind_address());

    // Generative providers
    println!();
    println!("  {}", "Generative:".bold());
    for spec in PROVIDERS {
        let slice = slice_for(&config.properties, spec.name);
        let capabilities = capability_summary(spec);

        let status = if slice.is_empty() {
            format!("{}", "· not configured".dimmed())
        } else {
            let mut provider = HttpProvider::from_spec(spec);
            match provider.initialize(&slice) {
                Ok(()) => format!("{} configured", "✓".green()),
                Err(e) => format!("{} {}", "✗".red(), e),
            }
        };
        println!(
            "    {:<12} {:<34} {}",
            spec.name,
            capabilities.dimmed(),
            status
        );
    }

    // Vector stores
    println!();
    let vector_status = if config.vector_db.enabled {
        format!("{} enabled", "✓".green())
    } else {
        format!("{}", "· disabled (feature.vectordb.enabled)".dimmed())
    };
    println!("  {:<18} {}", "Vector stores:".bold(), vector_status);
    if config.vector_db.enabled {
        for store in omnigate_vectordb::discover_all(config.vector_db.load_wait) {
            let configured = !slice_for(&config.properties, store.name()).is_empty();
            println!(
                "    {:<12} {}",
                store.name(),
                if configured {
                    format!("{} configured", "✓".green())
                } else {
                    format!("{}", "· not configured".dimmed())
                }
            );
        }
        println!(
            "    {:<12} {}",
            "collection",
            config.vector_db.collection.dimmed()
        );
    }

    println!();
    Ok(())
}

fn slice_for(properties: &Properties, name: &str) -> Properties {
    properties.filter_prefix(&format!("{}.", name.to_lowercase()))
}

/// Service level, claimed capabilities and locality of one catalog entry.
fn capability_summary(spec: &ProviderSpec) -> String {
    let mut capabilities = Vec::new();
    if spec.supports_chat {
        capabilities.push("chat");
    }
    if spec.supports_embeddings {
        capabilities.push("embedding");
    }
    let capabilities = if capabilities.is_empty() {
        "none".to_string()
    } else {
        capabilities.join(", ")
    };
    let local = if spec.is_local { " (local)" } else { "" };
    format!("{} {}{}", spec.service_level, capabilities, local)
}
