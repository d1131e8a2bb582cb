//! Models command implementation.

use anyhow::Result;
use colored::Colorize;
use lumen_core::LumenConfig;
use lumen_models::ModelRegistry;
use serde_json::json;
use std::process::ExitCode;

/// List every model a fresh registry built from `config` holds.
pub fn execute(config: &LumenConfig, json_output: bool) -> Result<ExitCode> {
    let registry = ModelRegistry::from_config(&config.models, &config.huggingface);
    print_registry(&registry, json_output)?;
    Ok(ExitCode::SUCCESS)
}

/// Print `registry` with each model's current load state.
pub fn print_registry(registry: &ModelRegistry, json_output: bool) -> Result<()> {
    let entries: Vec<_> = registry
        .names()
        .into_iter()
        .filter_map(|name| registry.describe(name).ok().map(|info| (name, info)))
        .collect();

    if json_output {
        let list: Vec<_> = entries
            .iter()
            .map(|(name, info)| {
                json!({
                    "name": name,
                    "model": info.name,
                    "category": info.category.to_string(),
                    "description": info.description,
                    "repository": info.repository,
                    "loaded": info.loaded,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    println!();
    println!("{}", format!("Registered Models ({})", entries.len()).bold().cyan());
    println!();

    if entries.is_empty() {
        println!("  {}", "No models available.".yellow());
        println!();
        return Ok(());
    }

    for (name, info) in &entries {
        let status = if info.loaded { "Loaded".green() } else { "Not Loaded".yellow() };
        println!("  {} {}", "•".cyan(), name.bold());
        println!("    {} {}", "Model:".dimmed(), info.name);
        println!("    {} {}", "Repository:".dimmed(), info.repository);
        println!("    {} {}", "Description:".dimmed(), info.description);
        println!("    {} {}", "Status:".dimmed(), status);
        println!();
    }

    Ok(())
}
