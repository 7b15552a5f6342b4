//! Template command implementation
//!
//! Handles `dltforge template` subcommands.

use anyhow::{Context, Result};

use dltforge_config::Config;
use dltforge_templates::{TemplateKind, TemplateOrigin, builtin_source};
use dltforge_utils::canonicalization::emit_jcs;
use dltforge_utils::error::ForgeError;

use super::common::load_store;
use crate::cli::args::TemplateCommands;

/// Execute template inspection commands
pub fn execute_template_command(cmd: TemplateCommands, config: &Config) -> Result<()> {
    let store = load_store(config)?;

    match cmd {
        TemplateCommands::List { json } => {
            let summaries = store.list();
            if json {
                println!(
                    "{}",
                    emit_jcs(&summaries).context("Failed to emit template list JSON")?
                );
                return Ok(());
            }

            println!("Available templates:\n");
            for summary in &summaries {
                println!("  {} ({})", summary.id, summary.kind.as_str());
                if let Some(description) = &summary.description {
                    println!("    Description: {description}");
                }
                if let Some(anchor) = &summary.target_anchor {
                    println!("    Target anchor: {anchor}");
                }
                if !summary.placeholders.is_empty() {
                    println!("    Placeholders: {}", summary.placeholders.join(", "));
                }
                if let Some(origin) = store.origin(&summary.id) {
                    println!("    Source: {origin}");
                }
                println!();
            }
            Ok(())
        }
        TemplateCommands::Show { id } => {
            let template = store.load(&id).map_err(ForgeError::from)?;
            let required = template.required_placeholders();

            println!("Template: {}", template.id());
            println!("Kind: {}", template.kind().as_str());
            if let Some(description) = template.description() {
                println!("Description: {description}");
            }
            if template.kind() == TemplateKind::Appendix
                && let Some(anchor) = template.target_anchor()
            {
                println!("Target anchor: {anchor}");
            }
            let anchors = template.anchors();
            if !anchors.is_empty() {
                println!("Anchors: {}", anchors.join(", "));
            }

            println!("Placeholders:");
            for key in template.placeholders() {
                let need = if required.contains(&key) {
                    "required"
                } else {
                    "optional"
                };
                match template.prompt_for(&key) {
                    Some(prompt) => println!("  {key} ({need}): {prompt}"),
                    None => println!("  {key} ({need})"),
                }
            }

            let source = match store.origin(&id) {
                Some(TemplateOrigin::Builtin) => builtin_source(&id).map(str::to_string),
                Some(TemplateOrigin::File(path)) => Some(
                    std::fs::read_to_string(path.as_std_path())
                        .with_context(|| format!("Failed to read template: {path}"))?,
                ),
                _ => None,
            };
            if let Some(source) = source {
                println!();
                println!("{}", source.trim_end());
            }
            Ok(())
        }
    }
}
