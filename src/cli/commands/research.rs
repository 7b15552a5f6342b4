//! Research command implementation
//!
//! Handles `dltforge research`: writes the research document and records it
//! as the RESEARCH artifact.

use anyhow::Result;
use camino::Utf8PathBuf;

use dltforge_config::Config;
use dltforge_engine::output::research_path;
use dltforge_engine::{generate_document, state_store};
use dltforge_templates::RESEARCH_TEMPLATE;
use dltforge_utils::error::WorkflowError;
use dltforge_utils::types::WorkflowPhase;

use super::common::{
    api_name_arg, build_bindings, load_store, recorded_path, report_needed_inputs,
};
use crate::cli::args::BindingArgs;

/// Execute the research command
pub fn execute_research_command(
    api_name: &str,
    output: Option<Utf8PathBuf>,
    binding_args: &BindingArgs,
    config: &Config,
) -> Result<()> {
    let api_name = api_name_arg(api_name)?;
    let root = &config.project_root;

    let mut state = state_store::load_or_new(root, &api_name)?;
    if state.current_phase() != Some(WorkflowPhase::Research) {
        return Err(WorkflowError::NotInPhase {
            expected: WorkflowPhase::Research,
            actual: state.stage().to_string(),
        }
        .into());
    }

    let store = load_store(config)?;
    let bindings = build_bindings(config, &api_name, config.destination(), binding_args)?;
    report_needed_inputs(&store, RESEARCH_TEMPLATE, &bindings);

    let path = match output {
        Some(path) => config.cli_path(&path),
        None => config.output_dir().join(research_path(&bindings)?),
    };
    let written = generate_document(&store, RESEARCH_TEMPLATE, &bindings, &path)?;

    state.record_artifact(
        WorkflowPhase::Research,
        recorded_path(config, &written.path),
        written.blake3.clone(),
    )?;
    state_store::save_state(root, &state)?;

    println!("✓ Research document written: {}", written.path);
    println!();
    println!("Next steps:");
    println!("  1. Fill in the research document");
    println!("  2. Write the main spec:");
    println!("     dltforge spec {api_name} --set base_url=<url>");

    Ok(())
}
