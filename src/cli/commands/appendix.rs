//! Appendix command implementation
//!
//! Handles `dltforge appendix`: merges the appendix of the current
//! appendix phase into the main spec recorded for PLAN.

use anyhow::Result;

use dltforge_config::Config;
use dltforge_engine::{merge_appendix, state_store};
use dltforge_utils::error::{ConfigError, ForgeError, WorkflowError};
use dltforge_utils::types::WorkflowPhase;

use super::common::{
    api_name_arg, build_bindings, load_store, phase_arg, recorded_to_path, report_needed_inputs,
};
use crate::cli::args::BindingArgs;

/// Execute the appendix command
pub fn execute_appendix_command(
    api_name: &str,
    appendix: &str,
    binding_args: &BindingArgs,
    config: &Config,
) -> Result<()> {
    let api_name = api_name_arg(api_name)?;
    let root = &config.project_root;

    let phase = phase_arg(appendix)?;
    let Some(appendix_id) = phase.appendix_template_id() else {
        return Err(ForgeError::Config(ConfigError::InvalidValue {
            key: "appendix".to_string(),
            value: format!("'{appendix}' is not an appendix"),
        })
        .into());
    };

    let mut state = state_store::load_existing(root, &api_name)?;
    state.check_merge(phase, appendix_id)?;

    let Some(plan) = state.artifact(WorkflowPhase::Plan) else {
        return Err(WorkflowError::MissingArtifact {
            phase: WorkflowPhase::Plan,
        }
        .into());
    };
    let recorded = plan.path.clone();
    let path = recorded_to_path(config, &recorded);

    let store = load_store(config)?;
    let bindings = build_bindings(config, &api_name, config.destination(), binding_args)?;
    report_needed_inputs(&store, appendix_id, &bindings);

    let written = merge_appendix(&store, appendix_id, &bindings, &path)?;
    state.record_merge(phase, appendix_id, recorded, written.blake3.clone())?;
    state_store::save_state(root, &state)?;

    println!("✓ Merged {appendix_id} into {}", written.path);
    println!();
    println!("Next steps:");
    println!("  dltforge advance {api_name}");

    Ok(())
}
