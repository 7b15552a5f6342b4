//! Phase transition commands
//!
//! Handles `dltforge advance` and `dltforge enter`.

use anyhow::Result;

use dltforge_config::Config;
use dltforge_engine::{WorkflowStage, WorkflowState, state_store};

use super::common::{api_name_arg, phase_arg};

fn print_stage(state: &WorkflowState) {
    match state.stage() {
        WorkflowStage::Complete => println!("✓ Workflow for '{}' is complete", state.api_name()),
        WorkflowStage::Phase(phase) => {
            println!("✓ '{}' is now in {phase}", state.api_name());
            if phase.is_appendix() {
                println!(
                    "  Merge the appendix with: dltforge appendix {} {}",
                    state.api_name(),
                    phase.slug().trim_start_matches("appendix_")
                );
            }
        }
    }
}

/// Execute the advance command
pub fn execute_advance_command(api_name: &str, config: &Config) -> Result<()> {
    let api_name = api_name_arg(api_name)?;
    let root = &config.project_root;

    let mut state = state_store::load_existing(root, &api_name)?;
    state.advance()?;
    state_store::save_state(root, &state)?;

    print_stage(&state);
    Ok(())
}

/// Execute the enter command
pub fn execute_enter_command(api_name: &str, phase: &str, config: &Config) -> Result<()> {
    let api_name = api_name_arg(api_name)?;
    let phase = phase_arg(phase)?;
    let root = &config.project_root;

    let mut state = state_store::load_existing(root, &api_name)?;
    state.enter(phase)?;
    state_store::save_state(root, &state)?;

    print_stage(&state);
    Ok(())
}
