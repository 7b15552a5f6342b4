//! Checklist command implementation
//!
//! Handles `dltforge task` subcommands.

use anyhow::Result;

use dltforge_config::Config;
use dltforge_engine::state_store;

use super::common::{api_name_arg, phase_arg};
use crate::cli::args::TaskCommands;

/// Execute checklist management commands
pub fn execute_task_command(cmd: TaskCommands, config: &Config) -> Result<()> {
    let root = &config.project_root;

    match cmd {
        TaskCommands::Add {
            api_name,
            phase,
            description,
        } => {
            let api_name = api_name_arg(&api_name)?;
            let phase = phase_arg(&phase)?;
            let mut state = state_store::load_existing(root, &api_name)?;
            let number = state.add_task(phase, &description)?;
            state_store::save_state(root, &state)?;
            println!("✓ Added {phase} task #{number}: {}", description.trim());
        }
        TaskCommands::Done {
            api_name,
            phase,
            index,
        } => {
            let api_name = api_name_arg(&api_name)?;
            let phase = phase_arg(&phase)?;
            let mut state = state_store::load_existing(root, &api_name)?;
            state.complete_task(phase, index)?;
            state_store::save_state(root, &state)?;
            println!("✓ Completed {phase} task #{index}");
        }
        TaskCommands::List { api_name } => {
            let api_name = api_name_arg(&api_name)?;
            let state = state_store::load_existing(root, &api_name)?;

            let mut any = false;
            for phase in state.scheduled_phases() {
                let tasks = state.tasks(phase);
                if tasks.is_empty() {
                    continue;
                }
                any = true;
                println!("{phase}:");
                for (i, task) in tasks.iter().enumerate() {
                    let mark = if task.done { "x" } else { " " };
                    println!("  [{mark}] {}. {}", i + 1, task.description);
                }
            }
            if !any {
                println!("No tasks for '{api_name}'");
            }
        }
    }

    Ok(())
}
