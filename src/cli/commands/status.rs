//! Status command implementation
//!
//! Handles `dltforge status`: human-readable or JCS JSON output.

use anyhow::{Context, Result};

use dltforge_config::Config;
use dltforge_engine::{WorkflowStatus, state_store};
use dltforge_utils::canonicalization::emit_jcs;

use super::common::api_name_arg;

/// Emit status output as canonical JSON using JCS (RFC 8785)
pub fn emit_status_json(status: &WorkflowStatus) -> Result<String> {
    emit_jcs(status).context("Failed to emit status JSON")
}

/// Execute the status command
pub fn execute_status_command(api_name: &str, json: bool, config: &Config) -> Result<()> {
    let api_name = api_name_arg(api_name)?;
    let state = state_store::load_existing(&config.project_root, &api_name)?;
    let status = state.status();

    if json {
        println!("{}", emit_status_json(&status)?);
        return Ok(());
    }

    println!("Workflow: {}", status.api_name);
    println!("Stage: {}", status.stage);
    println!();
    println!("Phases:");
    for phase in &status.scheduled {
        let mark = if status.completed.contains(phase) {
            "✓"
        } else if status.stage.phase() == Some(*phase) {
            "→"
        } else {
            " "
        };
        let detail = status
            .artifacts
            .get(phase)
            .map(|record| format!("  ({})", record.path))
            .unwrap_or_default();
        println!("  {mark} {phase}{detail}");
    }

    if !status.merged_appendices.is_empty() {
        println!();
        println!("Merged appendices: {}", status.merged_appendices.join(", "));
    }

    if !status.pending_tasks.is_empty() {
        println!();
        println!("Open tasks:");
        for (phase, tasks) in &status.pending_tasks {
            for task in tasks {
                println!("  {phase}: {task}");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dltforge_engine::WorkflowState;
    use dltforge_utils::types::WorkflowPhase;

    #[test]
    fn test_status_json_is_canonical() {
        let mut state = WorkflowState::new("github");
        state.add_task(WorkflowPhase::Plan, "confirm endpoints").unwrap();
        let json = emit_status_json(&state.status()).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["api_name"], "github");
        assert_eq!(value["stage"], "RESEARCH");
        assert_eq!(value["pending_tasks"]["PLAN"][0], "confirm endpoints");
        assert!(!json.contains('\n'));
        assert!(json.starts_with("{\"api_name\""));
    }
}
