//! Workflow state persistence
//!
//! One JSON file per API under `.dltforge/state/`. Writes replace the whole
//! file atomically.

use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};

use dltforge_utils::atomic_write::write_file_atomic;
use dltforge_utils::error::WorkflowError;
use dltforge_utils::paths;

use crate::workflow::{STATE_SCHEMA_VERSION, WorkflowState};

/// Load the state for `api_name`, or `None` if no workflow was started.
pub fn load_state(root: &Utf8Path, api_name: &str) -> Result<Option<WorkflowState>> {
    let path = paths::state_path(root, api_name);
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path.as_std_path())
        .with_context(|| format!("Failed to read workflow state: {path}"))?;
    let state: WorkflowState = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse workflow state: {path}"))?;

    if state.schema_version() != STATE_SCHEMA_VERSION {
        bail!(
            "Workflow state {path} has schema version {}, expected {STATE_SCHEMA_VERSION}",
            state.schema_version()
        );
    }
    if state.api_name() != api_name {
        bail!(
            "Workflow state {path} belongs to '{}', not '{api_name}'",
            state.api_name()
        );
    }

    tracing::debug!(api_name = %api_name, stage = %state.stage(), "Loaded workflow state");
    Ok(Some(state))
}

/// Load the state for `api_name`, starting a new workflow if none exists.
pub fn load_or_new(root: &Utf8Path, api_name: &str) -> Result<WorkflowState> {
    Ok(load_state(root, api_name)?.unwrap_or_else(|| {
        tracing::info!(api_name = %api_name, "Starting new workflow");
        WorkflowState::new(api_name)
    }))
}

/// Load the state for `api_name`, failing if no workflow was started.
pub fn load_existing(root: &Utf8Path, api_name: &str) -> Result<WorkflowState> {
    let state = load_state(root, api_name)?.ok_or_else(|| WorkflowError::NotStarted {
        api_name: api_name.to_string(),
    })?;
    Ok(state)
}

/// Persist `state`, returning the path written.
pub fn save_state(root: &Utf8Path, state: &WorkflowState) -> Result<Utf8PathBuf> {
    let path = paths::state_path(root, state.api_name());
    let mut json = serde_json::to_string_pretty(state)
        .with_context(|| "Failed to serialize workflow state")?;
    json.push('\n');
    write_file_atomic(&path, &json)?;
    tracing::debug!(api_name = %state.api_name(), path = %path, "Saved workflow state");
    Ok(path)
}
