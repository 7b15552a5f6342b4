//! Helpers shared by the command implementations.

use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};

use dltforge_config::Config;
use dltforge_engine::{Bindings, needs_input};
use dltforge_templates::TemplateStore;
use dltforge_utils::api_name::sanitize_api_name;
use dltforge_utils::error::{ConfigError, ForgeError};
use dltforge_utils::paths::resolve_against;
use dltforge_utils::types::WorkflowPhase;

use crate::cli::args::BindingArgs;

/// Sanitize an API name given on the command line.
pub fn api_name_arg(raw: &str) -> Result<String, ForgeError> {
    sanitize_api_name(raw).map_err(|e| {
        ForgeError::Config(ConfigError::InvalidValue {
            key: "api_name".to_string(),
            value: format!("'{raw}': {e}"),
        })
    })
}

/// Parse a phase name given on the command line.
pub fn phase_arg(raw: &str) -> Result<WorkflowPhase, ForgeError> {
    raw.parse::<WorkflowPhase>().map_err(|_| {
        ForgeError::Config(ConfigError::InvalidValue {
            key: "phase".to_string(),
            value: format!(
                "unknown phase '{raw}' (expected research, plan, auth, pagination, incremental, retry, implement or test)"
            ),
        })
    })
}

/// Template store with the configured template directory overlaid.
pub fn load_store(config: &Config) -> Result<TemplateStore> {
    let store = match config.template_dir() {
        Some(dir) => TemplateStore::with_dir(&dir)?,
        None => TemplateStore::builtin().map_err(ForgeError::from)?,
    };
    tracing::debug!(templates = store.len(), "Template store loaded");
    Ok(store)
}

/// Today's date in UTC as `YYYY-MM-DD`.
#[must_use]
pub fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

/// Build the bindings for a command.
///
/// Later layers win: `api_name`, `date`, `destination`, then the
/// `[bindings]` config section, then `--set` assignments.
pub fn build_bindings(
    config: &Config,
    api_name: &str,
    destination: &str,
    args: &BindingArgs,
) -> Result<Bindings, ForgeError> {
    let date = args.date.clone().unwrap_or_else(today);
    let mut bindings = Bindings::new()
        .with("api_name", api_name)
        .with("date", date)
        .with("destination", destination);

    for (key, value) in &config.bindings {
        bindings.set(key.clone(), value.clone());
    }
    for raw in &args.set {
        let (key, value) = Bindings::parse_assignment(raw)?;
        bindings.set(key, value);
    }

    Ok(bindings)
}

/// Print the prompt of every required key the template still needs.
///
/// Resolution fails on the same keys right after; this only adds the
/// prompts from the template's front matter.
pub fn report_needed_inputs(store: &TemplateStore, template_id: &str, bindings: &Bindings) {
    let Ok(template) = store.load(template_id) else {
        return;
    };
    let needed = needs_input(template, bindings);
    if needed.is_empty() {
        return;
    }

    eprintln!("Template '{template_id}' needs more input:");
    for input in &needed {
        eprintln!("  {}: {}", input.key, input.prompt);
        eprintln!("    --set {}=<value>", input.key);
    }
    eprintln!();
}

/// Path as recorded in workflow state: relative to the project root when
/// it lies inside it.
#[must_use]
pub fn recorded_path(config: &Config, path: &Utf8Path) -> String {
    path.strip_prefix(&config.project_root)
        .map(Utf8Path::as_str)
        .unwrap_or_else(|_| path.as_str())
        .to_string()
}

/// Resolve a path recorded in workflow state back to a filesystem path.
#[must_use]
pub fn recorded_to_path(config: &Config, recorded: &str) -> Utf8PathBuf {
    resolve_against(&config.project_root, Utf8Path::new(recorded))
}
