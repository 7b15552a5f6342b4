//! Spec command implementation
//!
//! Handles `dltforge spec`: moves the workflow into PLAN, fixes the
//! complexity flags, writes the main spec and records it.
//!
//! Without flag arguments a rerun keeps the appendices already scheduled.

use anyhow::Result;
use camino::Utf8PathBuf;

use dltforge_config::Config;
use dltforge_engine::output::spec_path;
use dltforge_engine::{ComplexityFlags, WorkflowState, generate_document, state_store};
use dltforge_templates::SPEC_MAIN_TEMPLATE;
use dltforge_utils::error::WorkflowError;
use dltforge_utils::types::WorkflowPhase;

use super::common::{
    api_name_arg, build_bindings, load_store, recorded_path, report_needed_inputs,
};
use crate::cli::args::{BindingArgs, FlagArgs};

impl From<FlagArgs> for ComplexityFlags {
    fn from(args: FlagArgs) -> Self {
        Self {
            has_custom_auth: args.custom_auth,
            has_mixed_pagination: args.mixed_pagination,
            has_compound_cursor: args.compound_cursor,
            has_custom_retry_logic: args.custom_retry,
        }
    }
}

/// Flags for this run: the ones given, or the current ones if none were.
fn choose_flags(current: ComplexityFlags, args: FlagArgs) -> ComplexityFlags {
    if args.is_empty() {
        current
    } else {
        args.into()
    }
}

/// Appendix phases scheduled by `before` that `after` drops.
fn unscheduled(before: ComplexityFlags, after: ComplexityFlags) -> Vec<WorkflowPhase> {
    before
        .scheduled_appendices()
        .into_iter()
        .filter(|phase| !after.schedules(*phase))
        .collect()
}

/// Move a workflow that just finished research into PLAN.
fn enter_plan(state: &mut WorkflowState) -> Result<(), WorkflowError> {
    match state.current_phase() {
        Some(WorkflowPhase::Plan) => Ok(()),
        Some(WorkflowPhase::Research) => state.advance().map(|_| ()),
        _ => Err(WorkflowError::NotInPhase {
            expected: WorkflowPhase::Plan,
            actual: state.stage().to_string(),
        }),
    }
}

/// Execute the spec command
pub fn execute_spec_command(
    api_name: &str,
    output: Option<Utf8PathBuf>,
    binding_args: &BindingArgs,
    flags: FlagArgs,
    config: &Config,
) -> Result<()> {
    let api_name = api_name_arg(api_name)?;
    let root = &config.project_root;

    let mut state = state_store::load_existing(root, &api_name)?;
    enter_plan(&mut state)?;
    let before = state.flags();
    let flags = choose_flags(before, flags);
    state.set_flags(flags)?;
    let dropped = unscheduled(before, flags);

    let store = load_store(config)?;
    let bindings = build_bindings(config, &api_name, config.destination(), binding_args)?;
    report_needed_inputs(&store, SPEC_MAIN_TEMPLATE, &bindings);

    let path = match output {
        Some(path) => config.cli_path(&path),
        None => config.output_dir().join(spec_path(&bindings)?),
    };
    let written = generate_document(&store, SPEC_MAIN_TEMPLATE, &bindings, &path)?;

    state.record_artifact(
        WorkflowPhase::Plan,
        recorded_path(config, &written.path),
        written.blake3.clone(),
    )?;
    state_store::save_state(root, &state)?;

    println!("✓ Main spec written: {}", written.path);
    if !dropped.is_empty() {
        let names: Vec<&str> = dropped.iter().map(WorkflowPhase::as_str).collect();
        eprintln!("⚠ No longer scheduled: {}", names.join(", "));
    }

    let appendices = state.flags().scheduled_appendices();
    if appendices.is_empty() {
        println!("  No appendices scheduled");
    } else {
        println!("  Scheduled appendices:");
        for phase in &appendices {
            println!("    - {phase}");
        }
    }

    println!();
    println!("Next steps:");
    println!("  1. Add the implementation checklist:");
    println!("     dltforge task add {api_name} implement \"<task>\"");
    println!("  2. Move on:");
    println!("     dltforge advance {api_name}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_args_map_to_complexity_flags() {
        let flags: ComplexityFlags = FlagArgs {
            custom_auth: true,
            compound_cursor: true,
            ..FlagArgs::default()
        }
        .into();
        assert_eq!(
            flags.scheduled_appendices(),
            vec![WorkflowPhase::AppendixAuth, WorkflowPhase::AppendixIncremental]
        );
    }

    #[test]
    fn test_rerun_without_flags_keeps_schedule() {
        let current = ComplexityFlags {
            has_mixed_pagination: true,
            ..ComplexityFlags::default()
        };
        assert_eq!(choose_flags(current, FlagArgs::default()), current);

        let cleared = choose_flags(
            current,
            FlagArgs {
                no_appendices: true,
                ..FlagArgs::default()
            },
        );
        assert_eq!(cleared, ComplexityFlags::default());
        assert_eq!(
            unscheduled(current, cleared),
            vec![WorkflowPhase::AppendixPagination]
        );

        let switched = choose_flags(
            current,
            FlagArgs {
                custom_retry: true,
                ..FlagArgs::default()
            },
        );
        assert!(switched.has_custom_retry_logic);
        assert!(!switched.has_mixed_pagination);
    }

    #[test]
    fn test_enter_plan_requires_research_artifact() {
        let mut state = WorkflowState::new("github");
        assert_eq!(
            enter_plan(&mut state),
            Err(WorkflowError::MissingArtifact {
                phase: WorkflowPhase::Research
            })
        );

        state
            .record_artifact(WorkflowPhase::Research, "research/r.md", "h")
            .unwrap();
        enter_plan(&mut state).unwrap();
        assert_eq!(state.current_phase(), Some(WorkflowPhase::Plan));
        enter_plan(&mut state).unwrap();
        assert_eq!(state.current_phase(), Some(WorkflowPhase::Plan));
    }
}
