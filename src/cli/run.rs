//! CLI entry point and dispatch logic
//!
//! This module owns the `run()` function which:
//! - Parses CLI arguments
//! - Builds CliArgs and discovers Config
//! - Initializes tracing
//! - Dispatches to command handlers
//! - Handles all error output

use clap::Parser;

use super::args::{Cli, Commands};
use super::commands;

use crate::{CliArgs, Config, ExitCode, ForgeError};
use dltforge_utils::logging::{command_span, init_tracing};

/// Main CLI execution function.
///
/// This function handles ALL output including errors. On error it prints a
/// report and returns the exit code; main.rs only calls
/// `std::process::exit(code.as_i32())`.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    let destination = match &cli.command {
        Commands::Spec { destination, .. } => destination.clone(),
        _ => None,
    };
    let cli_args = CliArgs {
        config_path: cli.config.clone(),
        destination,
        output_dir: None,
        template_dir: cli.template_dir.clone(),
        verbose: cli.verbose.then_some(true),
    };

    let config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(err) => return Err(report_error(&err)),
    };

    if let Err(e) = init_tracing(config.verbose()) {
        eprintln!("Warning: failed to initialize logging: {e}");
    }

    let (operation, api_name) = describe(&cli.command);
    let span = command_span(operation, api_name);
    let _guard = span.enter();

    let result = match cli.command {
        Commands::Research {
            api_name,
            output,
            bindings,
        } => commands::execute_research_command(&api_name, output, &bindings, &config),
        Commands::Spec {
            api_name,
            output,
            bindings,
            flags,
            ..
        } => commands::execute_spec_command(&api_name, output, &bindings, flags, &config),
        Commands::Appendix {
            api_name,
            appendix,
            bindings,
        } => commands::execute_appendix_command(&api_name, &appendix, &bindings, &config),
        Commands::Advance { api_name } => commands::execute_advance_command(&api_name, &config),
        Commands::Enter { api_name, phase } => {
            commands::execute_enter_command(&api_name, &phase, &config)
        }
        Commands::Task(task_cmd) => commands::execute_task_command(task_cmd, &config),
        Commands::Status { api_name, json } => {
            commands::execute_status_command(&api_name, json, &config)
        }
        Commands::Template(template_cmd) => {
            commands::execute_template_command(template_cmd, &config)
        }
        Commands::Config => commands::execute_config_command(&config),
    };

    result.map_err(|error| report_error(&error))
}

/// Command name and API name for the command span.
fn describe(command: &Commands) -> (&'static str, Option<&str>) {
    use super::args::TaskCommands;

    match command {
        Commands::Research { api_name, .. } => ("research", Some(api_name)),
        Commands::Spec { api_name, .. } => ("spec", Some(api_name)),
        Commands::Appendix { api_name, .. } => ("appendix", Some(api_name)),
        Commands::Advance { api_name } => ("advance", Some(api_name)),
        Commands::Enter { api_name, .. } => ("enter", Some(api_name)),
        Commands::Task(
            TaskCommands::Add { api_name, .. }
            | TaskCommands::Done { api_name, .. }
            | TaskCommands::List { api_name },
        ) => ("task", Some(api_name)),
        Commands::Status { api_name, .. } => ("status", Some(api_name)),
        Commands::Template(_) => ("template", None),
        Commands::Config => ("config", None),
    }
}

/// Print an error report to stderr and pick the exit code.
fn report_error(error: &anyhow::Error) -> ExitCode {
    match ForgeError::from_chain(error) {
        Some(forge_error) => {
            eprint!("{}", forge_error.display_for_user());
            forge_error.to_exit_code()
        }
        None => {
            eprintln!("✗ Unexpected error: {error:#}");
            eprintln!("\n  General troubleshooting:");
            eprintln!("    - Run with --verbose for more detailed output");
            eprintln!("    - Check that the current directory is writable");
            ExitCode::INTERNAL
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dltforge_utils::error::{AppendError, ResolveError};

    #[test]
    fn test_report_error_maps_exit_codes() {
        let missing = anyhow::Error::from(ResolveError::MissingBindings {
            template: "spec_main".to_string(),
            keys: vec!["base_url".to_string()],
        });
        assert_eq!(report_error(&missing), ExitCode::MISSING_BINDING);

        let anchor = anyhow::Error::from(AppendError::AnchorNotFound {
            anchor: "pagination".to_string(),
            available: vec![],
        });
        assert_eq!(report_error(&anchor), ExitCode::ANCHOR_NOT_FOUND);

        assert_eq!(report_error(&anyhow::anyhow!("disk full")), ExitCode::INTERNAL);
    }
}
