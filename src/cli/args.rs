//! CLI argument definitions and parsing structures
//!
//! This module defines the command-line interface structure using clap,
//! including the main `Cli` struct and all subcommand enums.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// dltforge - templated document pipeline for dlt REST API pipelines
#[derive(Parser, Debug)]
#[command(name = "dltforge")]
#[command(about = "Scaffold research and dlt REST client specs from templates")]
#[command(long_about = r#"
dltforge resolves placeholder templates into research and spec documents,
merges complexity appendices into the main spec, and tracks the workflow
from research to tested pipeline.

EXAMPLES:
  # Research an API
  dltforge research github

  # Write the main spec, scheduling the pagination appendix
  dltforge spec github --set base_url=https://api.github.com --mixed-pagination

  # Merge the scheduled appendix
  dltforge appendix github pagination

  # Track the implementation checklist
  dltforge task add github implement "write github_pipeline.py"
  dltforge task done github implement 1

  # Move on and inspect progress
  dltforge advance github
  dltforge status github --json

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > config file > defaults
  Config file is discovered by searching upward from CWD for .dltforge/config.toml
  Use --config to specify an explicit config file path

PHASES:
  RESEARCH → PLAN → [APPENDIX_AUTH → APPENDIX_PAGINATION → APPENDIX_INCREMENTAL → APPENDIX_RETRY] → IMPLEMENT → TEST
  Appendix phases run only when the matching complexity flag is set on `spec`
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Directory of templates overriding or extending the built-ins
    #[arg(long, global = true)]
    pub template_dir: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Bindings shared by document-producing commands
#[derive(Args, Debug, Clone, Default)]
pub struct BindingArgs {
    /// Date bound to {date} (YYYY-MM-DD, default: today in UTC)
    #[arg(long)]
    pub date: Option<String>,

    /// Bind a placeholder (repeatable): --set key=value
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,
}

/// Complexity flags selecting the appendices to merge
///
/// Without any of these the previously scheduled appendices are kept.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct FlagArgs {
    /// The API uses an authentication scheme dlt does not ship
    #[arg(long)]
    pub custom_auth: bool,

    /// Resources paginate differently from one another
    #[arg(long)]
    pub mixed_pagination: bool,

    /// Incremental loading needs a cursor built from several fields
    #[arg(long)]
    pub compound_cursor: bool,

    /// Rate limits or errors need retry handling beyond the defaults
    #[arg(long)]
    pub custom_retry: bool,

    /// Schedule no appendices, clearing earlier flags
    #[arg(
        long,
        conflicts_with_all = ["custom_auth", "mixed_pagination", "compound_cursor", "custom_retry"]
    )]
    pub no_appendices: bool,
}

impl FlagArgs {
    /// Whether any flag was given on the command line.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !(self.custom_auth
            || self.mixed_pagination
            || self.compound_cursor
            || self.custom_retry
            || self.no_appendices)
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the research document and record it for the RESEARCH phase
    ///
    /// EXAMPLES:
    ///   dltforge research github
    ///   dltforge research stripe --set docs_url=https://docs.stripe.com/api
    Research {
        /// API name (sanitized to [a-z0-9_])
        api_name: String,

        /// Output path (default: <output_dir>/research/<date>_001_research_<api>.md)
        #[arg(long)]
        output: Option<Utf8PathBuf>,

        #[command(flatten)]
        bindings: BindingArgs,
    },

    /// Write the main spec and schedule appendices for the PLAN phase
    ///
    /// EXAMPLES:
    ///   dltforge spec github --set base_url=https://api.github.com
    ///   dltforge spec hubspot --destination bigquery --custom-auth --compound-cursor
    Spec {
        /// API name (sanitized to [a-z0-9_])
        api_name: String,

        /// Output path (default: <output_dir>/specs/<date>_011_spec_dlt_rest_client_<api>.md)
        #[arg(long)]
        output: Option<Utf8PathBuf>,

        /// dlt destination bound to {destination} (default: duckdb)
        #[arg(long)]
        destination: Option<String>,

        #[command(flatten)]
        bindings: BindingArgs,

        #[command(flatten)]
        flags: FlagArgs,
    },

    /// Merge an appendix into the main spec
    ///
    /// The workflow must be in the matching appendix phase.
    ///
    /// EXAMPLES:
    ///   dltforge appendix github pagination
    Appendix {
        /// API name (sanitized to [a-z0-9_])
        api_name: String,

        /// Appendix to merge
        #[arg(value_parser = ["auth", "pagination", "incremental", "retry"])]
        appendix: String,

        #[command(flatten)]
        bindings: BindingArgs,
    },

    /// Move to the next scheduled phase
    Advance {
        /// API name (sanitized to [a-z0-9_])
        api_name: String,
    },

    /// Move forward to the next phase, or return to a visited phase
    ///
    /// Returning reopens the phase and every phase after it.
    ///
    /// EXAMPLES:
    ///   dltforge enter github plan
    Enter {
        /// API name (sanitized to [a-z0-9_])
        api_name: String,

        /// Phase to enter (e.g. plan, pagination, implement)
        phase: String,
    },

    /// Manage phase checklists
    #[command(subcommand)]
    Task(TaskCommands),

    /// Show workflow status
    Status {
        /// API name (sanitized to [a-z0-9_])
        api_name: String,

        /// Output status as JSON (JCS canonical form)
        #[arg(long)]
        json: bool,
    },

    /// Inspect the template store
    #[command(subcommand)]
    Template(TemplateCommands),

    /// Show effective configuration with the source of each value
    Config,
}

/// Checklist subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Add a checklist item to a phase
    Add {
        api_name: String,
        /// Phase the item belongs to
        phase: String,
        /// What has to be done
        description: String,
    },

    /// Mark a checklist item as done
    Done {
        api_name: String,
        phase: String,
        /// 1-based item number as shown by `task list`
        index: usize,
    },

    /// List checklist items of every phase
    List { api_name: String },
}

/// Template subcommands
#[derive(Subcommand, Debug)]
pub enum TemplateCommands {
    /// List registered templates
    List {
        /// Output as JSON (JCS canonical form)
        #[arg(long)]
        json: bool,
    },

    /// Show a template's placeholders and source
    Show {
        /// Template id
        id: String,
    },
}
