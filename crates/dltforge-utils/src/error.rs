use std::fmt;
use thiserror::Error;

use crate::types::WorkflowPhase;

/// Library-level error type for dltforge.
///
/// Each variant wraps a domain error from one component of the pipeline:
///
/// | Category | Description |
/// |----------|-------------|
/// | `Config` | Configuration file or CLI argument errors |
/// | `Template` | Unknown or malformed templates |
/// | `Resolve` | Unbound placeholders |
/// | `Append` | Appendix anchor missing from the host document |
/// | `Workflow` | Phase sequencing and checklist violations |
/// | `Io` | Reading templates, writing documents or state |
///
/// # Exit Code Mapping
///
/// Use [`to_exit_code()`](Self::to_exit_code) to map errors to CLI exit codes:
///
/// | Exit Code | Error Type |
/// |-----------|------------|
/// | 2 | Configuration/CLI argument errors |
/// | 3 | Template not found |
/// | 4 | Missing bindings |
/// | 5 | Anchor not found |
/// | 6 | Incomplete checklist tasks |
/// | 7 | Other workflow violations |
/// | 8 | Invalid template |
/// | 1 | Other errors |
///
/// Library code returns `ForgeError` and never calls `std::process::exit()`.
#[derive(Error, Debug)]
pub enum ForgeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Resolution error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Append error: {0}")]
    Append(#[from] AppendError),

    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Template,
    UserInput,
    Workflow,
    FileSystem,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::Template => write!(f, "Template"),
            Self::UserInput => write!(f, "User Input"),
            Self::Workflow => write!(f, "Workflow"),
            Self::FileSystem => write!(f, "File System"),
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found at {path}")]
    NotFound { path: String },

    #[error("Configuration discovery failed: {reason}")]
    DiscoveryFailed { reason: String },
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile(reason) => {
                format!("Configuration file has invalid format: {reason}")
            }
            Self::InvalidValue { key, value } => {
                format!("Configuration '{key}' has invalid value: {value}")
            }
            Self::NotFound { path } => format!("Configuration file not found: {path}"),
            Self::DiscoveryFailed { reason } => {
                format!("Failed to discover configuration: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidFile(_) => Some(
                "Configuration files must be valid TOML with [defaults], [templates] and [bindings] sections."
                    .to_string(),
            ),
            Self::InvalidValue { key, .. } => Some(format!(
                "The '{key}' option has specific format requirements."
            )),
            Self::NotFound { .. } | Self::DiscoveryFailed { .. } => Some(
                "dltforge searches for .dltforge/config.toml from the current directory upward."
                    .to_string(),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile(_) => vec![
                "Check the TOML syntax of .dltforge/config.toml".to_string(),
                "Remove unknown sections or keys".to_string(),
            ],
            Self::InvalidValue { key, .. } => match key.as_str() {
                "destination" => vec![
                    "Use a dlt destination name such as 'duckdb', 'bigquery' or 'postgres'"
                        .to_string(),
                ],
                "api_name" => vec![
                    "Use letters, digits and underscores (e.g. 'github' or 'stripe_v2')"
                        .to_string(),
                ],
                "set" => vec!["Pass bindings as --set key=value".to_string()],
                _ => vec![
                    "Check the documentation for valid values for this option".to_string(),
                    "Remove the option to use the default value".to_string(),
                ],
            },
            Self::NotFound { .. } => vec![
                "Check the path passed to --config".to_string(),
                "Omit --config to use discovery".to_string(),
            ],
            Self::DiscoveryFailed { .. } => vec![
                "Check read permissions on the directory tree".to_string(),
                "Use --config <path> to specify the configuration file explicitly".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

/// Template store errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Template '{id}' not found")]
    NotFound { id: String, available: Vec<String> },

    #[error("Template '{id}' is invalid: {reason}")]
    Invalid { id: String, reason: String },
}

impl UserFriendlyError for TemplateError {
    fn user_message(&self) -> String {
        match self {
            Self::NotFound { id, .. } => format!("No template is registered with id '{id}'"),
            Self::Invalid { id, reason } => format!("Template '{id}' could not be parsed: {reason}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::NotFound { available, .. } if !available.is_empty() => {
                Some(format!("Registered templates: {}", available.join(", ")))
            }
            Self::NotFound { .. } => None,
            Self::Invalid { .. } => Some(
                "Templates are markdown files with optional YAML front matter and <!-- anchor: name --> markers."
                    .to_string(),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::NotFound { .. } => vec![
                "Run 'dltforge template list' to see available templates".to_string(),
                "Check the [templates] dir setting in .dltforge/config.toml".to_string(),
            ],
            Self::Invalid { .. } => vec![
                "Fix the template file and re-run the command".to_string(),
                "Compare with the built-in template via 'dltforge template show <id>'"
                    .to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Template
    }
}

/// Placeholder resolution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Every unresolved key is reported at once, sorted.
    #[error("Template '{template}' has unbound placeholders: {}", keys.join(", "))]
    MissingBindings { template: String, keys: Vec<String> },

    #[error("Value bound to '{key}' in template '{template}' {reason}")]
    UnsafeValue {
        template: String,
        key: String,
        reason: String,
    },
}

impl UserFriendlyError for ResolveError {
    fn user_message(&self) -> String {
        match self {
            Self::MissingBindings { template, keys } => format!(
                "Template '{template}' needs values for {} placeholder(s): {}",
                keys.len(),
                keys.join(", ")
            ),
            Self::UnsafeValue { key, reason, .. } => {
                format!("The value for '{key}' {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::MissingBindings { .. } => Some("Every placeholder referenced by a template must be bound before the document is written.".to_string()),
            Self::UnsafeValue { .. } => Some(
                "Values are pasted into the spec verbatim; anchor markers and code fences in them would break later appendix merges."
                    .to_string(),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::MissingBindings { keys, .. } => {
                let mut suggestions: Vec<String> = keys
                    .iter()
                    .map(|key| format!("Pass --set {key}=<value>"))
                    .collect();
                suggestions.push(
                    "Add recurring values to the [bindings] section of .dltforge/config.toml"
                        .to_string(),
                );
                suggestions
            }
            Self::UnsafeValue { key, .. } => vec![
                format!("Remove anchor comments from the value of '{key}'"),
                "Close every ``` or ~~~ fence opened inside the value".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::UserInput
    }
}

/// Appendix merge errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppendError {
    #[error("Anchor '{anchor}' not found in host document")]
    AnchorNotFound {
        anchor: String,
        available: Vec<String>,
    },
}

impl UserFriendlyError for AppendError {
    fn user_message(&self) -> String {
        match self {
            Self::AnchorNotFound { anchor, .. } => format!(
                "Cannot merge appendix: the host document has no '{anchor}' anchor"
            ),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::AnchorNotFound { available, .. } if available.is_empty() => {
                Some("The host document declares no anchors.".to_string())
            }
            Self::AnchorNotFound { available, .. } => {
                Some(format!("Available anchors: {}", available.join(", ")))
            }
        }
    }

    fn suggestions(&self) -> Vec<String> {
        vec![
            "Check the appendix's target_anchor front matter".to_string(),
            "Add the missing <!-- anchor: name --> marker to the main spec template".to_string(),
        ]
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Template
    }
}

/// Workflow sequencing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Phase {phase} has {} incomplete task(s)", pending.len())]
    IncompleteTasks {
        phase: WorkflowPhase,
        pending: Vec<String>,
    },

    #[error("Cannot enter {phase}: prerequisite phase(s) not completed: {}", display_phases(missing))]
    PrerequisiteIncomplete {
        phase: WorkflowPhase,
        missing: Vec<WorkflowPhase>,
    },

    #[error("Phase {phase} is not scheduled for this workflow")]
    PhaseNotScheduled { phase: WorkflowPhase },

    #[error("Phase {phase} has not produced its output artifact")]
    MissingArtifact { phase: WorkflowPhase },

    #[error("Appendix '{appendix}' was already merged")]
    AppendixAlreadyMerged { appendix: String },

    #[error("Expected current phase {expected}, found {actual}")]
    NotInPhase {
        expected: WorkflowPhase,
        actual: String,
    },

    #[error("Phase {phase} has no task #{index}")]
    TaskNotFound { phase: WorkflowPhase, index: usize },

    #[error("Phase {phase} is already completed; return to it before adding tasks")]
    PhaseAlreadyCompleted { phase: WorkflowPhase },

    #[error("Complexity flags cannot change after {phase}")]
    FlagsLocked { phase: String },

    #[error("Task description must not be empty")]
    EmptyTask,

    #[error("Workflow is already complete")]
    AlreadyComplete,

    #[error("No workflow found for '{api_name}'")]
    NotStarted { api_name: String },
}

fn display_phases(phases: &[WorkflowPhase]) -> String {
    phases
        .iter()
        .map(WorkflowPhase::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl UserFriendlyError for WorkflowError {
    fn user_message(&self) -> String {
        match self {
            Self::IncompleteTasks { phase, pending } => format!(
                "Cannot leave {phase}: {} task(s) still open: {}",
                pending.len(),
                pending.join("; ")
            ),
            Self::PrerequisiteIncomplete { phase, missing } => format!(
                "Cannot enter {phase} before completing {}",
                display_phases(missing)
            ),
            Self::PhaseNotScheduled { phase } => {
                format!("{phase} is not part of this workflow's schedule")
            }
            Self::MissingArtifact { phase } => {
                format!("{phase} has not written its document yet")
            }
            Self::AppendixAlreadyMerged { appendix } => {
                format!("Appendix '{appendix}' is already part of the main spec")
            }
            Self::NotInPhase { expected, actual } => {
                format!("This command runs during {expected}, but the workflow is in {actual}")
            }
            Self::TaskNotFound { phase, index } => format!("{phase} has no task #{index}"),
            Self::PhaseAlreadyCompleted { phase } => {
                format!("{phase} is already completed")
            }
            Self::FlagsLocked { phase } => {
                format!("Complexity flags are fixed once the workflow reaches {phase}")
            }
            Self::EmptyTask => "Task description is empty".to_string(),
            Self::AlreadyComplete => "The workflow has already completed".to_string(),
            Self::NotStarted { api_name } => {
                format!("No workflow has been started for '{api_name}'")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::IncompleteTasks { .. } | Self::PrerequisiteIncomplete { .. } => Some(
                "Phases must not be skipped: every checklist item must be done before moving on."
                    .to_string(),
            ),
            Self::MissingArtifact { .. } => Some(
                "Research, plan and appendix phases each write or merge a document.".to_string(),
            ),
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::IncompleteTasks { phase, .. } => vec![
                format!(
                    "Mark finished items with 'dltforge task done <api> {} <index>'",
                    phase.slug()
                ),
                "Run 'dltforge task list <api>' to review open items".to_string(),
            ],
            Self::PrerequisiteIncomplete { .. } | Self::NotInPhase { .. } => {
                vec!["Run 'dltforge status <api>' to see the current phase".to_string()]
            }
            Self::MissingArtifact { phase } => match phase {
                WorkflowPhase::Research => {
                    vec!["Run 'dltforge research <api>' first".to_string()]
                }
                WorkflowPhase::Plan => vec!["Run 'dltforge spec <api>' first".to_string()],
                _ => vec![format!(
                    "Run 'dltforge appendix <api> {}' first",
                    phase.slug().trim_start_matches("appendix_")
                )],
            },
            Self::PhaseAlreadyCompleted { phase } => vec![format!(
                "Return to the phase first with 'dltforge enter <api> {}'",
                phase.slug()
            )],
            Self::NotStarted { api_name } => {
                vec![format!("Run 'dltforge research {api_name}' first")]
            }
            _ => Vec::new(),
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Workflow
    }
}

impl UserFriendlyError for ForgeError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.user_message(),
            Self::Template(err) => err.user_message(),
            Self::Resolve(err) => err.user_message(),
            Self::Append(err) => err.user_message(),
            Self::Workflow(err) => err.user_message(),
            Self::Io(err) => format!("File operation failed: {err}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Config(err) => err.context(),
            Self::Template(err) => err.context(),
            Self::Resolve(err) => err.context(),
            Self::Append(err) => err.context(),
            Self::Workflow(err) => err.context(),
            Self::Io(_) => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(err) => err.suggestions(),
            Self::Template(err) => err.suggestions(),
            Self::Resolve(err) => err.suggestions(),
            Self::Append(err) => err.suggestions(),
            Self::Workflow(err) => err.suggestions(),
            Self::Io(_) => vec!["Check file permissions and available disk space".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(err) => err.category(),
            Self::Template(err) => err.category(),
            Self::Resolve(err) => err.category(),
            Self::Append(err) => err.category(),
            Self::Workflow(err) => err.category(),
            Self::Io(_) => ErrorCategory::FileSystem,
        }
    }
}

impl ForgeError {
    /// Find the first dltforge error in an `anyhow` error chain.
    ///
    /// Library functions that return `anyhow::Result` attach the typed error
    /// directly or wrap it in context; both are found here.
    #[must_use]
    pub fn from_chain(error: &anyhow::Error) -> Option<Self> {
        error.chain().find_map(|cause| {
            if let Some(err) = cause.downcast_ref::<Self>() {
                Some(err.duplicate())
            } else if let Some(err) = cause.downcast_ref::<ConfigError>() {
                Some(Self::Config(err.clone()))
            } else if let Some(err) = cause.downcast_ref::<TemplateError>() {
                Some(Self::Template(err.clone()))
            } else if let Some(err) = cause.downcast_ref::<ResolveError>() {
                Some(Self::Resolve(err.clone()))
            } else if let Some(err) = cause.downcast_ref::<AppendError>() {
                Some(Self::Append(err.clone()))
            } else {
                cause
                    .downcast_ref::<WorkflowError>()
                    .map(|err| Self::Workflow(err.clone()))
            }
        })
    }

    fn duplicate(&self) -> Self {
        match self {
            Self::Config(err) => Self::Config(err.clone()),
            Self::Template(err) => Self::Template(err.clone()),
            Self::Resolve(err) => Self::Resolve(err.clone()),
            Self::Append(err) => Self::Append(err.clone()),
            Self::Workflow(err) => Self::Workflow(err.clone()),
            Self::Io(err) => Self::Io(std::io::Error::new(err.kind(), err.to_string())),
        }
    }

    /// Get a user-friendly error message with context and actionable suggestions.
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error: {}\n", self.user_message()));

        if let Some(ctx) = self.context() {
            output.push_str(&format!("\nContext: {ctx}\n"));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }

    /// Map this error to the appropriate CLI exit code.
    ///
    /// This is the single source of truth for CLI exit codes.
    #[must_use]
    pub fn to_exit_code(&self) -> crate::exit_codes::ExitCode {
        use crate::exit_codes::ExitCode;

        match self {
            Self::Config(_) => ExitCode::CLI_ARGS,
            Self::Template(TemplateError::NotFound { .. }) => ExitCode::NOT_FOUND,
            Self::Template(TemplateError::Invalid { .. }) => ExitCode::INVALID_TEMPLATE,
            Self::Resolve(ResolveError::MissingBindings { .. }) => ExitCode::MISSING_BINDING,
            Self::Resolve(ResolveError::UnsafeValue { .. }) => ExitCode::CLI_ARGS,
            Self::Append(AppendError::AnchorNotFound { .. }) => ExitCode::ANCHOR_NOT_FOUND,
            Self::Workflow(WorkflowError::IncompleteTasks { .. }) => ExitCode::INCOMPLETE_TASKS,
            Self::Workflow(_) => ExitCode::WORKFLOW,
            Self::Io(_) => ExitCode::INTERNAL,
        }
    }
}
