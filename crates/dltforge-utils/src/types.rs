use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString};

/// Phases of the API-to-pipeline workflow.
///
/// The canonical order is:
///
/// ```text
/// Research → Plan → [AppendixAuth → AppendixPagination → AppendixIncremental → AppendixRetry] → Implement → Test
/// ```
///
/// Appendix phases are optional and only scheduled when the matching
/// complexity flag is set.
///
/// # Dependencies
///
/// - `Research`: none (starting phase)
/// - `Plan`: `Research`
/// - `Appendix*`: `Plan`
/// - `Implement`: `Plan` and every scheduled appendix phase
/// - `Test`: `Implement`
///
/// # Example
///
/// ```rust
/// use dltforge_utils::types::WorkflowPhase;
///
/// let phase: WorkflowPhase = "pagination".parse().unwrap();
/// assert_eq!(phase, WorkflowPhase::AppendixPagination);
/// assert_eq!(phase.as_str(), "APPENDIX_PAGINATION");
/// assert_eq!(phase.slug(), "appendix_pagination");
/// ```
///
/// # Serialization
///
/// Serializes to the upper-case name (e.g. `"APPENDIX_AUTH"`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(ascii_case_insensitive)]
pub enum WorkflowPhase {
    /// Research the API surface and write the research document.
    #[strum(serialize = "research")]
    Research,
    /// Write the main dlt REST client spec.
    #[strum(serialize = "plan")]
    Plan,
    /// Merge the custom authentication appendix.
    #[strum(serialize = "appendix_auth", serialize = "auth")]
    AppendixAuth,
    /// Merge the mixed pagination appendix.
    #[strum(serialize = "appendix_pagination", serialize = "pagination")]
    AppendixPagination,
    /// Merge the compound cursor / incremental loading appendix.
    #[strum(serialize = "appendix_incremental", serialize = "incremental")]
    AppendixIncremental,
    /// Merge the custom retry logic appendix.
    #[strum(serialize = "appendix_retry", serialize = "retry")]
    AppendixRetry,
    /// Implement the pipeline source code.
    #[strum(serialize = "implement")]
    Implement,
    /// Test the pipeline against the live API.
    #[strum(serialize = "test")]
    Test,
}

/// Appendix phases in their fixed scheduling priority.
pub const APPENDIX_ORDER: [WorkflowPhase; 4] = [
    WorkflowPhase::AppendixAuth,
    WorkflowPhase::AppendixPagination,
    WorkflowPhase::AppendixIncremental,
    WorkflowPhase::AppendixRetry,
];

impl WorkflowPhase {
    /// Upper-case name used in status output and state files.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Research => "RESEARCH",
            Self::Plan => "PLAN",
            Self::AppendixAuth => "APPENDIX_AUTH",
            Self::AppendixPagination => "APPENDIX_PAGINATION",
            Self::AppendixIncremental => "APPENDIX_INCREMENTAL",
            Self::AppendixRetry => "APPENDIX_RETRY",
            Self::Implement => "IMPLEMENT",
            Self::Test => "TEST",
        }
    }

    /// Lower-case name accepted on the command line.
    #[must_use]
    pub const fn slug(&self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::Plan => "plan",
            Self::AppendixAuth => "appendix_auth",
            Self::AppendixPagination => "appendix_pagination",
            Self::AppendixIncremental => "appendix_incremental",
            Self::AppendixRetry => "appendix_retry",
            Self::Implement => "implement",
            Self::Test => "test",
        }
    }

    /// Static prerequisite DAG.
    ///
    /// `Implement` lists every appendix phase; callers filter out the ones
    /// that were not scheduled.
    #[must_use]
    pub const fn prerequisites(&self) -> &'static [WorkflowPhase] {
        match self {
            Self::Research => &[],
            Self::Plan => &[Self::Research],
            Self::AppendixAuth
            | Self::AppendixPagination
            | Self::AppendixIncremental
            | Self::AppendixRetry => &[Self::Plan],
            Self::Implement => &[
                Self::Plan,
                Self::AppendixAuth,
                Self::AppendixPagination,
                Self::AppendixIncremental,
                Self::AppendixRetry,
            ],
            Self::Test => &[Self::Implement],
        }
    }

    #[must_use]
    pub const fn is_appendix(&self) -> bool {
        matches!(
            self,
            Self::AppendixAuth
                | Self::AppendixPagination
                | Self::AppendixIncremental
                | Self::AppendixRetry
        )
    }

    /// Identifier of the appendix template merged during this phase.
    #[must_use]
    pub const fn appendix_template_id(&self) -> Option<&'static str> {
        match self {
            Self::AppendixAuth => Some("appendix_auth"),
            Self::AppendixPagination => Some("appendix_pagination"),
            Self::AppendixIncremental => Some("appendix_incremental"),
            Self::AppendixRetry => Some("appendix_retry"),
            _ => None,
        }
    }

    /// Whether leaving this phase requires a recorded document artifact.
    ///
    /// `Implement` and `Test` produce a source tree that dltforge does not
    /// generate, so nothing is recorded for them.
    #[must_use]
    pub const fn produces_document(&self) -> bool {
        !matches!(self, Self::Implement | Self::Test)
    }
}

impl std::fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of a configuration value.
///
/// Precedence: CLI arguments > configuration file > programmatic > defaults.
///
/// Serializes to lowercase strings: `"cli"`, `"config"`, `"programmatic"`, `"default"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    /// Value provided via CLI argument (highest precedence).
    Cli,
    /// Value loaded from configuration file.
    Config,
    /// Value provided programmatically (e.g., `Config::builder()`).
    Programmatic,
    /// Built-in default value (lowest precedence).
    Default,
}

impl ConfigSource {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cli => "cli",
            Self::Config => "config",
            Self::Programmatic => "programmatic",
            Self::Default => "default",
        }
    }
}
