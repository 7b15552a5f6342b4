//! Exit code constants for dltforge.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Operation completed successfully |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments or configuration |
//! | 3 | `NOT_FOUND` | Template id is not registered |
//! | 4 | `MISSING_BINDING` | One or more placeholders are unbound |
//! | 5 | `ANCHOR_NOT_FOUND` | Appendix target anchor missing from host |
//! | 6 | `INCOMPLETE_TASKS` | Checklist items still open |
//! | 7 | `WORKFLOW` | Other phase sequencing violation |
//! | 8 | `INVALID_TEMPLATE` | Template could not be parsed |
//!
//! Codes 3 to 6 let a calling script tell "bad template" apart from
//! "user input incomplete".

/// Exit codes matching the documented exit code table.
///
/// # Example
///
/// ```rust
/// use dltforge_utils::exit_codes::ExitCode;
///
/// assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
/// assert_eq!(ExitCode::MISSING_BINDING.as_i32(), 4);
/// assert_eq!(ExitCode::SUCCESS, ExitCode::from_i32(0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - operation completed successfully
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// CLI arguments error - invalid or missing command-line arguments or configuration
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// Template not found - no template registered with the requested id
    pub const NOT_FOUND: ExitCode = ExitCode(3);

    /// Missing binding - placeholders without a value
    pub const MISSING_BINDING: ExitCode = ExitCode(4);

    /// Anchor not found - appendix target anchor absent from host document
    pub const ANCHOR_NOT_FOUND: ExitCode = ExitCode(5);

    /// Incomplete tasks - checklist items still open in the phase being left
    pub const INCOMPLETE_TASKS: ExitCode = ExitCode(6);

    /// Workflow violation - skipped phase, missing artifact, double merge
    pub const WORKFLOW: ExitCode = ExitCode(7);

    /// Invalid template - malformed front matter or anchors
    pub const INVALID_TEMPLATE: ExitCode = ExitCode(8);

    /// Get the numeric exit code value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an ExitCode from a raw i32 value.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}
