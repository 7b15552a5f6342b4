//! dltforge - templated document pipeline for dlt REST API pipelines
//!
//! dltforge mechanizes the research → spec → appendix merge → task breakdown
//! chain used to scaffold dlt REST API ingestion pipelines:
//!
//! - resolve `{placeholder}` templates into research and spec documents,
//!   reporting every unbound key at once
//! - merge complexity appendices into the main spec at named anchors
//! - track the workflow phases and their checklists between invocations
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! dltforge research github
//! dltforge spec github --set base_url=https://api.github.com --mixed-pagination
//! dltforge appendix github pagination
//! dltforge status github --json
//! ```
//!
//! # Quick Start (Library)
//!
//! ```rust
//! use dltforge::{Bindings, TemplateStore, resolve};
//!
//! let store = TemplateStore::builtin().unwrap();
//! let template = store.load("research").unwrap();
//! let bindings = Bindings::new()
//!     .with("api_name", "github")
//!     .with("date", "2026-01-26");
//! let doc = resolve(template, &bindings).unwrap();
//! assert!(doc.render().contains("github"));
//! ```
//!
//! # JSON Contracts
//!
//! `status --json` and `template list --json` emit JCS (RFC 8785) canonical
//! JSON. Use [`emit_jcs`] for your own integrations.

pub use dltforge_config::{CliArgs, Config, ConfigBuilder, ConfigSource};
pub use dltforge_engine::{
    ComplexityFlags, NeedsInput, ResolvedDocument, WorkflowStage, WorkflowState, WorkflowStatus,
    append, needs_input, resolve,
};
pub use dltforge_engine::{Bindings, generate_document, merge_appendix};
pub use dltforge_templates::{Template, TemplateKind, TemplateStore};
pub use dltforge_utils::canonicalization::emit_jcs;
pub use dltforge_utils::error::{ErrorCategory, ForgeError, UserFriendlyError};
pub use dltforge_utils::exit_codes::ExitCode;
pub use dltforge_utils::types::WorkflowPhase;

#[doc(hidden)]
pub use dltforge_engine as engine;
#[doc(hidden)]
pub use dltforge_templates as templates;
#[doc(hidden)]
pub use dltforge_utils as utils;

// Exported with #[doc(hidden)] to allow white-box testing of CLI flag parsing
#[doc(hidden)]
pub mod cli;
