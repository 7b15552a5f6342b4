//! Document engine for dltforge
//!
//! - [`resolve`]: substitute placeholders, reporting every unbound key at once
//! - [`append`]: splice an appendix into a host document at a named anchor
//! - [`workflow`]: the persisted phase state machine and its checklists
//! - [`pipeline`]: the above applied to files on disk

pub mod append;
pub mod bindings;
pub mod document;
pub mod output;
pub mod pipeline;
pub mod resolve;
pub mod state_store;
pub mod workflow;

pub use append::append;
pub use bindings::{BindingValue, Bindings};
pub use document::ResolvedDocument;
pub use pipeline::{WrittenDocument, generate_document, merge_appendix};
pub use resolve::{NeedsInput, needs_input, resolve, resolve_text};
pub use workflow::{
    ArtifactRecord, ComplexityFlags, TaskChecklistItem, WorkflowStage, WorkflowState,
    WorkflowStatus,
};
