//! Template store for dltforge
//!
//! Templates are markdown files with optional YAML front matter. Their text
//! is lexed into literal runs and `{key}` / `{key?}` placeholders, and split
//! into heading sections, some of which carry a named anchor that appendix
//! templates merge into.

pub mod lexer;
pub mod markdown;
pub mod store;
pub mod template;

pub use lexer::{Token, is_valid_key, tokenize};
pub use markdown::{MarkdownDocument, MarkdownSection, anchor_marker, structural_conflict};
pub use store::{
    RESEARCH_TEMPLATE, SPEC_MAIN_TEMPLATE, TemplateOrigin, TemplateStore, builtin_source,
};
pub use template::{Section, Template, TemplateKind, TemplateSummary, list_placeholders};
