//! Configuration management for dltforge
//!
//! Hierarchical configuration with discovery and precedence:
//! CLI > file > defaults. The TOML file at `.dltforge/config.toml` supports
//! `[defaults]`, `[templates]` and `[bindings]` sections.

mod builder;
mod cli_args;
mod discovery;
mod model;
mod sources;
mod validation;

pub use builder::ConfigBuilder;
pub use cli_args::CliArgs;
pub use dltforge_utils::types::ConfigSource;
pub use model::*;
