//! Configuration management for dltforge
//!
//! Hierarchical configuration with discovery and precedence:
//! CLI > file > defaults. The file is `.dltforge/config.toml` with
//! `[defaults]`, `[templates]` and `[bindings]` sections.

mod config;

pub use config::*;
