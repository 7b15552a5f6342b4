//! Command-line interface for dltforge
//!
//! ## Module Structure
//!
//! - `args`: CLI argument definitions and parsing structures (clap)
//! - `run`: Main entry point and command dispatch
//! - `commands`: Command implementations and helpers

pub mod args;
mod commands;
mod run;

pub use args::{BindingArgs, Cli, Commands, FlagArgs, TaskCommands, TemplateCommands};
pub use run::run;
