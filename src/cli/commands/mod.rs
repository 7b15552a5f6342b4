//! CLI command implementations (facade).
//!
//! This module re-exports the command surface used by `run.rs`.
//! Implementations live in `commands/*`.

mod appendix;
mod common;
mod config;
mod research;
mod spec;
mod status;
mod task;
mod template;
mod workflow;

pub use appendix::execute_appendix_command;
pub use config::execute_config_command;
pub use research::execute_research_command;
pub use spec::execute_spec_command;
pub use status::execute_status_command;
pub use task::execute_task_command;
pub use template::execute_template_command;
pub use workflow::{execute_advance_command, execute_enter_command};
