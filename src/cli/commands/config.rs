//! Config command implementation
//!
//! Handles `dltforge config`: prints every effective setting with the
//! layer it came from.

use anyhow::Result;

use dltforge_config::Config;

/// Execute the config command
pub fn execute_config_command(config: &Config) -> Result<()> {
    println!("Effective configuration:");
    println!("  project_root = {}  [detected]", config.project_root);
    for (key, (value, source)) in config.effective_config() {
        println!("  {key} = {value}  [{source}]");
    }
    if config.config_path.is_none() {
        println!();
        println!("No .dltforge/config.toml found; using defaults.");
    }
    Ok(())
}
