use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use dltforge_utils::paths::resolve_against;
use dltforge_utils::types::ConfigSource;

/// Destination used when neither the CLI nor the config file names one.
pub const DEFAULT_DESTINATION: &str = "duckdb";

/// Output directory used when none is configured.
pub const DEFAULT_OUTPUT_DIR: &str = ".";

/// `[defaults]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    /// dlt destination bound to `{destination}`.
    pub destination: Option<String>,
    /// Directory that `research/` and `specs/` are written under.
    pub output_dir: Option<String>,
    pub verbose: Option<bool>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            destination: Some(DEFAULT_DESTINATION.to_string()),
            output_dir: Some(DEFAULT_OUTPUT_DIR.to_string()),
            verbose: Some(false),
        }
    }
}

/// `[templates]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TemplatesConfig {
    /// Directory of `*.md` templates overriding or extending the built-ins.
    pub dir: Option<String>,
}

/// Effective configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub defaults: Defaults,
    pub templates: TemplatesConfig,
    /// `[bindings]`: placeholder values applied to every template.
    pub bindings: BTreeMap<String, String>,
    /// Source attribution for each setting (for `dltforge config`).
    pub source_attribution: HashMap<String, ConfigSource>,
    /// Config file that was loaded, if any.
    pub config_path: Option<Utf8PathBuf>,
    /// Directory holding `.dltforge/`; relative paths resolve against it.
    pub project_root: Utf8PathBuf,
    /// Directory dltforge was invoked from; relative paths given on the
    /// command line resolve against it.
    pub working_dir: Utf8PathBuf,
}

impl Config {
    #[must_use]
    pub fn destination(&self) -> &str {
        self.defaults
            .destination
            .as_deref()
            .unwrap_or(DEFAULT_DESTINATION)
    }

    #[must_use]
    pub fn verbose(&self) -> bool {
        self.defaults.verbose.unwrap_or(false)
    }

    /// Output directory, resolved against the project root.
    #[must_use]
    pub fn output_dir(&self) -> Utf8PathBuf {
        let dir = self
            .defaults
            .output_dir
            .as_deref()
            .unwrap_or(DEFAULT_OUTPUT_DIR);
        if dir == "." {
            return self.project_root.clone();
        }
        resolve_against(&self.project_root, dir.as_ref())
    }

    /// A path given on the command line, resolved against the working
    /// directory.
    #[must_use]
    pub fn cli_path(&self, path: &Utf8Path) -> Utf8PathBuf {
        resolve_against(&self.working_dir, path)
    }

    /// Template directory, resolved against the project root.
    #[must_use]
    pub fn template_dir(&self) -> Option<Utf8PathBuf> {
        self.templates
            .dir
            .as_deref()
            .map(|dir| resolve_against(&self.project_root, dir.as_ref()))
    }

    #[must_use]
    pub fn source_of(&self, key: &str) -> ConfigSource {
        self.source_attribution
            .get(key)
            .cloned()
            .unwrap_or(ConfigSource::Default)
    }
}
