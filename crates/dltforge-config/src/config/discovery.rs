use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use dltforge_utils::error::{ConfigError, ForgeError};
use dltforge_utils::paths::{CONFIG_FILE_NAME, PROJECT_DIR_NAME, resolve_against};

use super::{CliArgs, Config, ConfigSource, Defaults, TemplatesConfig};

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    defaults: Option<Defaults>,
    templates: Option<TemplatesConfig>,
    bindings: Option<BTreeMap<String, String>>,
}

impl Config {
    /// Discover and load configuration with precedence: CLI > file > defaults
    ///
    /// Uses the current working directory for config file discovery when no
    /// explicit path is provided in `cli_args`.
    pub fn discover(cli_args: &CliArgs) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        let start_dir = Utf8PathBuf::from_path_buf(cwd).map_err(|path| {
            ForgeError::Config(ConfigError::DiscoveryFailed {
                reason: format!("current directory is not valid UTF-8: {}", path.display()),
            })
        })?;
        Self::discover_from(&start_dir, cli_args)
    }

    /// Discover and load configuration starting from a specific directory
    ///
    /// This is the path-driven variant used by tests to avoid process-global state.
    /// Relative paths in `cli_args` are resolved against `start_dir`, while
    /// relative paths from the config file resolve against the project root.
    pub fn discover_from(start_dir: &Utf8Path, cli_args: &CliArgs) -> Result<Self> {
        let mut source_attribution = HashMap::new();

        let mut defaults = Defaults::default();
        let mut templates = TemplatesConfig::default();
        let mut bindings = BTreeMap::new();

        source_attribution.insert("destination".to_string(), ConfigSource::Default);
        source_attribution.insert("output_dir".to_string(), ConfigSource::Default);
        source_attribution.insert("verbose".to_string(), ConfigSource::Default);

        let config_path = match &cli_args.config_path {
            Some(explicit) => {
                let explicit = resolve_against(start_dir, explicit);
                if !explicit.is_file() {
                    return Err(ForgeError::Config(ConfigError::NotFound {
                        path: explicit.to_string(),
                    })
                    .into());
                }
                Some(explicit)
            }
            None => Self::discover_config_file_from(start_dir)?,
        };

        let project_root = config_path
            .as_deref()
            .and_then(project_root_of)
            .unwrap_or_else(|| start_dir.to_path_buf());

        if let Some(path) = &config_path {
            let file_config = Self::load_config_file(path)?;
            let config_source = ConfigSource::Config;
            tracing::debug!(path = %path, "Loaded configuration file");

            if let Some(file_defaults) = file_config.defaults {
                if file_defaults.destination.is_some() {
                    defaults.destination = file_defaults.destination;
                    source_attribution.insert("destination".to_string(), config_source.clone());
                }
                if file_defaults.output_dir.is_some() {
                    defaults.output_dir = file_defaults.output_dir;
                    source_attribution.insert("output_dir".to_string(), config_source.clone());
                }
                if file_defaults.verbose.is_some() {
                    defaults.verbose = file_defaults.verbose;
                    source_attribution.insert("verbose".to_string(), config_source.clone());
                }
            }

            if let Some(file_templates) = file_config.templates
                && file_templates.dir.is_some()
            {
                templates.dir = file_templates.dir;
                source_attribution.insert("template_dir".to_string(), config_source.clone());
            }

            if let Some(file_bindings) = file_config.bindings {
                for key in file_bindings.keys() {
                    source_attribution.insert(format!("bindings.{key}"), config_source.clone());
                }
                bindings = file_bindings;
            }
        }

        // Apply CLI overrides (highest priority)
        if let Some(destination) = &cli_args.destination {
            defaults.destination = Some(destination.clone());
            source_attribution.insert("destination".to_string(), ConfigSource::Cli);
        }
        if let Some(output_dir) = &cli_args.output_dir {
            defaults.output_dir = Some(resolve_against(start_dir, output_dir.as_ref()).into_string());
            source_attribution.insert("output_dir".to_string(), ConfigSource::Cli);
        }
        if let Some(template_dir) = &cli_args.template_dir {
            templates.dir = Some(resolve_against(start_dir, template_dir.as_ref()).into_string());
            source_attribution.insert("template_dir".to_string(), ConfigSource::Cli);
        }
        if let Some(verbose) = cli_args.verbose {
            defaults.verbose = Some(verbose);
            source_attribution.insert("verbose".to_string(), ConfigSource::Cli);
        }

        let config = Self {
            defaults,
            templates,
            bindings,
            source_attribution,
            config_path,
            project_root,
            working_dir: start_dir.to_path_buf(),
        };

        config.validate()?;

        Ok(config)
    }

    /// Discover config file by searching upward from a given directory
    ///
    /// Walks up the directory tree looking for `.dltforge/config.toml`,
    /// stopping at repository root markers (.git, .hg, .svn) or the
    /// filesystem root.
    pub fn discover_config_file_from(start_dir: &Utf8Path) -> Result<Option<Utf8PathBuf>> {
        let mut current_dir = start_dir;

        loop {
            let config_path = current_dir.join(PROJECT_DIR_NAME).join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                return Ok(Some(config_path));
            }

            if current_dir.join(".git").exists()
                || current_dir.join(".hg").exists()
                || current_dir.join(".svn").exists()
            {
                break;
            }

            match current_dir.parent() {
                Some(parent) => current_dir = parent,
                None => break,
            }
        }

        Ok(None)
    }

    /// Load configuration from TOML file
    fn load_config_file(path: &Utf8Path) -> Result<TomlConfig> {
        let content = std::fs::read_to_string(path.as_std_path())
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: TomlConfig = toml::from_str(&content).map_err(|e| {
            ForgeError::Config(ConfigError::InvalidFile(format!("{path}: {e}")))
        })?;
        Ok(config)
    }
}

/// `<root>` for a config file at `<root>/.dltforge/config.toml`.
fn project_root_of(config_path: &Utf8Path) -> Option<Utf8PathBuf> {
    let dir = config_path.parent()?;
    if dir.file_name() == Some(PROJECT_DIR_NAME) {
        dir.parent().map(Utf8Path::to_path_buf)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn utf8(temp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap()
    }

    fn create_test_config_file(dir: &Utf8Path, content: &str) -> Utf8PathBuf {
        let project_dir = dir.join(PROJECT_DIR_NAME);
        std::fs::create_dir_all(&project_dir).unwrap();
        let config_path = project_dir.join(CONFIG_FILE_NAME);
        std::fs::write(&config_path, content).unwrap();
        config_path
    }

    #[test]
    fn test_default_config() {
        let temp = TempDir::new().unwrap();
        let root = utf8(&temp);
        std::fs::create_dir(root.join(".git")).unwrap();

        let config = Config::discover_from(&root, &CliArgs::default()).unwrap();
        assert_eq!(config.destination(), "duckdb");
        assert!(!config.verbose());
        assert_eq!(config.output_dir(), root);
        assert_eq!(config.template_dir(), None);
        assert!(config.config_path.is_none());
        assert_eq!(config.project_root, root);
        assert_eq!(config.source_of("destination"), ConfigSource::Default);
    }

    #[test]
    fn test_discovery_walks_upward() {
        let temp = TempDir::new().unwrap();
        let root = utf8(&temp);
        create_test_config_file(&root, "[defaults]\ndestination = \"bigquery\"\n");
        let nested = root.join("pipelines/github");
        std::fs::create_dir_all(&nested).unwrap();

        let config = Config::discover_from(&nested, &CliArgs::default()).unwrap();
        assert_eq!(config.destination(), "bigquery");
        assert_eq!(config.project_root, root);
        assert_eq!(config.source_of("destination"), ConfigSource::Config);
    }

    #[test]
    fn test_discovery_stops_at_repository_root() {
        let temp = TempDir::new().unwrap();
        let root = utf8(&temp);
        create_test_config_file(&root, "[defaults]\ndestination = \"bigquery\"\n");
        let repo = root.join("repo");
        std::fs::create_dir_all(repo.join(".git")).unwrap();

        let found = Config::discover_config_file_from(&repo).unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn test_cli_overrides_file() {
        let temp = TempDir::new().unwrap();
        let root = utf8(&temp);
        let path = create_test_config_file(
            &root,
            "[defaults]\ndestination = \"bigquery\"\nverbose = true\n\n[bindings]\nauthor = \"Data Team\"\n",
        );

        let cli_args = CliArgs {
            config_path: Some(path.clone()),
            destination: Some("postgres".to_string()),
            ..Default::default()
        };
        let config = Config::discover_from(&root, &cli_args).unwrap();
        assert_eq!(config.destination(), "postgres");
        assert_eq!(config.source_of("destination"), ConfigSource::Cli);
        assert!(config.verbose());
        assert_eq!(config.source_of("verbose"), ConfigSource::Config);
        assert_eq!(config.bindings.get("author").map(String::as_str), Some("Data Team"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_explicit_missing_config_is_not_found() {
        let temp = TempDir::new().unwrap();
        let root = utf8(&temp);
        let cli_args = CliArgs {
            config_path: Some(root.join("missing.toml")),
            ..Default::default()
        };
        let err = Config::discover_from(&root, &cli_args).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ForgeError>(),
            Some(ForgeError::Config(ConfigError::NotFound { .. }))
        ));
    }

    #[test]
    fn test_invalid_toml_is_invalid_file() {
        let temp = TempDir::new().unwrap();
        let root = utf8(&temp);
        create_test_config_file(&root, "[defaults\ndestination = ");
        let err = Config::discover_from(&root, &CliArgs::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ForgeError>(),
            Some(ForgeError::Config(ConfigError::InvalidFile(_)))
        ));
    }

    #[test]
    fn test_unknown_section_is_rejected() {
        let temp = TempDir::new().unwrap();
        let root = utf8(&temp);
        create_test_config_file(&root, "[runner]\nmode = \"native\"\n");
        assert!(Config::discover_from(&root, &CliArgs::default()).is_err());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let root = utf8(&temp);
        create_test_config_file(&root, "# only comments\n");
        let config = Config::discover_from(&root, &CliArgs::default()).unwrap();
        assert_eq!(config.destination(), "duckdb");
        assert!(config.config_path.is_some());
    }

    #[test]
    fn test_cli_paths_resolve_against_start_dir() {
        let temp = TempDir::new().unwrap();
        let root = utf8(&temp);
        create_test_config_file(&root, "[defaults]\ndestination = \"duckdb\"\n");
        let nested = root.join("work");
        std::fs::create_dir_all(nested.join("my_templates")).unwrap();

        let cli_args = CliArgs {
            template_dir: Some("my_templates".to_string()),
            output_dir: Some("docs".to_string()),
            ..Default::default()
        };
        let config = Config::discover_from(&nested, &cli_args).unwrap();
        assert_eq!(config.project_root, root);
        assert_eq!(config.working_dir, nested);
        assert_eq!(config.template_dir(), Some(nested.join("my_templates")));
        assert_eq!(config.output_dir(), nested.join("docs"));
        assert_eq!(
            config.cli_path(Utf8Path::new("out/spec.md")),
            nested.join("out/spec.md")
        );
    }

    #[test]
    fn test_relative_paths_resolve_against_project_root() {
        let temp = TempDir::new().unwrap();
        let root = utf8(&temp);
        std::fs::create_dir(root.join("my_templates")).unwrap();
        create_test_config_file(
            &root,
            "[defaults]\noutput_dir = \"docs\"\n\n[templates]\ndir = \"my_templates\"\n",
        );
        let nested = root.join("sub");
        std::fs::create_dir(&nested).unwrap();

        let config = Config::discover_from(&nested, &CliArgs::default()).unwrap();
        assert_eq!(config.output_dir(), root.join("docs"));
        assert_eq!(config.template_dir(), Some(root.join("my_templates")));
    }
}
