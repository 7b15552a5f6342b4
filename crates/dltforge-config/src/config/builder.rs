use camino::Utf8PathBuf;
use std::collections::{BTreeMap, HashMap};

use dltforge_utils::error::ForgeError;

use super::{Config, ConfigSource, Defaults, TemplatesConfig};

impl Config {
    /// Create a builder for programmatic configuration.
    ///
    /// Use this when embedding dltforge without relying on a config file.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dltforge_config::Config;
    ///
    /// let config = Config::builder()
    ///     .destination("bigquery")
    ///     .binding("author", "Data Team")
    ///     .build()
    ///     .expect("Failed to build config");
    /// assert_eq!(config.destination(), "bigquery");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for programmatic configuration of dltforge.
///
/// All values set via the builder are attributed to
/// `ConfigSource::Programmatic` in the resulting `Config`.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    project_root: Option<Utf8PathBuf>,
    destination: Option<String>,
    output_dir: Option<String>,
    template_dir: Option<String>,
    verbose: Option<bool>,
    bindings: BTreeMap<String, String>,
}

impl ConfigBuilder {
    /// Create a new `ConfigBuilder` with no values set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory that relative paths resolve against (default: `.`).
    #[must_use]
    pub fn project_root(mut self, root: impl Into<Utf8PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    #[must_use]
    pub fn destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    #[must_use]
    pub fn output_dir(mut self, dir: impl Into<String>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn template_dir(mut self, dir: impl Into<String>) -> Self {
        self.template_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    /// Add a binding applied to every template.
    #[must_use]
    pub fn binding(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.bindings.insert(key.into(), value.into());
        self
    }

    /// Build the configuration and validate it.
    pub fn build(self) -> Result<Config, ForgeError> {
        let mut source_attribution = HashMap::new();
        let mut defaults = Defaults::default();
        let mut templates = TemplatesConfig::default();

        let mut attribute = |key: &str, set: bool| {
            let source = if set {
                ConfigSource::Programmatic
            } else {
                ConfigSource::Default
            };
            source_attribution.insert(key.to_string(), source);
        };

        attribute("destination", self.destination.is_some());
        attribute("output_dir", self.output_dir.is_some());
        attribute("verbose", self.verbose.is_some());
        if self.template_dir.is_some() {
            attribute("template_dir", true);
        }
        for key in self.bindings.keys() {
            attribute(&format!("bindings.{key}"), true);
        }

        if self.destination.is_some() {
            defaults.destination = self.destination;
        }
        if self.output_dir.is_some() {
            defaults.output_dir = self.output_dir;
        }
        if self.verbose.is_some() {
            defaults.verbose = self.verbose;
        }
        templates.dir = self.template_dir;

        let project_root = self
            .project_root
            .unwrap_or_else(|| Utf8PathBuf::from("."));
        let config = Config {
            defaults,
            templates,
            bindings: self.bindings,
            source_attribution,
            config_path: None,
            working_dir: project_root.clone(),
            project_root,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = Config::builder().build().unwrap();
        assert_eq!(config.destination(), "duckdb");
        assert!(!config.verbose());
        assert!(config.bindings.is_empty());
        assert_eq!(config.source_of("destination"), ConfigSource::Default);
    }

    #[test]
    fn test_builder_values_are_programmatic() {
        let config = Config::builder()
            .project_root("/work")
            .destination("postgres")
            .output_dir("docs")
            .verbose(true)
            .build()
            .unwrap();
        assert_eq!(config.destination(), "postgres");
        assert_eq!(config.output_dir(), Utf8PathBuf::from("/work/docs"));
        assert!(config.verbose());
        assert_eq!(config.source_of("output_dir"), ConfigSource::Programmatic);
        assert_eq!(config.source_of("verbose"), ConfigSource::Programmatic);
    }
}
