use std::collections::BTreeMap;

use super::{Config, ConfigSource};

fn source_label(source: Option<&ConfigSource>) -> String {
    source.unwrap_or(&ConfigSource::Default).as_str().to_string()
}

impl Config {
    /// Get effective configuration as key-value pairs with source attribution
    ///
    /// Bindings appear as `bindings.<key>`. Keys are sorted so the output of
    /// `dltforge config` is stable.
    #[must_use]
    pub fn effective_config(&self) -> BTreeMap<String, (String, String)> {
        let mut config = BTreeMap::new();

        let mut add_config = |key: &str, value: String| {
            let source = source_label(self.source_attribution.get(key));
            config.insert(key.to_string(), (value, source));
        };

        add_config("destination", self.destination().to_string());
        add_config("output_dir", self.output_dir().to_string());
        add_config("verbose", self.verbose().to_string());
        if let Some(dir) = self.template_dir() {
            add_config("template_dir", dir.to_string());
        }
        for (key, value) in &self.bindings {
            add_config(&format!("bindings.{key}"), value.clone());
        }

        if let Some(path) = &self.config_path {
            config.insert(
                "config_path".to_string(),
                (path.to_string(), ConfigSource::Config.as_str().to_string()),
            );
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_config_attributes_sources() {
        let config = Config::builder()
            .destination("bigquery")
            .binding("author", "Data Team")
            .build()
            .unwrap();
        let effective = config.effective_config();

        assert_eq!(
            effective.get("destination"),
            Some(&("bigquery".to_string(), "programmatic".to_string()))
        );
        assert_eq!(
            effective.get("verbose"),
            Some(&("false".to_string(), "default".to_string()))
        );
        assert_eq!(
            effective.get("bindings.author"),
            Some(&("Data Team".to_string(), "programmatic".to_string()))
        );
        assert!(!effective.contains_key("template_dir"));
        assert!(!effective.contains_key("config_path"));
    }
}
