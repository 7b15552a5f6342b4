use dltforge_templates::is_valid_key;
use dltforge_utils::error::{ConfigError, ForgeError};

use super::Config;

impl Config {
    /// Validate configuration values
    pub(crate) fn validate(&self) -> Result<(), ForgeError> {
        if let Some(destination) = &self.defaults.destination
            && !is_valid_destination(destination)
        {
            return Err(ForgeError::Config(ConfigError::InvalidValue {
                key: "destination".to_string(),
                value: format!("'{destination}' must be non-empty and use only [a-z0-9_]"),
            }));
        }

        if let Some(output_dir) = &self.defaults.output_dir
            && output_dir.trim().is_empty()
        {
            return Err(ForgeError::Config(ConfigError::InvalidValue {
                key: "output_dir".to_string(),
                value: "must not be empty".to_string(),
            }));
        }

        if let Some(dir) = self.template_dir()
            && !dir.is_dir()
        {
            return Err(ForgeError::Config(ConfigError::InvalidValue {
                key: "template_dir".to_string(),
                value: format!("{dir} is not a directory"),
            }));
        }

        for key in self.bindings.keys() {
            if !is_valid_key(key) {
                return Err(ForgeError::Config(ConfigError::InvalidValue {
                    key: format!("bindings.{key}"),
                    value: "binding keys use [A-Za-z0-9_.-] and cannot start with '.' or '-'"
                        .to_string(),
                }));
            }
        }

        Ok(())
    }
}

fn is_valid_destination(destination: &str) -> bool {
    !destination.is_empty()
        && destination
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_charset() {
        assert!(is_valid_destination("duckdb"));
        assert!(is_valid_destination("motherduck_v2"));
        assert!(!is_valid_destination(""));
        assert!(!is_valid_destination("Big Query"));
        assert!(!is_valid_destination("../etc"));
    }

    #[test]
    fn test_invalid_destination_rejected() {
        let err = Config::builder().destination("Duck DB").build().unwrap_err();
        assert!(matches!(
            err,
            ForgeError::Config(ConfigError::InvalidValue { ref key, .. }) if key == "destination"
        ));
    }

    #[test]
    fn test_invalid_binding_key_rejected() {
        let err = Config::builder()
            .binding("bad key", "value")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ForgeError::Config(ConfigError::InvalidValue { ref key, .. }) if key == "bindings.bad key"
        ));
    }

    #[test]
    fn test_missing_template_dir_rejected() {
        let temp = tempfile::TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        let err = Config::builder()
            .template_dir(missing.to_str().unwrap())
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ForgeError::Config(ConfigError::InvalidValue { ref key, .. }) if key == "template_dir"
        ));
    }
}
