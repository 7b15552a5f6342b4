use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use dltforge_templates::is_valid_key;
use dltforge_utils::error::ConfigError;

/// Value bound to a placeholder key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingValue {
    Value(String),
    /// Explicitly unresolved; counts as unbound during resolution.
    Missing,
}

/// Case-sensitive placeholder bindings.
///
/// Later inserts replace earlier ones, so callers layer sources from lowest
/// to highest precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bindings {
    values: BTreeMap<String, BindingValue>,
}

impl Bindings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values
            .insert(key.into(), BindingValue::Value(value.into()));
    }

    /// Bind `key` to the [`BindingValue::Missing`] sentinel.
    pub fn mark_missing(&mut self, key: impl Into<String>) {
        self.values.insert(key.into(), BindingValue::Missing);
    }

    /// Resolved value for `key`; `None` when unbound or `Missing`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(BindingValue::Value(value)) => Some(value),
            Some(BindingValue::Missing) | None => None,
        }
    }

    #[must_use]
    pub fn binding(&self, key: &str) -> Option<&BindingValue> {
        self.values.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BindingValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Overlay `other` on top of these bindings.
    pub fn merge(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parse a `key=value` assignment as given to `--set`.
    ///
    /// The value may be empty and may itself contain `=`.
    pub fn parse_assignment(raw: &str) -> Result<(String, String), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: "set".to_string(),
            value: raw.to_string(),
        };
        let (key, value) = raw.split_once('=').ok_or_else(invalid)?;
        let key = key.trim();
        if !is_valid_key(key) {
            return Err(invalid());
        }
        Ok((key.to_string(), value.to_string()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bindings = Self::new();
        bindings.extend(iter);
        bindings
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Bindings {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sentinel_is_unbound() {
        let mut bindings = Bindings::new().with("api_name", "github");
        bindings.mark_missing("base_url");
        assert_eq!(bindings.get("api_name"), Some("github"));
        assert_eq!(bindings.get("base_url"), None);
        assert_eq!(bindings.binding("base_url"), Some(&BindingValue::Missing));
        assert_eq!(bindings.get("API_NAME"), None);
    }

    #[test]
    fn test_merge_overrides() {
        let mut base: Bindings = [("destination", "duckdb"), ("author", "team")]
            .into_iter()
            .collect();
        let overlay = Bindings::new().with("destination", "bigquery");
        base.merge(&overlay);
        assert_eq!(base.get("destination"), Some("bigquery"));
        assert_eq!(base.get("author"), Some("team"));
        assert_eq!(base.len(), 2);
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            Bindings::parse_assignment("base_url=https://api.github.com").unwrap(),
            ("base_url".to_string(), "https://api.github.com".to_string())
        );
        assert_eq!(
            Bindings::parse_assignment("q=a=b").unwrap(),
            ("q".to_string(), "a=b".to_string())
        );
        assert_eq!(
            Bindings::parse_assignment("empty=").unwrap(),
            ("empty".to_string(), String::new())
        );
        assert!(Bindings::parse_assignment("novalue").is_err());
        assert!(Bindings::parse_assignment("bad key=1").is_err());
    }

    #[test]
    fn test_serializes_as_map() {
        let mut bindings = Bindings::new().with("a", "1");
        bindings.mark_missing("b");
        let json = serde_json::to_string(&bindings).unwrap();
        assert_eq!(json, r#"{"a":{"value":"1"},"b":"missing"}"#);
    }
}
