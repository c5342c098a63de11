//! Attribute sets describing one adapter.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered attribute name → value pairs, as read from a configuration
/// element such as `<file-source directory="/var/in" filter="*.csv"/>`.
///
/// Built once and read-only afterwards. Setting the same name twice keeps
/// its original position and the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdapterConfig {
    attributes: IndexMap<String, String>,
}

impl AdapterConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Value of an attribute.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Attributes in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for AdapterConfig
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            attributes: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_preserves_order() {
        let config = AdapterConfig::new()
            .with("directory", "/var/in")
            .with("filter", "*.csv")
            .with("poll-interval", "5000");

        let names: Vec<&str> = config.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["directory", "filter", "poll-interval"]);
        assert_eq!(config.get("filter"), Some("*.csv"));
        assert!(!config.contains("id"));
    }

    #[test]
    fn test_repeated_name_keeps_position() {
        let config: AdapterConfig = [("a", "1"), ("b", "2"), ("a", "3")].into_iter().collect();

        assert_eq!(config.len(), 2);
        assert_eq!(config.iter().next(), Some(("a", "3")));
    }

    #[test]
    fn test_deserializes_from_map() {
        let config: AdapterConfig =
            serde_json::from_str(r#"{"directory": "/in", "filter": "*.txt"}"#).unwrap();
        assert_eq!(config.get("directory"), Some("/in"));
        assert_eq!(config.len(), 2);
    }
}
