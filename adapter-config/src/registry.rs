//! Adapter registry.
//!
//! Maps configuration tags (`file-source`, ...) to builder functions. The
//! process-wide registry is assembled once, on first use, and is
//! read-only after that.

use std::collections::BTreeMap;

use conduit_file_source::DirectoryPoller;
use once_cell::sync::Lazy;
use tracing::debug;

use crate::config::AdapterConfig;
use crate::error::{AdapterError, Result};
use crate::file_source::{FILE_SOURCE_TAG, build_file_source};

/// Builds a configured, stopped adapter from its attributes.
pub type AdapterBuilder = fn(&AdapterConfig) -> Result<DirectoryPoller>;

static GLOBAL: Lazy<AdapterRegistry> = Lazy::new(AdapterRegistry::with_builtin);

/// Immutable tag → builder table.
#[derive(Debug, Clone, Default)]
pub struct AdapterRegistry {
    builders: BTreeMap<String, AdapterBuilder>,
}

impl AdapterRegistry {
    /// The process-wide registry holding the built-in adapter types.
    pub fn global() -> &'static AdapterRegistry {
        &GLOBAL
    }

    /// A registry holding the built-in adapter types.
    pub fn with_builtin() -> Self {
        let mut builders = BTreeMap::new();
        builders.insert(FILE_SOURCE_TAG.to_string(), build_file_source as AdapterBuilder);
        Self { builders }
    }

    /// Start assembling a custom registry.
    pub fn builder() -> AdapterRegistryBuilder {
        AdapterRegistryBuilder::default()
    }

    /// Builder registered for `tag`.
    pub fn lookup(&self, tag: &str) -> Result<AdapterBuilder> {
        self.builders
            .get(tag)
            .copied()
            .ok_or_else(|| AdapterError::UnknownAdapterType(tag.to_string()))
    }

    /// Look up `tag` and build an adapter from `config`.
    pub fn build(&self, tag: &str, config: &AdapterConfig) -> Result<DirectoryPoller> {
        let builder = self.lookup(tag)?;
        debug!("Building `{tag}` adapter");
        builder(config)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.builders.contains_key(tag)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.builders.keys().map(String::as_str)
    }
}

/// Collects registrations for a custom [`AdapterRegistry`].
#[derive(Debug, Default)]
pub struct AdapterRegistryBuilder {
    builders: BTreeMap<String, AdapterBuilder>,
}

impl AdapterRegistryBuilder {
    /// Include the built-in adapter types.
    pub fn with_builtin(mut self) -> Self {
        self.builders.extend(AdapterRegistry::with_builtin().builders);
        self
    }

    /// Register `builder` under `tag`. Each tag can be registered once.
    pub fn register(mut self, tag: impl Into<String>, builder: AdapterBuilder) -> Result<Self> {
        let tag = tag.into();
        if self.builders.contains_key(&tag) {
            return Err(AdapterError::DuplicateAdapterType(tag));
        }
        self.builders.insert(tag, builder);
        Ok(self)
    }

    pub fn build(self) -> AdapterRegistry {
        AdapterRegistry {
            builders: self.builders,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_file_source::{PollerConfig, PollerState};
    use pretty_assertions::assert_eq;

    fn build_fixed(_: &AdapterConfig) -> Result<DirectoryPoller> {
        Ok(DirectoryPoller::new(PollerConfig::new("/fixed"))?)
    }

    #[test]
    fn test_global_has_file_source() {
        let registry = AdapterRegistry::global();
        assert!(registry.contains(FILE_SOURCE_TAG));
        assert_eq!(registry.tags().collect::<Vec<_>>(), vec![FILE_SOURCE_TAG]);
    }

    #[test]
    fn test_unknown_tag_fails() {
        let err = AdapterRegistry::global()
            .lookup("unknown-source")
            .unwrap_err();
        assert!(matches!(err, AdapterError::UnknownAdapterType(ref tag) if tag == "unknown-source"));
    }

    #[test]
    fn test_build_through_registry() {
        let config = AdapterConfig::new().with("directory", "/var/in");
        let poller = AdapterRegistry::global()
            .build(FILE_SOURCE_TAG, &config)
            .unwrap();
        assert_eq!(poller.state(), PollerState::Stopped);
    }

    #[test]
    fn test_build_propagates_configuration_error() {
        let result = AdapterRegistry::global().build(FILE_SOURCE_TAG, &AdapterConfig::new());
        assert!(matches!(result, Err(AdapterError::Configuration(_))));
    }

    #[test]
    fn test_custom_registry() {
        let registry = AdapterRegistry::builder()
            .with_builtin()
            .register("fixed-source", build_fixed)
            .unwrap()
            .build();

        assert!(registry.contains(FILE_SOURCE_TAG));
        let poller = registry
            .build("fixed-source", &AdapterConfig::new())
            .unwrap();
        assert_eq!(poller.config().directory, std::path::Path::new("/fixed"));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let result = AdapterRegistry::builder()
            .with_builtin()
            .register(FILE_SOURCE_TAG, build_fixed);
        assert!(matches!(result, Err(AdapterError::DuplicateAdapterType(_))));
    }
}
