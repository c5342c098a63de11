//! Adapter definitions file.
//!
//! ```toml
//! [[adapter]]
//! type = "file-source"
//! id = "csv-inbox"
//! directory = "/var/in"
//! filter = "*.csv"
//! poll-interval = 5000
//! ```
//!
//! `type` selects the registry tag; every other key becomes an adapter
//! attribute. Strings, integers, floats and booleans are accepted.

use std::path::Path;

use anyhow::{Context, Result, bail};
use conduit_adapter_config::AdapterConfig;
use serde::Deserialize;

/// Key naming the adapter type.
pub const TYPE_KEY: &str = "type";

/// Optional key naming the adapter in logs.
pub const ID_KEY: &str = "id";

#[derive(Debug, Deserialize)]
struct DefinitionsFile {
    #[serde(default, rename = "adapter")]
    adapters: Vec<toml::Table>,
}

/// One adapter to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterDefinition {
    /// Display name: the `id` attribute, or `<type>-<position>`.
    pub name: String,

    /// Registry tag.
    pub tag: String,

    /// Attributes, `type` excluded.
    pub config: AdapterConfig,
}

/// Read adapter definitions from a TOML file.
pub fn load(path: &Path) -> Result<Vec<AdapterDefinition>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse(&text).with_context(|| format!("invalid adapter definitions in {}", path.display()))
}

/// Parse adapter definitions from TOML text.
pub fn parse(text: &str) -> Result<Vec<AdapterDefinition>> {
    let file: DefinitionsFile = toml::from_str(text)?;

    file.adapters
        .into_iter()
        .enumerate()
        .map(|(index, table)| definition(index + 1, table))
        .collect()
}

fn definition(position: usize, table: toml::Table) -> Result<AdapterDefinition> {
    let tag = match table.get(TYPE_KEY) {
        Some(toml::Value::String(tag)) => tag.clone(),
        Some(other) => bail!("adapter #{position}: `{TYPE_KEY}` must be a string, got {other}"),
        None => bail!("adapter #{position}: missing `{TYPE_KEY}`"),
    };

    let mut attributes = Vec::with_capacity(table.len());
    for (key, value) in table {
        if key == TYPE_KEY {
            continue;
        }
        let value = match value {
            toml::Value::String(s) => s,
            toml::Value::Integer(i) => i.to_string(),
            toml::Value::Float(f) => f.to_string(),
            toml::Value::Boolean(b) => b.to_string(),
            other => bail!(
                "adapter #{position}: attribute `{key}` must be a scalar, got {}",
                other.type_str()
            ),
        };
        attributes.push((key, value));
    }

    let config: AdapterConfig = attributes.into_iter().collect();
    let name = config
        .get(ID_KEY)
        .map_or_else(|| format!("{tag}-{position}"), str::to_string);

    Ok(AdapterDefinition { name, tag, config })
}
