use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use toml::Value;

use crate::lifestyle::Lifestyle;

/// Tunables of an [`ObjectContainer`](crate::ObjectContainer).
///
/// Read from the `[container]` table of a TOML document; missing keys keep
/// their defaults.
///
/// ```
/// use rcontainer::{ContainerSettings, Lifestyle};
///
/// let settings = ContainerSettings::from_str(r#"
///     [container]
///     default_lifestyle = "transient"
/// "#).unwrap();
///
/// assert_eq!(settings.default_lifestyle, Lifestyle::Transient);
/// assert!(!settings.log_resolutions);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSettings {
    /// Lifestyle used when a registration does not name one.
    pub default_lifestyle: Lifestyle,
    /// Emit a `trace` event for every successful resolution.
    pub log_resolutions: bool,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        ContainerSettings {
            default_lifestyle: Lifestyle::Singleton,
            log_resolutions: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct Document {
    #[serde(default)]
    container: ContainerSettings,
}

impl ContainerSettings {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, anyhow::Error> {
        let document: Document = toml::from_str(s)?;
        Ok(document.container)
    }

    pub fn from_file<P: AsRef<Path>>(fname: P) -> Result<Self, anyhow::Error> {
        Self::from_value(read_value(fname.as_ref())?)
    }

    /// Loads every existing file of `paths` in order and deep-merges them,
    /// later files overriding earlier ones. Missing files are skipped.
    pub fn load_layered<P: AsRef<Path>>(paths: &[P]) -> Result<Self, anyhow::Error> {
        let mut merged = Value::Table(toml::Table::new());
        for path in paths {
            let path = path.as_ref();
            if !path.exists() {
                continue;
            }
            merged = merge_values(&merged, &read_value(path)?);
        }
        Self::from_value(merged)
    }

    fn from_value(value: Value) -> Result<Self, anyhow::Error> {
        let document: Document = value.try_into()?;
        Ok(document.container)
    }
}

fn read_value(path: &Path) -> Result<Value, anyhow::Error> {
    if !path.exists() {
        return Err(anyhow::anyhow!("File {} does not exist", path.display()));
    }
    let content = std::fs::read_to_string(path)?;
    let value: Value = toml::from_str(&content)?;
    Ok(value)
}

fn merge_values(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Table(a_map), Value::Table(b_map)) => {
            let mut result: BTreeMap<String, Value> = a_map
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();

            for (k, v) in b_map {
                let merged = match result.get(k) {
                    Some(existing) => merge_values(existing, v),
                    None => v.clone(),
                };
                result.insert(k.clone(), merged);
            }

            Value::Table(result.into_iter().collect())
        }
        _ => b.clone(),
    }
}
