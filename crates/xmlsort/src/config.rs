//! Sort configuration: relevant keys and non-sort keys
//!
//! The on-disk shape is a JSON object with two fields:
//!
//! ```json
//! { "relevantKeys": { "item": "name" }, "nonSortKeys": ["layoutItems"] }
//! ```
//!
//! Keys are element names or `/`-separated element paths from the root
//! (`Profile/fieldPermissions`). A path key wins over a bare name.

pub mod cache;
pub mod loader;
pub mod rule;

pub use cache::ConfigCache;
pub use loader::{ConfigLoader, ConfigSource, LoadedConfig, DEFAULT_CONFIG_FILE};
pub use rule::{AttributeOrder, Criterion, Direction, SortRule};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::warn;

use crate::error::{Error, ErrorKind, Result};

/// Config file contents as written on disk
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSortConfig {
    pub relevant_keys: IndexMap<String, JsonValue>,
    pub non_sort_keys: Vec<String>,
}

impl RawSortConfig {
    pub fn from_json_str(input: &str) -> Result<Self> {
        serde_json::from_str(input).map_err(|err| Error::detached(ErrorKind::Config, err.to_string()))
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| Error::detached(ErrorKind::Config, err.to_string()))
    }
}

/// Validated sort policy consumed by the sorting engine
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SortConfig {
    relevant_keys: IndexMap<String, SortRule>,
    non_sort_keys: IndexSet<String>,
}

impl SortConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interpret raw config data. Ill-shaped rule entries are dropped with a
    /// warning, so the key behaves as if it had no rule.
    pub fn from_raw(raw: &RawSortConfig) -> Self {
        let mut relevant_keys = IndexMap::with_capacity(raw.relevant_keys.len());
        for (key, value) in &raw.relevant_keys {
            match SortRule::from_json(value) {
                Some(rule) => {
                    relevant_keys.insert(key.clone(), rule);
                }
                None => warn!(key = %key, value = %value, "ignoring ill-shaped sort rule"),
            }
        }

        Self {
            relevant_keys,
            non_sort_keys: raw.non_sort_keys.iter().cloned().collect(),
        }
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        RawSortConfig::from_json_str(input).map(|raw| Self::from_raw(&raw))
    }

    pub fn with_rule(mut self, key: impl Into<String>, rule: SortRule) -> Self {
        self.relevant_keys.insert(key.into(), rule);
        self
    }

    pub fn with_non_sort_key(mut self, key: impl Into<String>) -> Self {
        self.non_sort_keys.insert(key.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.relevant_keys.is_empty() && self.non_sort_keys.is_empty()
    }

    pub fn relevant_keys(&self) -> impl Iterator<Item = (&str, &SortRule)> {
        self.relevant_keys.iter().map(|(key, rule)| (key.as_str(), rule))
    }

    pub fn non_sort_keys(&self) -> impl Iterator<Item = &str> {
        self.non_sort_keys.iter().map(String::as_str)
    }

    /// Rule for the element at `path` named `name`
    pub fn rule_for(&self, path: &str, name: &str) -> Option<&SortRule> {
        self.relevant_keys
            .get(path)
            .or_else(|| self.relevant_keys.get(name))
    }

    /// Whether the element at `path` named `name` is excluded from reordering
    pub fn is_non_sort(&self, path: &str, name: &str) -> bool {
        self.non_sort_keys.contains(path) || self.non_sort_keys.contains(name)
    }

    /// Whether an attribute keeps its position whatever the element's rule says
    pub fn is_non_sort_attribute(&self, name: &str) -> bool {
        self.non_sort_keys.contains(name)
    }
}
