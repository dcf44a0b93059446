//! Layered configuration for resource nodes
//!
//! Settings are declared as an ordered list of [`ConfigFragment`]s, from the
//! most general to the most derived, and merged together with explicit
//! [`Overrides`] into one read-only [`Settings`] record:
//!
//! 1. fragments are applied in order, so a derived fragment wins over the
//!    fragments declared before it;
//! 2. overrides win over every fragment, but only for keys some fragment
//!    declares; other override keys are handed back untouched;
//! 3. keys starting with `_` are reserved and never merged.

use crate::error::{Error, Result};
use crate::http::Credentials;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Prefix marking names that are never settings or addresses
pub const RESERVED_PREFIX: char = '_';

/// Format used when nothing else is declared
pub const DEFAULT_FORMAT: &str = "json";

/// One layer of declared defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigFragment {
    entries: BTreeMap<String, Value>,
}

impl ConfigFragment {
    /// Create an empty fragment
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `key` with a default value
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// The defaults every node starts from
    pub fn builtin() -> Self {
        Self::new()
            .with("authentication", Value::Null)
            .with("base_url", Value::Null)
            .with("format", DEFAULT_FORMAT)
    }

    /// Look up a declared value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Iterate over the non-reserved entries
    pub fn settings(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries
            .iter()
            .filter(|(key, _)| !key.starts_with(RESERVED_PREFIX))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Explicit per-construction overrides
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    entries: BTreeMap<String, Value>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override `key` with `value`
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    fn take(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }
}

/// Merged settings for one node
///
/// A declared key that is not one of these fields is a configuration error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Address of the node
    #[serde(default)]
    pub base_url: Option<String>,
    /// Codec selection
    #[serde(default = "default_format")]
    pub format: String,
    /// Credentials handed to the transport
    #[serde(default)]
    pub authentication: Option<Credentials>,
}

fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: None,
            format: default_format(),
            authentication: None,
        }
    }
}

/// Result of a resolution: the settings plus override keys nobody declared
#[derive(Debug, Clone)]
pub struct Resolved {
    pub settings: Settings,
    pub passthrough: Overrides,
}

/// Merge `fragments` (most general first) with `overrides`
pub fn resolve(fragments: &[ConfigFragment], mut overrides: Overrides) -> Result<Resolved> {
    let mut merged = Map::new();

    for fragment in fragments {
        for (key, value) in fragment.settings() {
            merged.insert(key.clone(), value.clone());
        }
    }

    let declared: Vec<String> = merged.keys().cloned().collect();
    for key in declared {
        if let Some(value) = overrides.take(&key) {
            merged.insert(key, value);
        }
    }

    tracing::trace!(
        keys = ?merged.keys().collect::<Vec<_>>(),
        passthrough = overrides.len(),
        "resolved node settings"
    );

    let settings = serde_json::from_value(Value::Object(merged)).map_err(|e| {
        Error::Configuration {
            message: format!("Invalid settings: {}", e),
            source: Some(Box::new(e)),
        }
    })?;

    Ok(Resolved {
        settings,
        passthrough: overrides,
    })
}
