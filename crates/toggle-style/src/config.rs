//! Condition definitions and configuration files.
//!
//! Definitions can be built in code or loaded from JSON or TOML:
//!
//! ```json
//! {
//!   "format": { "pretty": true },
//!   "conditions": {
//!     "hover": "&:hover",
//!     "enabledHover": { "and": ["&:enabled", "hover"] },
//!     "dark": "@media (prefers-color-scheme: dark)"
//!   }
//! }
//! ```
//!
//! ```toml
//! [format]
//! pretty = true
//!
//! [conditions]
//! hover = "&:hover"
//! enabledHover = { and = ["&:enabled", "hover"] }
//! ```

use std::fmt;
use std::path::Path;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::condition::Condition;
use crate::logging::targets;
use crate::set::ConditionSet;
use crate::stylesheet::Format;
use crate::{Error, Result};

/// An ordered list of named conditions.
///
/// Leaves are either hooks (selectors containing `&`, or `@media` /
/// `@container` / `@supports` at-rules) or names of other conditions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Definitions {
    entries: Vec<(String, Condition<String>)>,
}

impl Definitions {
    /// Create empty definitions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition, builder style.
    pub fn with(mut self, name: impl Into<String>, condition: impl Into<Condition<String>>) -> Self {
        self.insert(name, condition);
        self
    }

    /// Add a definition.
    ///
    /// Duplicate names are kept so that building a condition set can report
    /// them.
    pub fn insert(&mut self, name: impl Into<String>, condition: impl Into<Condition<String>>) {
        self.entries.push((name.into(), condition.into()));
    }

    /// Get the first definition with the given name.
    pub fn get(&self, name: &str) -> Option<&Condition<String>> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    /// Iterate over definitions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Condition<String>)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), c))
    }

    /// Get the number of definitions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no definitions.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<&str> for Condition<String> {
    fn from(value: &str) -> Self {
        Condition::Leaf(value.to_string())
    }
}

impl From<String> for Condition<String> {
    fn from(value: String) -> Self {
        Condition::Leaf(value)
    }
}

impl<K: Into<String>, C: Into<Condition<String>>> FromIterator<(K, C)> for Definitions {
    fn from_iter<I: IntoIterator<Item = (K, C)>>(iter: I) -> Self {
        let mut definitions = Definitions::new();
        for (name, condition) in iter {
            definitions.insert(name, condition);
        }
        definitions
    }
}

impl Serialize for Definitions {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, condition) in &self.entries {
            map.serialize_entry(name, condition)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Definitions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct DefinitionsVisitor;

        impl<'de> Visitor<'de> for DefinitionsVisitor {
            type Value = Definitions;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a map of condition names to conditions")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Definitions, A::Error> {
                let mut definitions = Definitions::new();
                while let Some((name, condition)) = map.next_entry::<String, Condition<String>>()? {
                    definitions.insert(name, condition);
                }
                Ok(definitions)
            }
        }

        deserializer.deserialize_map(DefinitionsVisitor)
    }
}

/// A complete configuration: output format plus root conditions.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleConfig {
    /// Formatting for emitted CSS.
    pub format: Format,
    /// Root condition definitions.
    pub conditions: Definitions,
}

impl StyleConfig {
    /// Parse a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::config(e.to_string()))
    }

    /// Parse a TOML configuration.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        toml::from_str(toml).map_err(|e| Error::config(e.to_string()))
    }

    /// Load a configuration file; `.toml` files are parsed as TOML, anything
    /// else as JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        tracing::debug!(target: targets::CONFIG, path = %path.display(), is_toml, "loading condition configuration");
        if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    /// Build the root condition set for these definitions.
    pub fn build(&self) -> Result<ConditionSet<'static>> {
        ConditionSet::new(&self.conditions)
    }
}
