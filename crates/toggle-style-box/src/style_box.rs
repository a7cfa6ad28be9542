//! Resolving style props against a condition set.

use std::collections::HashMap;
use std::fmt;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;
use toggle_style::ConditionSet;

use crate::logging::targets;
use crate::value::stringify_value;
use crate::{Error, Result};

/// Prefix of props that apply unconditionally.
pub const INITIAL_PREFIX: &str = "initial";

/// Value used for a conditional property when nothing else sets it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Fallback {
    /// `revert-layer`: fall back to the previous cascade layer.
    #[default]
    RevertLayer,
    /// `unset`
    Unset,
}

impl Fallback {
    /// The CSS keyword.
    pub fn keyword(&self) -> &'static str {
        match self {
            Fallback::RevertLayer => "revert-layer",
            Fallback::Unset => "unset",
        }
    }
}

/// Expands one style prop into the CSS properties it sets.
pub trait PropertyResolver: Send + Sync {
    /// Resolve `property: value` into concrete declarations.
    fn resolve(&self, property: &str, value: &Value) -> Vec<(String, Value)>;
}

/// Uses every prop as the CSS property of the same name.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

impl PropertyResolver for IdentityResolver {
    fn resolve(&self, property: &str, value: &Value) -> Vec<(String, Value)> {
        vec![(property.to_string(), value.clone())]
    }
}

/// Props that expand to several properties, e.g. `padding-x` to
/// `padding-left` and `padding-right`. Other props resolve to themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct AliasTable {
    aliases: HashMap<String, Vec<String>>,
}

impl AliasTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an alias, builder style.
    pub fn with<I, S>(mut self, prop: impl Into<String>, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases
            .insert(prop.into(), properties.into_iter().map(Into::into).collect());
        self
    }
}

impl PropertyResolver for AliasTable {
    fn resolve(&self, property: &str, value: &Value) -> Vec<(String, Value)> {
        match self.aliases.get(property) {
            Some(properties) => properties
                .iter()
                .map(|p| (p.clone(), value.clone()))
                .collect(),
            None => IdentityResolver.resolve(property, value),
        }
    }
}

/// Ordered inline style declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleMap {
    entries: Vec<(String, String)>,
}

impl StyleMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a property's value.
    pub fn get(&self, property: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    /// Set a property, keeping its position if already present.
    pub fn set(&mut self, property: impl Into<String>, value: impl Into<String>) {
        let property = property.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(p, _)| *p == property) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((property, value)),
        }
    }

    /// Set a property and move it after every other property.
    pub fn set_last(&mut self, property: impl Into<String>, value: impl Into<String>) {
        let property = property.into();
        self.remove(&property);
        self.entries.push((property, value.into()));
    }

    /// Remove a property, returning its value.
    pub fn remove(&mut self, property: &str) -> Option<String> {
        let index = self.entries.iter().position(|(p, _)| p == property)?;
        Some(self.entries.remove(index).1)
    }

    /// Iterate in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, v)| (p.as_str(), v.as_str()))
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as the contents of a `style` attribute.
    pub fn to_css(&self) -> String {
        self.entries
            .iter()
            .map(|(p, v)| format!("{}: {};", p, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl<'de> Deserialize<'de> for StyleMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct StyleMapVisitor;

        impl<'de> Visitor<'de> for StyleMapVisitor {
            type Value = StyleMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a map of CSS properties to strings or numbers")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<StyleMap, A::Error> {
                let mut style = StyleMap::new();
                while let Some((property, value)) = map.next_entry::<String, Value>()? {
                    let css = stringify_value(&property, &value).ok_or_else(|| {
                        serde::de::Error::custom(format!("`{property}` has no CSS value"))
                    })?;
                    style.set(property, css);
                }
                Ok(style)
            }
        }

        deserializer.deserialize_map(StyleMapVisitor)
    }
}

/// Configuration shared by every use of a [`StyleBox`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoxConfig {
    /// Value for conditional properties without a base value.
    pub fallback: Fallback,
    /// Props that expand to several properties.
    pub aliases: AliasTable,
    /// Style applied before any prop.
    pub default_style: StyleMap,
}

impl BoxConfig {
    /// Parse a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::config(e.to_string()))
    }

    /// Parse a TOML configuration.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        toml::from_str(toml).map_err(|e| Error::config(e.to_string()))
    }
}

/// The output of [`StyleBox::resolve`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedStyle {
    /// Inline style, in application order.
    pub style: StyleMap,
    /// Props that are not style props, untouched.
    pub forward: Vec<(String, Value)>,
}

/// Turns `initial:*` and `<condition>:*` props into an inline style.
pub struct StyleBox {
    fallback: Fallback,
    default_style: StyleMap,
    resolver: Box<dyn PropertyResolver>,
}

impl fmt::Debug for StyleBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleBox")
            .field("fallback", &self.fallback)
            .field("default_style", &self.default_style)
            .finish_non_exhaustive()
    }
}

impl Default for StyleBox {
    fn default() -> Self {
        Self::new(BoxConfig::default())
    }
}

impl StyleBox {
    /// Create a box from configuration, resolving props through its aliases.
    pub fn new(config: BoxConfig) -> Self {
        Self {
            fallback: config.fallback,
            default_style: config.default_style,
            resolver: Box::new(config.aliases),
        }
    }

    /// Replace the property resolver.
    pub fn with_resolver(mut self, resolver: impl PropertyResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// The configured fallback.
    pub fn fallback(&self) -> Fallback {
        self.fallback
    }

    /// Resolve props into an inline style using `set`.
    ///
    /// The style starts with the set's inline toggle declarations and the
    /// default style. `initial:` props are applied first. A
    /// `<condition>:<property>` prop wraps its value in a conditional
    /// expression whose false branch is the property's current value (or the
    /// fallback keyword), and moves the property to the end. Every other prop
    /// is forwarded.
    pub fn resolve(&self, set: &ConditionSet<'_>, props: &[(String, Value)]) -> Result<ResolvedStyle> {
        let mut style = StyleMap::new();
        for declaration in set.declarations() {
            style.set(declaration.property, declaration.value);
        }
        for (property, value) in self.default_style.iter() {
            style.set(property, value);
        }

        let mut ordered: Vec<_> = props.iter().collect();
        ordered.sort_by_key(|(key, _)| !is_initial_prop(key));

        let mut forward = Vec::new();
        for (key, value) in ordered {
            let Some((prefix, prop)) = key.split_once(':').filter(|(_, prop)| !prop.is_empty()) else {
                forward.push((key.clone(), value.clone()));
                continue;
            };
            let condition = if prefix == INITIAL_PREFIX {
                None
            } else if set.contains(prefix) {
                Some(prefix)
            } else {
                forward.push((key.clone(), value.clone()));
                continue;
            };

            for (property, value) in self.resolver.resolve(prop, value) {
                let Some(css) = stringify_value(&property, &value) else {
                    tracing::trace!(target: targets::RESOLVE, prop = %key, property = %property, "skipping value without CSS form");
                    continue;
                };
                match condition {
                    None => style.set(property, css),
                    Some(condition) => {
                        let fallback = style
                            .get(&property)
                            .unwrap_or(self.fallback.keyword())
                            .to_string();
                        let value = set.conditional_expression(condition, &css, &fallback)?;
                        style.set_last(property, value);
                    }
                }
            }
        }

        tracing::debug!(
            target: targets::RESOLVE,
            properties = style.len(),
            forwarded = forward.len(),
            "resolved style props"
        );
        Ok(ResolvedStyle { style, forward })
    }
}

fn is_initial_prop(key: &str) -> bool {
    key.split_once(':')
        .is_some_and(|(prefix, _)| prefix == INITIAL_PREFIX)
}
