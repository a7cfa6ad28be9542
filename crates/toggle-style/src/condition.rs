//! Surface condition trees.
//!
//! A [`Condition`] is what users write: a leaf, or an n-ary `and` / `or`, or a
//! `not`. Before anything is compiled the tree goes through [`normalize`],
//! which reduces it to a binary, double-negation-free form.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::{Error, Result};

/// A boolean expression over `S`.
///
/// `S` is a hook selector, a condition name, or a generated identifier,
/// depending on the compilation stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Condition<S> {
    /// A single atomic condition.
    Leaf(S),
    /// All children must hold.
    And(Vec<Condition<S>>),
    /// At least one child must hold.
    Or(Vec<Condition<S>>),
    /// The child must not hold.
    Not(Box<Condition<S>>),
}

impl<S> Condition<S> {
    /// Create a leaf condition.
    pub fn leaf(value: impl Into<S>) -> Self {
        Condition::Leaf(value.into())
    }

    /// Create an AND condition.
    pub fn and(conditions: impl IntoIterator<Item = Condition<S>>) -> Self {
        Condition::And(conditions.into_iter().collect())
    }

    /// Create an OR condition.
    pub fn or(conditions: impl IntoIterator<Item = Condition<S>>) -> Self {
        Condition::Or(conditions.into_iter().collect())
    }

    /// Create a NOT condition.
    pub fn negate(condition: Condition<S>) -> Self {
        Condition::Not(Box::new(condition))
    }

    /// A condition that normalizes to nothing.
    pub fn vacuous() -> Self {
        Condition::And(Vec::new())
    }

    /// Replace every leaf with a subtree produced by `f`.
    ///
    /// Returning [`Condition::vacuous`] from `f` drops the leaf once the
    /// result is normalized.
    pub fn try_flat_map<T, E>(
        &self,
        f: &mut impl FnMut(&S) -> std::result::Result<Condition<T>, E>,
    ) -> std::result::Result<Condition<T>, E> {
        Ok(match self {
            Condition::Leaf(value) => f(value)?,
            Condition::And(children) => Condition::And(
                children
                    .iter()
                    .map(|c| c.try_flat_map(f))
                    .collect::<std::result::Result<_, _>>()?,
            ),
            Condition::Or(children) => Condition::Or(
                children
                    .iter()
                    .map(|c| c.try_flat_map(f))
                    .collect::<std::result::Result<_, _>>()?,
            ),
            Condition::Not(inner) => Condition::Not(Box::new(inner.try_flat_map(f)?)),
        })
    }

    /// Map every leaf value.
    pub fn map<T>(&self, f: &mut impl FnMut(&S) -> T) -> Condition<T> {
        match self {
            Condition::Leaf(value) => Condition::Leaf(f(value)),
            Condition::And(children) => Condition::And(children.iter().map(|c| c.map(f)).collect()),
            Condition::Or(children) => Condition::Or(children.iter().map(|c| c.map(f)).collect()),
            Condition::Not(inner) => Condition::Not(Box::new(inner.map(f))),
        }
    }

    /// Visit leaves in left-to-right order.
    pub fn leaves(&self) -> Vec<&S> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a S>) {
        match self {
            Condition::Leaf(value) => out.push(value),
            Condition::And(children) | Condition::Or(children) => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
            Condition::Not(inner) => inner.collect_leaves(out),
        }
    }
}

impl Condition<String> {
    /// Parse a condition from a JSON value.
    ///
    /// Strings are leaves; objects must have exactly one of the keys `and`,
    /// `or` (arrays) or `not` (a condition).
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        Condition::deserialize(value).map_err(|e| Error::invalid_condition(e.to_string()))
    }
}

/// Normalize a condition tree.
///
/// - `not not x` collapses to `x`.
/// - `and` / `or` children that normalize to nothing are dropped; no survivors
///   means the whole node is dropped, one survivor replaces the node.
/// - Two or more survivors are folded to the right: `op(a, op(b, c))`.
///
/// Returns `None` when the condition is vacuous. The result always has binary
/// `and` / `or` nodes and never a `not` directly inside a `not`, so
/// normalizing it again is a no-op.
pub fn normalize<S: Clone>(condition: &Condition<S>) -> Option<Condition<S>> {
    match condition {
        Condition::Leaf(value) => Some(Condition::Leaf(value.clone())),
        Condition::Not(inner) => match inner.as_ref() {
            Condition::Not(value) => normalize(value),
            other => match normalize(other)? {
                Condition::Not(value) => Some(*value),
                value => Some(Condition::Not(Box::new(value))),
            },
        },
        Condition::And(children) => fold_right(children, Condition::And),
        Condition::Or(children) => fold_right(children, Condition::Or),
    }
}

fn fold_right<S: Clone>(
    children: &[Condition<S>],
    make: fn(Vec<Condition<S>>) -> Condition<S>,
) -> Option<Condition<S>> {
    let mut survivors: Vec<_> = children.iter().filter_map(normalize).collect();
    let last = survivors.pop()?;
    Some(
        survivors
            .into_iter()
            .rev()
            .fold(last, |acc, child| make(vec![child, acc])),
    )
}

impl<S: fmt::Display> fmt::Display for Condition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (op, children) = match self {
            Condition::Leaf(value) => return write!(f, "{}", value),
            Condition::Not(inner) => return write!(f, "not({})", inner),
            Condition::And(children) => ("and", children),
            Condition::Or(children) => ("or", children),
        };
        write!(f, "{}(", op)?;
        for (i, c) in children.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, ")")
    }
}

impl<S: Serialize> Serialize for Condition<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> std::result::Result<Ser::Ok, Ser::Error> {
        match self {
            Condition::Leaf(value) => value.serialize(serializer),
            Condition::And(children) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("and", children)?;
                map.end()
            }
            Condition::Or(children) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("or", children)?;
                map.end()
            }
            Condition::Not(inner) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("not", inner)?;
                map.end()
            }
        }
    }
}

impl<'de, S: Deserialize<'de>> Deserialize<'de> for Condition<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(ConditionVisitor(PhantomData))
    }
}

struct ConditionVisitor<S>(PhantomData<S>);

const OPERATORS: &[&str] = &["and", "or", "not"];

impl<'de, S: Deserialize<'de>> Visitor<'de> for ConditionVisitor<S> {
    type Value = Condition<S>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a string or an object with one of `and`, `or`, `not`")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<Self::Value, E> {
        S::deserialize(de::value::StrDeserializer::<E>::new(value)).map(Condition::Leaf)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
        let key: String = map
            .next_key()?
            .ok_or_else(|| de::Error::custom("empty condition object"))?;
        let condition = match key.as_str() {
            "and" => Condition::And(map.next_value()?),
            "or" => Condition::Or(map.next_value()?),
            "not" => Condition::Not(Box::new(map.next_value()?)),
            other => return Err(de::Error::unknown_field(other, OPERATORS)),
        };
        if let Some(extra) = map.next_key::<String>()? {
            return Err(de::Error::custom(format!(
                "condition mixes `{}` with `{}`",
                key, extra
            )));
        }
        Ok(condition)
    }
}
