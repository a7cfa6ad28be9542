//! Condition sets.
//!
//! A [`ConditionSet`] owns a list of named, compiled conditions. A root set is
//! built once from configuration; nested sets are built per use with
//! [`ConditionSet::add`] and borrow their parent for name resolution. Lookups
//! check the local set first and then walk up the parent chain. A nested set
//! never changes its parent.
//!
//! Generated identifiers are derived from the root configuration's hash and
//! the nesting depth, so identical selectors in independently configured sets
//! get different ids. Hashes are lowercase base-36 and the suffixes appended
//! to composite nodes are uppercase, so synthetic ids never collide with
//! hashed ones.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::compile::compile;
use crate::condition::{normalize, Condition};
use crate::config::Definitions;
use crate::expression::{build_expression, LogicalExpression};
use crate::hash::create_hash;
use crate::hook::Hook;
use crate::logging::targets;
use crate::stylesheet::{Declaration, StyleSheet};
use crate::{Error, Result};

/// Names that cannot be used for conditions.
pub const RESERVED_NAMES: &[&str] = &["box", "initial"];

/// Opaque identifier of a hook's toggle pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HookId(String);

impl HookId {
    /// Wrap an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for HookId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Check that a condition name is alphanumeric, starts with a letter and is
/// not reserved.
pub fn validate_condition_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    match chars.next() {
        None => return Err(Error::invalid_name(name, "name is empty")),
        Some(c) if !c.is_ascii_alphabetic() => {
            return Err(Error::invalid_name(name, "must start with a letter"));
        }
        Some(_) => {}
    }
    if !chars.all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::invalid_name(name, "must contain only letters and digits"));
    }
    if RESERVED_NAMES.contains(&name) {
        return Err(Error::invalid_name(name, "name is reserved"));
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct HookEntry {
    hook: Hook,
    id: HookId,
}

#[derive(Debug, Clone)]
struct Compiled {
    /// Toggle id reflecting the whole condition.
    toggle: String,
    /// Declarations for composite nodes, children first.
    declarations: Vec<Declaration>,
    /// Normalized condition over hooks, with references expanded.
    hooks: Condition<HookId>,
    /// Expression used to build runtime `var()` chains.
    expression: LogicalExpression<HookId>,
}

#[derive(Debug, Clone)]
struct NamedCondition {
    name: String,
    definition: Condition<String>,
    /// `None` when the condition is vacuous.
    compiled: Option<Compiled>,
}

/// A scope of named conditions.
#[derive(Debug)]
pub struct ConditionSet<'p> {
    parent: Option<&'p ConditionSet<'p>>,
    hash: String,
    depth: u32,
    hooks: Vec<HookEntry>,
    conditions: Vec<NamedCondition>,
    index: HashMap<String, usize>,
}

/// Create a root set, or a nested set when `parent` is given.
pub fn create_condition_set<'p>(
    definitions: &Definitions,
    parent: Option<&'p ConditionSet<'p>>,
) -> Result<ConditionSet<'p>> {
    match parent {
        Some(parent) => parent.add(definitions),
        None => ConditionSet::new(definitions),
    }
}

impl ConditionSet<'static> {
    /// Build a root condition set.
    pub fn new(definitions: &Definitions) -> Result<Self> {
        let hash = create_hash(definitions)?;
        ConditionSet::build(None, hash, 0, definitions)
    }
}

impl<'p> ConditionSet<'p> {
    /// Build a nested set whose definitions may reference this set's
    /// conditions (and any ancestor's).
    pub fn add(&self, definitions: &Definitions) -> Result<ConditionSet<'_>> {
        ConditionSet::build(Some(self), self.hash.clone(), self.depth + 1, definitions)
    }

    fn build(
        parent: Option<&'p ConditionSet<'p>>,
        hash: String,
        depth: u32,
        definitions: &Definitions,
    ) -> Result<Self> {
        let mut set = ConditionSet {
            parent,
            hash,
            depth,
            hooks: Vec::new(),
            conditions: Vec::new(),
            index: HashMap::new(),
        };
        let mut ids = set.ancestor_ids();

        for (name, definition) in definitions.iter() {
            validate_condition_name(name)?;
            if set.index.contains_key(name) {
                return Err(Error::DuplicateCondition {
                    name: name.to_string(),
                });
            }

            let compiled = set.compile_definition(name, definition, &mut ids)?;
            if compiled.is_none() {
                tracing::warn!(
                    target: targets::SET,
                    condition = name,
                    depth = set.depth,
                    "condition is vacuous and will never apply"
                );
            }

            set.index.insert(name.to_string(), set.conditions.len());
            set.conditions.push(NamedCondition {
                name: name.to_string(),
                definition: definition.clone(),
                compiled,
            });
        }

        tracing::debug!(
            target: targets::SET,
            hash = %set.hash,
            depth = set.depth,
            conditions = set.conditions.len(),
            hooks = set.hooks.len(),
            "built condition set"
        );
        Ok(set)
    }

    fn compile_definition(
        &mut self,
        name: &str,
        definition: &Condition<String>,
        ids: &mut HashMap<String, String>,
    ) -> Result<Option<Compiled>> {
        // References expand to the referenced tree for runtime expressions...
        let hook_level = definition.try_flat_map(&mut |leaf: &String| -> Result<Condition<HookId>> {
            if Hook::is_hook_syntax(leaf) {
                return Ok(Condition::Leaf(self.intern_hook(leaf, ids)?));
            }
            let named = self
                .lookup(leaf)
                .ok_or_else(|| Error::unknown_condition(leaf.as_str()))?;
            Ok(named
                .compiled
                .as_ref()
                .map_or_else(Condition::vacuous, |c| c.hooks.clone()))
        })?;
        // ...but point at the referenced toggle pair in the toggle network.
        let toggle_level = definition.try_flat_map(&mut |leaf: &String| -> Result<Condition<String>> {
            if Hook::is_hook_syntax(leaf) {
                return Ok(Condition::Leaf(self.intern_hook(leaf, ids)?.to_string()));
            }
            let named = self
                .lookup(leaf)
                .ok_or_else(|| Error::unknown_condition(leaf.as_str()))?;
            Ok(named
                .compiled
                .as_ref()
                .map_or_else(Condition::vacuous, |c| Condition::Leaf(c.toggle.clone())))
        })?;

        let Some(hooks) = normalize(&hook_level) else {
            return Ok(None);
        };
        let Some(expression) = LogicalExpression::from_condition(&hooks) else {
            return Ok(None);
        };

        let base_id = create_hash(&(name, &self.hash, self.depth))?;
        let Some(compiled) = compile(&toggle_level, &base_id) else {
            return Ok(None);
        };
        if !compiled.declarations.is_empty() {
            claim_id(ids, &base_id, format!("condition '{}'", name))?;
        }

        Ok(Some(Compiled {
            toggle: compiled.id,
            declarations: compiled.declarations,
            hooks,
            expression,
        }))
    }

    fn intern_hook(&mut self, text: &str, ids: &mut HashMap<String, String>) -> Result<HookId> {
        let existing = self.chain().find_map(|set| {
            set.hooks
                .iter()
                .find(|entry| entry.hook.as_str() == text)
                .map(|entry| entry.id.clone())
        });
        if let Some(id) = existing {
            return Ok(id);
        }

        let hook = Hook::parse(text)?;
        let id = HookId(create_hash(&(text, &self.hash, self.depth))?);
        claim_id(ids, id.as_str(), format!("hook '{}'", text))?;
        tracing::trace!(target: targets::SET, hook = text, id = %id, depth = self.depth, "registered hook");
        self.hooks.push(HookEntry {
            hook,
            id: id.clone(),
        });
        Ok(id)
    }

    /// Identifiers already used along the parent chain.
    fn ancestor_ids(&self) -> HashMap<String, String> {
        let mut ids = HashMap::new();
        for set in std::iter::successors(self.parent, |set| set.parent) {
            for entry in &set.hooks {
                ids.insert(entry.id.to_string(), format!("hook '{}'", entry.hook));
            }
            for condition in &set.conditions {
                if let Some(compiled) = &condition.compiled {
                    if !compiled.declarations.is_empty() {
                        ids.insert(compiled.toggle.clone(), format!("condition '{}'", condition.name));
                    }
                }
            }
        }
        ids
    }

    /// This set followed by its ancestors, nearest first.
    fn chain(&self) -> impl Iterator<Item = &ConditionSet<'p>> {
        std::iter::successors(Some(self), |set| set.parent)
    }

    fn lookup(&self, name: &str) -> Option<&NamedCondition> {
        self.chain()
            .find_map(|set| set.index.get(name).map(|&i| &set.conditions[i]))
    }

    /// Hash shared by this set and every set nested under its root.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Nesting depth; 0 for a root set.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// The set this one was nested under.
    pub fn parent(&self) -> Option<&'p ConditionSet<'p>> {
        self.parent
    }

    /// Check if a condition name is visible from this set.
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// The definition a visible name resolves to.
    pub fn definition(&self, name: &str) -> Option<&Condition<String>> {
        self.lookup(name).map(|c| &c.definition)
    }

    /// Toggle id of a visible condition.
    ///
    /// Returns `None` for unknown names and for vacuous conditions.
    pub fn condition_id(&self, name: &str) -> Option<&str> {
        self.lookup(name)?
            .compiled
            .as_ref()
            .map(|c| c.toggle.as_str())
    }

    /// Id of a hook registered in this set or an ancestor.
    pub fn hook_id(&self, hook: &str) -> Option<&HookId> {
        self.chain().find_map(|set| {
            set.hooks
                .iter()
                .find(|entry| entry.hook.as_str() == hook)
                .map(|entry| &entry.id)
        })
    }

    /// Hooks introduced by this set.
    pub fn hooks(&self) -> impl Iterator<Item = (&Hook, &HookId)> {
        self.hooks.iter().map(|entry| (&entry.hook, &entry.id))
    }

    /// Every visible condition name, root set first, without duplicates.
    pub fn condition_names(&self) -> Vec<&str> {
        let mut sets: Vec<_> = self.chain().collect();
        sets.reverse();

        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for set in sets {
            for condition in &set.conditions {
                if seen.insert(condition.name.as_str()) {
                    names.push(condition.name.as_str());
                }
            }
        }
        names
    }

    /// The hook-level expression of a visible condition.
    ///
    /// `Ok(None)` means the condition is vacuous.
    pub fn expression(&self, name: &str) -> Result<Option<&LogicalExpression<HookId>>> {
        let condition = self
            .lookup(name)
            .ok_or_else(|| Error::unknown_condition(name))?;
        Ok(condition.compiled.as_ref().map(|c| &c.expression))
    }

    /// Build the CSS value that is `if_true` while the named condition holds
    /// and `if_false` otherwise.
    ///
    /// A vacuous condition never holds, so `if_false` is returned unchanged.
    pub fn conditional_expression(&self, name: &str, if_true: &str, if_false: &str) -> Result<String> {
        match self.expression(name)? {
            Some(expression) => Ok(build_expression(expression, if_true, if_false)),
            None => Ok(if_false.to_string()),
        }
    }

    /// Inline declarations for the composite conditions of nested sets,
    /// outermost nested set first.
    ///
    /// A root set's composite toggles live in its style sheet, so this is
    /// empty for a root set.
    pub fn declarations(&self) -> Vec<Declaration> {
        let Some(parent) = self.parent else {
            return Vec::new();
        };
        let mut declarations = parent.declarations();
        for condition in &self.conditions {
            if let Some(compiled) = &condition.compiled {
                declarations.extend(compiled.declarations.iter().cloned());
            }
        }
        declarations
    }

    /// The style sheet for this set merged with every ancestor's.
    pub fn style_sheet(&self) -> StyleSheet {
        let mut sheet = match self.parent {
            Some(parent) => parent.style_sheet(),
            None => StyleSheet::new(),
        };

        let mut own = StyleSheet::new();
        for entry in &self.hooks {
            own.add_hook(&entry.hook, &entry.id);
        }
        if self.parent.is_none() {
            for condition in &self.conditions {
                if let Some(compiled) = &condition.compiled {
                    for declaration in &compiled.declarations {
                        own.add_default(declaration.clone());
                    }
                }
            }
        }
        sheet.merge(&own);
        sheet
    }
}

fn claim_id(ids: &mut HashMap<String, String>, id: &str, source: String) -> Result<()> {
    match ids.entry(id.to_string()) {
        Entry::Occupied(entry) => Err(Error::IdentifierCollision {
            id: id.to_string(),
            first: entry.get().clone(),
            second: source,
        }),
        Entry::Vacant(entry) => {
            entry.insert(source);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stylesheet::Format;

    fn hover_set() -> ConditionSet<'static> {
        ConditionSet::new(&Definitions::new().with("hover", "&:hover")).unwrap()
    }

    #[test]
    fn name_validation() {
        assert!(validate_condition_name("hover").is_ok());
        assert!(validate_condition_name("enabledHover2").is_ok());
        assert!(validate_condition_name("").is_err());
        assert!(validate_condition_name("2x").is_err());
        assert!(validate_condition_name("has-dash").is_err());
        assert!(validate_condition_name("box").is_err());
        assert!(validate_condition_name("initial").is_err());
    }

    #[test]
    fn invalid_names_fail_construction() {
        let err = ConditionSet::new(&Definitions::new().with("initial", "&:hover")).unwrap_err();
        assert!(matches!(err, Error::InvalidConditionName { .. }));
    }

    #[test]
    fn ids_are_derived_from_configuration() {
        let set = hover_set();
        assert_eq!(set.hash(), "h1qham");
        assert_eq!(set.depth(), 0);
        assert_eq!(set.condition_id("hover"), Some("fgj6hm"));
        assert_eq!(set.hook_id("&:hover"), Some(&HookId::new("fgj6hm")));
    }

    #[test]
    fn simple_condition_expression() {
        let set = hover_set();
        assert_eq!(
            set.conditional_expression("hover", "red", "blue").unwrap(),
            "var(--fgj6hm-1, red) var(--fgj6hm-0, blue)"
        );
    }

    #[test]
    fn composite_condition_gets_its_own_toggle() {
        let set = ConditionSet::new(
            &Definitions::new().with("notHover", Condition::<String>::negate("&:hover".into())),
        )
        .unwrap();
        assert_eq!(set.hash(), "a3l5idc");
        assert_eq!(set.condition_id("notHover"), Some("wpulz0"));
        assert_eq!(
            set.style_sheet().render(&Format::compact()),
            "*{--a74x4zx-0:initial;--a74x4zx-1:;--wpulz0-0:var(--a74x4zx-1);--wpulz0-1:var(--a74x4zx-0);}\
             *:hover{--a74x4zx-0:;--a74x4zx-1:initial;}"
        );
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let definitions = Definitions::new().with("a", "&.a").with("a", "&.b");
        assert!(matches!(
            ConditionSet::new(&definitions),
            Err(Error::DuplicateCondition { .. })
        ));
    }

    #[test]
    fn unknown_references_are_rejected() {
        let definitions = Definitions::new().with("a", Condition::<String>::negate("missing".into()));
        assert!(matches!(
            ConditionSet::new(&definitions),
            Err(Error::UnknownCondition { .. })
        ));
    }

    #[test]
    fn forward_references_are_unknown() {
        let definitions = Definitions::new().with("a", "b").with("b", "&.b");
        assert!(ConditionSet::new(&definitions).is_err());
    }

    #[test]
    fn invalid_hooks_are_rejected() {
        let definitions = Definitions::new().with("a", "&{color:red}");
        assert!(matches!(
            ConditionSet::new(&definitions),
            Err(Error::InvalidHook { .. })
        ));
    }

    #[test]
    fn references_reuse_toggles() {
        let definitions = Definitions::new()
            .with("hover", "&:hover")
            .with("alias", "hover")
            .with("notHover", Condition::<String>::negate("hover".into()));
        let set = ConditionSet::new(&definitions).unwrap();
        assert_eq!(set.condition_id("alias"), set.condition_id("hover"));
        assert_eq!(set.hooks().count(), 1);
        assert_eq!(
            set.conditional_expression("alias", "a", "b").unwrap(),
            set.conditional_expression("hover", "a", "b").unwrap()
        );
        assert_eq!(
            set.conditional_expression("notHover", "a", "b").unwrap(),
            set.conditional_expression("hover", "b", "a").unwrap()
        );
    }

    #[test]
    fn vacuous_conditions_never_apply() {
        let definitions = Definitions::new()
            .with("hover", "&:hover")
            .with("nothing", Condition::<String>::or([]))
            .with("hoverOrNothing", Condition::<String>::or(["hover".into(), "nothing".into()]));
        let set = ConditionSet::new(&definitions).unwrap();
        assert_eq!(set.condition_id("nothing"), None);
        assert!(set.contains("nothing"));
        assert_eq!(set.conditional_expression("nothing", "red", "blue").unwrap(), "blue");
        assert_eq!(set.condition_id("hoverOrNothing"), set.condition_id("hover"));
    }

    #[test]
    fn unknown_name_in_expression() {
        let set = hover_set();
        assert!(matches!(
            set.conditional_expression("focus", "a", "b"),
            Err(Error::UnknownCondition { .. })
        ));
    }

    #[test]
    fn nested_sets_resolve_through_parent() {
        let root = hover_set();
        let local = root
            .add(&Definitions::new().with(
                "activeHover",
                Condition::<String>::and(["hover".into(), "&.active".into()]),
            ))
            .unwrap();

        assert_eq!(local.depth(), 1);
        assert_eq!(local.hash(), root.hash());
        assert_eq!(local.condition_names(), vec!["hover", "activeHover"]);
        assert_eq!(local.condition_id("hover"), root.condition_id("hover"));
        assert!(!root.contains("activeHover"));

        // The composite toggle is inline, not part of the root's sheet.
        let declarations = local.declarations();
        assert_eq!(declarations.len(), 2);
        assert!(root.declarations().is_empty());

        // The new hook is added to the merged sheet.
        let sheet = local.style_sheet();
        assert_eq!(sheet.rules().len(), 2);
        assert_eq!(root.style_sheet().rules().len(), 1);
    }

    #[test]
    fn nested_hook_ids_depend_on_depth() {
        let root = ConditionSet::new(&Definitions::new().with("a", "&.a")).unwrap();
        let local = root.add(&Definitions::new().with("b", "&.b")).unwrap();
        let expected = create_hash(&("&.b", root.hash(), 1u32)).unwrap();
        assert_eq!(local.hook_id("&.b").map(HookId::as_str), Some(expected.as_str()));
        // Hooks already known to an ancestor are reused.
        let again = local.add(&Definitions::new().with("c", "&.a")).unwrap();
        assert_eq!(again.hook_id("&.a"), root.hook_id("&.a"));
        assert_eq!(again.hooks().count(), 0);
    }

    #[test]
    fn local_names_shadow_ancestors() {
        let root = hover_set();
        let local = root.add(&Definitions::new().with("hover", "&:focus")).unwrap();
        assert_ne!(local.condition_id("hover"), root.condition_id("hover"));
        assert_eq!(local.condition_names(), vec!["hover"]);
        assert_eq!(local.definition("hover"), Some(&Condition::leaf("&:focus")));
    }

    #[test]
    fn claim_id_detects_collisions() {
        let mut ids = HashMap::new();
        claim_id(&mut ids, "x", "hook 'a'".to_string()).unwrap();
        let err = claim_id(&mut ids, "x", "hook 'b'".to_string()).unwrap_err();
        assert!(matches!(err, Error::IdentifierCollision { .. }));
    }

    #[test]
    fn create_condition_set_with_and_without_parent() {
        let root = create_condition_set(&Definitions::new().with("a", "&.a"), None).unwrap();
        let nested = create_condition_set(&Definitions::new().with("b", "a"), Some(&root)).unwrap();
        assert_eq!(nested.parent().map(ConditionSet::depth), Some(0));
        assert_eq!(nested.condition_id("b"), root.condition_id("a"));
    }
}
