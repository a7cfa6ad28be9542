//! A tiny model of custom-property resolution on one element.
//!
//! Only what the toggle network relies on is modelled: `initial` and missing
//! properties are guaranteed-invalid, `var()` substitutes a valid value or
//! falls back, and a reference to an invalid property without a fallback makes
//! the whole value invalid. Cycles are invalid too.

#![allow(dead_code)]

use std::collections::HashMap;

use toggle_style::hook::Hook;
use toggle_style::{Declaration, StyleSheet};

/// Declared custom properties of one element.
pub struct Element {
    declared: HashMap<String, String>,
}

impl Element {
    /// Apply the sheet's `*` block, the rules whose hook is active, then
    /// inline declarations.
    pub fn new(sheet: &StyleSheet, inline: &[Declaration], active: impl Fn(&Hook) -> bool) -> Self {
        let mut declared = HashMap::new();
        for declaration in sheet.defaults() {
            declared.insert(declaration.property.clone(), declaration.value.clone());
        }
        for rule in sheet.rules() {
            if active(&rule.hook) {
                for declaration in &rule.declarations {
                    declared.insert(declaration.property.clone(), declaration.value.clone());
                }
            }
        }
        for declaration in inline {
            declared.insert(declaration.property.clone(), declaration.value.clone());
        }
        Self { declared }
    }

    /// Element whose active hooks are given by their source text.
    pub fn with_hooks(sheet: &StyleSheet, inline: &[Declaration], hooks: &[&str]) -> Self {
        Self::new(sheet, inline, |hook| hooks.contains(&hook.as_str()))
    }

    /// Computed value of a property; `None` when guaranteed-invalid.
    pub fn computed(&self, name: &str) -> Option<String> {
        self.computed_with(name, &mut Vec::new())
    }

    fn computed_with(&self, name: &str, stack: &mut Vec<String>) -> Option<String> {
        if stack.iter().any(|n| n == name) {
            return None;
        }
        let raw = self.declared.get(name)?;
        if raw.trim() == "initial" {
            return None;
        }
        stack.push(name.to_string());
        let value = self.substitute(raw, stack);
        stack.pop();
        value
    }

    fn substitute(&self, text: &str, stack: &mut Vec<String>) -> Option<String> {
        let mut out = String::new();
        let mut rest = text;
        while let Some(start) = rest.find("var(") {
            out.push_str(&rest[..start]);
            let body_start = start + 4;
            let close = matching_paren(rest, body_start);
            let body = &rest[body_start..close];
            let (name, fallback) = match body.find(',') {
                Some(i) => (body[..i].trim(), Some(&body[i + 1..])),
                None => (body.trim(), None),
            };
            let value = match self.computed_with(name, stack) {
                Some(value) => value,
                None => self.substitute(fallback?, stack)?,
            };
            out.push_str(&value);
            rest = &rest[close + 1..];
        }
        out.push_str(rest);
        Some(out)
    }

    /// Resolve a value the way it would be used in a regular property.
    pub fn resolve(&self, value: &str) -> Option<String> {
        self.substitute(value, &mut Vec::new())
            .map(|v| v.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    /// Read a toggle pair, checking that exactly one side is invalid.
    pub fn toggle(&self, id: &str) -> bool {
        let off = self.computed(&format!("--{id}-0")).is_none();
        let on = self.computed(&format!("--{id}-1")).is_none();
        assert_ne!(off, on, "toggle pair for '{id}' is inconsistent");
        on
    }
}

fn matching_paren(text: &str, from: usize) -> usize {
    let mut depth = 1;
    for (i, c) in text[from..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return from + i;
                }
            }
            _ => {}
        }
    }
    panic!("unbalanced parentheses in '{text}'");
}

/// Every subset of `items`, as lists.
pub fn subsets<'a>(items: &[&'a str]) -> Vec<Vec<&'a str>> {
    (0..1usize << items.len())
        .map(|mask| {
            items
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, item)| *item)
                .collect()
        })
        .collect()
}
