//! Style sheet emission.
//!
//! A [`StyleSheet`] holds the `*` block that gives every toggle its default
//! state, followed by one scoped rule per hook that flips the hook's pair when
//! the hook's selector or at-rule matches. Rendering is a pure function of the
//! sheet and an explicit [`Format`].

use std::fmt;

use serde::Deserialize;

use crate::compile::toggle_property;
use crate::hash::hash_str;
use crate::hook::Hook;
use crate::set::HookId;

/// A single custom property declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Declaration {
    /// Property name, including the leading `--`.
    pub property: String,
    /// Property value; may be empty.
    pub value: String,
}

impl Declaration {
    /// Create a declaration.
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }
}

/// Output formatting for emitted CSS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Format {
    /// Emit spaces and newlines.
    pub pretty: bool,
    /// Spaces per nesting level when pretty.
    pub indent: usize,
}

impl Default for Format {
    fn default() -> Self {
        Self::compact()
    }
}

impl Format {
    /// Minified output.
    pub fn compact() -> Self {
        Self {
            pretty: false,
            indent: 2,
        }
    }

    /// Human-readable output.
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            indent: 2,
        }
    }

    fn space(&self) -> &'static str {
        if self.pretty { " " } else { "" }
    }

    fn newline(&self) -> &'static str {
        if self.pretty { "\n" } else { "" }
    }

    fn indentation(&self, depth: usize) -> String {
        if self.pretty {
            " ".repeat(self.indent * depth)
        } else {
            String::new()
        }
    }

    /// Render declarations, one per line when pretty.
    pub fn declaration_list(&self, declarations: &[Declaration], depth: usize) -> String {
        let indent = self.indentation(depth);
        declarations
            .iter()
            .map(|d| format!("{}{}:{}{};", indent, d.property, self.space(), d.value))
            .collect::<Vec<_>>()
            .join(self.newline())
    }

    fn block(&self, selector: &str, declarations: &[Declaration], depth: usize) -> String {
        let nl = self.newline();
        format!(
            "{indent}{selector}{space}{{{nl}{body}{nl}{indent}}}",
            indent = self.indentation(depth),
            space = self.space(),
            body = self.declaration_list(declarations, depth + 1),
        )
    }
}

/// A rule that applies while one hook matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedRule {
    /// The hook that scopes the rule.
    pub hook: Hook,
    /// Declarations applied while the hook matches.
    pub declarations: Vec<Declaration>,
}

impl ScopedRule {
    fn render(&self, format: &Format) -> String {
        match &self.hook {
            Hook::Selector(_) => format.block(&self.hook.scoped_selector(), &self.declarations, 0),
            Hook::AtRule { text, .. } => {
                let nl = format.newline();
                format!(
                    "{text}{space}{{{nl}{inner}{nl}}}",
                    space = format.space(),
                    inner = format.block("*", &self.declarations, 1),
                )
            }
        }
    }
}

/// The CSS text a condition set needs in the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheet {
    /// Declarations applied to every element.
    defaults: Vec<Declaration>,
    /// Hook-scoped rules, in definition order.
    rules: Vec<ScopedRule>,
}

impl StyleSheet {
    /// Create an empty style sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the default state and the scoped rule for a hook.
    ///
    /// Outside its scope the hook is off (`-0: initial`, `-1` empty); inside
    /// it the pair is flipped.
    pub fn add_hook(&mut self, hook: &Hook, id: &HookId) {
        let off = toggle_property(id.as_str(), false);
        let on = toggle_property(id.as_str(), true);
        self.defaults.push(Declaration::new(off.clone(), "initial"));
        self.defaults.push(Declaration::new(on.clone(), ""));
        self.rules.push(ScopedRule {
            hook: hook.clone(),
            declarations: vec![Declaration::new(off, ""), Declaration::new(on, "initial")],
        });
    }

    /// Add a declaration to the `*` block.
    pub fn add_default(&mut self, declaration: Declaration) {
        self.defaults.push(declaration);
    }

    /// Append another sheet, skipping declarations and rules already present.
    pub fn merge(&mut self, other: &StyleSheet) {
        for declaration in &other.defaults {
            if !self.defaults.iter().any(|d| d.property == declaration.property) {
                self.defaults.push(declaration.clone());
            }
        }
        for rule in &other.rules {
            if !self.rules.contains(rule) {
                self.rules.push(rule.clone());
            }
        }
    }

    /// Declarations in the `*` block.
    pub fn defaults(&self) -> &[Declaration] {
        &self.defaults
    }

    /// Hook-scoped rules.
    pub fn rules(&self) -> &[ScopedRule] {
        &self.rules
    }

    /// Check if the sheet has no content.
    pub fn is_empty(&self) -> bool {
        self.defaults.is_empty() && self.rules.is_empty()
    }

    /// Identifier of the sheet's content, used to insert it only once.
    pub fn key(&self) -> String {
        let mut input = String::new();
        for declaration in &self.defaults {
            input.push_str(&declaration.property);
            input.push(';');
        }
        for rule in &self.rules {
            input.push_str(rule.hook.as_str());
            input.push(';');
        }
        hash_str(&input)
    }

    /// Render the sheet as CSS text.
    pub fn render(&self, format: &Format) -> String {
        let mut blocks = Vec::with_capacity(self.rules.len() + 1);
        if !self.defaults.is_empty() {
            blocks.push(format.block("*", &self.defaults, 0));
        }
        blocks.extend(self.rules.iter().map(|rule| rule.render(format)));
        blocks.join(format.newline())
    }
}

impl fmt::Display for StyleSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(&Format::compact()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> StyleSheet {
        let mut sheet = StyleSheet::new();
        sheet.add_hook(&Hook::parse("&:hover").unwrap(), &HookId::new("h"));
        sheet.add_hook(
            &Hook::parse("@media (prefers-color-scheme: dark)").unwrap(),
            &HookId::new("d"),
        );
        sheet
    }

    #[test]
    fn compact_output() {
        assert_eq!(
            sheet().render(&Format::compact()),
            "*{--h-0:initial;--h-1:;--d-0:initial;--d-1:;}\
             *:hover{--h-0:;--h-1:initial;}\
             @media (prefers-color-scheme: dark){*{--d-0:;--d-1:initial;}}"
        );
    }

    #[test]
    fn pretty_output() {
        let expected = "\
* {
  --h-0: initial;
  --h-1: ;
  --d-0: initial;
  --d-1: ;
}
*:hover {
  --h-0: ;
  --h-1: initial;
}
@media (prefers-color-scheme: dark) {
  * {
    --d-0: ;
    --d-1: initial;
  }
}";
        assert_eq!(sheet().render(&Format::pretty()), expected);
    }

    #[test]
    fn empty_sheet_renders_nothing() {
        let sheet = StyleSheet::new();
        assert!(sheet.is_empty());
        assert_eq!(sheet.to_string(), "");
    }

    #[test]
    fn merge_skips_duplicates() {
        let mut merged = sheet();
        merged.merge(&sheet());
        assert_eq!(merged, sheet());

        let mut other = StyleSheet::new();
        other.add_hook(&Hook::parse("&:focus").unwrap(), &HookId::new("f"));
        merged.merge(&other);
        assert_eq!(merged.rules().len(), 3);
        assert_eq!(merged.defaults().len(), 6);
    }

    #[test]
    fn key_depends_on_content() {
        assert_eq!(sheet().key(), sheet().key());
        assert_ne!(sheet().key(), StyleSheet::new().key());
    }

    #[test]
    fn format_from_config() {
        let format: Format = serde_json::from_str(r#"{"pretty": true}"#).unwrap();
        assert_eq!(format, Format::pretty());
    }
}
