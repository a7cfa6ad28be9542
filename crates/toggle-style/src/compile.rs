//! Compile conditions into a network of `-0` / `-1` toggle properties.
//!
//! Every toggle id `x` owns the pair `--x-0` and `--x-1`. At any DOM state
//! exactly one of the pair is `initial` (guaranteed-invalid) and the other is
//! the empty value: `--x-1: initial` means the condition holds, `--x-0:
//! initial` means it does not. Hooks get their pair from the style sheet; every
//! composite node of a condition gets a pair derived from its children here.

use crate::condition::Condition;
use crate::expression::LogicalExpression;
use crate::logging::targets;
use crate::stylesheet::{Declaration, Format};

/// Name of one side of a toggle pair: `--{id}-1` when `on`, else `--{id}-0`.
pub fn toggle_property(id: &str, on: bool) -> String {
    format!("--{}-{}", id, if on { 1 } else { 0 })
}

fn var(id: &str, on: bool) -> String {
    format!("var({})", toggle_property(id, on))
}

/// The result of compiling one condition.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledCondition<S> {
    /// Toggle id whose pair reflects the whole condition.
    ///
    /// For a bare leaf this is the leaf itself and no declarations are needed.
    pub id: String,
    /// Toggle declarations, children before parents.
    pub declarations: Vec<Declaration>,
    /// The binary expression tree the declarations were compiled from.
    pub expression: LogicalExpression<S>,
}

impl<S> CompiledCondition<S> {
    /// Render the declarations as CSS declaration text.
    pub fn declarations_css(&self, format: &Format) -> String {
        format.declaration_list(&self.declarations, 0)
    }
}

/// Compile a condition whose leaves are toggle ids.
///
/// The condition is normalized first; `None` means it is vacuous. Composite
/// nodes are named by appending `A` (left), `B` (right) or `X` (negated child)
/// to their parent's id, starting from `base_id`.
pub fn compile<S: AsRef<str> + Clone>(
    condition: &Condition<S>,
    base_id: &str,
) -> Option<CompiledCondition<S>> {
    let expression = LogicalExpression::from_condition(condition)?;
    let mut declarations = Vec::new();
    let id = compile_node(&expression, base_id, &mut declarations);
    tracing::trace!(
        target: targets::COMPILE,
        base_id,
        id = %id,
        declarations = declarations.len(),
        "compiled condition"
    );
    Some(CompiledCondition {
        id,
        declarations,
        expression,
    })
}

fn compile_node<S: AsRef<str>>(
    expression: &LogicalExpression<S>,
    id: &str,
    out: &mut Vec<Declaration>,
) -> String {
    match expression {
        LogicalExpression::Just(leaf) => leaf.as_ref().to_string(),
        LogicalExpression::Not(inner) => {
            let x = compile_node(inner, &format!("{id}X"), out);
            out.push(Declaration::new(toggle_property(id, false), var(&x, true)));
            out.push(Declaration::new(toggle_property(id, true), var(&x, false)));
            id.to_string()
        }
        LogicalExpression::And(left, right) => {
            let a = compile_node(left, &format!("{id}A"), out);
            let b = compile_node(right, &format!("{id}B"), out);
            // Off if either side is off; on only if both are on.
            out.push(Declaration::new(
                toggle_property(id, false),
                format!("{} {}", var(&a, false), var(&b, false)),
            ));
            out.push(Declaration::new(
                toggle_property(id, true),
                format!("var({}, {})", toggle_property(&a, true), var(&b, true)),
            ));
            id.to_string()
        }
        LogicalExpression::Or(left, right) => {
            let a = compile_node(left, &format!("{id}A"), out);
            let b = compile_node(right, &format!("{id}B"), out);
            out.push(Declaration::new(
                toggle_property(id, false),
                format!("var({}, {})", toggle_property(&a, false), var(&b, false)),
            ));
            out.push(Declaration::new(
                toggle_property(id, true),
                format!("{} {}", var(&a, true), var(&b, true)),
            ));
            id.to_string()
        }
    }
}
