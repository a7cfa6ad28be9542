//! Binary logical expressions and the runtime `var()` expression builder.

use std::fmt;

use crate::compile::toggle_property;
use crate::condition::{normalize, Condition};

/// A binary boolean expression tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogicalExpression<S> {
    /// A single toggle.
    Just(S),
    /// Both sides hold.
    And(Box<LogicalExpression<S>>, Box<LogicalExpression<S>>),
    /// Either side holds.
    Or(Box<LogicalExpression<S>>, Box<LogicalExpression<S>>),
    /// The inner expression does not hold.
    Not(Box<LogicalExpression<S>>),
}

impl<S: Clone> LogicalExpression<S> {
    /// Normalize a condition and convert it into an expression tree.
    ///
    /// Returns `None` for vacuous conditions.
    pub fn from_condition(condition: &Condition<S>) -> Option<Self> {
        normalize(condition).and_then(|c| Self::lower(&c))
    }

    fn lower(condition: &Condition<S>) -> Option<Self> {
        match condition {
            Condition::Leaf(value) => Some(LogicalExpression::Just(value.clone())),
            Condition::Not(inner) => Self::lower(inner).map(|e| LogicalExpression::Not(Box::new(e))),
            Condition::And(children) => Self::lower_list(children, LogicalExpression::And),
            Condition::Or(children) => Self::lower_list(children, LogicalExpression::Or),
        }
    }

    fn lower_list(
        children: &[Condition<S>],
        make: fn(Box<Self>, Box<Self>) -> Self,
    ) -> Option<Self> {
        let mut lowered: Vec<_> = children.iter().filter_map(Self::lower).collect();
        let last = lowered.pop()?;
        Some(
            lowered
                .into_iter()
                .rev()
                .fold(last, |acc, left| make(Box::new(left), Box::new(acc))),
        )
    }
}

impl<S> LogicalExpression<S> {
    /// Evaluate the expression given the truth value of each leaf.
    pub fn evaluate(&self, value_of: &mut impl FnMut(&S) -> bool) -> bool {
        match self {
            LogicalExpression::Just(value) => value_of(value),
            LogicalExpression::And(left, right) => left.evaluate(value_of) && right.evaluate(value_of),
            LogicalExpression::Or(left, right) => left.evaluate(value_of) || right.evaluate(value_of),
            LogicalExpression::Not(inner) => !inner.evaluate(value_of),
        }
    }

    /// Map every leaf value.
    pub fn map<T>(&self, f: &mut impl FnMut(&S) -> T) -> LogicalExpression<T> {
        match self {
            LogicalExpression::Just(value) => LogicalExpression::Just(f(value)),
            LogicalExpression::And(left, right) => {
                LogicalExpression::And(Box::new(left.map(f)), Box::new(right.map(f)))
            }
            LogicalExpression::Or(left, right) => {
                LogicalExpression::Or(Box::new(left.map(f)), Box::new(right.map(f)))
            }
            LogicalExpression::Not(inner) => LogicalExpression::Not(Box::new(inner.map(f))),
        }
    }

    /// Number of nodes in the tree.
    pub fn size(&self) -> usize {
        match self {
            LogicalExpression::Just(_) => 1,
            LogicalExpression::And(left, right) | LogicalExpression::Or(left, right) => {
                1 + left.size() + right.size()
            }
            LogicalExpression::Not(inner) => 1 + inner.size(),
        }
    }
}

impl<S: fmt::Display> fmt::Display for LogicalExpression<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalExpression::Just(value) => write!(f, "{}", value),
            LogicalExpression::And(left, right) => write!(f, "({} && {})", left, right),
            LogicalExpression::Or(left, right) => write!(f, "({} || {})", left, right),
            LogicalExpression::Not(inner) => write!(f, "!{}", inner),
        }
    }
}

/// Build a CSS value that resolves to `if_true` when the expression holds and
/// to `if_false` otherwise.
///
/// Each leaf contributes `var(--id-1, T) var(--id-0, F)`: exactly one of the
/// pair is the guaranteed-invalid `initial`, so exactly one fallback survives
/// and the other reference substitutes to nothing. `and` / `or` nest the right
/// side into the true / false branch of the left side, and `not` swaps the
/// branches.
pub fn build_expression<S: AsRef<str>>(
    expression: &LogicalExpression<S>,
    if_true: &str,
    if_false: &str,
) -> String {
    match expression {
        LogicalExpression::Just(id) => {
            let id = id.as_ref();
            format!(
                "var({}, {}) var({}, {})",
                toggle_property(id, true),
                if_true,
                toggle_property(id, false),
                if_false
            )
        }
        LogicalExpression::And(left, right) => {
            let right = build_expression(right, if_true, if_false);
            build_expression(left, &right, if_false)
        }
        LogicalExpression::Or(left, right) => {
            let right = build_expression(right, if_true, if_false);
            build_expression(left, if_true, &right)
        }
        LogicalExpression::Not(inner) => build_expression(inner, if_false, if_true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn just(s: &str) -> LogicalExpression<String> {
        LogicalExpression::Just(s.to_string())
    }

    #[test]
    fn leaf_expression() {
        assert_eq!(
            build_expression(&just("h"), "red", "blue"),
            "var(--h-1, red) var(--h-0, blue)"
        );
    }

    #[test]
    fn and_nests_into_true_branch() {
        let e = LogicalExpression::And(Box::new(just("a")), Box::new(just("b")));
        assert_eq!(
            build_expression(&e, "T", "F"),
            "var(--a-1, var(--b-1, T) var(--b-0, F)) var(--a-0, F)"
        );
    }

    #[test]
    fn or_nests_into_false_branch() {
        let e = LogicalExpression::Or(Box::new(just("a")), Box::new(just("b")));
        assert_eq!(
            build_expression(&e, "T", "F"),
            "var(--a-1, T) var(--a-0, var(--b-1, T) var(--b-0, F))"
        );
    }

    #[test]
    fn not_swaps_branches() {
        let e = LogicalExpression::Not(Box::new(just("a")));
        assert_eq!(build_expression(&e, "T", "F"), "var(--a-1, F) var(--a-0, T)");
    }

    #[test]
    fn from_condition_folds_right() {
        let c: Condition<String> =
            Condition::or([Condition::leaf("a"), Condition::leaf("b"), Condition::leaf("c")]);
        let e = LogicalExpression::from_condition(&c).unwrap();
        assert_eq!(e.to_string(), "(a || (b || c))");
        assert_eq!(e.size(), 5);
    }

    #[test]
    fn from_condition_vacuous() {
        let c: Condition<String> = Condition::and([Condition::or([])]);
        assert_eq!(LogicalExpression::from_condition(&c), None);
    }

    #[test]
    fn evaluate() {
        let c: Condition<&str> = Condition::and([
            Condition::leaf("a"),
            Condition::negate(Condition::leaf("b")),
        ]);
        let e = LogicalExpression::from_condition(&c).unwrap();
        assert!(e.evaluate(&mut |s| *s == "a"));
        assert!(!e.evaluate(&mut |_| true));
    }
}
