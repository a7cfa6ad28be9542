//! Condition-based styling with CSS custom-property toggles.
//!
//! Named conditions such as "hovered", "disabled" or "dark mode" are combined
//! with `and` / `or` / `not` and compiled into plain CSS. No script runs when
//! the DOM state changes; the browser's `var()` fallback rules do the logic.
//!
//! - **Hooks**: selectors containing `&` (like `&:hover`) or `@media`,
//!   `@container` and `@supports` at-rules. Each gets a pair of custom
//!   properties, `--id-0` and `--id-1`, exactly one of which is `initial`.
//! - **Condition sets**: named conditions compiled into a toggle network,
//!   plus the style sheet that drives the hook toggles.
//! - **Conditional expressions**: CSS values that resolve to one of two
//!   branches depending on a condition.
//!
//! # Example
//!
//! ```ignore
//! use toggle_style::prelude::*;
//!
//! let conditions = Definitions::new()
//!     .with("hover", "&:hover")
//!     .with("disabled", "&:disabled")
//!     .with("enabledHover", Condition::and(["hover".into(), Condition::negate("disabled".into())]));
//! let set = ConditionSet::new(&conditions)?;
//!
//! // Emit once per document.
//! let css = set.style_sheet().render(&Format::pretty());
//!
//! // Use anywhere a CSS value is accepted.
//! let background = set.conditional_expression("enabledHover", "gold", "white")?;
//! ```

pub mod compile;
pub mod condition;
pub mod config;
pub mod expression;
pub mod hash;
pub mod hook;
pub mod logging;
pub mod registry;
pub mod set;
pub mod stylesheet;

mod error;

pub use compile::{compile, CompiledCondition};
pub use condition::{normalize, Condition};
pub use config::{Definitions, StyleConfig};
pub use error::{Error, Result};
pub use expression::{build_expression, LogicalExpression};
pub use hash::create_hash;
pub use hook::{AtRuleKind, Hook};
pub use registry::{global_registry, StyleRegistry};
pub use set::{create_condition_set, validate_condition_name, ConditionSet, HookId};
pub use stylesheet::{Declaration, Format, StyleSheet};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::condition::Condition;
    pub use crate::config::{Definitions, StyleConfig};
    pub use crate::registry::{global_registry, StyleRegistry};
    pub use crate::set::{create_condition_set, ConditionSet, HookId};
    pub use crate::stylesheet::{Declaration, Format, StyleSheet};
    pub use crate::{Error, Result};
}
