//! Conditional style props on top of `toggle-style` condition sets.
//!
//! A component receives a flat list of props. `initial:<property>` props set
//! a base value; `<condition>:<property>` props apply while the named
//! condition holds. [`StyleBox::resolve`] turns them into one ordered inline
//! style, and everything else is forwarded untouched.
//!
//! # Example
//!
//! ```ignore
//! use serde_json::json;
//! use toggle_style::prelude::*;
//! use toggle_style_box::StyleBox;
//!
//! let set = ConditionSet::new(&Definitions::new().with("hover", "&:hover"))?;
//! let resolved = StyleBox::default().resolve(&set, &[
//!     ("initial:color".into(), json!("blue")),
//!     ("hover:color".into(), json!("red")),
//! ])?;
//!
//! // Insert the set's style sheet once per document.
//! if let Some(css) = global_registry().insert(&set.style_sheet(), &Format::compact()) {
//!     document.push_style(css);
//! }
//! element.set_style(resolved.style.to_css());
//! ```

pub mod logging;
pub mod style_box;
pub mod value;

mod error;

pub use error::{Error, Result};
pub use style_box::{
    AliasTable, BoxConfig, Fallback, IdentityResolver, PropertyResolver, ResolvedStyle, StyleBox,
    StyleMap, INITIAL_PREFIX,
};
pub use value::{is_unitless, stringify_value, UNITLESS_PROPERTIES};
