//! Stringifying prop values into CSS values.

use serde_json::{Number, Value};

/// Properties whose numeric values take no unit.
pub const UNITLESS_PROPERTIES: &[&str] = &[
    "animation-iteration-count",
    "aspect-ratio",
    "border-image-outset",
    "border-image-slice",
    "border-image-width",
    "box-flex",
    "box-flex-group",
    "box-ordinal-group",
    "column-count",
    "columns",
    "flex",
    "flex-grow",
    "flex-positive",
    "flex-shrink",
    "flex-negative",
    "flex-order",
    "grid-area",
    "grid-row",
    "grid-row-end",
    "grid-row-span",
    "grid-row-start",
    "grid-column",
    "grid-column-end",
    "grid-column-span",
    "grid-column-start",
    "font-weight",
    "line-clamp",
    "line-height",
    "opacity",
    "order",
    "orphans",
    "scale",
    "tab-size",
    "widows",
    "z-index",
    "zoom",
    // SVG
    "fill-opacity",
    "flood-opacity",
    "stop-opacity",
    "stroke-dasharray",
    "stroke-dashoffset",
    "stroke-miterlimit",
    "stroke-opacity",
    "stroke-width",
    // Vendor prefixed
    "-moz-animation-iteration-count",
    "-moz-box-flex",
    "-moz-box-flex-group",
    "-moz-line-clamp",
    "-ms-animation-iteration-count",
    "-ms-flex",
    "-ms-zoom",
    "-ms-flex-grow",
    "-ms-flex-negative",
    "-ms-flex-order",
    "-ms-flex-positive",
    "-ms-flex-shrink",
    "-ms-grid-column",
    "-ms-grid-column-span",
    "-ms-grid-row",
    "-ms-grid-row-span",
    "-webkit-animation-iteration-count",
    "-webkit-box-flex",
    "-webkit-box-flex-group",
    "-webkit-box-ordinal-group",
    "-webkit-column-count",
    "-webkit-columns",
    "-webkit-flex",
    "-webkit-flex-grow",
    "-webkit-flex-positive",
    "-webkit-flex-shrink",
    "-webkit-line-clamp",
];

/// Check if numbers for `property` are written without `px`.
///
/// Custom properties (`--*`) are always unitless.
pub fn is_unitless(property: &str) -> bool {
    property.starts_with("--") || UNITLESS_PROPERTIES.contains(&property)
}

/// Convert a prop value into CSS text for `property`.
///
/// Strings are used as-is and numbers get `px` unless the property is
/// unitless. Anything else has no CSS form and yields `None`.
pub fn stringify_value(property: &str, value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => {
            let unit = if is_unitless(property) { "" } else { "px" };
            Some(format!("{}{}", format_number(n), unit))
        }
        _ => None,
    }
}

fn format_number(n: &Number) -> String {
    if n.is_f64() {
        // f64 formatting drops a trailing ".0".
        n.as_f64().map_or_else(|| n.to_string(), |f| f.to_string())
    } else {
        n.to_string()
    }
}
