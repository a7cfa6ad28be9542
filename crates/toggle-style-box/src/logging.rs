//! Logging for toggle-style-box.
//!
//! Resolving props logs a `debug` summary per call and a `trace` event for
//! each value that has no CSS form:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("toggle_style_box::resolve=trace")
//!     .init();
//! ```

/// Target names for log filtering.
pub mod targets {
    /// Style prop resolution.
    pub const RESOLVE: &str = "toggle_style_box::resolve";
}
