//! Logging for toggle-style.
//!
//! The crate logs through `tracing`. Nothing is printed unless the
//! application installs a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("toggle_style::set=debug")
//!     .init();
//! ```
//!
//! Building a condition set logs a `debug` summary and a `warn` for every
//! condition that can never hold. Compilation details are logged at `trace`.

/// Target names for log filtering.
pub mod targets {
    /// Condition set construction.
    pub const SET: &str = "toggle_style::set";
    /// Toggle network compilation.
    pub const COMPILE: &str = "toggle_style::compile";
    /// Configuration loading.
    pub const CONFIG: &str = "toggle_style::config";
    /// Style sheet registry.
    pub const REGISTRY: &str = "toggle_style::registry";
}
