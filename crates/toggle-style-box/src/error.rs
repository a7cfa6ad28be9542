//! Error types for style props.

/// Result type alias for style prop operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving style props.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A condition set could not be built or queried.
    #[error(transparent)]
    Condition(#[from] toggle_style::Error),

    /// A box configuration could not be parsed.
    #[error("Invalid box configuration: {message}")]
    Config { message: String },
}

impl Error {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
