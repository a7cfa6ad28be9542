//! Error types for the condition compiler.

use std::path::PathBuf;

/// Result type alias for condition compiler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building condition sets.
///
/// All of these are configuration-time mistakes. Once a condition set has been
/// built, expression building and style sheet emission cannot fail.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A condition has the wrong shape (unknown key, mixed operators, ...).
    #[error("Invalid condition: {message}")]
    InvalidCondition { message: String },

    /// A condition name is not alphanumeric or uses a reserved word.
    #[error("Invalid condition name '{name}': {message}")]
    InvalidConditionName { name: String, message: String },

    /// A hook selector or at-rule cannot be emitted safely.
    #[error("Invalid hook '{hook}': {message}")]
    InvalidHook { hook: String, message: String },

    /// A condition references a name that is not visible from its scope.
    #[error("Unknown condition '{name}'")]
    UnknownCondition { name: String },

    /// The same name was defined twice in one condition set.
    #[error("Condition '{name}' is defined more than once")]
    DuplicateCondition { name: String },

    /// Two different sources produced the same generated identifier.
    #[error("Identifier '{id}' generated for both {first} and {second}")]
    IdentifierCollision {
        id: String,
        first: String,
        second: String,
    },

    /// A value could not be serialized for hashing.
    #[error("Failed to serialize hash input: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A configuration document could not be parsed.
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// File I/O error.
    #[error("Failed to read configuration '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a condition shape error.
    pub fn invalid_condition(message: impl Into<String>) -> Self {
        Self::InvalidCondition {
            message: message.into(),
        }
    }

    /// Create a condition name error.
    pub fn invalid_name(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConditionName {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a hook error.
    pub fn invalid_hook(hook: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidHook {
            hook: hook.into(),
            message: message.into(),
        }
    }

    /// Create an unknown-condition error.
    pub fn unknown_condition(name: impl Into<String>) -> Self {
        Self::UnknownCondition { name: name.into() }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
