//! Expansion Errors
//!
//! Any of these aborts the whole expansion; text produced before the error
//! is discarded.

use thiserror::Error;

/// Failure reported by a resolver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ResolveError {
    pub message: String,
}

impl ResolveError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpansionError {
    /// `${VAR:?word}` on an unset or empty variable
    #[error("{name}: {message}")]
    UnsetWithError { name: String, message: String },

    #[error("failed to resolve {name}: {source}")]
    Resolver {
        name: String,
        #[source]
        source: ResolveError,
    },

    /// Referenced an unset variable with `no_unset` enabled
    #[error("variable ${{{name}}} not set")]
    Unbound { name: String },

    /// Referenced an empty variable with `no_empty` enabled
    #[error("variable ${{{name}}} set but empty")]
    EmptyValue { name: String },
}

impl ExpansionError {
    /// Bash's message when `${VAR:?}` has no word.
    pub const NULL_OR_NOT_SET: &'static str = "parameter null or not set";

    pub fn unset_with_error(name: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::UnsetWithError {
            name: name.into(),
            message: if message.is_empty() {
                Self::NULL_OR_NOT_SET.to_string()
            } else {
                message
            },
        }
    }
}
