//! Interpreter Types
//!
//! Options controlling how a tree is expanded.

/// Expansion options. The defaults match plain bash: unset and empty
/// variables silently expand to nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandOptions {
    /// Referencing an unset variable is an error (like `set -u`)
    pub no_unset: bool,
    /// Referencing a set but empty variable is an error
    pub no_empty: bool,
}

impl ExpandOptions {
    /// Both restrictions enabled.
    pub fn strict() -> Self {
        Self {
            no_unset: true,
            no_empty: true,
        }
    }
}
