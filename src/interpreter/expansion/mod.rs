//! Expansion helpers
//!
//! Glob-to-regex conversion and the value transformations behind each
//! substitution operator.

pub mod parameter_ops;
pub mod pattern;
pub mod pattern_removal;

pub use parameter_ops::*;
pub use pattern::{compile_pattern, pattern_to_regex, Anchor};
pub use pattern_removal::*;
