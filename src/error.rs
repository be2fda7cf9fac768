//! Top-level error for the one-shot helpers in the crate root.

use crate::interpreter::errors::ExpansionError;
use crate::parser::types::ParseError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Expansion(#[from] ExpansionError),
}
