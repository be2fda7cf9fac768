//! Parser Types and Constants
//!
//! Error types and limits shared by the scanner and the parser.

use thiserror::Error;

// Parser limits to prevent hangs and resource exhaustion
pub const MAX_INPUT_SIZE: usize = 10_000_000; // characters
pub const MAX_PARSER_DEPTH: usize = 200; // nested ${...} inside arguments

/// What went wrong during parsing.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("bad substitution")]
    BadSubstitution,

    #[error("missing closing brace")]
    MissingClosingBrace,

    #[error("unable to parse variable name")]
    ParseVariableName,

    #[error("unable to parse substitution within function")]
    ParseFuncSubstitution,

    #[error("unable to parse default function")]
    ParseDefaultFunction,

    #[error("template exceeds maximum size of {} characters", MAX_INPUT_SIZE)]
    InputTooLarge,

    #[error("substitutions nested deeper than {} levels", MAX_PARSER_DEPTH)]
    NestingTooDeep,
}

/// A parse failure. `offset` is the character offset of the scanner when
/// the error was detected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at offset {offset}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub offset: usize,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}
