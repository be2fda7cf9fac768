//! Parser module for templates
//!
//! This module contains the context-driven scanner and the recursive descent
//! parser.

pub mod types;
pub mod scanner;
pub mod parser;

// Re-exports
pub use types::{ParseError, ParseErrorKind};
pub use scanner::{ScanContext, Scanner, Token};
pub use parser::{parse, Parser};
