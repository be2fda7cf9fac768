//! Interpreter module
//!
//! Expands parsed templates against a variable resolver.

pub mod errors;
pub mod expansion;
pub mod interpreter;
pub mod resolver;
pub mod types;

pub use errors::*;
pub use interpreter::Interpreter;
pub use resolver::*;
pub use types::*;
