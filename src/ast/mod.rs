//! Abstract Syntax Tree (AST) for templates
//!
//! Architecture:
//!   Template → Scanner → Parser → AST → Expansion Engine → Output

pub mod types;
