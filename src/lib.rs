//! envsubst - bash-style variable substitution for text templates
//!
//! This library parses templates such as `${HOME}/${APP:-web}.conf` into a
//! tree and expands the tree against a pluggable variable resolver.
//!
//! ```
//! let mut vars: envsubst::MapResolver = [("NAME", "world")].into_iter().collect();
//! assert_eq!(envsubst::eval("hello ${NAME:-you}", &mut vars).unwrap(), "hello world");
//! ```

pub mod ast;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod parser;

pub use ast::types::*;
pub use error::Error;
pub use interpreter::{
    EnvResolver, ExpandOptions, ExpansionError, FallibleFn, MapResolver, ResolveError, Resolver,
};
pub use parser::{parse, ParseError, ParseErrorKind, Parser};

/// Parse and expand a template in one step.
pub fn eval<R: Resolver + ?Sized>(template: &str, resolver: &mut R) -> Result<String, Error> {
    eval_with(template, resolver, &ExpandOptions::default())
}

/// Parse and expand a template with explicit options.
pub fn eval_with<R: Resolver + ?Sized>(
    template: &str,
    resolver: &mut R,
    options: &ExpandOptions,
) -> Result<String, Error> {
    let tree = parse(template)?;
    Ok(tree.execute_with(resolver, options)?)
}

/// Expand a template against the process environment.
pub fn eval_env(template: &str) -> Result<String, Error> {
    eval(template, &mut EnvResolver)
}
