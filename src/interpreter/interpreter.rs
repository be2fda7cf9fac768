//! Interpreter - AST Execution Engine
//!
//! Walks a parsed [`Tree`] and writes the expansion into a single output
//! buffer. Variable values come from a [`Resolver`]; the value-level work of
//! each operator is delegated to the expansion/ helpers.
//!
//! Operator words are evaluated lazily: `${A:-${B:?}}` never looks at `B`
//! while `A` is set.

use crate::ast::types::{FuncName, FuncNode, Node, Tree};
use crate::interpreter::errors::ExpansionError;
use crate::interpreter::expansion::{
    apply_case_modification, apply_pattern_removal, apply_pattern_replacement,
    apply_substring_op, get_parameter_length, parse_substring_index, should_use_alternative,
    should_use_default, CaseOp, ParameterOpContext, PatternRemovalSide, ReplaceMode,
};
use crate::interpreter::resolver::Resolver;
use crate::interpreter::types::ExpandOptions;

impl Tree {
    /// Expand the tree with default options.
    pub fn execute<R: Resolver + ?Sized>(&self, resolver: &mut R) -> Result<String, ExpansionError> {
        self.execute_with(resolver, &ExpandOptions::default())
    }

    /// Expand the tree. On error nothing is returned, not even the text
    /// produced before the failing substitution.
    pub fn execute_with<R: Resolver + ?Sized>(
        &self,
        resolver: &mut R,
        options: &ExpandOptions,
    ) -> Result<String, ExpansionError> {
        let mut out = String::new();
        Interpreter::new(resolver, options).eval(&self.root, &mut out)?;
        Ok(out)
    }
}

/// Expansion state for a single run over a tree.
pub struct Interpreter<'a, R: Resolver + ?Sized> {
    resolver: &'a mut R,
    options: &'a ExpandOptions,
}

impl<'a, R: Resolver + ?Sized> Interpreter<'a, R> {
    pub fn new(resolver: &'a mut R, options: &'a ExpandOptions) -> Self {
        Self { resolver, options }
    }

    /// Append the expansion of `node` to `out`.
    pub fn eval(&mut self, node: &Node, out: &mut String) -> Result<(), ExpansionError> {
        match node {
            Node::Empty => Ok(()),
            Node::Text(text) => {
                out.push_str(&text.value);
                Ok(())
            }
            Node::List(list) => {
                for child in &list.nodes {
                    self.eval(child, out)?;
                }
                Ok(())
            }
            Node::Func(func) => {
                let value = self.eval_func(func)?;
                out.push_str(&value);
                Ok(())
            }
        }
    }

    /// Expand a sequence of argument nodes as one concatenated string.
    fn eval_word(&mut self, nodes: &[Node]) -> Result<String, ExpansionError> {
        let mut word = String::new();
        for node in nodes {
            self.eval(node, &mut word)?;
        }
        Ok(word)
    }

    fn eval_arg(&mut self, func: &FuncNode, index: usize) -> Result<Option<String>, ExpansionError> {
        match func.args.get(index) {
            Some(node) => {
                let mut arg = String::new();
                self.eval(node, &mut arg)?;
                Ok(Some(arg))
            }
            None => Ok(None),
        }
    }

    fn resolve(&self, name: &str) -> Result<Option<String>, ExpansionError> {
        self.resolver
            .resolve(name)
            .map_err(|source| ExpansionError::Resolver {
                name: name.to_string(),
                source,
            })
    }

    fn check_restrictions(&self, name: &str, value: Option<&str>) -> Result<(), ExpansionError> {
        match value {
            None if self.options.no_unset => {
                tracing::debug!(param = name, "reference to unset variable");
                Err(ExpansionError::Unbound {
                    name: name.to_string(),
                })
            }
            Some("") if self.options.no_empty => {
                tracing::debug!(param = name, "reference to empty variable");
                Err(ExpansionError::EmptyValue {
                    name: name.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    fn eval_func(&mut self, func: &FuncNode) -> Result<String, ExpansionError> {
        let value = self.resolve(&func.param)?;
        tracing::trace!(
            param = %func.param,
            operator = %func.name,
            set = value.is_some(),
            "evaluating substitution"
        );

        if !func.name.handles_unset() {
            self.check_restrictions(&func.param, value.as_deref())?;
        }

        let op_ctx = ParameterOpContext::new(value);
        match func.name {
            FuncName::Plain => Ok(op_ctx.value),
            FuncName::Length => Ok(get_parameter_length(&op_ctx.value).to_string()),

            FuncName::Default | FuncName::DefaultIfUnset => {
                if should_use_default(&op_ctx, func.name == FuncName::Default) {
                    self.eval_word(&func.args)
                } else {
                    Ok(op_ctx.value)
                }
            }
            FuncName::Assign | FuncName::AssignEqual => {
                if !should_use_default(&op_ctx, true) {
                    return Ok(op_ctx.value);
                }
                let word = self.eval_word(&func.args)?;
                if self.resolver.assign(&func.param, &word) {
                    tracing::debug!(param = %func.param, "assigned default value");
                } else {
                    tracing::debug!(param = %func.param, "resolver is read-only, default not stored");
                }
                Ok(word)
            }
            FuncName::Error | FuncName::ErrorIfUnset => {
                if should_use_default(&op_ctx, func.name == FuncName::Error) {
                    let message = self.eval_word(&func.args)?;
                    Err(ExpansionError::unset_with_error(&func.param, message))
                } else {
                    Ok(op_ctx.value)
                }
            }
            FuncName::Alternative | FuncName::AlternativeIfSet => {
                if should_use_alternative(&op_ctx, func.name == FuncName::Alternative) {
                    self.eval_word(&func.args)
                } else {
                    Ok(String::new())
                }
            }

            FuncName::Substring => {
                let offset = self.eval_arg(func, 0)?.unwrap_or_default();
                let length = self.eval_arg(func, 1)?;

                let Some(offset) = parse_substring_index(&offset) else {
                    return Ok(op_ctx.value);
                };
                let length = match length {
                    Some(text) => match parse_substring_index(&text) {
                        Some(n) => Some(n),
                        None => return Ok(op_ctx.value),
                    },
                    None => None,
                };
                Ok(apply_substring_op(&op_ctx.value, offset, length))
            }

            FuncName::TrimShortestPrefix
            | FuncName::TrimLongestPrefix
            | FuncName::TrimShortestSuffix
            | FuncName::TrimLongestSuffix => {
                let pattern = self.eval_arg(func, 0)?.unwrap_or_default();
                let (side, greedy) = match func.name {
                    FuncName::TrimShortestPrefix => (PatternRemovalSide::Prefix, false),
                    FuncName::TrimLongestPrefix => (PatternRemovalSide::Prefix, true),
                    FuncName::TrimShortestSuffix => (PatternRemovalSide::Suffix, false),
                    _ => (PatternRemovalSide::Suffix, true),
                };
                Ok(apply_pattern_removal(&op_ctx.value, &pattern, side, greedy))
            }

            FuncName::ReplaceFirst
            | FuncName::ReplaceAll
            | FuncName::ReplacePrefix
            | FuncName::ReplaceSuffix => {
                let pattern = self.eval_arg(func, 0)?.unwrap_or_default();
                let replacement = self.eval_arg(func, 1)?.unwrap_or_default();
                let mode = match func.name {
                    FuncName::ReplaceFirst => ReplaceMode::First,
                    FuncName::ReplaceAll => ReplaceMode::All,
                    FuncName::ReplacePrefix => ReplaceMode::Prefix,
                    _ => ReplaceMode::Suffix,
                };
                Ok(apply_pattern_replacement(&op_ctx.value, &pattern, &replacement, mode))
            }

            FuncName::LowerFirst => Ok(apply_case_modification(&op_ctx.value, CaseOp::LowerFirst)),
            FuncName::LowerAll => Ok(apply_case_modification(&op_ctx.value, CaseOp::LowerAll)),
            FuncName::UpperFirst => Ok(apply_case_modification(&op_ctx.value, CaseOp::UpperFirst)),
            FuncName::UpperAll => Ok(apply_case_modification(&op_ctx.value, CaseOp::UpperAll)),
        }
    }
}
