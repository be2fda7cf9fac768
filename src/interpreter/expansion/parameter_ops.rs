//! Parameter Operation Handlers
//!
//! Value-level helpers behind the substitution operators:
//! - DefaultValue, AssignDefault, UseAlternative, ErrorIfUnset decisions
//! - PatternReplacement
//! - Substring
//! - CaseModification

use crate::interpreter::expansion::pattern::{compile_pattern, Anchor};
use regex_lite::NoExpand;

/// Resolved state of the parameter an operator works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterOpContext {
    pub value: String,
    pub is_unset: bool,
    pub is_empty: bool,
}

impl ParameterOpContext {
    pub fn new(value: Option<String>) -> Self {
        let is_unset = value.is_none();
        let value = value.unwrap_or_default();
        Self {
            is_empty: value.is_empty(),
            value,
            is_unset,
        }
    }
}

/// Check if default value should be used.
/// Returns true if the variable is unset, or if check_empty is true and the variable is empty.
pub fn should_use_default(op_ctx: &ParameterOpContext, check_empty: bool) -> bool {
    op_ctx.is_unset || (check_empty && op_ctx.is_empty)
}

/// Check if alternative value should be used.
/// Returns true if the variable is set (and non-empty if check_empty is true).
pub fn should_use_alternative(op_ctx: &ParameterOpContext, check_empty: bool) -> bool {
    !should_use_default(op_ctx, check_empty)
}

/// Where a replacement pattern must match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceMode {
    First,
    All,
    Prefix,
    Suffix,
}

/// Apply pattern replacement to a value.
/// The pattern is a glob matched longest-first; the replacement is literal.
pub fn apply_pattern_replacement(
    value: &str,
    pattern: &str,
    replacement: &str,
    mode: ReplaceMode,
) -> String {
    if pattern.is_empty() {
        // bash: an empty pattern only means something when anchored
        return match mode {
            ReplaceMode::Prefix => format!("{}{}", replacement, value),
            ReplaceMode::Suffix => format!("{}{}", value, replacement),
            ReplaceMode::First | ReplaceMode::All => value.to_string(),
        };
    }

    let anchor = match mode {
        ReplaceMode::Prefix => Anchor::Start,
        ReplaceMode::Suffix => Anchor::End,
        ReplaceMode::First | ReplaceMode::All => Anchor::None,
    };

    match compile_pattern(pattern, true, anchor) {
        Some(re) if mode == ReplaceMode::All => re.replace_all(value, NoExpand(replacement)).into_owned(),
        Some(re) => re.replace(value, NoExpand(replacement)).into_owned(),
        None => value.to_string(),
    }
}

/// Parse a substring offset or length. Surrounding whitespace is allowed so
/// that `${VAR: -2}` reads as a negative offset.
pub fn parse_substring_index(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

/// Apply substring extraction to a value.
/// offset: starting position (can be negative for counting from end)
/// length: optional length (can be negative for counting from end)
/// Out-of-range positions clamp to an empty result.
pub fn apply_substring_op(value: &str, offset: i64, length: Option<i64>) -> String {
    let chars: Vec<char> = value.chars().collect();
    let len = chars.len() as i64;

    // Calculate start position
    let start = if offset < 0 { (len + offset).max(0) } else { offset };

    // If start is beyond the string, return empty
    if start >= len {
        return String::new();
    }

    // Calculate end position
    let end = match length {
        Some(l) if l < 0 => len + l,
        Some(l) => start.saturating_add(l).min(len),
        None => len,
    };

    if end <= start {
        return String::new();
    }
    chars[start as usize..end as usize].iter().collect()
}

/// Case conversion operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseOp {
    LowerFirst,
    LowerAll,
    UpperFirst,
    UpperAll,
}

/// Apply case modification to a value.
pub fn apply_case_modification(value: &str, op: CaseOp) -> String {
    match op {
        CaseOp::UpperAll => value.to_uppercase(),
        CaseOp::LowerAll => value.to_lowercase(),
        CaseOp::UpperFirst => {
            let mut chars = value.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => c.to_uppercase().to_string() + chars.as_str(),
            }
        }
        CaseOp::LowerFirst => {
            let mut chars = value.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => c.to_lowercase().to_string() + chars.as_str(),
            }
        }
    }
}

/// Length of a value in characters.
pub fn get_parameter_length(value: &str) -> usize {
    value.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_op_context() {
        let ctx = ParameterOpContext::new(Some("hello world".to_string()));
        assert!(!ctx.is_unset);
        assert!(!ctx.is_empty);
        assert_eq!(ctx.value, "hello world");
    }

    #[test]
    fn test_parameter_op_context_unset() {
        let ctx = ParameterOpContext::new(None);
        assert!(ctx.is_unset);
        assert!(ctx.is_empty);
        assert_eq!(ctx.value, "");
    }

    #[test]
    fn test_should_use_default() {
        let unset = ParameterOpContext::new(None);
        assert!(should_use_default(&unset, false));
        assert!(should_use_default(&unset, true));

        let empty = ParameterOpContext::new(Some(String::new()));
        assert!(!should_use_default(&empty, false));
        assert!(should_use_default(&empty, true));

        let set = ParameterOpContext::new(Some("v".to_string()));
        assert!(!should_use_default(&set, false));
        assert!(!should_use_default(&set, true));
    }

    #[test]
    fn test_should_use_alternative() {
        let empty = ParameterOpContext::new(Some(String::new()));
        assert!(should_use_alternative(&empty, false));
        assert!(!should_use_alternative(&empty, true));
    }

    #[test]
    fn test_pattern_replacement() {
        assert_eq!(
            apply_pattern_replacement("hello world", "world", "rust", ReplaceMode::First),
            "hello rust"
        );
        assert_eq!(apply_pattern_replacement("foo", "o", "0", ReplaceMode::First), "f0o");
        assert_eq!(apply_pattern_replacement("foo", "o", "0", ReplaceMode::All), "f00");
    }

    #[test]
    fn test_pattern_replacement_anchored() {
        assert_eq!(apply_pattern_replacement("oxo", "o", "_", ReplaceMode::Prefix), "_xo");
        assert_eq!(apply_pattern_replacement("oxo", "o", "_", ReplaceMode::Suffix), "ox_");
        assert_eq!(apply_pattern_replacement("xox", "o", "_", ReplaceMode::Prefix), "xox");
    }

    #[test]
    fn test_pattern_replacement_glob() {
        assert_eq!(
            apply_pattern_replacement("v1.2.3-rc1", "-*", "", ReplaceMode::Suffix),
            "v1.2.3"
        );
        assert_eq!(
            apply_pattern_replacement("a-b_c", "[-_]", " ", ReplaceMode::All),
            "a b c"
        );
    }

    #[test]
    fn test_pattern_replacement_is_literal() {
        assert_eq!(apply_pattern_replacement("cost", "cost", "$1", ReplaceMode::First), "$1");
    }

    #[test]
    fn test_empty_pattern() {
        assert_eq!(apply_pattern_replacement("abc", "", "x", ReplaceMode::All), "abc");
        assert_eq!(apply_pattern_replacement("abc", "", "x", ReplaceMode::Prefix), "xabc");
        assert_eq!(apply_pattern_replacement("abc", "", "x", ReplaceMode::Suffix), "abcx");
    }

    #[test]
    fn test_substring() {
        assert_eq!(apply_substring_op("hello", 1, None), "ello");
        assert_eq!(apply_substring_op("hello", 1, Some(2)), "el");
        assert_eq!(apply_substring_op("hello", -2, None), "lo");
        assert_eq!(apply_substring_op("abcdef", 1, Some(3)), "bcd");
    }

    #[test]
    fn test_substring_clamps() {
        assert_eq!(apply_substring_op("hello", 10, None), "");
        assert_eq!(apply_substring_op("hello", -10, None), "hello");
        assert_eq!(apply_substring_op("hello", 3, Some(100)), "lo");
        assert_eq!(apply_substring_op("hello", 1, Some(-1)), "ell");
        assert_eq!(apply_substring_op("hello", 3, Some(-4)), "");
    }

    #[test]
    fn test_parse_substring_index() {
        assert_eq!(parse_substring_index(" -2"), Some(-2));
        assert_eq!(parse_substring_index("3 "), Some(3));
        assert_eq!(parse_substring_index("x"), None);
    }

    #[test]
    fn test_case_modification() {
        assert_eq!(apply_case_modification("hello", CaseOp::UpperAll), "HELLO");
        assert_eq!(apply_case_modification("hello", CaseOp::UpperFirst), "Hello");
        assert_eq!(apply_case_modification("HELLO", CaseOp::LowerAll), "hello");
        assert_eq!(apply_case_modification("HELLO", CaseOp::LowerFirst), "hELLO");
        assert_eq!(apply_case_modification("", CaseOp::UpperFirst), "");
    }

    #[test]
    fn test_get_parameter_length() {
        assert_eq!(get_parameter_length("hello world"), 11);
        assert_eq!(get_parameter_length("héllo"), 5);
    }
}
