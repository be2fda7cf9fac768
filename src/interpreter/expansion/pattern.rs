//! Pattern Matching
//!
//! Converts shell glob patterns to regex equivalents for the trim and
//! replace operators (`${var%pattern}`, `${var/pattern/string}`, ...).
//!
//! ## Error Handling
//!
//! Invalid patterns follow bash:
//! - Invalid character ranges (e.g., `[z-a]`) fail regex compilation, and the
//!   caller treats that as "no match"
//! - Unknown POSIX classes (e.g., `[:foo:]`) match nothing
//! - Unclosed character classes (`[abc`) are treated as literal `[`

use regex_lite::Regex;
use std::collections::HashMap;

lazy_static::lazy_static! {
    /// Valid POSIX character class names
    static ref POSIX_CLASSES: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("alnum", "a-zA-Z0-9");
        m.insert("alpha", "a-zA-Z");
        m.insert("ascii", "\\x00-\\x7F");
        m.insert("blank", " \\t");
        m.insert("cntrl", "\\x00-\\x1F\\x7F");
        m.insert("digit", "0-9");
        m.insert("graph", "!-~");
        m.insert("lower", "a-z");
        m.insert("print", " -~");
        m.insert("punct", "!-/:-@\\[-`{-~");
        m.insert("space", " \\t\\n\\r\\f\\v");
        m.insert("upper", "A-Z");
        m.insert("word", "a-zA-Z0-9_");
        m.insert("xdigit", "0-9A-Fa-f");
        m
    };
}

/// Where a compiled pattern must match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    None,
    Start,
    End,
    Both,
}

/// Convert a shell glob pattern to a regex string.
/// `greedy` decides whether `*` prefers the longest match.
pub fn pattern_to_regex(pattern: &str, greedy: bool) -> String {
    let mut regex = String::new();
    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\\' {
            // Shell escape: \X means literal X
            if i + 1 < chars.len() {
                push_literal(&mut regex, chars[i + 1]);
                i += 2;
            } else {
                // Trailing backslash - treat as literal
                regex.push_str("\\\\");
                i += 1;
            }
        } else if c == '*' {
            regex.push_str(if greedy { ".*" } else { ".*?" });
            i += 1;
        } else if c == '?' {
            regex.push('.');
            i += 1;
        } else if c == '[' {
            let class_end = find_char_class_end(&chars, i);
            if class_end == usize::MAX {
                // No matching ], escape the [
                regex.push_str("\\[");
                i += 1;
            } else {
                let class_content: String = chars[i + 1..class_end].iter().collect();
                regex.push_str(&convert_char_class(&class_content));
                i = class_end + 1;
            }
        } else {
            push_literal(&mut regex, c);
            i += 1;
        }
    }
    regex
}

/// Compile a glob pattern, anchored as requested. `None` for patterns the
/// regex engine rejects.
///
/// Compiled with `(?s)`: `*` and `?` match newlines like any other character.
pub fn compile_pattern(pattern: &str, greedy: bool, anchor: Anchor) -> Option<Regex> {
    let body = pattern_to_regex(pattern, greedy);
    let source = match anchor {
        Anchor::None => format!("(?s){}", body),
        Anchor::Start => format!("(?s)^(?:{})", body),
        Anchor::End => format!("(?s)(?:{})$", body),
        Anchor::Both => format!("(?s)^(?:{})$", body),
    };
    match Regex::new(&source) {
        Ok(re) => Some(re),
        Err(err) => {
            tracing::debug!(pattern, error = %err, "pattern does not compile, treating as no match");
            None
        }
    }
}

fn push_literal(regex: &mut String, c: char) {
    if is_regex_special(c) {
        regex.push('\\');
    }
    regex.push(c);
}

/// Check if a character is a regex special character
fn is_regex_special(c: char) -> bool {
    "\\^$.|+(){}[]*?".contains(c)
}

/// Find the end of a character class starting at position i (where chars[i] is '[')
fn find_char_class_end(chars: &[char], start: usize) -> usize {
    let mut i = start + 1;

    // Handle negation
    if i < chars.len() && (chars[i] == '^' || chars[i] == '!') {
        i += 1;
    }

    // A ] immediately after [ or [^ is literal, not closing
    if i < chars.len() && chars[i] == ']' {
        i += 1;
    }

    while i < chars.len() {
        // \] should not end the class
        if chars[i] == '\\' && i + 1 < chars.len() {
            i += 2;
            continue;
        }

        if chars[i] == ']' {
            return i;
        }

        // Skip over POSIX classes [:name:]
        if chars[i] == '[' && i + 1 < chars.len() && chars[i + 1] == ':' {
            let rest: String = chars[i + 2..].iter().collect();
            if let Some(close_pos) = rest.find(":]") {
                i = i + 2 + rest[..close_pos].chars().count() + 2;
                continue;
            }
        }
        i += 1;
    }
    usize::MAX
}

/// Convert a shell character class content to regex equivalent.
/// Input is the content inside [...], e.g., ":alpha:" for [[:alpha:]]
fn convert_char_class(content: &str) -> String {
    let mut result = String::from("[");
    let chars: Vec<char> = content.chars().collect();
    let mut i = 0;

    if !chars.is_empty() && (chars[0] == '^' || chars[0] == '!') {
        result.push('^');
        i += 1;
    }
    let first = i;

    while i < chars.len() {
        // POSIX classes like [:alpha:]
        if chars[i] == '[' && i + 1 < chars.len() && chars[i + 1] == ':' {
            let rest: String = chars[i + 2..].iter().collect();
            if let Some(close_pos) = rest.find(":]") {
                let name = &rest[..close_pos];
                result.push_str(posix_class_to_regex(name));
                i = i + 2 + name.chars().count() + 2;
                continue;
            }
        }

        let c = chars[i];
        if c == '\\' {
            if i + 1 < chars.len() {
                result.push('\\');
                result.push(chars[i + 1]);
                i += 2;
            } else {
                result.push_str("\\\\");
                i += 1;
            }
        } else if c == '-' && i > first && i < chars.len() - 1 {
            // Range separator
            result.push('-');
            i += 1;
        } else if matches!(c, '[' | ']' | '^' | '-' | '&' | '~') {
            // Literal inside the class
            result.push('\\');
            result.push(c);
            i += 1;
        } else {
            result.push(c);
            i += 1;
        }
    }

    result.push(']');
    result
}

/// Convert POSIX character class name to regex equivalent.
/// Returns empty string for unknown class names (matches bash behavior).
fn posix_class_to_regex(name: &str) -> &'static str {
    POSIX_CLASSES.get(name).copied().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_patterns() {
        assert_eq!(pattern_to_regex("*", true), ".*");
        assert_eq!(pattern_to_regex("*", false), ".*?");
        assert_eq!(pattern_to_regex("?", true), ".");
        assert_eq!(pattern_to_regex("abc", true), "abc");
        assert_eq!(pattern_to_regex("a.b", true), "a\\.b");
    }

    #[test]
    fn test_escaped_chars() {
        assert_eq!(pattern_to_regex("\\*", true), "\\*");
        assert_eq!(pattern_to_regex("\\?", true), "\\?");
        assert_eq!(pattern_to_regex("\\[", true), "\\[");
        assert_eq!(pattern_to_regex("\\a", true), "a");
    }

    #[test]
    fn test_character_class() {
        assert_eq!(pattern_to_regex("[abc]", true), "[abc]");
        assert_eq!(pattern_to_regex("[a-z]", true), "[a-z]");
        assert_eq!(pattern_to_regex("[^abc]", true), "[^abc]");
        assert_eq!(pattern_to_regex("[!abc]", true), "[^abc]");
        assert_eq!(pattern_to_regex("[]a]", true), "[\\]a]");
    }

    #[test]
    fn test_unclosed_class_is_literal() {
        assert_eq!(pattern_to_regex("[abc", true), "\\[abc");
    }

    #[test]
    fn test_posix_classes() {
        assert_eq!(pattern_to_regex("[[:alpha:]]", true), "[a-zA-Z]");
        assert_eq!(pattern_to_regex("[[:digit:]_]", true), "[0-9_]");
    }

    #[test]
    fn test_compile_anchored() {
        let re = compile_pattern("*.txt", true, Anchor::Both).unwrap();
        assert!(re.is_match("notes.txt"));
        assert!(!re.is_match("notes.txt.bak"));

        let re = compile_pattern("a|b", true, Anchor::Both).unwrap();
        assert!(re.is_match("a|b"));
        assert!(!re.is_match("a"));
    }

    #[test]
    fn test_wildcards_match_newlines() {
        let re = compile_pattern("a*z", true, Anchor::Both).unwrap();
        assert!(re.is_match("a\nb\nz"));

        let re = compile_pattern("a?z", true, Anchor::Both).unwrap();
        assert!(re.is_match("a\nz"));
    }

    #[test]
    fn test_invalid_range_does_not_compile() {
        assert!(compile_pattern("[z-a]", true, Anchor::None).is_none());
    }
}
