//! Pattern Removal Helpers
//!
//! Functions for ${var#pattern}, ${var##pattern}, ${var%pattern} and
//! ${var%%pattern}.

use crate::interpreter::expansion::pattern::{compile_pattern, Anchor};

/// Side for pattern removal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternRemovalSide {
    Prefix,
    Suffix,
}

/// Remove a prefix or suffix matching a glob pattern.
/// greedy: true removes the longest match (## and %%), false the shortest.
pub fn apply_pattern_removal(
    value: &str,
    pattern: &str,
    side: PatternRemovalSide,
    greedy: bool,
) -> String {
    // Anchored at both ends: each candidate prefix or suffix must match whole
    let Some(re) = compile_pattern(pattern, greedy, Anchor::Both) else {
        return value.to_string();
    };

    // One linear search rules out values where no candidate can match
    let side_anchor = match side {
        PatternRemovalSide::Prefix => Anchor::Start,
        PatternRemovalSide::Suffix => Anchor::End,
    };
    match compile_pattern(pattern, greedy, side_anchor) {
        Some(side_re) if side_re.is_match(value) => {}
        _ => return value.to_string(),
    }

    // Char boundaries, ascending, end of string included
    let bounds: Vec<usize> = value
        .char_indices()
        .map(|(idx, _)| idx)
        .chain(std::iter::once(value.len()))
        .collect();

    match side {
        PatternRemovalSide::Prefix => {
            // Shortest prefix first, or longest when greedy
            let found = if greedy {
                bounds.iter().rev().find(|&&end| re.is_match(&value[..end]))
            } else {
                bounds.iter().find(|&&end| re.is_match(&value[..end]))
            };
            match found {
                Some(&end) => value[end..].to_string(),
                None => value.to_string(),
            }
        }
        PatternRemovalSide::Suffix => {
            // Shortest suffix starts at the end, longest at the beginning
            let found = if greedy {
                bounds.iter().find(|&&start| re.is_match(&value[start..]))
            } else {
                bounds.iter().rev().find(|&&start| re.is_match(&value[start..]))
            };
            match found {
                Some(&start) => value[..start].to_string(),
                None => value.to_string(),
            }
        }
    }
}
