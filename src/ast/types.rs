//! Abstract Syntax Tree (AST) Types for Templates
//!
//! A template is literal text interleaved with `${...}` substitutions.
//! Substitution arguments are themselves trees, so `${A:-${B}}` nests a
//! `Func` inside the argument list of another `Func`.

use serde::Serialize;
use std::fmt;

// =============================================================================
// TREE
// =============================================================================

/// A parsed template. Immutable once built and reusable across expansions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tree {
    pub root: Node,
}

impl Tree {
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    /// Number of nodes in the tree, nested arguments included.
    pub fn node_count(&self) -> usize {
        self.root.count()
    }
}

// =============================================================================
// NODES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// Nothing was parsed. Only ever appears as the root of an empty template.
    Empty,
    Text(TextNode),
    List(ListNode),
    Func(FuncNode),
}

/// A literal run of characters, escapes already removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextNode {
    pub value: String,
}

/// Ordered concatenation of at least two nodes, none of them `Empty`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListNode {
    pub nodes: Vec<Node>,
}

/// A `${...}` substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FuncNode {
    pub name: FuncName,
    /// Variable name, never empty.
    pub param: String,
    pub args: Vec<Node>,
}

impl Node {
    pub fn is_empty(&self) -> bool {
        matches!(self, Node::Empty)
    }

    fn count(&self) -> usize {
        match self {
            Node::Empty => 0,
            Node::Text(_) => 1,
            Node::List(list) => 1 + list.nodes.iter().map(Node::count).sum::<usize>(),
            Node::Func(func) => 1 + func.args.iter().map(Node::count).sum::<usize>(),
        }
    }
}

// =============================================================================
// OPERATORS
// =============================================================================

/// Operator selected by a substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FuncName {
    /// ${VAR}
    Plain,
    /// ${#VAR}
    Length,
    /// ${VAR:-word}
    Default,
    /// ${VAR-word}
    DefaultIfUnset,
    /// ${VAR:=word}
    Assign,
    /// ${VAR=word}
    AssignEqual,
    /// ${VAR:?word}
    Error,
    /// ${VAR?word}
    ErrorIfUnset,
    /// ${VAR:+word}
    Alternative,
    /// ${VAR+word}
    AlternativeIfSet,
    /// ${VAR:offset} or ${VAR:offset:length}
    Substring,
    /// ${VAR#pattern}
    TrimShortestPrefix,
    /// ${VAR##pattern}
    TrimLongestPrefix,
    /// ${VAR%pattern}
    TrimShortestSuffix,
    /// ${VAR%%pattern}
    TrimLongestSuffix,
    /// ${VAR/pattern/string}
    ReplaceFirst,
    /// ${VAR//pattern/string}
    ReplaceAll,
    /// ${VAR/#pattern/string}
    ReplacePrefix,
    /// ${VAR/%pattern/string}
    ReplaceSuffix,
    /// ${VAR,}
    LowerFirst,
    /// ${VAR,,}
    LowerAll,
    /// ${VAR^}
    UpperFirst,
    /// ${VAR^^}
    UpperAll,
}

impl FuncName {
    /// Operator text as written in a template.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "",
            Self::Length => "#",
            Self::Default => ":-",
            Self::DefaultIfUnset => "-",
            Self::Assign => ":=",
            Self::AssignEqual => "=",
            Self::Error => ":?",
            Self::ErrorIfUnset => "?",
            Self::Alternative => ":+",
            Self::AlternativeIfSet => "+",
            Self::Substring => ":",
            Self::TrimShortestPrefix => "#",
            Self::TrimLongestPrefix => "##",
            Self::TrimShortestSuffix => "%",
            Self::TrimLongestSuffix => "%%",
            Self::ReplaceFirst => "/",
            Self::ReplaceAll => "//",
            Self::ReplacePrefix => "/#",
            Self::ReplaceSuffix => "/%",
            Self::LowerFirst => ",",
            Self::LowerAll => ",,",
            Self::UpperFirst => "^",
            Self::UpperAll => "^^",
        }
    }

    /// Map a scanned default/assign/error/alternative operator.
    pub fn from_default_operator(op: &str) -> Option<Self> {
        match op {
            ":-" => Some(Self::Default),
            "-" => Some(Self::DefaultIfUnset),
            ":=" => Some(Self::Assign),
            "=" => Some(Self::AssignEqual),
            ":?" => Some(Self::Error),
            "?" => Some(Self::ErrorIfUnset),
            ":+" => Some(Self::Alternative),
            "+" => Some(Self::AlternativeIfSet),
            _ => None,
        }
    }

    /// Map a scanned trim operator.
    pub fn from_trim_operator(op: &str) -> Option<Self> {
        match op {
            "#" => Some(Self::TrimShortestPrefix),
            "##" => Some(Self::TrimLongestPrefix),
            "%" => Some(Self::TrimShortestSuffix),
            "%%" => Some(Self::TrimLongestSuffix),
            _ => None,
        }
    }

    /// Map a scanned replace operator.
    pub fn from_replace_operator(op: &str) -> Option<Self> {
        match op {
            "/" => Some(Self::ReplaceFirst),
            "//" => Some(Self::ReplaceAll),
            "/#" => Some(Self::ReplacePrefix),
            "/%" => Some(Self::ReplaceSuffix),
            _ => None,
        }
    }

    /// Map a scanned case operator.
    pub fn from_casing_operator(op: &str) -> Option<Self> {
        match op {
            "," => Some(Self::LowerFirst),
            ",," => Some(Self::LowerAll),
            "^" => Some(Self::UpperFirst),
            "^^" => Some(Self::UpperAll),
            _ => None,
        }
    }

    /// Whether the operator supplies its own fallback for unset values.
    pub fn handles_unset(&self) -> bool {
        matches!(
            self,
            Self::Default
                | Self::DefaultIfUnset
                | Self::Assign
                | Self::AssignEqual
                | Self::Error
                | Self::ErrorIfUnset
                | Self::Alternative
                | Self::AlternativeIfSet
        )
    }
}

impl fmt::Display for FuncName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Length => write!(f, "length"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

// =============================================================================
// AST BUILDER
// =============================================================================

/// Constructors used by the parser and by tests.
pub struct AST;

impl AST {
    pub fn text(value: impl Into<String>) -> Node {
        Node::Text(TextNode { value: value.into() })
    }

    pub fn func(name: FuncName, param: impl Into<String>, args: Vec<Node>) -> Node {
        Node::Func(FuncNode {
            name,
            param: param.into(),
            args,
        })
    }

    pub fn plain(param: impl Into<String>) -> Node {
        Self::func(FuncName::Plain, param, Vec::new())
    }

    /// Fold sibling nodes into a single node: `Empty` for none, the node
    /// itself for one, a `List` otherwise. Empty nodes are dropped.
    pub fn list(nodes: Vec<Node>) -> Node {
        let mut nodes: Vec<Node> = nodes.into_iter().filter(|n| !n.is_empty()).collect();
        match nodes.len() {
            0 => Node::Empty,
            1 => nodes.pop().unwrap_or(Node::Empty),
            _ => Node::List(ListNode { nodes }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_folding() {
        assert_eq!(AST::list(vec![]), Node::Empty);
        assert_eq!(AST::list(vec![AST::text("a")]), AST::text("a"));
        assert_eq!(AST::list(vec![Node::Empty, AST::text("a"), Node::Empty]), AST::text("a"));

        let list = AST::list(vec![AST::text("a"), AST::plain("B")]);
        match list {
            Node::List(l) => assert_eq!(l.nodes.len(), 2),
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_operator_mapping() {
        assert_eq!(FuncName::from_default_operator(":-"), Some(FuncName::Default));
        assert_eq!(FuncName::from_default_operator("="), Some(FuncName::AssignEqual));
        assert_eq!(FuncName::from_default_operator("=="), None);
        assert_eq!(FuncName::from_trim_operator("##"), Some(FuncName::TrimLongestPrefix));
        assert_eq!(FuncName::from_replace_operator("/%"), Some(FuncName::ReplaceSuffix));
        assert_eq!(FuncName::from_casing_operator("^^"), Some(FuncName::UpperAll));
        assert_eq!(FuncName::from_casing_operator(",^"), None);
    }

    #[test]
    fn test_node_count() {
        let tree = Tree::new(AST::list(vec![
            AST::text("x"),
            AST::func(FuncName::Default, "A", vec![AST::plain("B")]),
        ]));
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn test_serialize_shape() {
        let json = serde_json::to_value(AST::plain("HOME")).unwrap();
        assert_eq!(json["type"], "func");
        assert_eq!(json["name"], "plain");
        assert_eq!(json["param"], "HOME");
    }
}
