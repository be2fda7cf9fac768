//! Recursive Descent Parser for Templates
//!
//! This parser drives the scanner, switching its context before every scan,
//! and produces an AST. Every decision point needs at most one rune of
//! lookahead.
//!
//! Grammar (simplified):
//!   template   ::= (text | func)*
//!   func       ::= '${' ( '#' name | name [operation] ) '}'
//!   operation  ::= ':' offset [':' length]
//!                | (':-' | ':=' | ':?' | ':+' | '-' | '=' | '?' | '+') word*
//!                | ('#' | '##' | '%' | '%%') pattern
//!                | ('/' | '//' | '/#' | '/%') pattern ['/' [string]]
//!                | (',' | ',,' | '^' | '^^')
//!   argument   ::= (text | func)+

use crate::ast::types::{FuncName, FuncNode, Node, Tree, AST};
use crate::parser::scanner::{ScanContext, Scanner, Token};
use crate::parser::types::{ParseError, ParseErrorKind, MAX_INPUT_SIZE, MAX_PARSER_DEPTH};

/// Parse a template into a tree.
pub fn parse(input: &str) -> Result<Tree, ParseError> {
    Parser::new(input).parse()
}

pub struct Parser {
    scanner: Scanner,
    depth: usize,
    input_len: usize,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        let scanner = Scanner::new(input);
        Self {
            input_len: input.chars().count(),
            scanner,
            depth: 0,
        }
    }

    /// Parse the whole input. The scanner is consumed; a failed parse leaves
    /// nothing behind.
    pub fn parse(mut self) -> Result<Tree, ParseError> {
        if self.input_len > MAX_INPUT_SIZE {
            return Err(ParseError::new(ParseErrorKind::InputTooLarge, 0));
        }

        match self.parse_any() {
            Ok(root) => {
                let tree = Tree::new(root);
                tracing::debug!(
                    chars = self.input_len,
                    nodes = tree.node_count(),
                    "parsed template"
                );
                Ok(tree)
            }
            Err(err) => {
                tracing::debug!(error = %err, "template parse failed");
                Err(err)
            }
        }
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.scanner.offset())
    }

    fn scan(&mut self, context: ScanContext) -> Token {
        self.scanner.set_context(context);
        self.scanner.scan()
    }

    /// Scan an operator token, returning its text.
    fn scan_operator(
        &mut self,
        context: ScanContext,
        kind: ParseErrorKind,
    ) -> Result<String, ParseError> {
        match self.scan(context) {
            Token::Ident => Ok(self.scanner.text().to_string()),
            _ => Err(self.error(kind)),
        }
    }

    // =========================================================================
    // TOP LEVEL
    // =========================================================================

    /// Alternating literal runs and substitutions until end of input.
    fn parse_any(&mut self) -> Result<Node, ParseError> {
        let mut nodes = Vec::new();
        loop {
            match self.scan(ScanContext::Text) {
                Token::Ident => nodes.push(AST::text(self.scanner.text())),
                Token::Lbrack => nodes.push(self.parse_func()?),
                Token::Eof => break,
                _ => return Err(self.error(ParseErrorKind::BadSubstitution)),
            }
        }
        Ok(AST::list(nodes))
    }

    // =========================================================================
    // SUBSTITUTIONS
    // =========================================================================

    /// Parse a substitution; `${` has already been consumed.
    fn parse_func(&mut self) -> Result<Node, ParseError> {
        self.depth += 1;
        if self.depth > MAX_PARSER_DEPTH {
            return Err(self.error(ParseErrorKind::NestingTooDeep));
        }
        let result = self.parse_func_body();
        self.depth -= 1;
        result
    }

    fn parse_func_body(&mut self) -> Result<Node, ParseError> {
        if self.scanner.peek() == Some('#') {
            return self.parse_len_func();
        }

        let name = match self.scan(ScanContext::VariableName) {
            Token::Ident => self.scanner.text().to_string(),
            _ => return Err(self.error(ParseErrorKind::ParseVariableName)),
        };

        match self.scanner.peek() {
            Some(':') => return self.parse_default_or_substr(name),
            Some('=' | '-' | '?' | '+') => return self.parse_default_func(name),
            Some(',' | '^') => return self.parse_casing_func(name),
            Some('/') => return self.parse_replace_func(name),
            Some('#') => return self.parse_remove_func(name, ScanContext::HashOp),
            Some('%') => return self.parse_remove_func(name, ScanContext::PercentOp),
            _ => {}
        }

        match self.scan(ScanContext::Close) {
            Token::Rbrack => Ok(AST::plain(name)),
            _ => Err(self.error(ParseErrorKind::MissingClosingBrace)),
        }
    }

    /// `${VAR:` starts both the substring and the colon default forms; the
    /// rune after the colon decides.
    fn parse_default_or_substr(&mut self, name: String) -> Result<Node, ParseError> {
        self.scanner.read();
        let next = self.scanner.peek();
        self.scanner.unread();

        match next {
            Some('=' | '-' | '?' | '+') => self.parse_default_func(name),
            _ => self.parse_substr_func(name),
        }
    }

    // parses the ${param:offset} string function
    // parses the ${param:offset:length} string function
    fn parse_substr_func(&mut self, name: String) -> Result<Node, ParseError> {
        self.scan_operator(ScanContext::SubstrOp, ParseErrorKind::BadSubstitution)?;

        let mut node = FuncNode {
            name: FuncName::Substring,
            param: name,
            args: Vec::new(),
        };
        node.args
            .push(self.parse_arg(ScanContext::SubstrOffset, &[':', '}'])?);

        match self.scan(ScanContext::SubstrDelimiter) {
            Token::Rbrack => return Ok(Node::Func(node)),
            Token::Ident => {}
            _ => return Err(self.error(ParseErrorKind::BadSubstitution)),
        }

        node.args.push(self.parse_arg(ScanContext::SubstrLength, &['}'])?);
        self.consume_rbrack()?;
        Ok(Node::Func(node))
    }

    // parses the ${param#pattern} and ${param##pattern} string functions
    // parses the ${param%pattern} and ${param%%pattern} string functions
    fn parse_remove_func(
        &mut self,
        name: String,
        operator: ScanContext,
    ) -> Result<Node, ParseError> {
        let op = self.scan_operator(operator, ParseErrorKind::BadSubstitution)?;
        let func = FuncName::from_trim_operator(&op)
            .ok_or_else(|| self.error(ParseErrorKind::BadSubstitution))?;

        let pattern = self.parse_arg(ScanContext::RemovePattern, &['}'])?;
        self.consume_rbrack()?;
        Ok(AST::func(func, name, vec![pattern]))
    }

    // parses the ${param/pattern/string} string function
    // parses the ${param//pattern/string} string function
    // parses the ${param/#pattern/string} string function
    // parses the ${param/%pattern/string} string function
    fn parse_replace_func(&mut self, name: String) -> Result<Node, ParseError> {
        let op = self.scan_operator(ScanContext::ReplaceOp, ParseErrorKind::BadSubstitution)?;
        let func = FuncName::from_replace_operator(&op)
            .ok_or_else(|| self.error(ParseErrorKind::BadSubstitution))?;

        let mut args = vec![self.parse_arg(ScanContext::ReplacePattern, &['/', '}'])?];

        // ${param/pattern} deletes the match
        if self.scanner.peek() == Some('}') {
            self.consume_rbrack()?;
            return Ok(AST::func(func, name, args));
        }

        self.scan_operator(ScanContext::ReplaceDelimiter, ParseErrorKind::BadSubstitution)?;

        // blank replacement
        if self.scanner.peek() != Some('}') {
            args.push(self.parse_arg(ScanContext::Replacement, &['}'])?);
        }

        self.consume_rbrack()?;
        Ok(AST::func(func, name, args))
    }

    // parses the ${param:-word}, ${param:=word}, ${param:?word} and
    // ${param:+word} string functions, and their colon-less forms
    fn parse_default_func(&mut self, name: String) -> Result<Node, ParseError> {
        let context = if self.scanner.peek() == Some(':') {
            ScanContext::DefaultOp
        } else {
            ScanContext::BareDefaultOp
        };
        let op = self.scan_operator(context, ParseErrorKind::ParseDefaultFunction)?;
        let func = FuncName::from_default_operator(&op)
            .ok_or_else(|| self.error(ParseErrorKind::ParseDefaultFunction))?;

        // the word may interleave literal runs and nested substitutions
        let mut args = Vec::new();
        loop {
            if self.scanner.peek() == Some('}') {
                self.consume_rbrack()?;
                return Ok(AST::func(func, name, args));
            }
            args.push(self.parse_param(ScanContext::DefaultWord)?);
        }
    }

    // parses the ${param,}, ${param,,}, ${param^} and ${param^^} string functions
    fn parse_casing_func(&mut self, name: String) -> Result<Node, ParseError> {
        let context = if self.scanner.peek() == Some(',') {
            ScanContext::LowerOp
        } else {
            ScanContext::UpperOp
        };
        let op = self.scan_operator(context, ParseErrorKind::BadSubstitution)?;
        let func = FuncName::from_casing_operator(&op)
            .ok_or_else(|| self.error(ParseErrorKind::BadSubstitution))?;

        self.consume_rbrack()?;
        Ok(AST::func(func, name, Vec::new()))
    }

    // parses the ${#param} string function
    fn parse_len_func(&mut self) -> Result<Node, ParseError> {
        self.scan_operator(ScanContext::LengthOp, ParseErrorKind::BadSubstitution)?;
        let param = self.scan_operator(ScanContext::VariableName, ParseErrorKind::BadSubstitution)?;

        self.consume_rbrack()?;
        Ok(AST::func(FuncName::Length, param, Vec::new()))
    }

    // =========================================================================
    // ARGUMENTS
    // =========================================================================

    /// One argument fragment: a nested substitution or a literal run.
    fn parse_param(&mut self, context: ScanContext) -> Result<Node, ParseError> {
        match self.scan(context) {
            Token::Lbrack => self.parse_func(),
            Token::Ident => Ok(AST::text(self.scanner.text())),
            _ => Err(self.error(ParseErrorKind::ParseFuncSubstitution)),
        }
    }

    /// A whole argument: fragments up to the next unescaped terminator.
    fn parse_arg(&mut self, context: ScanContext, terminators: &[char]) -> Result<Node, ParseError> {
        let mut fragments = Vec::new();
        loop {
            match self.scanner.peek() {
                None => break,
                Some(c) if terminators.contains(&c) => break,
                Some(_) => fragments.push(self.parse_param(context)?),
            }
        }

        if fragments.is_empty() {
            return Err(self.error(ParseErrorKind::ParseFuncSubstitution));
        }
        Ok(AST::list(fragments))
    }

    /// Require and consume a closing brace.
    fn consume_rbrack(&mut self) -> Result<(), ParseError> {
        match self.scan(ScanContext::Close) {
            Token::Rbrack => Ok(()),
            _ => Err(self.error(ParseErrorKind::BadSubstitution)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root(input: &str) -> Node {
        parse(input).unwrap().root
    }

    fn kind(input: &str) -> ParseErrorKind {
        parse(input).unwrap_err().kind
    }

    fn func(input: &str) -> FuncNode {
        match root(input) {
            Node::Func(f) => f,
            other => panic!("expected func for {:?}, got {:?}", input, other),
        }
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(root(""), Node::Empty);
    }

    #[test]
    fn test_parse_text_only() {
        assert_eq!(root("hello world"), AST::text("hello world"));
    }

    #[test]
    fn test_parse_plain() {
        assert_eq!(root("${HOME}"), AST::plain("HOME"));
    }

    #[test]
    fn test_parse_mixed() {
        let expected = AST::list(vec![
            AST::text("a "),
            AST::plain("B"),
            AST::text(" c"),
            AST::plain("D"),
        ]);
        assert_eq!(root("a ${B} c${D}"), expected);
    }

    #[test]
    fn test_parse_length() {
        assert_eq!(root("${#VAR}"), AST::func(FuncName::Length, "VAR", vec![]));
    }

    #[test]
    fn test_parse_defaults() {
        let cases = [
            ("${V:-w}", FuncName::Default),
            ("${V:=w}", FuncName::Assign),
            ("${V:?w}", FuncName::Error),
            ("${V:+w}", FuncName::Alternative),
            ("${V=w}", FuncName::AssignEqual),
            ("${V-w}", FuncName::DefaultIfUnset),
            ("${V?w}", FuncName::ErrorIfUnset),
            ("${V+w}", FuncName::AlternativeIfSet),
        ];
        for (input, name) in cases {
            assert_eq!(root(input), AST::func(name, "V", vec![AST::text("w")]), "{}", input);
        }
    }

    /// The colon-less `-`, `?` and `+` forms are accepted like bash, not
    /// just `=`. Any other character after the name still needs a `}`.
    #[test]
    fn test_parse_colonless_operators() {
        assert_eq!(func("${V-w}").name, FuncName::DefaultIfUnset);
        assert_eq!(func("${V?}").name, FuncName::ErrorIfUnset);
        assert_eq!(func("${V+${W}}").args, vec![AST::plain("W")]);
        assert_eq!(kind("${V!w}"), ParseErrorKind::MissingClosingBrace);
        assert_eq!(kind("${V~w}"), ParseErrorKind::MissingClosingBrace);
    }

    #[test]
    fn test_parse_default_empty_word() {
        assert_eq!(root("${V:-}"), AST::func(FuncName::Default, "V", vec![]));
    }

    #[test]
    fn test_parse_default_fragments() {
        let f = func("${V:-a${B}c}");
        assert_eq!(
            f.args,
            vec![AST::text("a"), AST::plain("B"), AST::text("c")]
        );
    }

    #[test]
    fn test_parse_nested_default() {
        let f = func("${VAR:-${OTHER:-x}}");
        assert_eq!(f.name, FuncName::Default);
        assert_eq!(
            f.args,
            vec![AST::func(FuncName::Default, "OTHER", vec![AST::text("x")])]
        );
    }

    #[test]
    fn test_parse_substring() {
        let f = func("${V:1:3}");
        assert_eq!(f.name, FuncName::Substring);
        assert_eq!(f.args, vec![AST::text("1"), AST::text("3")]);

        let f = func("${V:2}");
        assert_eq!(f.args, vec![AST::text("2")]);

        let f = func("${V: -2}");
        assert_eq!(f.name, FuncName::Substring);
        assert_eq!(f.args, vec![AST::text(" -2")]);
    }

    #[test]
    fn test_parse_substring_nested_offset() {
        let f = func("${V:${OFF}:${LEN}}");
        assert_eq!(f.args, vec![AST::plain("OFF"), AST::plain("LEN")]);
    }

    #[test]
    fn test_colon_dash_is_default_not_substring() {
        assert_eq!(func("${V:-2}").name, FuncName::Default);
    }

    #[test]
    fn test_parse_remove() {
        let cases = [
            ("${V#*/}", FuncName::TrimShortestPrefix),
            ("${V##*/}", FuncName::TrimLongestPrefix),
            ("${V%/*}", FuncName::TrimShortestSuffix),
            ("${V%%/*}", FuncName::TrimLongestSuffix),
        ];
        for (input, name) in cases {
            let f = func(input);
            assert_eq!(f.name, name, "{}", input);
            assert_eq!(f.args.len(), 1);
        }
    }

    #[test]
    fn test_parse_remove_pattern_with_nested() {
        let f = func("${V#${P}-}");
        assert_eq!(f.args, vec![AST::list(vec![AST::plain("P"), AST::text("-")])]);
    }

    #[test]
    fn test_parse_replace() {
        let f = func("${V/o/0}");
        assert_eq!(f.name, FuncName::ReplaceFirst);
        assert_eq!(f.args, vec![AST::text("o"), AST::text("0")]);

        assert_eq!(func("${V//o/0}").name, FuncName::ReplaceAll);
        assert_eq!(func("${V/#o/0}").name, FuncName::ReplacePrefix);
        assert_eq!(func("${V/%o/0}").name, FuncName::ReplaceSuffix);
    }

    #[test]
    fn test_parse_replace_blank() {
        assert_eq!(func("${V/o/}").args, vec![AST::text("o")]);
        assert_eq!(func("${V/o}").args, vec![AST::text("o")]);
    }

    #[test]
    fn test_parse_replace_escaped_slash() {
        let f = func(r"${V/a\/b/c\/d}");
        assert_eq!(f.args, vec![AST::text("a/b"), AST::text("c/d")]);
    }

    #[test]
    fn test_parse_casing() {
        assert_eq!(func("${V,}").name, FuncName::LowerFirst);
        assert_eq!(func("${V,,}").name, FuncName::LowerAll);
        assert_eq!(func("${V^}").name, FuncName::UpperFirst);
        assert_eq!(func("${V^^}").name, FuncName::UpperAll);
    }

    #[test]
    fn test_escaped_dollar_in_text() {
        assert_eq!(root(r"\${NOT}"), AST::text("${NOT}"));
    }

    #[test]
    fn test_escaped_close_in_default() {
        assert_eq!(func(r"${V:-a\}b}").args, vec![AST::text("a}b")]);
    }

    #[test]
    fn test_missing_closing_brace() {
        assert_eq!(kind("${VAR"), ParseErrorKind::MissingClosingBrace);
        assert_eq!(kind("${VAR!}"), ParseErrorKind::MissingClosingBrace);
    }

    #[test]
    fn test_bad_variable_name() {
        assert_eq!(kind("${}"), ParseErrorKind::ParseVariableName);
        assert_eq!(kind("${ VAR}"), ParseErrorKind::ParseVariableName);
    }

    #[test]
    fn test_bad_substitution() {
        assert_eq!(kind("${V,^}"), ParseErrorKind::BadSubstitution);
        assert_eq!(kind("${#}"), ParseErrorKind::BadSubstitution);
        assert_eq!(kind("${V:1"), ParseErrorKind::BadSubstitution);
        assert_eq!(kind("${V^^x}"), ParseErrorKind::BadSubstitution);
    }

    #[test]
    fn test_func_substitution_errors() {
        assert_eq!(kind("${V:}"), ParseErrorKind::ParseFuncSubstitution);
        assert_eq!(kind("${V#}"), ParseErrorKind::ParseFuncSubstitution);
        assert_eq!(kind("${V:-abc"), ParseErrorKind::ParseFuncSubstitution);
    }

    #[test]
    fn test_error_offset() {
        let err = parse("abc ${}").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ParseVariableName);
        assert_eq!(err.offset, 6);
    }

    #[test]
    fn test_nesting_limit() {
        let deep = "${A:-".repeat(MAX_PARSER_DEPTH + 1) + &"}".repeat(MAX_PARSER_DEPTH + 1);
        assert_eq!(kind(&deep), ParseErrorKind::NestingTooDeep);

        let ok = "${A:-".repeat(10) + &"}".repeat(10);
        assert!(parse(&ok).is_ok());
    }
}
