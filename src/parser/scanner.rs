//! Scanner for Templates
//!
//! Unlike a fixed lexer, the scanner has no grammar of its own. Before each
//! call to [`Scanner::scan`] the parser selects a [`ScanContext`], and the
//! context decides:
//! - which characters belong to the current token (acceptance predicate)
//! - which token kinds are legal (mode bitmask)
//! - which characters a backslash may escape
//!
//! One-rune lookahead is available through `peek`/`read`/`unread`.

use std::ops::BitOr;

/// Token kinds produced by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// A run of accepted characters, see [`Scanner::text`]
    Ident,
    /// `${`
    Lbrack,
    /// `}`
    Rbrack,
    Eof,
    /// Nothing legal in the current context
    Illegal,
}

/// Set of token kinds legal in a context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanMode(u8);

impl ScanMode {
    pub const IDENT: ScanMode = ScanMode(1);
    pub const LBRACK: ScanMode = ScanMode(1 << 1);
    pub const RBRACK: ScanMode = ScanMode(1 << 2);
    pub const ESCAPE: ScanMode = ScanMode(1 << 3);

    pub fn contains(self, other: ScanMode) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ScanMode {
    type Output = ScanMode;

    fn bitor(self, rhs: ScanMode) -> ScanMode {
        ScanMode(self.0 | rhs.0)
    }
}

/// Characters a backslash may escape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeSet {
    None,
    /// Literal text: only `$`
    Dollar,
    /// Word arguments: every delimiter plus the backslash itself
    Word,
    /// Glob pattern arguments: delimiters only. The backslash stays in the
    /// text so the pattern engine still sees `\*`, `\?` and `\\`.
    Pattern,
}

impl EscapeSet {
    pub fn contains(self, c: char) -> bool {
        match self {
            EscapeSet::None => false,
            EscapeSet::Dollar => c == '$',
            EscapeSet::Word => "$\\:/}#%,^".contains(c),
            EscapeSet::Pattern => "$:/}#%,^".contains(c),
        }
    }
}

/// Acceptance predicate: character and its 1-based position in the token
pub type AcceptFn = fn(char, usize) -> bool;

/// Resolved scanning rules for one context
#[derive(Clone, Copy)]
pub struct ScanRules {
    pub accept: AcceptFn,
    pub mode: ScanMode,
    pub escapes: EscapeSet,
}

/// Grammar position the parser is in when it asks for the next token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanContext {
    /// Top-level literal text
    Text,
    /// Variable name right after `${` (or `${#`)
    VariableName,
    /// The `#` of `${#VAR}`
    LengthOp,
    /// The `:` of `${VAR:offset}`
    SubstrOp,
    SubstrOffset,
    /// `:` between offset and length, or the closing brace
    SubstrDelimiter,
    SubstrLength,
    /// `#` or `##`
    HashOp,
    /// `%` or `%%`
    PercentOp,
    RemovePattern,
    /// `/`, `//`, `/#` or `/%`
    ReplaceOp,
    ReplacePattern,
    /// `/` between pattern and replacement
    ReplaceDelimiter,
    Replacement,
    /// `:-`, `:=`, `:?` or `:+`
    DefaultOp,
    /// `-`, `=`, `?` or `+`
    BareDefaultOp,
    DefaultWord,
    /// `,` or `,,`
    LowerOp,
    /// `^` or `^^`
    UpperOp,
    /// Only a closing brace
    Close,
}

fn accept_any(_c: char, _i: usize) -> bool {
    true
}

fn accept_none(_c: char, _i: usize) -> bool {
    false
}

fn accept_ident(c: char, _i: usize) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn accept_one_hash(c: char, i: usize) -> bool {
    i == 1 && c == '#'
}

fn accept_one_colon(c: char, i: usize) -> bool {
    i == 1 && c == ':'
}

fn accept_one_slash(c: char, i: usize) -> bool {
    i == 1 && c == '/'
}

fn accept_hash_op(c: char, i: usize) -> bool {
    i <= 2 && c == '#'
}

fn accept_percent_op(c: char, i: usize) -> bool {
    i <= 2 && c == '%'
}

fn accept_lower_op(c: char, i: usize) -> bool {
    i <= 2 && c == ','
}

fn accept_upper_op(c: char, i: usize) -> bool {
    i <= 2 && c == '^'
}

fn accept_replace_op(c: char, i: usize) -> bool {
    match i {
        1 => c == '/',
        2 => matches!(c, '/' | '#' | '%'),
        _ => false,
    }
}

fn accept_default_op(c: char, i: usize) -> bool {
    match i {
        1 => c == ':',
        2 => matches!(c, '=' | '-' | '?' | '+'),
        _ => false,
    }
}

fn accept_bare_default_op(c: char, i: usize) -> bool {
    i == 1 && matches!(c, '=' | '-' | '?' | '+')
}

fn reject_colon_close(c: char, _i: usize) -> bool {
    c != ':' && c != '}'
}

fn reject_slash_close(c: char, _i: usize) -> bool {
    c != '/' && c != '}'
}

fn reject_close(c: char, _i: usize) -> bool {
    c != '}'
}

impl ScanContext {
    /// Dispatch table from grammar position to scanning rules.
    pub fn rules(self) -> ScanRules {
        use ScanContext::*;

        let argument = ScanMode::IDENT | ScanMode::LBRACK | ScanMode::ESCAPE;
        let (accept, mode, escapes): (AcceptFn, ScanMode, EscapeSet) = match self {
            Text => (accept_any, argument, EscapeSet::Dollar),
            VariableName => (accept_ident, ScanMode::IDENT, EscapeSet::None),
            LengthOp => (accept_one_hash, ScanMode::IDENT, EscapeSet::None),
            SubstrOp => (accept_one_colon, ScanMode::IDENT, EscapeSet::None),
            SubstrOffset => (reject_colon_close, argument, EscapeSet::Word),
            SubstrDelimiter => (
                accept_one_colon,
                ScanMode::IDENT | ScanMode::RBRACK,
                EscapeSet::None,
            ),
            SubstrLength => (reject_close, argument, EscapeSet::Word),
            HashOp => (accept_hash_op, ScanMode::IDENT, EscapeSet::None),
            PercentOp => (accept_percent_op, ScanMode::IDENT, EscapeSet::None),
            RemovePattern => (reject_close, argument, EscapeSet::Pattern),
            ReplaceOp => (accept_replace_op, ScanMode::IDENT, EscapeSet::None),
            ReplacePattern => (reject_slash_close, argument, EscapeSet::Pattern),
            ReplaceDelimiter => (accept_one_slash, ScanMode::IDENT, EscapeSet::None),
            Replacement => (reject_close, argument, EscapeSet::Word),
            DefaultOp => (accept_default_op, ScanMode::IDENT, EscapeSet::None),
            BareDefaultOp => (accept_bare_default_op, ScanMode::IDENT, EscapeSet::None),
            DefaultWord => (reject_close, argument, EscapeSet::Word),
            LowerOp => (accept_lower_op, ScanMode::IDENT, EscapeSet::None),
            UpperOp => (accept_upper_op, ScanMode::IDENT, EscapeSet::None),
            Close => (accept_none, ScanMode::RBRACK, EscapeSet::None),
        };

        ScanRules {
            accept,
            mode,
            escapes,
        }
    }
}

/// Lexical cursor over a template
pub struct Scanner {
    input: Vec<char>,
    pos: usize,
    context: ScanContext,
    text: String,
}

impl Scanner {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            context: ScanContext::Text,
            text: String::new(),
        }
    }

    pub fn set_context(&mut self, context: ScanContext) {
        self.context = context;
    }

    pub fn context(&self) -> ScanContext {
        self.context
    }

    /// Character offset of the cursor
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Text covered by the last `Ident` token, escapes removed
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    pub fn read(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    /// Step back over the last character read
    pub fn unread(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }

    fn at_lbrack(&self) -> bool {
        self.peek() == Some('$') && self.peek_at(1) == Some('{')
    }

    /// Scan the next token under the current context.
    pub fn scan(&mut self) -> Token {
        self.text.clear();
        let rules = self.context.rules();

        let Some(c) = self.peek() else {
            return Token::Eof;
        };

        if rules.mode.contains(ScanMode::LBRACK) && self.at_lbrack() {
            self.pos += 2;
            return Token::Lbrack;
        }

        if rules.mode.contains(ScanMode::RBRACK) && c == '}' {
            self.pos += 1;
            return Token::Rbrack;
        }

        if rules.mode.contains(ScanMode::IDENT) && self.scan_ident(&rules) {
            return Token::Ident;
        }

        Token::Illegal
    }

    fn scan_ident(&mut self, rules: &ScanRules) -> bool {
        let escape = rules.mode.contains(ScanMode::ESCAPE);
        let stop_at_lbrack = rules.mode.contains(ScanMode::LBRACK);
        let mut count = 0;

        while let Some(c) = self.peek() {
            if stop_at_lbrack && self.at_lbrack() {
                break;
            }

            if escape && c == '\\' {
                if let Some(next) = self.peek_at(1) {
                    if rules.escapes.contains(next) {
                        self.text.push(next);
                        self.pos += 2;
                        count += 1;
                        continue;
                    }
                }
            }

            if !(rules.accept)(c, count + 1) {
                break;
            }
            self.text.push(c);
            self.pos += 1;
            count += 1;
        }

        count > 0
    }
}
