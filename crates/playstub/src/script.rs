//! Snippet grammar.
//!
//! The stub has no script engine. Instead every snippet the test suite sends
//! to `page.evaluate` is tokenised and parsed into a [`Snippet`] from a closed
//! set of forms, tried in priority order:
//!
//! 1. `window.__testState.<path> = <literal>`
//! 2. `applyTheme(<theme>, {<options>})`
//! 3. `setMutedState(<muted>, {<options>})`
//! 4. `(async () => { await setMutedState(...); ... })()`
//! 5. `() => <expr>` / `(() => <expr>)`, where `<expr>` is a test-state read
//!    (optionally compared with `>` or `===`) or a `document.querySelector`
//!    lookup (optionally chained with `.classList.contains(...)`)
//! 6. bare `window.__testState.<path>`
//!
//! The first form that matches the whole snippet wins; anything else is an
//! [`StubError::UnsupportedExpression`].

use crate::result::{StubError, StubResult};
use crate::state::{kind_of, StatePath};
use serde_json::{Number, Value};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// TOKENS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tok {
    Ident(String),
    Number(String),
    Str(String),
    Dot,
    Comma,
    Colon,
    Semi,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Assign,
    StrictEq,
    LooseEq,
    Arrow,
    Gt,
    Other(String),
}

#[derive(Debug, Clone)]
struct Token {
    tok: Tok,
    end: usize,
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Split source into tokens. Never fails: unknown characters and unterminated
/// strings become `Tok::Other`, which no rule accepts.
fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let tok = if is_ident_start(c) {
            let mut ident = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if !is_ident_continue(c) {
                    break;
                }
                ident.push(c);
                chars.next();
            }
            Tok::Ident(ident)
        } else if c.is_ascii_digit() {
            let mut digits = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if !c.is_ascii_digit() {
                    break;
                }
                digits.push(c);
                chars.next();
            }
            Tok::Number(digits)
        } else if c == '"' || c == '\'' {
            let quote = c;
            chars.next();
            let mut text = String::new();
            let mut closed = false;
            while let Some((_, c)) = chars.next() {
                match c {
                    '\\' => match chars.next() {
                        Some((_, 'n')) => text.push('\n'),
                        Some((_, 't')) => text.push('\t'),
                        Some((_, escaped)) => text.push(escaped),
                        None => break,
                    },
                    c if c == quote => {
                        closed = true;
                        break;
                    }
                    c => text.push(c),
                }
            }
            if closed {
                Tok::Str(text)
            } else {
                Tok::Other(source[start..].to_string())
            }
        } else {
            chars.next();
            let mut next_is = |expected: char| {
                if chars.peek().map(|&(_, c)| c) == Some(expected) {
                    chars.next();
                    true
                } else {
                    false
                }
            };
            match c {
                '.' => Tok::Dot,
                ',' => Tok::Comma,
                ':' => Tok::Colon,
                ';' => Tok::Semi,
                '(' => Tok::LParen,
                ')' => Tok::RParen,
                '{' => Tok::LBrace,
                '}' => Tok::RBrace,
                '[' => Tok::LBracket,
                ']' => Tok::RBracket,
                '=' => {
                    if next_is('>') {
                        Tok::Arrow
                    } else if next_is('=') {
                        if next_is('=') {
                            Tok::StrictEq
                        } else {
                            Tok::LooseEq
                        }
                    } else {
                        Tok::Assign
                    }
                }
                '>' => {
                    if next_is('=') {
                        Tok::Other(">=".to_string())
                    } else {
                        Tok::Gt
                    }
                }
                other => Tok::Other(other.to_string()),
            }
        };

        let end = chars.peek().map_or(source.len(), |&(i, _)| i);
        tokens.push(Token { tok, end });
    }

    tokens
}

// =============================================================================
// SNIPPET TREE
// =============================================================================

/// Boolean options object passed to the bridge calls, e.g.
/// `{announce: true, force: false}`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOptions {
    entries: BTreeMap<String, bool>,
}

impl CallOptions {
    /// Value of an option, false when absent
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.entries.get(key).copied().unwrap_or(false)
    }

    /// `announce` option
    #[must_use]
    pub fn announce(&self) -> bool {
        self.flag("announce")
    }

    /// `force` option
    #[must_use]
    pub fn force(&self) -> bool {
        self.flag("force")
    }

    /// Set an option (builder form)
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: bool) -> Self {
        self.entries.insert(key.into(), value);
        self
    }
}

/// `applyTheme(theme, options)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeCall {
    /// First argument with quotes removed
    pub theme: String,
    /// Options object
    pub options: CallOptions,
}

/// `setMutedState(muted, options)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuteCall {
    /// First argument compared case-insensitively to `true`
    pub muted: bool,
    /// Options object
    pub options: CallOptions,
}

/// Comparison operator allowed after a test-state read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `>`
    GreaterThan,
    /// `===`
    StrictEquals,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::GreaterThan => ">",
            Self::StrictEquals => "===",
        })
    }
}

/// `<op> <literal>` suffix of a test-state read
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Operator
    pub op: CompareOp,
    /// Right-hand literal
    pub rhs: Value,
}

impl Comparison {
    /// Compare a resolved value against the literal
    pub fn apply(&self, lhs: &Value) -> StubResult<bool> {
        match self.op {
            CompareOp::StrictEquals => Ok(strict_equals(lhs, &self.rhs)),
            CompareOp::GreaterThan => {
                if let (Some(a), Some(b)) = (numeric(lhs), numeric(&self.rhs)) {
                    return Ok(a > b);
                }
                match (lhs, &self.rhs) {
                    (Value::String(a), Value::String(b)) => Ok(a > b),
                    (a, b) => Err(StubError::type_mismatch(format!(
                        "cannot compare {} > {}",
                        kind_of(a),
                        kind_of(b)
                    ))),
                }
            }
        }
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn strict_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        // Distinct arrays/objects are never identical in JavaScript
        (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => false,
        _ => a == b,
    }
}

/// Body of a zero-argument arrow function
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `window.__testState[.<path>] [<op> <literal>]`
    State {
        /// Path below `window.__testState`
        path: StatePath,
        /// Optional comparison
        comparison: Option<Comparison>,
    },
    /// `document.querySelector(<selector>)[.classList.contains(<class>)]`
    QuerySelector {
        /// Selector text
        selector: String,
        /// Class name to test for
        contains_class: Option<String>,
    },
}

/// A parsed snippet
#[derive(Debug, Clone, PartialEq)]
pub enum Snippet {
    /// `window.__testState.<path> = <literal>`
    AssignState {
        /// Target path
        path: StatePath,
        /// Parsed right-hand side
        value: Value,
    },
    /// `applyTheme(...)`
    ApplyTheme(ThemeCall),
    /// `setMutedState(...)`
    SetMutedState(MuteCall),
    /// Async IIFE replaying `setMutedState` calls in order
    AsyncBlock(Vec<MuteCall>),
    /// Zero-argument arrow function
    Function(Expr),
    /// Bare `window.__testState.<path>`
    ReadState(StatePath),
}

impl Snippet {
    /// Parse a snippet, trying each form in priority order
    pub fn parse(source: &str) -> StubResult<Self> {
        let source = source.trim();
        let tokens = tokenize(source);
        let parser = || Parser::new(source, &tokens);
        parser()
            .assignment()
            .or_else(|| parser().apply_theme())
            .or_else(|| parser().set_muted_state())
            .or_else(|| parser().async_block())
            .or_else(|| parser().function())
            .or_else(|| parser().bare_read())
            .ok_or_else(|| StubError::unsupported(source))
    }

    /// Parse a predicate for `wait_for_function`: only arrow functions and
    /// bare test-state reads qualify
    pub fn parse_predicate(source: &str) -> StubResult<Self> {
        match Self::parse(source)? {
            snippet @ (Self::Function(_) | Self::ReadState(_)) => Ok(snippet),
            _ => Err(StubError::unsupported(source.trim())),
        }
    }

    /// Short name of the form, for logs
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AssignState { .. } => "assign_state",
            Self::ApplyTheme(_) => "apply_theme",
            Self::SetMutedState(_) => "set_muted_state",
            Self::AsyncBlock(_) => "async_block",
            Self::Function(_) => "function",
            Self::ReadState(_) => "read_state",
        }
    }
}

/// Parse the right-hand side of a path assignment.
///
/// `[]` is an empty array, `true`/`false` (any case) are booleans, a digit
/// string is an integer (a float once it exceeds `u64`), a quoted string
/// loses its quotes, and anything else is kept as raw text.
#[must_use]
pub fn parse_literal(raw: &str) -> Value {
    let raw = raw.trim();
    if raw.starts_with('[') && raw.ends_with(']') && raw[1..raw.len() - 1].trim().is_empty() {
        return Value::Array(Vec::new());
    }
    if raw.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = raw.parse::<u64>() {
            return Value::from(n);
        }
        if let Some(n) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(n);
        }
    }
    if raw.len() >= 2 {
        for quote in ['"', '\''] {
            if raw.starts_with(quote) && raw.ends_with(quote) {
                return Value::String(raw[1..raw.len() - 1].to_string());
            }
        }
    }
    Value::String(raw.to_string())
}

// =============================================================================
// PARSER
// =============================================================================

const STATE_ROOT: [&str; 2] = ["window", "__testState"];

struct Parser<'a> {
    source: &'a str,
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, tokens: &'a [Token]) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
        }
    }

    fn peek(&self) -> Option<&'a Tok> {
        self.tokens.get(self.pos).map(|t| &t.tok)
    }

    fn bump(&mut self) -> Option<&'a Tok> {
        let tok = self.peek()?;
        self.pos += 1;
        Some(tok)
    }

    fn eat(&mut self, expected: &Tok) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Tok) -> Option<()> {
        self.eat(expected).then_some(())
    }

    fn at_ident(&self, name: &str) -> bool {
        matches!(self.peek(), Some(Tok::Ident(ident)) if ident == name)
    }

    fn keyword(&mut self, name: &str) -> Option<()> {
        if self.at_ident(name) {
            self.pos += 1;
            Some(())
        } else {
            None
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        match self.peek()? {
            Tok::Ident(ident) => {
                self.pos += 1;
                Some(ident.as_str())
            }
            _ => None,
        }
    }

    /// Optional `;` then end of input
    fn finish(&mut self) -> Option<()> {
        while self.eat(&Tok::Semi) {}
        (self.pos == self.tokens.len()).then_some(())
    }

    /// `window.__testState` followed by `.ident` segments
    fn state_path(&mut self) -> Option<StatePath> {
        self.keyword(STATE_ROOT[0])?;
        self.expect(&Tok::Dot)?;
        self.keyword(STATE_ROOT[1])?;
        let mut segments = Vec::new();
        while self.eat(&Tok::Dot) {
            segments.push(self.ident()?.to_string());
        }
        Some(StatePath::from_segments(segments))
    }

    /// Single-token literal, or `[]`
    fn literal(&mut self) -> Option<Value> {
        match self.bump()? {
            Tok::Number(digits) => Some(parse_literal(digits)),
            Tok::Str(text) => Some(Value::String(text.clone())),
            Tok::Ident(ident) => Some(parse_literal(ident)),
            Tok::LBracket => {
                self.expect(&Tok::RBracket)?;
                Some(Value::Array(Vec::new()))
            }
            _ => None,
        }
    }

    /// Bridge-call argument: quotes are stripped, bare words kept verbatim
    fn argument(&mut self) -> Option<String> {
        match self.peek()? {
            Tok::Str(text) | Tok::Ident(text) | Tok::Number(text) => {
                self.pos += 1;
                Some(text.clone())
            }
            _ => None,
        }
    }

    /// `{key: value, ...}`; a value counts as true when it reads `true` in
    /// any case
    fn options(&mut self) -> Option<CallOptions> {
        self.expect(&Tok::LBrace)?;
        let mut options = CallOptions::default();
        while !self.eat(&Tok::RBrace) {
            let key = self.argument()?;
            self.expect(&Tok::Colon)?;
            let value = self.argument()?;
            options.entries.insert(key, value.eq_ignore_ascii_case("true"));
            if !self.eat(&Tok::Comma) {
                self.expect(&Tok::RBrace)?;
                break;
            }
        }
        Some(options)
    }

    /// `name(` [first [`,` options]] `)`; a missing first argument reads as
    /// the empty string
    fn call(&mut self, name: &str) -> Option<(String, CallOptions)> {
        self.keyword(name)?;
        self.expect(&Tok::LParen)?;
        let mut first = String::new();
        let mut options = CallOptions::default();
        if !self.eat(&Tok::RParen) {
            first = self.argument()?;
            if self.eat(&Tok::Comma) && self.peek() != Some(&Tok::RParen) {
                options = self.options()?;
            }
            self.expect(&Tok::RParen)?;
        }
        Some((first, options))
    }

    fn mute_call(&mut self) -> Option<Option<MuteCall>> {
        let start = self.pos;
        let (first, options) = self.call("setMutedState")?;
        // `setMutedState()` inside an async block is skipped
        let empty = self.pos - start == 3;
        Some((!empty).then(|| MuteCall {
            muted: first.eq_ignore_ascii_case("true"),
            options,
        }))
    }

    /// `() =>`
    fn arrow_head(&mut self) -> Option<()> {
        self.expect(&Tok::LParen)?;
        self.expect(&Tok::RParen)?;
        self.expect(&Tok::Arrow)
    }

    /// Arrow body: an expression, or a braced block holding one optionally
    /// `return`ed expression
    fn arrow_body(&mut self) -> Option<Expr> {
        if self.eat(&Tok::LBrace) {
            let _ = self.keyword("return");
            let expr = self.expr()?;
            while self.eat(&Tok::Semi) {}
            self.expect(&Tok::RBrace)?;
            Some(expr)
        } else {
            self.expr()
        }
    }

    fn expr(&mut self) -> Option<Expr> {
        if self.at_ident("document") {
            return self.query_selector();
        }
        let path = self.state_path()?;
        let op = match self.peek() {
            Some(Tok::Gt) => Some(CompareOp::GreaterThan),
            Some(Tok::StrictEq) => Some(CompareOp::StrictEquals),
            _ => None,
        };
        let comparison = match op {
            Some(op) => {
                self.pos += 1;
                Some(Comparison {
                    op,
                    rhs: self.literal()?,
                })
            }
            None => None,
        };
        Some(Expr::State { path, comparison })
    }

    fn query_selector(&mut self) -> Option<Expr> {
        self.keyword("document")?;
        self.expect(&Tok::Dot)?;
        self.keyword("querySelector")?;
        self.expect(&Tok::LParen)?;
        let selector = self.argument()?;
        self.expect(&Tok::RParen)?;

        let mut contains_class = None;
        if self.eat(&Tok::Dot) {
            self.keyword("classList")?;
            self.expect(&Tok::Dot)?;
            self.keyword("contains")?;
            self.expect(&Tok::LParen)?;
            contains_class = Some(self.argument()?);
            self.expect(&Tok::RParen)?;
        }
        Some(Expr::QuerySelector {
            selector,
            contains_class,
        })
    }

    // Rules -------------------------------------------------------------------

    fn assignment(&mut self) -> Option<Snippet> {
        let path = self.state_path()?;
        if path.is_root() {
            return None;
        }
        let end = self.tokens.get(self.pos).filter(|t| t.tok == Tok::Assign)?.end;
        let rhs = self.source[end..].trim().trim_end_matches(';');
        Some(Snippet::AssignState {
            path,
            value: parse_literal(rhs),
        })
    }

    fn apply_theme(&mut self) -> Option<Snippet> {
        let (theme, options) = self.call("applyTheme")?;
        self.finish()?;
        Some(Snippet::ApplyTheme(ThemeCall { theme, options }))
    }

    fn set_muted_state(&mut self) -> Option<Snippet> {
        let (first, options) = self.call("setMutedState")?;
        self.finish()?;
        Some(Snippet::SetMutedState(MuteCall {
            muted: first.eq_ignore_ascii_case("true"),
            options,
        }))
    }

    fn async_block(&mut self) -> Option<Snippet> {
        self.expect(&Tok::LParen)?;
        self.keyword("async")?;
        self.arrow_head()?;
        self.expect(&Tok::LBrace)?;
        let mut calls = Vec::new();
        while !self.eat(&Tok::RBrace) {
            if self.eat(&Tok::Semi) {
                continue;
            }
            let _ = self.keyword("await");
            if let Some(call) = self.mute_call()? {
                calls.push(call);
            }
        }
        self.expect(&Tok::RParen)?;
        self.expect(&Tok::LParen)?;
        self.expect(&Tok::RParen)?;
        self.finish()?;
        Some(Snippet::AsyncBlock(calls))
    }

    fn function(&mut self) -> Option<Snippet> {
        let wrapped = self.peek() == Some(&Tok::LParen)
            && self.tokens.get(self.pos + 1).map(|t| &t.tok) == Some(&Tok::LParen);
        if wrapped {
            self.expect(&Tok::LParen)?;
        }
        self.arrow_head()?;
        let expr = self.arrow_body()?;
        if wrapped {
            self.expect(&Tok::RParen)?;
            if self.eat(&Tok::LParen) {
                self.expect(&Tok::RParen)?;
            }
        }
        self.finish()?;
        Some(Snippet::Function(expr))
    }

    fn bare_read(&mut self) -> Option<Snippet> {
        let path = self.state_path()?;
        self.finish()?;
        Some(Snippet::ReadState(path))
    }
}
