//! S-expression reading for WAT and script sources.
//!
//! Parsing happens in two phases:
//!
//! 1. **Tokens -> S-expression tree**: parentheses are matched and tokens are
//!    organised into nested forms. No meaning is attached to anything yet.
//!
//! 2. **S-expression tree -> module/script**: later phases walk the tree and
//!    can see every child of a list without consuming tokens speculatively.
//!
//! # Example
//!
//! ```
//! use kasm_text::wat::sexpr::read;
//!
//! let sexpr = read("(module (func $add (param i32 i32) (result i32)))").unwrap();
//! let list = sexpr.as_list().unwrap();
//! assert_eq!(list.head_keyword(), Some("module"));
//! assert_eq!(list.len(), 2); // "module" and "(func ...)"
//! ```

use super::error::ParseError;
use super::lexer::Lexer;
use super::token::{IntLit, Span, Token, TokenKind};
use crate::config::Config;

// ============================================================================
// S-Expression Types
// ============================================================================

/// An S-expression: either an atom (single token) or a parenthesised list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SExpr {
    Atom(Token),

    /// A parenthesised list. The span covers both parentheses.
    List { span: Span, items: Vec<SExpr> },
}

impl SExpr {
    pub fn span(&self) -> Span {
        match self {
            SExpr::Atom(token) => token.span,
            SExpr::List { span, .. } => *span,
        }
    }

    pub fn as_atom(&self) -> Option<&Token> {
        match self {
            SExpr::Atom(token) => Some(token),
            SExpr::List { .. } => None,
        }
    }

    pub fn as_list(&self) -> Option<SExprList<'_>> {
        match self {
            SExpr::Atom(_) => None,
            SExpr::List { span, items } => Some(SExprList { span: *span, items }),
        }
    }

    /// The keyword text if this is a keyword atom.
    pub fn as_keyword(&self) -> Option<&str> {
        match self.as_atom().map(|t| &t.kind) {
            Some(TokenKind::Keyword(kw)) => Some(kw),
            _ => None,
        }
    }

    /// The identifier (without `$`) if this is an id atom.
    pub fn as_id(&self) -> Option<&str> {
        match self.as_atom().map(|t| &t.kind) {
            Some(TokenKind::Id(id)) => Some(id),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&[u8]> {
        match self.as_atom().map(|t| &t.kind) {
            Some(TokenKind::String(bytes)) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<&IntLit> {
        match self.as_atom().map(|t| &t.kind) {
            Some(TokenKind::Integer(lit)) => Some(lit),
            _ => None,
        }
    }

    /// Whether this is a list starting with the given keyword.
    pub fn is_list_headed_by(&self, keyword: &str) -> bool {
        self.as_list().map_or(false, |list| list.head_keyword() == Some(keyword))
    }

    /// A short description for "expected X, found Y" messages.
    pub fn describe(&self) -> String {
        match self {
            SExpr::Atom(token) => token.kind.describe(),
            SExpr::List { items, .. } => match items.first().and_then(SExpr::as_keyword) {
                Some(kw) => format!("'({kw} ...)'"),
                None => "list".into(),
            },
        }
    }

    pub fn expect_list(&self) -> Result<SExprList<'_>, ParseError> {
        self.as_list()
            .ok_or_else(|| ParseError::expected("list", &self.describe(), self.span()))
    }

    pub fn expect_keyword(&self) -> Result<&str, ParseError> {
        self.as_keyword()
            .ok_or_else(|| ParseError::expected("keyword", &self.describe(), self.span()))
    }

    pub fn expect_string(&self) -> Result<&[u8], ParseError> {
        self.as_string()
            .ok_or_else(|| ParseError::expected("string", &self.describe(), self.span()))
    }
}

// ============================================================================
// List View
// ============================================================================

/// A borrowed view of a list, with accessors for the common `(keyword ...)`
/// shape.
#[derive(Debug, Clone, Copy)]
pub struct SExprList<'a> {
    pub span: Span,
    pub items: &'a [SExpr],
}

impl<'a> SExprList<'a> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn head(&self) -> Option<&'a SExpr> {
        self.items.first()
    }

    /// All items after the head.
    pub fn tail(&self) -> &'a [SExpr] {
        self.items.get(1..).unwrap_or(&[])
    }

    pub fn get(&self, index: usize) -> Option<&'a SExpr> {
        self.items.get(index)
    }

    pub fn head_keyword(&self) -> Option<&'a str> {
        self.head().and_then(|s| s.as_keyword())
    }

    /// Expects the head to be a specific keyword.
    pub fn expect_head(&self, expected: &str) -> Result<(), ParseError> {
        match self.head() {
            Some(head) if head.as_keyword() == Some(expected) => Ok(()),
            Some(head) => Err(ParseError::expected(&format!("'{expected}'"), &head.describe(), head.span())),
            None => Err(ParseError::expected(&format!("'{expected}'"), "empty list", self.span)),
        }
    }

    /// Finds the first list with the given head keyword, starting from index.
    pub fn find_list(&self, keyword: &str, from: usize) -> Option<SExprList<'a>> {
        self.items
            .iter()
            .skip(from)
            .find(|s| s.is_list_headed_by(keyword))
            .and_then(|s| s.as_list())
    }
}

// ============================================================================
// Reader
// ============================================================================

/// Pull-based reader producing one top-level form at a time.
///
/// Lexical errors from the underlying [`Lexer`] are passed through as-is.
/// After any error the reader yields nothing more.
pub struct Reader<'a> {
    tokens: Lexer<'a>,
    max_depth: usize,
    failed: bool,
}

impl<'a> Reader<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::with_config(source.as_bytes(), &Config::default())
    }

    pub fn with_config(source: &'a [u8], config: &Config) -> Self {
        Self {
            tokens: Lexer::from_bytes(source),
            max_depth: config.max_depth,
            failed: false,
        }
    }

    fn read_form(&mut self) -> Option<Result<SExpr, ParseError>> {
        // Open lists, innermost last. Built iteratively so deep input cannot
        // exhaust the stack.
        let mut open: Vec<(Span, Vec<SExpr>)> = Vec::new();

        loop {
            let token = match self.tokens.next() {
                Some(Ok(token)) => token,
                Some(Err(e)) => return Some(Err(e)),
                None => {
                    return match open.pop() {
                        Some((span, _)) => Some(Err(ParseError::structural("unclosed parenthesis", span))),
                        None => None,
                    };
                }
            };

            let form = match token.kind {
                TokenKind::LeftParen => {
                    if open.len() >= self.max_depth {
                        return Some(Err(ParseError::structural("nesting too deep", token.span)));
                    }
                    open.push((token.span, Vec::new()));
                    continue;
                }
                TokenKind::RightParen => match open.pop() {
                    Some((start, items)) => SExpr::List {
                        span: start.through(token.span),
                        items,
                    },
                    None => return Some(Err(ParseError::structural("unexpected ')'", token.span))),
                },
                _ => SExpr::Atom(token),
            };

            match open.last_mut() {
                Some((_, items)) => items.push(form),
                None => return Some(Ok(form)),
            }
        }
    }
}

impl<'a> Iterator for Reader<'a> {
    type Item = Result<SExpr, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = self.read_form();
        if matches!(result, Some(Err(_))) {
            self.failed = true;
        }
        result
    }
}

impl std::iter::FusedIterator for Reader<'_> {}

/// Reads exactly one S-expression from source.
///
/// # Example
///
/// ```
/// use kasm_text::wat::sexpr::read;
///
/// let sexpr = read("(module)").unwrap();
/// assert!(sexpr.as_list().is_some());
/// ```
pub fn read(source: &str) -> Result<SExpr, ParseError> {
    let mut reader = Reader::new(source);
    let sexpr = match reader.next() {
        Some(result) => result?,
        None => return Err(ParseError::structural("unexpected end of input", Span::ZERO)),
    };
    match reader.next() {
        Some(Ok(extra)) => Err(ParseError::structural("unexpected token after expression", extra.span())),
        Some(Err(e)) => Err(e),
        None => Ok(sexpr),
    }
}

/// Reads every top-level S-expression in source.
pub fn read_all(source: &str) -> Result<Vec<SExpr>, ParseError> {
    Reader::new(source).collect()
}
