//! Token types for the WAT lexer.
//!
//! Numeric tokens keep their digit text exactly as written (underscores
//! included). Turning that text into a value, and deciding whether it fits the
//! target type, is the job of [`super::literal`].

use serde::Serialize;
use std::fmt;

/// A location in source text.
///
/// Spans track both byte offsets (for slicing) and line/column (for errors).
/// Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    /// Byte offset where this span starts.
    pub start: usize,
    /// Byte offset just past the end of this span.
    pub end: usize,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, counting characters not bytes).
    pub column: u32,
}

impl Span {
    /// A zero-length span at the start of source, for errors without position.
    pub const ZERO: Span = Span {
        start: 0,
        end: 0,
        line: 1,
        column: 1,
    };

    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// The length of this span in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// A span running from the start of `self` to the end of `other`.
    #[must_use]
    pub fn through(self, other: Span) -> Span {
        Span {
            end: other.end.max(self.start),
            ..self
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A lexical token with its location in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The raw source bytes this token was scanned from.
    #[must_use]
    pub fn raw<'a>(&self, source: &'a [u8]) -> &'a [u8] {
        &source[self.span.start..self.span.end]
    }

    /// Get the original source text for this token.
    ///
    /// # Example
    ///
    /// ```
    /// use kasm_text::wat::Lexer;
    ///
    /// let source = "(module)";
    /// let tokens = Lexer::tokenise(source).unwrap();
    /// assert_eq!(tokens[1].text(source), "module");
    /// ```
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.start..self.span.end]
    }
}

/// The kind of token, with associated data where relevant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    LeftParen,
    RightParen,

    /// Keyword-class text found in the fixed keyword table: structural words
    /// (`module`, `func`, `param`), script directives (`assert_return`),
    /// value types and every instruction mnemonic.
    Keyword(String),

    /// Keyword-class text that is not in the keyword table, such as the
    /// memory argument forms `offset=8` and `align=4`.
    Reserved(String),

    /// An identifier like `$name`. The stored string excludes the leading `$`.
    Id(String),

    /// A string literal with escape sequences resolved.
    ///
    /// Stored as raw bytes since WAT strings can contain arbitrary bytes.
    String(Vec<u8>),

    /// An integer literal, not yet converted.
    Integer(IntLit),

    /// A floating-point literal, not yet converted.
    Float(FloatLit),
}

impl TokenKind {
    /// Short description used in "expected X, found Y" diagnostics.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::LeftParen => "'('".into(),
            TokenKind::RightParen => "')'".into(),
            TokenKind::Keyword(k) | TokenKind::Reserved(k) => format!("'{k}'"),
            TokenKind::Id(id) => format!("${id}"),
            TokenKind::String(_) => "string".into(),
            TokenKind::Integer(_) => "integer".into(),
            TokenKind::Float(_) => "float".into(),
        }
    }
}

/// An integer literal as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntLit {
    /// Whether a `-` sign was present.
    pub negative: bool,
    /// Whether any explicit sign (`+` or `-`) was present.
    pub has_sign: bool,
    /// Whether the literal used the `0x` prefix.
    pub hex: bool,
    /// The digits after the sign and prefix, underscores included.
    pub digits: String,
}

/// A floating-point literal as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FloatLit {
    /// `1.5e-3`, `1.`, `12E+4`. The text excludes the sign.
    Decimal { negative: bool, text: String },
    /// `0x1.8p1`. The text excludes the sign and the `0x` prefix.
    Hex { negative: bool, text: String },
    Inf { negative: bool },
    /// `nan` or `nan:0x...`; the payload digits are kept as written.
    Nan { negative: bool, payload: Option<String> },
}

impl FloatLit {
    pub fn is_negative(&self) -> bool {
        match self {
            FloatLit::Decimal { negative, .. }
            | FloatLit::Hex { negative, .. }
            | FloatLit::Inf { negative }
            | FloatLit::Nan { negative, .. } => *negative,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::LeftParen => write!(f, "("),
            TokenKind::RightParen => write!(f, ")"),
            TokenKind::Keyword(s) | TokenKind::Reserved(s) => write!(f, "{}", s),
            TokenKind::Id(s) => write!(f, "${}", s),
            TokenKind::String(bytes) => {
                write!(f, "\"")?;
                for &b in bytes {
                    if (b.is_ascii_graphic() && b != b'"' && b != b'\\') || b == b' ' {
                        write!(f, "{}", b as char)?;
                    } else {
                        write!(f, "\\{:02x}", b)?;
                    }
                }
                write!(f, "\"")
            }
            TokenKind::Integer(lit) => {
                let sign = if lit.negative {
                    "-"
                } else if lit.has_sign {
                    "+"
                } else {
                    ""
                };
                let prefix = if lit.hex { "0x" } else { "" };
                write!(f, "{sign}{prefix}{}", lit.digits)
            }
            TokenKind::Float(fl) => {
                if fl.is_negative() {
                    write!(f, "-")?;
                }
                match fl {
                    FloatLit::Decimal { text, .. } => write!(f, "{text}"),
                    FloatLit::Hex { text, .. } => write!(f, "0x{text}"),
                    FloatLit::Inf { .. } => write!(f, "inf"),
                    FloatLit::Nan { payload: None, .. } => write!(f, "nan"),
                    FloatLit::Nan { payload: Some(p), .. } => write!(f, "nan:0x{p}"),
                }
            }
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind, self.span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_display_is_line_colon_column() {
        assert_eq!(Span::new(10, 12, 3, 7).to_string(), "3:7");
    }

    #[test]
    fn span_through_covers_both() {
        let open = Span::new(4, 5, 1, 5);
        let close = Span::new(20, 21, 2, 3);
        let joined = open.through(close);
        assert_eq!((joined.start, joined.end), (4, 21));
        assert_eq!((joined.line, joined.column), (1, 5));
    }

    #[test]
    fn display_integer_keeps_sign_and_prefix() {
        let kind = TokenKind::Integer(IntLit {
            negative: true,
            has_sign: true,
            hex: true,
            digits: "ff_ff".into(),
        });
        assert_eq!(kind.to_string(), "-0xff_ff");
    }

    #[test]
    fn display_string_escapes_non_printable() {
        let kind = TokenKind::String(vec![b'a', 0x00, b'"']);
        assert_eq!(kind.to_string(), r#""a\00\22""#);
    }

    #[test]
    fn display_nan_payload() {
        let kind = TokenKind::Float(FloatLit::Nan {
            negative: true,
            payload: Some("7f_ffff".into()),
        });
        assert_eq!(kind.to_string(), "-nan:0x7f_ffff");
    }
}
