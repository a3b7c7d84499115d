//! Error type shared by every phase of text parsing.

use super::token::Span;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Which phase rejected the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// Malformed token: bad escape, unterminated string or comment, unknown byte.
    Lexical,
    /// Unbalanced parentheses, wrong field shape, mismatched block opener/closer.
    Structural,
    /// Unbound or duplicate identifier, namespace mismatch.
    Resolution,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::Lexical => "lexical error",
            ErrorKind::Structural => "structural error",
            ErrorKind::Resolution => "resolution error",
        })
    }
}

/// An error encountered while parsing a module or script.
///
/// None of these are recoverable: the unit being parsed is abandoned at the
/// first one.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{span}: {message}")]
#[must_use]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
        }
    }

    pub fn lexical(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Lexical, message, span)
    }

    pub fn structural(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Structural, message, span)
    }

    pub fn resolution(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Resolution, message, span)
    }

    /// Creates an "expected X, found Y" structural error.
    pub fn expected(expected: &str, found: &str, span: Span) -> Self {
        Self::structural(format!("expected {}, found {}", expected, found), span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ParseError::lexical("unexpected character", Span::new(10, 11, 3, 5));
        assert_eq!(err.to_string(), "3:5: unexpected character");
        assert_eq!(err.kind, ErrorKind::Lexical);
    }

    #[test]
    fn expected_is_structural() {
        let err = ParseError::expected("string", "integer", Span::ZERO);
        assert_eq!(err.kind, ErrorKind::Structural);
        assert_eq!(err.message, "expected string, found integer");
    }
}
