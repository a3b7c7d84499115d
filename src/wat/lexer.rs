//! Lexer for WebAssembly Text Format.
//!
//! Tokenises WAT source into a stream of tokens. The lexer is an iterator,
//! producing tokens lazily on demand, and stops for good at the first error.
//!
//! # Example
//!
//! ```
//! use kasm_text::wat::Lexer;
//!
//! let source = "(module (func $add (param i32 i32) (result i32)))";
//! for result in Lexer::new(source) {
//!     let token = result.expect("valid token");
//!     println!("{:?}", token);
//! }
//! ```

use super::cursor::{Cursor, Position};
use super::error::ParseError;
use super::keywords::is_keyword;
use super::token::{FloatLit, IntLit, Token, TokenKind};

// ============================================================================
// Lexer
// ============================================================================

/// Lexer for WebAssembly Text Format.
///
/// Produces tokens via the `Iterator` trait. Once an error has been yielded
/// the iterator is exhausted.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    failed: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::from_bytes(source.as_bytes())
    }

    /// Create a lexer over raw bytes. String literals may hold any bytes;
    /// everywhere else only ASCII is accepted.
    pub fn from_bytes(source: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(source),
            failed: false,
        }
    }

    /// Tokenise the entire source, returning all tokens or the first error.
    pub fn tokenise(source: &str) -> Result<Vec<Token>, ParseError> {
        Lexer::new(source).collect()
    }

    /// Create an error at the given position.
    fn error(&self, message: impl Into<String>, pos: Position) -> ParseError {
        ParseError::lexical(message, pos.span_here())
    }

    /// Create an error spanning from start to current position.
    fn error_span(&self, message: impl Into<String>, start: Position) -> ParseError {
        ParseError::lexical(message, start.span_to(&self.cursor.position()))
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = self.skip_whitespace_and_comments().and_then(|()| {
            if self.cursor.is_eof() {
                return Ok(None);
            }
            let start = self.cursor.position();
            let kind = self.lex_token()?;
            Ok(Some(Token::new(kind, start.span_to(&self.cursor.position()))))
        });
        match result {
            Ok(token) => token.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for Lexer<'_> {}

// ============================================================================
// Top-level token dispatch
// ============================================================================

impl<'a> Lexer<'a> {
    /// Lex a single token (after whitespace/comments have been skipped).
    fn lex_token(&mut self) -> Result<TokenKind, ParseError> {
        let start = self.cursor.position();
        let Some(b) = self.cursor.peek() else {
            return Err(self.error("unexpected end of input", start));
        };

        let kind = match b {
            b'(' => {
                self.cursor.advance();
                return Ok(TokenKind::LeftParen);
            }
            b')' => {
                self.cursor.advance();
                return Ok(TokenKind::RightParen);
            }
            b'"' => self.lex_string()?,
            b'$' => self.lex_id()?,
            b'+' | b'-' => self.lex_signed()?,
            b if b.is_ascii_digit() => self.lex_number(false, false)?,
            b if is_idchar(b) => self.lex_keyword(),
            b => {
                self.cursor.advance();
                let message = if b.is_ascii_graphic() {
                    format!("unexpected character: {:?}", b as char)
                } else {
                    format!("unexpected byte 0x{:02x}", b)
                };
                return Err(self.error(message, start));
            }
        };

        self.check_token_boundary(start)?;
        Ok(kind)
    }

    /// Lex a keyword-class run: a known keyword, `inf`/`nan`, or a reserved word.
    fn lex_keyword(&mut self) -> TokenKind {
        let text = ascii(self.cursor.take_while(is_idchar));

        if let Some(float) = parse_special_float(&text, false) {
            return TokenKind::Float(float);
        }
        let leads_lowercase = text.as_bytes().first().map_or(false, u8::is_ascii_lowercase);
        if leads_lowercase && is_keyword(&text) {
            TokenKind::Keyword(text)
        } else {
            TokenKind::Reserved(text)
        }
    }

    /// Handle a `+` or `-` prefix: a signed number, signed `inf`/`nan`, or
    /// a reserved word such as a bare `-`.
    fn lex_signed(&mut self) -> Result<TokenKind, ParseError> {
        if matches!(self.cursor.peek_second(), Some(b) if b.is_ascii_digit()) {
            let negative = self.cursor.advance() == Some(b'-');
            return self.lex_number(negative, true);
        }

        let text = ascii(self.cursor.take_while(is_idchar));
        let (negative, rest) = text.split_at(1);
        match parse_special_float(rest, negative == "-") {
            Some(float) => Ok(TokenKind::Float(float)),
            None => Ok(TokenKind::Reserved(text)),
        }
    }

    /// Verify the next byte is a token boundary (whitespace, parens,
    /// comment start, or EOF). `1x`, `$l"a"` and `"a""b"` are all rejected.
    fn check_token_boundary(&self, start: Position) -> Result<(), ParseError> {
        match self.cursor.peek() {
            None => Ok(()),
            Some(b' ' | b'\t' | b'\n' | b'\r' | b'(' | b')' | b';') => Ok(()),
            _ => Err(self.error("unknown operator", start)),
        }
    }
}

// ============================================================================
// Whitespace and comments
// ============================================================================

impl<'a> Lexer<'a> {
    fn skip_whitespace_and_comments(&mut self) -> Result<(), ParseError> {
        loop {
            self.cursor.skip_while(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'));

            if self.cursor.starts_with(b";;") {
                self.cursor.skip_while(|b| b != b'\n');
            } else if self.cursor.starts_with(b"(;") {
                self.skip_block_comment()?;
            } else {
                return Ok(());
            }
        }
    }

    /// Skip a block comment, handling nesting.
    fn skip_block_comment(&mut self) -> Result<(), ParseError> {
        let start = self.cursor.position();
        self.cursor.advance();
        self.cursor.advance();

        let mut depth = 1;
        while depth > 0 {
            if self.cursor.is_eof() {
                return Err(self.error_span("unterminated block comment", start));
            }
            if self.cursor.starts_with(b"(;") {
                self.cursor.advance();
                self.cursor.advance();
                depth += 1;
            } else if self.cursor.starts_with(b";)") {
                self.cursor.advance();
                self.cursor.advance();
                depth -= 1;
            } else {
                self.cursor.advance();
            }
        }
        Ok(())
    }
}

// ============================================================================
// Identifiers and strings
// ============================================================================

impl<'a> Lexer<'a> {
    fn lex_id(&mut self) -> Result<TokenKind, ParseError> {
        let start = self.cursor.position();
        self.cursor.advance();

        let name = self.cursor.take_while(is_idchar);
        if name.is_empty() {
            return Err(self.error_span("expected identifier after '$'", start));
        }
        Ok(TokenKind::Id(ascii(name)))
    }

    fn lex_string(&mut self) -> Result<TokenKind, ParseError> {
        let start = self.cursor.position();
        self.cursor.advance();

        let mut bytes = Vec::new();
        loop {
            match self.cursor.peek() {
                None => return Err(self.error_span("unterminated string literal", start)),
                Some(b'"') => {
                    self.cursor.advance();
                    return Ok(TokenKind::String(bytes));
                }
                Some(b'\n' | b'\r') => {
                    return Err(self.error_span("newline in string literal", start));
                }
                Some(b'\\') => {
                    self.cursor.advance();
                    self.lex_escape(&mut bytes)?;
                }
                Some(b) => {
                    self.cursor.advance();
                    bytes.push(b);
                }
            }
        }
    }

    /// Lex an escape sequence (after the backslash), appending to `bytes`.
    fn lex_escape(&mut self, bytes: &mut Vec<u8>) -> Result<(), ParseError> {
        let pos = self.cursor.position();
        let b = self
            .cursor
            .advance()
            .ok_or_else(|| self.error("unterminated escape sequence", pos))?;

        match b {
            b't' => bytes.push(0x09),
            b'n' => bytes.push(0x0A),
            b'r' => bytes.push(0x0D),
            b'"' => bytes.push(0x22),
            b'\'' => bytes.push(0x27),
            b'\\' => bytes.push(0x5C),
            b'u' => self.lex_unicode_escape(bytes)?,
            high if high.is_ascii_hexdigit() => {
                let low_pos = self.cursor.position();
                match self.cursor.peek() {
                    Some(low) if low.is_ascii_hexdigit() => {
                        self.cursor.advance();
                        bytes.push((hex_value(high) << 4) | hex_value(low));
                    }
                    _ => return Err(self.error("invalid hex escape", low_pos)),
                }
            }
            other => {
                let shown = if other.is_ascii_graphic() {
                    (other as char).to_string()
                } else {
                    format!("x{:02x}", other)
                };
                return Err(self.error(format!("invalid escape sequence: \\{}", shown), pos));
            }
        }
        Ok(())
    }

    /// Lex `\u{...}` (after the `u`), appending the code point as UTF-8.
    fn lex_unicode_escape(&mut self, bytes: &mut Vec<u8>) -> Result<(), ParseError> {
        let pos = self.cursor.position();
        if self.cursor.advance() != Some(b'{') {
            return Err(self.error("expected '{' after \\u", pos));
        }

        let digits_start = self.cursor.position();
        let digits = self.cursor.take_while(|b| b.is_ascii_hexdigit());
        if digits.is_empty() || digits.len() > 6 {
            return Err(self.error_span("unicode escape needs one to six hex digits", digits_start));
        }
        let code_point = digits.iter().fold(0u32, |acc, &d| (acc << 4) | u32::from(hex_value(d)));

        if self.cursor.advance() != Some(b'}') {
            return Err(self.error_span("unterminated unicode escape", pos));
        }

        let c = char::from_u32(code_point).ok_or_else(|| {
            self.error(format!("invalid unicode code point: U+{:X}", code_point), digits_start)
        })?;
        let mut buf = [0u8; 4];
        bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
        Ok(())
    }
}

// ============================================================================
// Number literals
// ============================================================================

impl<'a> Lexer<'a> {
    /// Lex a number whose sign (if any) has been consumed.
    ///
    /// Underscores are accepted anywhere in a digit run here; their placement
    /// is checked when the literal is converted to a value.
    fn lex_number(&mut self, negative: bool, has_sign: bool) -> Result<TokenKind, ParseError> {
        let start = self.cursor.position();
        let hex = self.cursor.starts_with(b"0x") || self.cursor.starts_with(b"0X");
        if hex {
            self.cursor.advance();
            self.cursor.advance();
        }
        let is_digit = move |b: u8| if hex { b.is_ascii_hexdigit() } else { b.is_ascii_digit() };

        let digits_start = self.cursor.position();
        if self.cursor.skip_while(|b| is_digit(b) || b == b'_') == 0 {
            return Err(self.error_span("expected digits in number", start));
        }

        let mut is_float = false;
        if self.cursor.peek() == Some(b'.') {
            is_float = true;
            self.cursor.advance();
            self.cursor.skip_while(|b| is_digit(b) || b == b'_');
        }

        let exponent = if hex { [b'p', b'P'] } else { [b'e', b'E'] };
        if matches!(self.cursor.peek(), Some(b) if exponent.contains(&b)) {
            is_float = true;
            self.cursor.advance();
            if matches!(self.cursor.peek(), Some(b'+' | b'-')) {
                self.cursor.advance();
            }
            let exp_digits = self.cursor.take_while(|b| b.is_ascii_digit() || b == b'_');
            if !exp_digits.iter().any(u8::is_ascii_digit) {
                return Err(self.error_span("missing exponent digits", start));
            }
        }

        let text = ascii(self.cursor.slice_from(&digits_start));
        Ok(match (is_float, hex) {
            (false, _) => TokenKind::Integer(IntLit {
                negative,
                has_sign,
                hex,
                digits: text,
            }),
            (true, false) => TokenKind::Float(FloatLit::Decimal { negative, text }),
            (true, true) => TokenKind::Float(FloatLit::Hex { negative, text }),
        })
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Whether a byte may appear in an identifier or keyword.
///
/// Per the text format, idchars are ASCII letters and digits plus
/// ``!#$%&'*+-./:<=>?@\^_`|~``.
fn is_idchar(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'!' | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'-'
                | b'.'
                | b'/'
                | b':'
                | b'<'
                | b'='
                | b'>'
                | b'?'
                | b'@'
                | b'\\'
                | b'^'
                | b'_'
                | b'`'
                | b'|'
                | b'~'
        )
}

fn hex_value(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        _ => b - b'A' + 10,
    }
}

/// Idchar runs are ASCII by construction.
fn ascii(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Recognise `inf`, `nan` and `nan:0x...` keyword-class text.
fn parse_special_float(text: &str, negative: bool) -> Option<FloatLit> {
    match text {
        "inf" => Some(FloatLit::Inf { negative }),
        "nan" => Some(FloatLit::Nan {
            negative,
            payload: None,
        }),
        _ => {
            let payload = text.strip_prefix("nan:0x")?;
            if payload.is_empty() || !payload.bytes().all(|b| b.is_ascii_hexdigit() || b == b'_') {
                return None;
            }
            Some(FloatLit::Nan {
                negative,
                payload: Some(payload.to_string()),
            })
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::super::error::ErrorKind;
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenise(source)
            .expect("tokenise failed")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn expect_error(source: &str, substring: &str) -> ParseError {
        let err = Lexer::tokenise(source).expect_err("expected error");
        assert_eq!(err.kind, ErrorKind::Lexical);
        assert!(
            err.message.contains(substring),
            "Expected error containing {:?}, got {:?}",
            substring,
            err.message
        );
        err
    }

    fn int(digits: &str) -> TokenKind {
        TokenKind::Integer(IntLit {
            negative: false,
            has_sign: false,
            hex: false,
            digits: digits.into(),
        })
    }

    fn kw(s: &str) -> TokenKind {
        TokenKind::Keyword(s.into())
    }

    // =========================================================================
    // Parentheses, whitespace and comments
    // =========================================================================

    #[test]
    fn empty_input() {
        assert_eq!(kinds(""), vec![]);
    }

    #[test]
    fn nested_parens() {
        assert_eq!(
            kinds(" ( ( ) )\t\r\n"),
            vec![
                TokenKind::LeftParen,
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::RightParen,
            ]
        );
    }

    #[test]
    fn line_comment_runs_to_newline() {
        assert_eq!(kinds(";; (module)\nfunc"), vec![kw("func")]);
    }

    #[test]
    fn nested_block_comment() {
        assert_eq!(kinds("(; outer (; inner ;) still ;) nop"), vec![kw("nop")]);
    }

    #[test]
    fn unterminated_block_comment_yields_one_error() {
        let results: Vec<_> = Lexer::new("(; never closed").collect();
        assert_eq!(results.len(), 1);
        let err = results[0].clone().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Lexical);
        assert!(err.message.contains("unterminated block comment"));
    }

    #[test]
    fn unbalanced_nested_comment() {
        expect_error("(; (; ;)", "unterminated block comment");
    }

    // =========================================================================
    // Keywords and reserved words
    // =========================================================================

    #[test]
    fn keywords_from_table() {
        assert_eq!(
            kinds("module i32.const memory.grow assert_return nan:canonical"),
            vec![
                kw("module"),
                kw("i32.const"),
                kw("memory.grow"),
                kw("assert_return"),
                kw("nan:canonical"),
            ]
        );
    }

    #[test]
    fn unknown_text_is_reserved() {
        assert_eq!(
            kinds("offset=8 align=4 i32.frob Upper"),
            vec![
                TokenKind::Reserved("offset=8".into()),
                TokenKind::Reserved("align=4".into()),
                TokenKind::Reserved("i32.frob".into()),
                TokenKind::Reserved("Upper".into()),
            ]
        );
    }

    #[test]
    fn bare_sign_is_reserved() {
        assert_eq!(kinds("-"), vec![TokenKind::Reserved("-".into())]);
    }

    // =========================================================================
    // Identifiers
    // =========================================================================

    #[test]
    fn ids_with_special_chars() {
        assert_eq!(
            kinds("$my_func $add/sub $0"),
            vec![
                TokenKind::Id("my_func".into()),
                TokenKind::Id("add/sub".into()),
                TokenKind::Id("0".into()),
            ]
        );
    }

    #[test]
    fn empty_id_error() {
        expect_error("$", "expected identifier");
    }

    // =========================================================================
    // Strings
    // =========================================================================

    #[test]
    fn string_escapes() {
        assert_eq!(
            kinds(r#""\t\n\r\"\'\\""#),
            vec![TokenKind::String(vec![0x09, 0x0A, 0x0D, 0x22, 0x27, 0x5C])]
        );
    }

    #[test]
    fn string_hex_escapes() {
        assert_eq!(kinds(r#""\00\ff\4A""#), vec![TokenKind::String(vec![0x00, 0xFF, 0x4A])]);
    }

    #[test]
    fn string_unicode_escape() {
        assert_eq!(
            kinds(r#""\u{1F600}\u{41}""#),
            vec![TokenKind::String("\u{1F600}A".as_bytes().to_vec())]
        );
    }

    #[test]
    fn string_raw_bytes_pass_through() {
        let source = b"\"\xff\xfe\"";
        let tokens: Vec<_> = Lexer::from_bytes(source).collect::<Result<_, _>>().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String(vec![0xFF, 0xFE]));
    }

    #[test]
    fn string_errors() {
        expect_error(r#""hello"#, "unterminated string");
        expect_error("\"line\nbreak\"", "newline in string");
        expect_error("\"cr\rx\"", "newline in string");
        expect_error(r#""\z""#, "invalid escape");
        expect_error(r#""\4""#, "invalid hex escape");
        expect_error(r#""\u{}""#, "one to six hex digits");
        expect_error(r#""\u{1234567}""#, "one to six hex digits");
        expect_error(r#""\u{D800}""#, "invalid unicode code point");
        expect_error(r#""\u{41""#, "unterminated unicode escape");
    }

    #[test]
    fn adjacent_strings_need_separator() {
        expect_error(r#""a""b""#, "unknown operator");
    }

    // =========================================================================
    // Numbers
    // =========================================================================

    #[test]
    fn integers_keep_their_digits() {
        assert_eq!(kinds("0 42 1_000"), vec![int("0"), int("42"), int("1_000")]);
        assert_eq!(
            kinds("-0x1F"),
            vec![TokenKind::Integer(IntLit {
                negative: true,
                has_sign: true,
                hex: true,
                digits: "1F".into(),
            })]
        );
    }

    #[test]
    fn underscore_runs_are_accepted_by_the_scanner() {
        assert_eq!(kinds("1__2"), vec![int("1__2")]);
    }

    #[test]
    fn floats() {
        assert_eq!(
            kinds("1.5e-3 0x1.8p1 1."),
            vec![
                TokenKind::Float(FloatLit::Decimal {
                    negative: false,
                    text: "1.5e-3".into()
                }),
                TokenKind::Float(FloatLit::Hex {
                    negative: false,
                    text: "1.8p1".into()
                }),
                TokenKind::Float(FloatLit::Decimal {
                    negative: false,
                    text: "1.".into()
                }),
            ]
        );
    }

    #[test]
    fn special_floats() {
        assert_eq!(
            kinds("inf -inf +nan nan:0x7f_ffff"),
            vec![
                TokenKind::Float(FloatLit::Inf { negative: false }),
                TokenKind::Float(FloatLit::Inf { negative: true }),
                TokenKind::Float(FloatLit::Nan {
                    negative: false,
                    payload: None
                }),
                TokenKind::Float(FloatLit::Nan {
                    negative: false,
                    payload: Some("7f_ffff".into())
                }),
            ]
        );
    }

    #[test]
    fn malformed_numbers() {
        expect_error("0x", "expected digits");
        expect_error("1e", "missing exponent digits");
        expect_error("1x", "unknown operator");
        expect_error("0x1.8q", "unknown operator");
    }

    // =========================================================================
    // Errors and positions
    // =========================================================================

    #[test]
    fn unexpected_bytes() {
        expect_error("{", "unexpected character");
        let source = "(module \u{e9})";
        let err = Lexer::tokenise(source).expect_err("non-ascii outside string");
        assert!(err.message.contains("unexpected byte 0xc3"));
        assert_eq!(err.span.column, 9);
    }

    #[test]
    fn iteration_stops_after_error() {
        let mut lexer = Lexer::new("( { )");
        assert!(lexer.next().unwrap().is_ok());
        assert!(lexer.next().unwrap().is_err());
        assert!(lexer.next().is_none());
    }

    #[test]
    fn spans_track_lines() {
        let tokens = Lexer::tokenise("(module\n  (func))").unwrap();
        let func = &tokens[3];
        assert_eq!(func.kind, kw("func"));
        assert_eq!((func.span.line, func.span.column), (2, 4));
    }

    #[test]
    fn real_wat_fib_iterative() {
        let wat = r#"
;; Iterative Fibonacci
(module
  (func (export "fib") (param $n i32) (result i32)
    (local $a i32) (local $b i32) (local $i i32)
    (block $done
      (loop $loop
        (br_if $done (i32.ge_u (local.get $i) (local.get $n)))
        (local.set $b (i32.add (local.get $a) (local.get $b)))
        (br $loop)))
    (local.get $b)))
"#;
        let tokens = Lexer::tokenise(wat).expect("should tokenise");
        let has_keyword = |k: &str| tokens.iter().any(|t| t.kind == kw(k));
        assert!(has_keyword("br_if"));
        assert!(has_keyword("i32.ge_u"));
        assert!(tokens.iter().all(|t| !matches!(t.kind, TokenKind::Reserved(_))));
    }
}

// ============================================================================
// Property-based tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Token spans must be in bounds and non-inverted.
        #[test]
        fn spans_are_valid(source in "\\PC{0,200}") {
            for token in Lexer::new(&source).flatten() {
                prop_assert!(token.span.start <= token.span.end);
                prop_assert!(token.span.end <= source.len());
            }
        }

        /// Successful tokens must not overlap.
        #[test]
        fn tokens_do_not_overlap(source in "\\PC{0,200}") {
            let tokens: Vec<_> = Lexer::new(&source).flatten().collect();
            for window in tokens.windows(2) {
                prop_assert!(window[0].span.end <= window[1].span.start);
            }
        }

        /// Re-serialising an atom from its span gives back the source text.
        #[test]
        fn atom_spans_round_trip(source in "[a-z][a-z0-9._]{0,12}( [$]?[a-z][a-z0-9_]{0,8}| [0-9]{1,6}| \"[a-z]{0,6}\"){0,6}") {
            let tokens = Lexer::tokenise(&source).unwrap();
            let rebuilt: Vec<&str> = tokens.iter().map(|t| t.text(&source)).collect();
            let words: Vec<&str> = source.split(' ').collect();
            prop_assert_eq!(rebuilt.len(), words.len());
            for (text, token) in rebuilt.iter().zip(&tokens) {
                if let TokenKind::Id(id) = &token.kind {
                    prop_assert_eq!(*text, format!("${}", id).as_str());
                }
                if let TokenKind::Keyword(k) | TokenKind::Reserved(k) = &token.kind {
                    prop_assert_eq!(*text, k.as_str());
                }
            }
        }

        /// Line numbers must never decrease.
        #[test]
        fn line_numbers_increase(source in "[a-z0-9()\\n ]{0,100}") {
            let mut last_line = 0u32;
            for token in Lexer::new(&source).flatten() {
                prop_assert!(token.span.line >= last_line);
                last_line = token.span.line;
            }
        }

        /// At most one error, always last, and never a panic.
        #[test]
        fn never_panics(source in proptest::collection::vec(any::<u8>(), 0..300)) {
            let results: Vec<_> = Lexer::from_bytes(&source).collect();
            let errors = results.iter().filter(|r| r.is_err()).count();
            prop_assert!(errors <= 1);
            if errors == 1 {
                prop_assert!(results.last().map_or(false, |r| r.is_err()));
            }
        }
    }
}
