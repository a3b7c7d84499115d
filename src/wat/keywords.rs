//! The fixed keyword table.
//!
//! Keyword-class text found here lexes as [`TokenKind::Keyword`]; anything
//! else lexes as [`TokenKind::Reserved`]. The only reserved forms the grammar
//! gives meaning to are the memory arguments `offset=N` and `align=N`; the
//! parser rejects every other reserved word where it finds one.
//!
//! [`TokenKind::Keyword`]: super::TokenKind::Keyword
//! [`TokenKind::Reserved`]: super::TokenKind::Reserved

use crate::ast::opcodes::Opcode;
use once_cell::sync::Lazy;
use std::collections::HashSet;

const STRUCTURAL: &[&str] = &[
    // Module fields and their parts
    "module", "type", "func", "param", "result", "local", "global", "table", "memory",
    "import", "export", "start", "elem", "data", "offset", "item", "declare", "mut",
    "then", "extern",
    // Value and reference types
    "i32", "i64", "f32", "f64", "v128", "funcref", "externref",
    // v128 lane shapes
    "i8x16", "i16x8", "i32x4", "i64x2", "f32x4", "f64x2",
    // Script
    "binary", "quote", "register", "invoke", "get",
    "assert_return", "assert_trap", "assert_exhaustion", "assert_invalid",
    "assert_malformed", "assert_unlinkable", "assert_uninstantiable",
    "ref.extern", "nan:canonical", "nan:arithmetic",
];

static KEYWORDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STRUCTURAL.iter().copied().chain(Opcode::names()).collect());

/// Whether `word` is a known keyword.
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(word)
}
