//! WebAssembly text format (WAT) parsing.
//!
//! Source flows through three layers:
//!
//! - [`Lexer`] turns bytes into [`Token`]s.
//! - [`sexpr::Reader`] groups tokens into S-expressions.
//! - The module builder folds instructions flat, resolves `$name`s to
//!   indices and assembles a [`crate::ast::Module`].
//!
//! Every failure is a [`ParseError`] classified as lexical, structural or
//! resolution, with the line and column where it was found.
//!
//! # Example
//!
//! ```
//! use kasm_text::wat;
//!
//! let module = wat::parse_module(r#"
//!     (module
//!         (func $add (export "add") (param i32 i32) (result i32)
//!             (i32.add (local.get 0) (local.get 1))))
//! "#).unwrap();
//!
//! assert_eq!(module.funcs.len(), 1);
//! assert_eq!(module.exports[0].name, "add");
//! ```
//!
//! Lexical errors stop the token stream:
//!
//! ```
//! use kasm_text::wat::{ErrorKind, Lexer};
//!
//! let result: Result<Vec<_>, _> = Lexer::new("\"unterminated string").collect();
//! assert_eq!(result.unwrap_err().kind, ErrorKind::Lexical);
//! ```

mod cursor;
mod error;
mod instr;
mod keywords;
mod lexer;
pub(crate) mod literal;
mod parser;
mod resolve;
pub mod sexpr;
mod token;
pub(crate) mod types;

pub use error::{ErrorKind, ParseError};
pub use lexer::Lexer;
pub use parser::{module_from_fields, module_from_list, parse_module, parse_module_with};
pub use resolve::Namespace;
pub use token::{FloatLit, IntLit, Span, Token, TokenKind};
