//! A WebAssembly text format and script front end.
//!
//! kasm-text reads WAT modules and `.wast` scripts into a resolved,
//! index-based representation ready for a validator or interpreter:
//! instructions flattened into a linear sequence with block ends located,
//! every `$name` replaced by its index, and inline type uses interned into
//! the type section.
//!
//! # Modules
//!
//! - [`wat`] -- Lexer, S-expression reader and module builder.
//! - [`wast`] -- Script parser and the seams a test driver plugs into.
//! - [`ast`] -- The resolved module representation both produce.
//!
//! # Example
//!
//! ```
//! use kasm_text::ast::Immediate;
//! use kasm_text::wat;
//!
//! let module = wat::parse_module(r#"
//!     (module
//!         (func $fac (export "fac") (param i64) (result i64)
//!             (if (result i64) (i64.eqz (local.get 0))
//!                 (then (i64.const 1))
//!                 (else
//!                     (i64.mul
//!                         (local.get 0)
//!                         (call $fac (i64.sub (local.get 0) (i64.const 1))))))))
//! "#).unwrap();
//!
//! let body = &module.funcs[0].body;
//! assert_eq!(body[0].name(), "local.get");
//! assert!(body.iter().any(|i| i.name() == "call" && i.imm == Immediate::Index(0)));
//! ```

pub mod ast;
pub mod config;
pub mod wast;
pub mod wat;

pub use config::Config;
pub use wat::{ErrorKind, ParseError};
