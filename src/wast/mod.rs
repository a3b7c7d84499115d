//! WebAssembly script (.wast) parsing.
//!
//! Scripts are the test format of the WebAssembly specification suite: a
//! sequence of module definitions, actions and assertions. Inline text
//! modules are parsed and resolved as they are read. Binary and quoted
//! modules are carried as bytes for the driver to decode or parse when an
//! assertion calls for it.
//!
//! Running a script is left to a driver. [`collab`] holds the seams a
//! driver plugs into: a [`BinaryDecoder`] and a [`ResultOracle`] for
//! `assert_return`.
//!
//! # Example
//!
//! ```
//! use kasm_text::wast::{parse_script, Directive};
//!
//! let source = r#"
//!     (module (func (export "f") (result i32) (i32.const 42)))
//!     (assert_return (invoke "f") (i32.const 42))
//! "#;
//! let script = parse_script(source).unwrap();
//! assert_eq!(script.directives.len(), 2);
//! assert!(matches!(script.directives[1], Directive::AssertReturn { .. }));
//! ```

pub mod collab;
pub mod command;
mod parser;
pub mod values;

pub use collab::{check_assert_return, match_results, BinaryDecoder, Mismatch, ResultOracle};
pub use command::{Action, Directive, ModuleSource, Script};
pub use parser::{parse_script, parse_script_with};
pub use values::{Expected, Lane, NanPattern, Value};
