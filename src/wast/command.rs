//! AST types for WebAssembly script (.wast) files.
//!
//! A script is a sequence of directives that define modules, register them
//! for linking, perform actions on them, and assert expected behaviour
//! (return values, traps, validation or parse failures).

use super::collab::BinaryDecoder;
use super::values::{Expected, Value};
use crate::ast::Module;
use crate::config::Config;
use crate::wat::{self, ParseError, Span};
use serde::Serialize;

/// A parsed script: its directives in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Script {
    pub directives: Vec<Directive>,
}

impl Script {
    /// The module directives, in definition order. Actions and `register`
    /// refer to modules by position in this sequence.
    pub fn modules(&self) -> impl Iterator<Item = &Directive> {
        self.directives
            .iter()
            .filter(|d| matches!(d, Directive::Module { .. }))
    }
}

/// A top-level directive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Directive {
    /// Define a module. `index` is its position among the script's modules.
    Module {
        span: Span,
        name: Option<String>,
        index: usize,
        source: ModuleSource,
    },

    /// Make a module's exports importable under `as_name`.
    Register {
        span: Span,
        as_name: String,
        module: usize,
    },

    /// An action performed for its effect.
    Action { span: Span, action: Action },

    AssertReturn {
        span: Span,
        action: Action,
        expected: Vec<Expected>,
    },

    AssertTrap {
        span: Span,
        action: Action,
        message: String,
    },

    /// Instantiating the module traps, as in its start function.
    AssertModuleTrap {
        span: Span,
        module: ModuleSource,
        message: String,
    },

    /// The action exhausts a resource such as the call stack.
    AssertExhaustion {
        span: Span,
        action: Action,
        message: String,
    },

    AssertInvalid {
        span: Span,
        module: ModuleSource,
        message: String,
    },

    AssertMalformed {
        span: Span,
        module: ModuleSource,
        message: String,
    },

    AssertUnlinkable {
        span: Span,
        module: ModuleSource,
        message: String,
    },

    AssertUninstantiable {
        span: Span,
        module: ModuleSource,
        message: String,
    },
}

impl Directive {
    pub fn span(&self) -> Span {
        match self {
            Directive::Module { span, .. }
            | Directive::Register { span, .. }
            | Directive::Action { span, .. }
            | Directive::AssertReturn { span, .. }
            | Directive::AssertTrap { span, .. }
            | Directive::AssertModuleTrap { span, .. }
            | Directive::AssertExhaustion { span, .. }
            | Directive::AssertInvalid { span, .. }
            | Directive::AssertMalformed { span, .. }
            | Directive::AssertUnlinkable { span, .. }
            | Directive::AssertUninstantiable { span, .. } => *span,
        }
    }

    /// The directive's keyword, as written in the script.
    pub fn keyword(&self) -> &'static str {
        match self {
            Directive::Module { .. } => "module",
            Directive::Register { .. } => "register",
            Directive::Action { action, .. } => match action {
                Action::Invoke { .. } => "invoke",
                Action::Get { .. } => "get",
            },
            Directive::AssertReturn { .. } => "assert_return",
            Directive::AssertTrap { .. } | Directive::AssertModuleTrap { .. } => "assert_trap",
            Directive::AssertExhaustion { .. } => "assert_exhaustion",
            Directive::AssertInvalid { .. } => "assert_invalid",
            Directive::AssertMalformed { .. } => "assert_malformed",
            Directive::AssertUnlinkable { .. } => "assert_unlinkable",
            Directive::AssertUninstantiable { .. } => "assert_uninstantiable",
        }
    }
}

/// An action on a previously defined module, identified by its position
/// among the script's modules.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Action {
    /// Call an exported function: `(invoke $mod? "name" const*)`.
    Invoke {
        module: usize,
        name: String,
        args: Vec<Value>,
    },

    /// Read an exported global: `(get $mod? "name")`.
    Get { module: usize, name: String },
}

/// How a module is given in a script.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ModuleSource {
    /// Inline text, already parsed and resolved.
    Text(Box<Module>),

    /// `(module binary "..."*)`: the concatenated bytes, for a
    /// [`BinaryDecoder`].
    #[serde(with = "base64_serde")]
    Binary(Vec<u8>),

    /// `(module quote "..."*)`: the strings joined with spaces, parsed only on
    /// request since such modules are usually meant to be malformed.
    #[serde(with = "base64_serde")]
    Quote(Vec<u8>),

    /// Inline text inside an assertion that failed to parse.
    Malformed(ParseError),
}

impl ModuleSource {
    /// Parses a quoted module. `None` for any other source.
    pub fn parse_quote(&self) -> Option<Result<Module, ParseError>> {
        self.parse_quote_with(&Config::default())
    }

    pub fn parse_quote_with(&self, config: &Config) -> Option<Result<Module, ParseError>> {
        match self {
            ModuleSource::Quote(text) => Some(wat::parse_module_with(text, config)),
            _ => None,
        }
    }

    /// Hands a binary module to `decoder`. `None` for any other source.
    pub fn decode<D: BinaryDecoder + ?Sized>(&self, decoder: &D) -> Option<Result<D::Module, D::Error>> {
        match self {
            ModuleSource::Binary(bytes) => Some(decoder.decode(bytes)),
            _ => None,
        }
    }

    /// The parsed module, for inline text that parsed.
    pub fn module(&self) -> Option<&Module> {
        match self {
            ModuleSource::Text(module) => Some(&**module),
            _ => None,
        }
    }
}

mod base64_serde {
    use base64::{engine::general_purpose, Engine as _};
    use serde::Serializer;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&general_purpose::STANDARD.encode(bytes))
    }
}
