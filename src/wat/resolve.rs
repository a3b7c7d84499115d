//! Symbol resolution: identifiers to dense numeric indices.
//!
//! Each namespace numbers its entities independently in declaration order.
//! Module-level namespaces are filled in a first pass over every field, so
//! later references (including forward ones) resolve during the second pass.
//! Locals are re-scoped per function and labels follow lexical block nesting.
//!
//! The resolver also owns the module's type list, since implicit type uses
//! are interned into it while bodies are resolved.

use super::error::ParseError;
use super::literal;
use super::sexpr::SExpr;
use super::token::{Span, TokenKind};
use crate::ast::FuncType;
use crate::config::Config;
use std::collections::HashMap;
use std::fmt;
use tracing::trace;

/// Independent identifier spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Func,
    Local,
    Global,
    Table,
    Memory,
    Type,
    Label,
    Elem,
    Data,
}

impl Namespace {
    const INDEXED: [Namespace; 8] = [
        Namespace::Func,
        Namespace::Local,
        Namespace::Global,
        Namespace::Table,
        Namespace::Memory,
        Namespace::Type,
        Namespace::Elem,
        Namespace::Data,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Namespace::Func => "function",
            Namespace::Local => "local",
            Namespace::Global => "global",
            Namespace::Table => "table",
            Namespace::Memory => "memory",
            Namespace::Type => "type",
            Namespace::Label => "label",
            Namespace::Elem => "elem segment",
            Namespace::Data => "data segment",
        }
    }

    fn slot(self) -> Option<usize> {
        Namespace::INDEXED.iter().position(|&ns| ns == self)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Names bound in one namespace, plus the next free index.
#[derive(Debug, Default)]
struct SymbolTable {
    names: HashMap<String, u32>,
    count: u32,
}

impl SymbolTable {
    fn clear(&mut self) {
        self.names.clear();
        self.count = 0;
    }
}

/// Per-module resolution state. Nothing here outlives one module parse.
#[derive(Debug)]
pub struct Resolver {
    tables: [SymbolTable; 8],
    /// Enclosing block labels, innermost last.
    labels: Vec<Option<String>>,
    types: Vec<FuncType>,
    config: Config,
}

impl Resolver {
    pub fn new(config: Config) -> Self {
        Self {
            tables: Default::default(),
            labels: Vec::new(),
            types: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Binds the next index in `ns`, optionally under a name.
    ///
    /// Labels may shadow each other; every other namespace rejects a second
    /// binding of the same name.
    pub fn declare(&mut self, ns: Namespace, name: Option<&str>, span: Span) -> Result<u32, ParseError> {
        let Some(slot) = ns.slot() else {
            self.labels.push(name.map(String::from));
            return Ok(self.labels.len() as u32 - 1);
        };

        let table = &mut self.tables[slot];
        let index = table.count;
        if let Some(name) = name {
            if table.names.contains_key(name) {
                return Err(ParseError::resolution(format!("duplicate {} ${}", ns, name), span));
            }
            table.names.insert(name.to_string(), index);
            trace!(namespace = %ns, name, index, "bound");
        }
        table.count += 1;
        Ok(index)
    }

    /// How many entities `ns` holds so far.
    pub fn count(&self, ns: Namespace) -> u32 {
        match ns.slot() {
            Some(slot) => self.tables[slot].count,
            None => self.labels.len() as u32,
        }
    }

    /// Resolves an index operand: a numeric literal passes through, an
    /// identifier is looked up in `ns`.
    pub fn resolve(&self, ns: Namespace, item: &SExpr) -> Result<u32, ParseError> {
        let Some(token) = item.as_atom() else {
            return Err(ParseError::expected(&format!("{} index", ns), &item.describe(), item.span()));
        };
        match &token.kind {
            TokenKind::Integer(lit) => literal::to_u32(lit, token.span),
            TokenKind::Id(name) => {
                let found = match ns.slot() {
                    Some(slot) => self.tables[slot].names.get(name.as_str()).copied(),
                    None => self.label_depth(name),
                };
                match found {
                    Some(index) => {
                        trace!(namespace = %ns, name = name.as_str(), index, "resolved");
                        Ok(index)
                    }
                    None => Err(self.unbound(ns, name, token.span)),
                }
            }
            other => Err(ParseError::expected(&format!("{} index", ns), &other.describe(), token.span)),
        }
    }

    /// Whether `item` looks like an index operand.
    pub fn is_index(item: &SExpr) -> bool {
        matches!(
            item.as_atom().map(|t| &t.kind),
            Some(TokenKind::Integer(_) | TokenKind::Id(_))
        )
    }

    /// Relative depth of the innermost enclosing block named `name`.
    fn label_depth(&self, name: &str) -> Option<u32> {
        self.labels
            .iter()
            .rev()
            .position(|label| label.as_deref() == Some(name))
            .map(|depth| depth as u32)
    }

    fn unbound(&self, ns: Namespace, name: &str, span: Span) -> ParseError {
        let elsewhere = Namespace::INDEXED
            .iter()
            .copied()
            .filter(|&other| other != ns)
            .find(|&other| other.slot().map_or(false, |slot| self.tables[slot].names.contains_key(name)))
            .or_else(|| (ns != Namespace::Label && self.label_depth(name).is_some()).then_some(Namespace::Label));

        match elsewhere {
            Some(other) => ParseError::resolution(
                format!("namespace mismatch: ${} is a {}, not a {}", name, other, ns),
                span,
            ),
            None => ParseError::resolution(format!("unknown {} ${}", ns, name), span),
        }
    }

    /// Opens a block scope.
    pub fn push_label(&mut self, name: Option<&str>) {
        self.labels.push(name.map(String::from));
    }

    /// Closes the innermost block scope.
    pub fn pop_label(&mut self) -> Option<Option<String>> {
        self.labels.pop()
    }

    /// The name of the innermost block, if it has one.
    pub fn innermost_label(&self) -> Option<&str> {
        self.labels.last().and_then(|l| l.as_deref())
    }

    /// Starts a new function: locals and labels from the previous one go away.
    pub fn begin_function(&mut self) {
        if let Some(slot) = Namespace::Local.slot() {
            self.tables[slot].clear();
        }
        self.labels.clear();
    }

    /// Declares an explicit `(type ...)` definition.
    pub fn define_type(&mut self, name: Option<&str>, ty: FuncType, span: Span) -> Result<u32, ParseError> {
        let index = self.declare(Namespace::Type, name, span)?;
        self.types.push(ty);
        Ok(index)
    }

    /// Index of the first type equal to `ty`, appending it if there is none.
    pub fn intern_type(&mut self, ty: FuncType) -> u32 {
        if let Some(index) = self.types.iter().position(|t| *t == ty) {
            return index as u32;
        }
        if let Some(slot) = Namespace::Type.slot() {
            self.tables[slot].count += 1;
        }
        self.types.push(ty);
        self.types.len() as u32 - 1
    }

    pub fn type_at(&self, index: u32) -> Option<&FuncType> {
        self.types.get(index as usize)
    }

    pub fn into_types(self) -> Vec<FuncType> {
        self.types
    }
}
