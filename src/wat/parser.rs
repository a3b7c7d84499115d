//! Module building.
//!
//! A module is built in two passes over its fields. The first pass declares
//! every entity so that indices are known up front; names may then be used
//! before their definition. The second pass builds each field, resolving
//! every reference through the [`Resolver`].
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
//! assert_eq!(module.export("add").unwrap().index, 0);
//! ```

use super::error::ParseError;
use super::instr;
use super::resolve::{Namespace, Resolver};
use super::sexpr::{Reader, SExpr, SExprList};
use super::token::Span;
use super::types::{self, ParamNames};
use crate::ast::{
    Data, DataMode, Elem, ElemItems, ElemMode, Export, ExternKind, Func, Global, Immediate, Import, ImportDesc,
    Instruction, Limits, MemoryType, Module, Opcode, RefType, TableType, ValType,
};
use crate::config::Config;
use std::collections::HashSet;
use tracing::debug;

const PAGE_SIZE: usize = 65536;

/// Parses a module from WAT source with the default [`Config`].
///
/// The source is either a single `(module ...)` form or a sequence of bare
/// module fields.
pub fn parse_module(source: &str) -> Result<Module, ParseError> {
    parse_module_with(source.as_bytes(), &Config::default())
}

pub fn parse_module_with(source: &[u8], config: &Config) -> Result<Module, ParseError> {
    let forms = Reader::with_config(source, config).collect::<Result<Vec<_>, _>>()?;
    match forms.as_slice() {
        [single] if single.is_list_headed_by("module") => module_from_list(single.expect_list()?, config),
        fields => module_from_fields(None, fields, config),
    }
}

/// Builds a module from a `(module $id? field*)` form.
///
/// Grammar: `module ::= '(' 'module' id? field* ')'`
pub fn module_from_list(list: SExprList<'_>, config: &Config) -> Result<Module, ParseError> {
    list.expect_head("module")?;
    let mut pos = 1;
    let name = take_name(list.items, &mut pos);
    module_from_fields(name, list.items.get(pos..).unwrap_or(&[]), config)
}

/// Builds a module from its fields.
pub fn module_from_fields(name: Option<&str>, fields: &[SExpr], config: &Config) -> Result<Module, ParseError> {
    let mut builder = ModuleBuilder::new(*config);
    for field in fields {
        builder.declare(field)?;
    }
    for field in fields {
        builder.build(field)?;
    }

    let module = builder.finish(name);
    debug!(
        name = module.name.as_deref().unwrap_or(""),
        types = module.types.len(),
        imports = module.imports.len(),
        funcs = module.funcs.len(),
        "parsed module"
    );
    Ok(module)
}

fn take_name<'a>(items: &'a [SExpr], pos: &mut usize) -> Option<&'a str> {
    let name = items.get(*pos).and_then(SExpr::as_id)?;
    *pos += 1;
    Some(name)
}

/// Import and export names must be valid UTF-8.
fn utf8_name(item: &SExpr) -> Result<String, ParseError> {
    let bytes = item.expect_string()?;
    String::from_utf8(bytes.to_vec()).map_err(|_| ParseError::structural("malformed UTF-8 encoding", item.span()))
}

fn extern_kind(keyword: Option<&str>, span: Span) -> Result<ExternKind, ParseError> {
    match keyword {
        Some("func") => Ok(ExternKind::Func),
        Some("table") => Ok(ExternKind::Table),
        Some("memory") => Ok(ExternKind::Memory),
        Some("global") => Ok(ExternKind::Global),
        Some(other) => Err(ParseError::expected("import or export kind", &format!("'{}'", other), span)),
        None => Err(ParseError::expected("import or export kind", "list", span)),
    }
}

fn namespace(kind: ExternKind) -> Namespace {
    match kind {
        ExternKind::Func => Namespace::Func,
        ExternKind::Table => Namespace::Table,
        ExternKind::Memory => Namespace::Memory,
        ExternKind::Global => Namespace::Global,
    }
}

fn no_more(items: &[SExpr], pos: usize) -> Result<(), ParseError> {
    match items.get(pos) {
        Some(extra) => Err(ParseError::structural(format!("unexpected {}", extra.describe()), extra.span())),
        None => Ok(()),
    }
}

fn skip_exports(items: &[SExpr], pos: &mut usize) {
    while items.get(*pos).map_or(false, |s| s.is_list_headed_by("export")) {
        *pos += 1;
    }
}

fn has_inline_import(items: &[SExpr], pos: usize) -> bool {
    items.get(pos).map_or(false, |s| s.is_list_headed_by("import"))
}

/// `(import "module" "name")` inside a func, table, memory or global.
fn inline_import(items: &[SExpr], pos: &mut usize) -> Result<Option<(String, String)>, ParseError> {
    let Some(list) = items.get(*pos).and_then(SExpr::as_list) else {
        return Ok(None);
    };
    if list.head_keyword() != Some("import") {
        return Ok(None);
    }
    let [_, module, name] = list.items else {
        return Err(ParseError::structural("expected (import \"module\" \"name\")", list.span));
    };
    *pos += 1;
    Ok(Some((utf8_name(module)?, utf8_name(name)?)))
}

fn zero_offset(span: Span) -> Vec<Instruction> {
    vec![Instruction::new(Opcode::I32_CONST, Immediate::I32(0), span)]
}

/// Concatenated contents of a run of string literals.
fn data_strings(items: &[SExpr]) -> Result<Vec<u8>, ParseError> {
    let mut bytes = Vec::new();
    for item in items {
        bytes.extend_from_slice(item.expect_string()?);
    }
    Ok(bytes)
}

struct ModuleBuilder {
    res: Resolver,
    module: Module,
    /// Kinds with at least one definition. Imports of these are rejected so
    /// that imported entities keep the lowest indices.
    defined: HashSet<ExternKind>,
}

impl ModuleBuilder {
    fn new(config: Config) -> Self {
        Self {
            res: Resolver::new(config),
            module: Module::default(),
            defined: HashSet::new(),
        }
    }

    fn finish(self, name: Option<&str>) -> Module {
        Module {
            name: name.map(String::from),
            types: self.res.into_types(),
            ..self.module
        }
    }

    /// Index the next defined entity of `kind` will get.
    fn next_index(&self, kind: ExternKind) -> u32 {
        let defined = match kind {
            ExternKind::Func => self.module.funcs.len(),
            ExternKind::Table => self.module.tables.len(),
            ExternKind::Memory => self.module.memories.len(),
            ExternKind::Global => self.module.globals.len(),
        };
        (self.module.imported(kind) + defined) as u32
    }

    // ========================================================================
    // Declaration pass
    // ========================================================================

    fn import_order(&self, kind: ExternKind, span: Span) -> Result<(), ParseError> {
        if self.defined.contains(&kind) {
            return Err(ParseError::structural(format!("import after {}", kind), span));
        }
        Ok(())
    }

    fn declare(&mut self, field: &SExpr) -> Result<(), ParseError> {
        let list = field.expect_list()?;
        let keyword = list
            .head_keyword()
            .ok_or_else(|| ParseError::expected("module field", &field.describe(), field.span()))?;
        let items = list.items;
        let mut pos = 1;

        match keyword {
            "type" => {
                let name = take_name(items, &mut pos);
                let def = match items.get(pos) {
                    Some(def) => def.expect_list()?,
                    None => return Err(ParseError::structural("expected (func ...) in type definition", list.span)),
                };
                let ty = types::functype(def, self.res.config())?;
                no_more(items, pos + 1)?;
                self.res.define_type(name, ty, list.span)?;
            }
            "import" => {
                let Some(desc) = items.get(3).and_then(SExpr::as_list) else {
                    return Err(ParseError::structural("expected import descriptor", list.span));
                };
                let kind = extern_kind(desc.head_keyword(), desc.span)?;
                self.import_order(kind, list.span)?;
                self.res
                    .declare(namespace(kind), desc.get(1).and_then(SExpr::as_id), desc.span)?;
            }
            "func" | "table" | "memory" | "global" => {
                let kind = extern_kind(Some(keyword), list.span)?;
                let name = take_name(items, &mut pos);
                skip_exports(items, &mut pos);
                if has_inline_import(items, pos) {
                    self.import_order(kind, list.span)?;
                } else {
                    self.defined.insert(kind);
                    if kind == ExternKind::Table && list.find_list("elem", pos).is_some() {
                        self.res.declare(Namespace::Elem, None, list.span)?;
                    }
                    if kind == ExternKind::Memory && list.find_list("data", pos).is_some() {
                        self.res.declare(Namespace::Data, None, list.span)?;
                    }
                }
                self.res.declare(namespace(kind), name, list.span)?;
            }
            "elem" => {
                self.res.declare(Namespace::Elem, take_name(items, &mut pos), list.span)?;
            }
            "data" => {
                self.res.declare(Namespace::Data, take_name(items, &mut pos), list.span)?;
            }
            "export" | "start" => {}
            other => {
                return Err(ParseError::structural(format!("unknown module field '{}'", other), list.span));
            }
        }
        Ok(())
    }

    // ========================================================================
    // Build pass
    // ========================================================================

    /// Grammar: `field ::= type | import | func | table | memory | global | export | start | elem | data`
    fn build(&mut self, field: &SExpr) -> Result<(), ParseError> {
        let list = field.expect_list()?;
        match list.head_keyword() {
            Some("type") => Ok(()),
            Some("import") => self.import(list),
            Some("func") => self.func(list),
            Some("table") => self.table(list),
            Some("memory") => self.memory(list),
            Some("global") => self.global(list),
            Some("export") => self.export(list),
            Some("start") => self.start(list),
            Some("elem") => self.elem(list),
            Some("data") => self.data(list),
            _ => Err(ParseError::expected("module field", &field.describe(), field.span())),
        }
    }

    /// `(export "name")*` following an entity's name.
    fn inline_exports(&mut self, items: &[SExpr], pos: &mut usize, kind: ExternKind, index: u32) -> Result<(), ParseError> {
        while let Some(list) = items.get(*pos).and_then(SExpr::as_list) {
            if list.head_keyword() != Some("export") {
                break;
            }
            let [_, name] = list.items else {
                return Err(ParseError::structural("expected (export \"name\")", list.span));
            };
            self.module.exports.push(Export {
                name: utf8_name(name)?,
                kind,
                index,
            });
            *pos += 1;
        }
        Ok(())
    }

    fn import_desc(&mut self, kind: ExternKind, items: &[SExpr], pos: &mut usize, span: Span) -> Result<ImportDesc, ParseError> {
        let desc = match kind {
            ExternKind::Func => ImportDesc::Func(types::typeuse(&mut self.res, items, pos, ParamNames::Ignore, span)?),
            ExternKind::Table => ImportDesc::Table(types::tabletype(items, pos, span)?),
            ExternKind::Memory => ImportDesc::Memory(types::memorytype(items, pos, span)?),
            ExternKind::Global => {
                let ty = types::globaltype(items.get(*pos), span, self.res.config())?;
                *pos += 1;
                ImportDesc::Global(ty)
            }
        };
        no_more(items, *pos)?;
        Ok(desc)
    }

    /// Handles the inline import abbreviation shared by func, table, memory
    /// and global. Returns whether the field was an import.
    fn abbreviated_import(&mut self, kind: ExternKind, items: &[SExpr], pos: &mut usize, span: Span) -> Result<bool, ParseError> {
        let Some((module, name)) = inline_import(items, pos)? else {
            return Ok(false);
        };
        let desc = self.import_desc(kind, items, pos, span)?;
        self.module.imports.push(Import { module, name, desc });
        Ok(true)
    }

    /// Grammar: `import ::= '(' 'import' name name importdesc ')'`
    fn import(&mut self, list: SExprList<'_>) -> Result<(), ParseError> {
        let [_, module, name, desc] = list.items else {
            return Err(ParseError::structural("expected (import \"module\" \"name\" descriptor)", list.span));
        };
        let module = utf8_name(module)?;
        let name = utf8_name(name)?;

        let desc_list = desc.expect_list()?;
        let kind = extern_kind(desc_list.head_keyword(), desc_list.span)?;
        let mut pos = 1;
        take_name(desc_list.items, &mut pos);
        let desc = self.import_desc(kind, desc_list.items, &mut pos, desc_list.span)?;
        self.module.imports.push(Import { module, name, desc });
        Ok(())
    }

    /// Grammar: `func ::= '(' 'func' id? export* import? typeuse local* instr* ')'`
    fn func(&mut self, list: SExprList<'_>) -> Result<(), ParseError> {
        self.res.begin_function();
        let items = list.items;
        let index = self.next_index(ExternKind::Func);
        let mut pos = 1;
        let name = take_name(items, &mut pos);
        self.inline_exports(items, &mut pos, ExternKind::Func, index)?;
        if self.abbreviated_import(ExternKind::Func, items, &mut pos, list.span)? {
            return Ok(());
        }

        let ty = types::typeuse(&mut self.res, items, &mut pos, ParamNames::Bind, list.span)?;
        let mut locals = Vec::new();
        while let Some(local) = items.get(pos).and_then(SExpr::as_list) {
            if local.head_keyword() != Some("local") {
                break;
            }
            self.locals(local, &mut locals)?;
            pos += 1;
        }

        let body = instr::parse_expr(&mut self.res, items.get(pos..).unwrap_or(&[]))?;
        self.module.funcs.push(Func {
            name: name.map(String::from),
            ty,
            locals,
            body,
        });
        Ok(())
    }

    /// Grammar: `local ::= '(' 'local' id valtype ')' | '(' 'local' valtype* ')'`
    fn locals(&mut self, list: SExprList<'_>, locals: &mut Vec<ValType>) -> Result<(), ParseError> {
        if let Some(name) = list.get(1).and_then(SExpr::as_id) {
            let [_, _, ty] = list.items else {
                return Err(ParseError::structural("expected one type for a named local", list.span));
            };
            locals.push(types::valtype(ty, self.res.config())?);
            self.res.declare(Namespace::Local, Some(name), list.span)?;
            return Ok(());
        }
        for ty in list.tail() {
            locals.push(types::valtype(ty, self.res.config())?);
            self.res.declare(Namespace::Local, None, ty.span())?;
        }
        Ok(())
    }

    /// Grammar: `table ::= '(' 'table' id? export* import? tabletype ')'`
    ///                   | `'(' 'table' id? export* reftype '(' 'elem' elemlist ')' ')'`
    fn table(&mut self, list: SExprList<'_>) -> Result<(), ParseError> {
        let items = list.items;
        let index = self.next_index(ExternKind::Table);
        let mut pos = 1;
        take_name(items, &mut pos);
        self.inline_exports(items, &mut pos, ExternKind::Table, index)?;
        if self.abbreviated_import(ExternKind::Table, items, &mut pos, list.span)? {
            return Ok(());
        }

        let segment = items.get(pos + 1).and_then(SExpr::as_list).filter(|l| l.head_keyword() == Some("elem"));
        let Some(segment) = segment else {
            let ty = types::tabletype(items, &mut pos, list.span)?;
            no_more(items, pos)?;
            self.module.tables.push(ty);
            return Ok(());
        };

        let elem = match items.get(pos) {
            Some(item) => types::reftype(item)?,
            None => return Err(ParseError::expected("reference type", "end of list", list.span)),
        };
        no_more(items, pos + 2)?;
        let elems = self.inline_elem_items(segment.tail())?;
        let count = elems.len() as u32;
        self.module.tables.push(TableType {
            limits: Limits {
                min: count,
                max: Some(count),
            },
            elem,
        });
        self.module.elems.push(Elem {
            ty: elem,
            items: elems,
            mode: ElemMode::Active {
                table: index,
                offset: zero_offset(segment.span),
            },
        });
        Ok(())
    }

    /// Grammar: `memory ::= '(' 'memory' id? export* import? limits ')'`
    ///                    | `'(' 'memory' id? export* '(' 'data' string* ')' ')'`
    fn memory(&mut self, list: SExprList<'_>) -> Result<(), ParseError> {
        let items = list.items;
        let index = self.next_index(ExternKind::Memory);
        let mut pos = 1;
        take_name(items, &mut pos);
        self.inline_exports(items, &mut pos, ExternKind::Memory, index)?;
        if self.abbreviated_import(ExternKind::Memory, items, &mut pos, list.span)? {
            return Ok(());
        }

        if let Some(segment) = items.get(pos).and_then(SExpr::as_list) {
            if segment.head_keyword() == Some("data") {
                no_more(items, pos + 1)?;
                let bytes = data_strings(segment.tail())?;
                let pages = bytes.len().div_ceil(PAGE_SIZE) as u32;
                self.module.memories.push(MemoryType {
                    limits: Limits {
                        min: pages,
                        max: Some(pages),
                    },
                });
                self.module.data.push(Data {
                    bytes,
                    mode: DataMode::Active {
                        memory: index,
                        offset: zero_offset(segment.span),
                    },
                });
                return Ok(());
            }
        }

        let ty = types::memorytype(items, &mut pos, list.span)?;
        no_more(items, pos)?;
        self.module.memories.push(ty);
        Ok(())
    }

    /// Grammar: `global ::= '(' 'global' id? export* import? globaltype expr ')'`
    fn global(&mut self, list: SExprList<'_>) -> Result<(), ParseError> {
        let items = list.items;
        let index = self.next_index(ExternKind::Global);
        let mut pos = 1;
        take_name(items, &mut pos);
        self.inline_exports(items, &mut pos, ExternKind::Global, index)?;
        if self.abbreviated_import(ExternKind::Global, items, &mut pos, list.span)? {
            return Ok(());
        }

        let ty = types::globaltype(items.get(pos), list.span, self.res.config())?;
        pos += 1;
        let init = instr::parse_expr(&mut self.res, items.get(pos..).unwrap_or(&[]))?;
        self.module.globals.push(Global { ty, init });
        Ok(())
    }

    /// Grammar: `export ::= '(' 'export' name '(' exportdesc ')' ')'`
    fn export(&mut self, list: SExprList<'_>) -> Result<(), ParseError> {
        let [_, name, desc] = list.items else {
            return Err(ParseError::structural("expected (export \"name\" (kind index))", list.span));
        };
        let desc = desc.expect_list()?;
        let kind = extern_kind(desc.head_keyword(), desc.span)?;
        let [_, index] = desc.items else {
            return Err(ParseError::structural("expected one index in export descriptor", desc.span));
        };
        self.module.exports.push(Export {
            name: utf8_name(name)?,
            kind,
            index: self.res.resolve(namespace(kind), index)?,
        });
        Ok(())
    }

    fn start(&mut self, list: SExprList<'_>) -> Result<(), ParseError> {
        let [_, func] = list.items else {
            return Err(ParseError::structural("expected (start index)", list.span));
        };
        if self.module.start.is_some() {
            return Err(ParseError::structural("multiple start sections", list.span));
        }
        self.module.start = Some(self.res.resolve(Namespace::Func, func)?);
        Ok(())
    }

    // ========================================================================
    // Segments
    // ========================================================================

    /// `(offset instr*)` or a single folded instruction.
    fn offset(&mut self, item: Option<&SExpr>, span: Span) -> Result<Vec<Instruction>, ParseError> {
        match item {
            Some(expr @ SExpr::List { items, .. }) => {
                if expr.is_list_headed_by("offset") {
                    instr::parse_expr(&mut self.res, items.get(1..).unwrap_or(&[]))
                } else {
                    instr::parse_expr(&mut self.res, std::slice::from_ref(expr))
                }
            }
            Some(other) => Err(ParseError::expected("offset expression", &other.describe(), other.span())),
            None => Err(ParseError::expected("offset expression", "end of list", span)),
        }
    }

    /// One element expression: `(item instr*)` or a single folded instruction.
    fn elem_expr(&mut self, item: &SExpr) -> Result<Vec<Instruction>, ParseError> {
        match item.as_list() {
            Some(list) if list.head_keyword() == Some("item") => instr::parse_expr(&mut self.res, list.tail()),
            Some(_) => instr::parse_expr(&mut self.res, std::slice::from_ref(item)),
            None => Err(ParseError::expected("element expression", &item.describe(), item.span())),
        }
    }

    fn func_indices(&self, items: &[SExpr]) -> Result<ElemItems, ParseError> {
        let funcs = items
            .iter()
            .map(|item| self.res.resolve(Namespace::Func, item))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ElemItems::Funcs(funcs))
    }

    /// Items of a table's inline `(elem ...)`: all indices or all expressions.
    fn inline_elem_items(&mut self, items: &[SExpr]) -> Result<ElemItems, ParseError> {
        if items.iter().all(Resolver::is_index) {
            return self.func_indices(items);
        }
        let exprs = items.iter().map(|item| self.elem_expr(item)).collect::<Result<Vec<_>, _>>()?;
        Ok(ElemItems::Exprs(exprs))
    }

    /// Grammar: `elemlist ::= reftype elemexpr* | 'func' funcidx*`
    ///
    /// With `bare_indices`, a list with neither prefix is read as function
    /// indices, as the old `(elem (offset) funcidx*)` form allows.
    fn elem_list(&mut self, items: &[SExpr], bare_indices: bool, span: Span) -> Result<(RefType, ElemItems), ParseError> {
        match items.first() {
            Some(first) if first.as_keyword() == Some("func") => Ok((RefType::Func, self.func_indices(&items[1..])?)),
            Some(first) if matches!(first.as_keyword(), Some("funcref" | "externref")) => {
                let ty = types::reftype(first)?;
                let exprs = items[1..]
                    .iter()
                    .map(|item| self.elem_expr(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((ty, ElemItems::Exprs(exprs)))
            }
            _ if bare_indices => Ok((RefType::Func, self.func_indices(items)?)),
            Some(other) => Err(ParseError::expected("element list", &other.describe(), other.span())),
            None => Err(ParseError::expected("element list", "end of list", span)),
        }
    }

    /// Grammar: `elem ::= '(' 'elem' id? elemlist ')'`
    ///                  | `'(' 'elem' id? 'declare' elemlist ')'`
    ///                  | `'(' 'elem' id? ('(' 'table' tableidx ')')? offset elemlist ')'`
    fn elem(&mut self, list: SExprList<'_>) -> Result<(), ParseError> {
        let items = list.items;
        let mut pos = 1;
        take_name(items, &mut pos);

        if items.get(pos).and_then(SExpr::as_keyword) == Some("declare") {
            let (ty, elems) = self.elem_list(&items[pos + 1..], false, list.span)?;
            self.module.elems.push(Elem {
                ty,
                items: elems,
                mode: ElemMode::Declarative,
            });
            return Ok(());
        }

        let mut table = None;
        if let Some(table_use) = items.get(pos).and_then(SExpr::as_list) {
            if table_use.head_keyword() == Some("table") {
                let [_, index] = table_use.items else {
                    return Err(ParseError::structural("expected one index in (table ...)", table_use.span));
                };
                table = Some(self.res.resolve(Namespace::Table, index)?);
                pos += 1;
            }
        }

        let active = table.is_some() || items.get(pos).map_or(false, |item| item.as_list().is_some());
        if !active {
            let (ty, elems) = self.elem_list(&items[pos..], false, list.span)?;
            self.module.elems.push(Elem {
                ty,
                items: elems,
                mode: ElemMode::Passive,
            });
            return Ok(());
        }

        let offset = self.offset(items.get(pos), list.span)?;
        let (ty, elems) = self.elem_list(items.get(pos + 1..).unwrap_or(&[]), table.is_none(), list.span)?;
        self.module.elems.push(Elem {
            ty,
            items: elems,
            mode: ElemMode::Active {
                table: table.unwrap_or(0),
                offset,
            },
        });
        Ok(())
    }

    /// Grammar: `data ::= '(' 'data' id? string* ')'`
    ///                  | `'(' 'data' id? ('(' 'memory' memidx ')')? offset string* ')'`
    fn data(&mut self, list: SExprList<'_>) -> Result<(), ParseError> {
        let items = list.items;
        let mut pos = 1;
        take_name(items, &mut pos);

        let mut memory = None;
        if let Some(memory_use) = items.get(pos).and_then(SExpr::as_list) {
            if memory_use.head_keyword() == Some("memory") {
                let [_, index] = memory_use.items else {
                    return Err(ParseError::structural("expected one index in (memory ...)", memory_use.span));
                };
                memory = Some(self.res.resolve(Namespace::Memory, index)?);
                pos += 1;
            }
        }

        let active = memory.is_some() || items.get(pos).map_or(false, |item| item.as_list().is_some());
        let mode = if active {
            let offset = self.offset(items.get(pos), list.span)?;
            pos += 1;
            DataMode::Active {
                memory: memory.unwrap_or(0),
                offset,
            }
        } else {
            DataMode::Passive
        };

        let bytes = data_strings(items.get(pos..).unwrap_or(&[]))?;
        self.module.data.push(Data { bytes, mode });
        Ok(())
    }
}
