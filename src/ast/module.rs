//! Resolved module representation.
//!
//! Every reference in a [`Module`] is a numeric index; names survive only as
//! optional annotations on the entities that declared them.

use super::instruction::Instruction;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValType {
    I32,
    I64,
    F32,
    F64,
    V128,
    FuncRef,
    ExternRef,
}

impl fmt::Display for ValType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValType::I32 => "i32",
            ValType::I64 => "i64",
            ValType::F32 => "f32",
            ValType::F64 => "f64",
            ValType::V128 => "v128",
            ValType::FuncRef => "funcref",
            ValType::ExternRef => "externref",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RefType {
    Func,
    Extern,
}

impl From<RefType> for ValType {
    fn from(r: RefType) -> ValType {
        match r {
            RefType::Func => ValType::FuncRef,
            RefType::Extern => ValType::ExternRef,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct FuncType {
    pub params: Vec<ValType>,
    pub results: Vec<ValType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Limits {
    pub min: u32,
    pub max: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableType {
    pub limits: Limits,
    pub elem: RefType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryType {
    pub limits: Limits,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GlobalType {
    pub ty: ValType,
    pub mutable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ExternKind {
    Func,
    Table,
    Memory,
    Global,
}

impl fmt::Display for ExternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExternKind::Func => "function",
            ExternKind::Table => "table",
            ExternKind::Memory => "memory",
            ExternKind::Global => "global",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ImportDesc {
    /// Type index of the imported function.
    Func(u32),
    Table(TableType),
    Memory(MemoryType),
    Global(GlobalType),
}

impl ImportDesc {
    pub fn kind(&self) -> ExternKind {
        match self {
            ImportDesc::Func(_) => ExternKind::Func,
            ImportDesc::Table(_) => ExternKind::Table,
            ImportDesc::Memory(_) => ExternKind::Memory,
            ImportDesc::Global(_) => ExternKind::Global,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Import {
    pub module: String,
    pub name: String,
    pub desc: ImportDesc,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Func {
    pub name: Option<String>,
    /// Index into the type section.
    pub ty: u32,
    /// Declared locals, not including parameters.
    pub locals: Vec<ValType>,
    /// Flattened body, without the implicit final `end`.
    pub body: Vec<Instruction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Global {
    pub ty: GlobalType,
    pub init: Vec<Instruction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Export {
    pub name: String,
    pub kind: ExternKind,
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ElemMode {
    Passive,
    Declarative,
    Active { table: u32, offset: Vec<Instruction> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ElemItems {
    /// Plain function indices.
    Funcs(Vec<u32>),
    /// One constant expression per element.
    Exprs(Vec<Vec<Instruction>>),
}

impl ElemItems {
    pub fn len(&self) -> usize {
        match self {
            ElemItems::Funcs(f) => f.len(),
            ElemItems::Exprs(e) => e.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Elem {
    pub ty: RefType,
    pub items: ElemItems,
    pub mode: ElemMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DataMode {
    Passive,
    Active { memory: u32, offset: Vec<Instruction> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Data {
    pub bytes: Vec<u8>,
    pub mode: DataMode,
}

/// A fully resolved module.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Module {
    pub name: Option<String>,
    pub types: Vec<FuncType>,
    pub imports: Vec<Import>,
    pub funcs: Vec<Func>,
    pub tables: Vec<TableType>,
    pub memories: Vec<MemoryType>,
    pub globals: Vec<Global>,
    pub exports: Vec<Export>,
    pub elems: Vec<Elem>,
    pub data: Vec<Data>,
    pub start: Option<u32>,
}

impl Module {
    /// How many entities of `kind` are imported. Imported entities take the
    /// lowest indices of their index space.
    pub fn imported(&self, kind: ExternKind) -> usize {
        self.imports.iter().filter(|i| i.desc.kind() == kind).count()
    }

    /// Looks up an export by name.
    pub fn export(&self, name: &str) -> Option<&Export> {
        self.exports.iter().find(|e| e.name == name)
    }

    /// The signature of a function by its index in the function index space.
    pub fn func_type(&self, index: u32) -> Option<&FuncType> {
        let imported: Vec<u32> = self
            .imports
            .iter()
            .filter_map(|i| match i.desc {
                ImportDesc::Func(ty) => Some(ty),
                _ => None,
            })
            .collect();
        let ty = match imported.get(index as usize) {
            Some(&ty) => ty,
            None => self.funcs.get(index as usize - imported.len())?.ty,
        };
        self.types.get(ty as usize)
    }
}
