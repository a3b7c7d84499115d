//! Flat instruction representation.
//!
//! A function body is a `Vec<Instruction>` in stack-machine order. Structured
//! control is expressed with explicit `else`/`end` entries; each block header
//! records the positions of its own `else` and `end`, so a nested body is an
//! index range into the same vector rather than a separate allocation.

use super::module::{RefType, ValType};
use super::opcodes::Opcode;
use crate::wat::Span;
use serde::Serialize;

/// A memory access argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemArg {
    /// Alignment as log2 of the byte count.
    pub align: u32,
    pub offset: u32,
}

/// The signature of a `block`, `loop` or `if`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlockType {
    Empty,
    Value(ValType),
    /// Index into the type section, for blocks with parameters or more than
    /// one result.
    Type(u32),
}

/// Immediate operands, already resolved to numeric indices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Immediate {
    None,
    /// `block` / `loop` header, with the index of the matching `end`.
    Block { ty: BlockType, end: u32 },
    /// `if` header, with the indices of its `else` (if any) and `end`.
    If {
        ty: BlockType,
        else_at: Option<u32>,
        end: u32,
    },
    /// Branch target as relative depth; the innermost enclosing block is 0.
    Label(u32),
    BrTable { targets: Vec<u32>, default: u32 },
    /// A function, local, global, table, element or data index.
    Index(u32),
    /// `table.copy dst src` and `table.init table elem`.
    Pair(u32, u32),
    CallIndirect { table: u32, ty: u32 },
    Memory(MemArg),
    MemoryLane { mem: MemArg, lane: u8 },
    Lane(u8),
    I32(i32),
    I64(i64),
    /// Raw bits, so NaN payloads survive.
    F32(u32),
    F64(u64),
    V128([u8; 16]),
    Shuffle([u8; 16]),
    RefType(RefType),
    /// Explicit result types of a typed `select`.
    Select(Vec<ValType>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instruction {
    pub op: Opcode,
    pub imm: Immediate,
    #[serde(skip)]
    pub span: Span,
}

impl Instruction {
    pub fn new(op: Opcode, imm: Immediate, span: Span) -> Self {
        Self { op, imm, span }
    }

    pub fn name(&self) -> &'static str {
        self.op.name()
    }
}
