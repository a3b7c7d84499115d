//! The resolved representation handed to validators and interpreters.

pub mod instruction;
pub mod module;
pub mod opcodes;

pub use instruction::{BlockType, Immediate, Instruction, MemArg};
pub use module::{
    Data, DataMode, Elem, ElemItems, ElemMode, Export, ExternKind, Func, FuncType, Global, GlobalType, Import,
    ImportDesc, Limits, MemoryType, Module, RefType, TableType, ValType,
};
pub use opcodes::{ImmKind, Opcode};
