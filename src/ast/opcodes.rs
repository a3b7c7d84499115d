//! Instruction metadata: mnemonic, immediate shape and natural alignment.
//!
//! The table is read-only and shared by every parse. An [`Opcode`] is a
//! small index into it, so instructions stay `Copy` and cheap to compare.

use once_cell::sync::Lazy;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// What follows a mnemonic in the text format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImmKind {
    None,
    /// `block`, `loop`, `if`: optional label and a block type.
    Block,
    Label,
    BrTable,
    Func,
    Local,
    Global,
    /// Optional table index, defaulting to 0.
    Table,
    Elem,
    Data,
    CallIndirect,
    /// `table.copy`: zero or two table indices.
    TableCopy,
    /// `table.init`: an element index, optionally preceded by a table index.
    TableInit,
    /// Memory argument with the natural alignment as log2 of the access width.
    Mem(u32),
    /// Memory argument followed by a lane index.
    MemLane(u32),
    Lane,
    I32,
    I64,
    F32,
    F64,
    V128,
    Shuffle,
    RefType,
    Select,
}

/// One row of the instruction table.
#[derive(Debug, Clone, Copy)]
pub struct OpInfo {
    pub name: &'static str,
    pub imm: ImmKind,
}

macro_rules! opcode_table {
    ($($name:literal => $imm:ident $(($arg:expr))?),* $(,)?) => {
        static OPCODES: &[OpInfo] = &[
            $(OpInfo { name: $name, imm: ImmKind::$imm $(($arg))? }),*
        ];
    };
}

opcode_table! {
    // Control. Rows addressed by the constants below must not move.
    "unreachable" => None, "nop" => None,
    "block" => Block, "loop" => Block, "if" => Block, "else" => None, "end" => None,
    "br" => Label, "br_if" => Label, "br_table" => BrTable, "return" => None,
    "call" => Func, "call_indirect" => CallIndirect,

    // Reference
    "ref.null" => RefType, "ref.is_null" => None, "ref.func" => Func,

    // Parametric
    "drop" => None, "select" => Select,

    // Variable
    "local.get" => Local, "local.set" => Local, "local.tee" => Local,
    "global.get" => Global, "global.set" => Global,

    // Table
    "table.get" => Table, "table.set" => Table, "table.size" => Table,
    "table.grow" => Table, "table.fill" => Table,
    "table.copy" => TableCopy, "table.init" => TableInit, "elem.drop" => Elem,

    // Memory
    "i32.load" => Mem(2), "i64.load" => Mem(3), "f32.load" => Mem(2), "f64.load" => Mem(3),
    "i32.load8_s" => Mem(0), "i32.load8_u" => Mem(0), "i32.load16_s" => Mem(1), "i32.load16_u" => Mem(1),
    "i64.load8_s" => Mem(0), "i64.load8_u" => Mem(0), "i64.load16_s" => Mem(1), "i64.load16_u" => Mem(1),
    "i64.load32_s" => Mem(2), "i64.load32_u" => Mem(2),
    "i32.store" => Mem(2), "i64.store" => Mem(3), "f32.store" => Mem(2), "f64.store" => Mem(3),
    "i32.store8" => Mem(0), "i32.store16" => Mem(1),
    "i64.store8" => Mem(0), "i64.store16" => Mem(1), "i64.store32" => Mem(2),
    "memory.size" => None, "memory.grow" => None, "memory.fill" => None, "memory.copy" => None,
    "memory.init" => Data, "data.drop" => Data,

    // Constants
    "i32.const" => I32, "i64.const" => I64, "f32.const" => F32, "f64.const" => F64,

    // i32 / i64 comparison
    "i32.eqz" => None, "i32.eq" => None, "i32.ne" => None,
    "i32.lt_s" => None, "i32.lt_u" => None, "i32.gt_s" => None, "i32.gt_u" => None,
    "i32.le_s" => None, "i32.le_u" => None, "i32.ge_s" => None, "i32.ge_u" => None,
    "i64.eqz" => None, "i64.eq" => None, "i64.ne" => None,
    "i64.lt_s" => None, "i64.lt_u" => None, "i64.gt_s" => None, "i64.gt_u" => None,
    "i64.le_s" => None, "i64.le_u" => None, "i64.ge_s" => None, "i64.ge_u" => None,

    // f32 / f64 comparison
    "f32.eq" => None, "f32.ne" => None, "f32.lt" => None, "f32.gt" => None, "f32.le" => None, "f32.ge" => None,
    "f64.eq" => None, "f64.ne" => None, "f64.lt" => None, "f64.gt" => None, "f64.le" => None, "f64.ge" => None,

    // i32 / i64 arithmetic
    "i32.clz" => None, "i32.ctz" => None, "i32.popcnt" => None,
    "i32.add" => None, "i32.sub" => None, "i32.mul" => None,
    "i32.div_s" => None, "i32.div_u" => None, "i32.rem_s" => None, "i32.rem_u" => None,
    "i32.and" => None, "i32.or" => None, "i32.xor" => None,
    "i32.shl" => None, "i32.shr_s" => None, "i32.shr_u" => None, "i32.rotl" => None, "i32.rotr" => None,
    "i64.clz" => None, "i64.ctz" => None, "i64.popcnt" => None,
    "i64.add" => None, "i64.sub" => None, "i64.mul" => None,
    "i64.div_s" => None, "i64.div_u" => None, "i64.rem_s" => None, "i64.rem_u" => None,
    "i64.and" => None, "i64.or" => None, "i64.xor" => None,
    "i64.shl" => None, "i64.shr_s" => None, "i64.shr_u" => None, "i64.rotl" => None, "i64.rotr" => None,

    // f32 / f64 arithmetic
    "f32.abs" => None, "f32.neg" => None, "f32.ceil" => None, "f32.floor" => None,
    "f32.trunc" => None, "f32.nearest" => None, "f32.sqrt" => None,
    "f32.add" => None, "f32.sub" => None, "f32.mul" => None, "f32.div" => None,
    "f32.min" => None, "f32.max" => None, "f32.copysign" => None,
    "f64.abs" => None, "f64.neg" => None, "f64.ceil" => None, "f64.floor" => None,
    "f64.trunc" => None, "f64.nearest" => None, "f64.sqrt" => None,
    "f64.add" => None, "f64.sub" => None, "f64.mul" => None, "f64.div" => None,
    "f64.min" => None, "f64.max" => None, "f64.copysign" => None,

    // Conversions
    "i32.wrap_i64" => None,
    "i32.trunc_f32_s" => None, "i32.trunc_f32_u" => None, "i32.trunc_f64_s" => None, "i32.trunc_f64_u" => None,
    "i64.extend_i32_s" => None, "i64.extend_i32_u" => None,
    "i64.trunc_f32_s" => None, "i64.trunc_f32_u" => None, "i64.trunc_f64_s" => None, "i64.trunc_f64_u" => None,
    "f32.convert_i32_s" => None, "f32.convert_i32_u" => None, "f32.convert_i64_s" => None, "f32.convert_i64_u" => None,
    "f32.demote_f64" => None,
    "f64.convert_i32_s" => None, "f64.convert_i32_u" => None, "f64.convert_i64_s" => None, "f64.convert_i64_u" => None,
    "f64.promote_f32" => None,
    "i32.reinterpret_f32" => None, "i64.reinterpret_f64" => None,
    "f32.reinterpret_i32" => None, "f64.reinterpret_i64" => None,
    "i32.extend8_s" => None, "i32.extend16_s" => None,
    "i64.extend8_s" => None, "i64.extend16_s" => None, "i64.extend32_s" => None,
    "i32.trunc_sat_f32_s" => None, "i32.trunc_sat_f32_u" => None,
    "i32.trunc_sat_f64_s" => None, "i32.trunc_sat_f64_u" => None,
    "i64.trunc_sat_f32_s" => None, "i64.trunc_sat_f32_u" => None,
    "i64.trunc_sat_f64_s" => None, "i64.trunc_sat_f64_u" => None,

    // SIMD memory
    "v128.load" => Mem(4),
    "v128.load8x8_s" => Mem(3), "v128.load8x8_u" => Mem(3),
    "v128.load16x4_s" => Mem(3), "v128.load16x4_u" => Mem(3),
    "v128.load32x2_s" => Mem(3), "v128.load32x2_u" => Mem(3),
    "v128.load8_splat" => Mem(0), "v128.load16_splat" => Mem(1),
    "v128.load32_splat" => Mem(2), "v128.load64_splat" => Mem(3),
    "v128.load32_zero" => Mem(2), "v128.load64_zero" => Mem(3),
    "v128.store" => Mem(4),
    "v128.load8_lane" => MemLane(0), "v128.load16_lane" => MemLane(1),
    "v128.load32_lane" => MemLane(2), "v128.load64_lane" => MemLane(3),
    "v128.store8_lane" => MemLane(0), "v128.store16_lane" => MemLane(1),
    "v128.store32_lane" => MemLane(2), "v128.store64_lane" => MemLane(3),

    // SIMD constants, shuffles and lanes
    "v128.const" => V128, "i8x16.shuffle" => Shuffle, "i8x16.swizzle" => None,
    "i8x16.splat" => None, "i16x8.splat" => None, "i32x4.splat" => None,
    "i64x2.splat" => None, "f32x4.splat" => None, "f64x2.splat" => None,
    "i8x16.extract_lane_s" => Lane, "i8x16.extract_lane_u" => Lane, "i8x16.replace_lane" => Lane,
    "i16x8.extract_lane_s" => Lane, "i16x8.extract_lane_u" => Lane, "i16x8.replace_lane" => Lane,
    "i32x4.extract_lane" => Lane, "i32x4.replace_lane" => Lane,
    "i64x2.extract_lane" => Lane, "i64x2.replace_lane" => Lane,
    "f32x4.extract_lane" => Lane, "f32x4.replace_lane" => Lane,
    "f64x2.extract_lane" => Lane, "f64x2.replace_lane" => Lane,

    // SIMD comparison
    "i8x16.eq" => None, "i8x16.ne" => None,
    "i8x16.lt_s" => None, "i8x16.lt_u" => None, "i8x16.gt_s" => None, "i8x16.gt_u" => None,
    "i8x16.le_s" => None, "i8x16.le_u" => None, "i8x16.ge_s" => None, "i8x16.ge_u" => None,
    "i16x8.eq" => None, "i16x8.ne" => None,
    "i16x8.lt_s" => None, "i16x8.lt_u" => None, "i16x8.gt_s" => None, "i16x8.gt_u" => None,
    "i16x8.le_s" => None, "i16x8.le_u" => None, "i16x8.ge_s" => None, "i16x8.ge_u" => None,
    "i32x4.eq" => None, "i32x4.ne" => None,
    "i32x4.lt_s" => None, "i32x4.lt_u" => None, "i32x4.gt_s" => None, "i32x4.gt_u" => None,
    "i32x4.le_s" => None, "i32x4.le_u" => None, "i32x4.ge_s" => None, "i32x4.ge_u" => None,
    "i64x2.eq" => None, "i64x2.ne" => None,
    "i64x2.lt_s" => None, "i64x2.gt_s" => None, "i64x2.le_s" => None, "i64x2.ge_s" => None,
    "f32x4.eq" => None, "f32x4.ne" => None, "f32x4.lt" => None, "f32x4.gt" => None, "f32x4.le" => None, "f32x4.ge" => None,
    "f64x2.eq" => None, "f64x2.ne" => None, "f64x2.lt" => None, "f64x2.gt" => None, "f64x2.le" => None, "f64x2.ge" => None,

    // SIMD bitwise
    "v128.not" => None, "v128.and" => None, "v128.andnot" => None, "v128.or" => None, "v128.xor" => None,
    "v128.bitselect" => None, "v128.any_true" => None,

    // SIMD i8x16
    "i8x16.abs" => None, "i8x16.neg" => None, "i8x16.popcnt" => None,
    "i8x16.all_true" => None, "i8x16.bitmask" => None,
    "i8x16.narrow_i16x8_s" => None, "i8x16.narrow_i16x8_u" => None,
    "i8x16.shl" => None, "i8x16.shr_s" => None, "i8x16.shr_u" => None,
    "i8x16.add" => None, "i8x16.add_sat_s" => None, "i8x16.add_sat_u" => None,
    "i8x16.sub" => None, "i8x16.sub_sat_s" => None, "i8x16.sub_sat_u" => None,
    "i8x16.min_s" => None, "i8x16.min_u" => None, "i8x16.max_s" => None, "i8x16.max_u" => None,
    "i8x16.avgr_u" => None,

    // SIMD i16x8
    "i16x8.extadd_pairwise_i8x16_s" => None, "i16x8.extadd_pairwise_i8x16_u" => None,
    "i16x8.abs" => None, "i16x8.neg" => None, "i16x8.q15mulr_sat_s" => None,
    "i16x8.all_true" => None, "i16x8.bitmask" => None,
    "i16x8.narrow_i32x4_s" => None, "i16x8.narrow_i32x4_u" => None,
    "i16x8.extend_low_i8x16_s" => None, "i16x8.extend_high_i8x16_s" => None,
    "i16x8.extend_low_i8x16_u" => None, "i16x8.extend_high_i8x16_u" => None,
    "i16x8.shl" => None, "i16x8.shr_s" => None, "i16x8.shr_u" => None,
    "i16x8.add" => None, "i16x8.add_sat_s" => None, "i16x8.add_sat_u" => None,
    "i16x8.sub" => None, "i16x8.sub_sat_s" => None, "i16x8.sub_sat_u" => None,
    "i16x8.mul" => None,
    "i16x8.min_s" => None, "i16x8.min_u" => None, "i16x8.max_s" => None, "i16x8.max_u" => None,
    "i16x8.avgr_u" => None,
    "i16x8.extmul_low_i8x16_s" => None, "i16x8.extmul_high_i8x16_s" => None,
    "i16x8.extmul_low_i8x16_u" => None, "i16x8.extmul_high_i8x16_u" => None,

    // SIMD i32x4
    "i32x4.extadd_pairwise_i16x8_s" => None, "i32x4.extadd_pairwise_i16x8_u" => None,
    "i32x4.abs" => None, "i32x4.neg" => None,
    "i32x4.all_true" => None, "i32x4.bitmask" => None,
    "i32x4.extend_low_i16x8_s" => None, "i32x4.extend_high_i16x8_s" => None,
    "i32x4.extend_low_i16x8_u" => None, "i32x4.extend_high_i16x8_u" => None,
    "i32x4.shl" => None, "i32x4.shr_s" => None, "i32x4.shr_u" => None,
    "i32x4.add" => None, "i32x4.sub" => None, "i32x4.mul" => None,
    "i32x4.min_s" => None, "i32x4.min_u" => None, "i32x4.max_s" => None, "i32x4.max_u" => None,
    "i32x4.dot_i16x8_s" => None,
    "i32x4.extmul_low_i16x8_s" => None, "i32x4.extmul_high_i16x8_s" => None,
    "i32x4.extmul_low_i16x8_u" => None, "i32x4.extmul_high_i16x8_u" => None,

    // SIMD i64x2
    "i64x2.abs" => None, "i64x2.neg" => None,
    "i64x2.all_true" => None, "i64x2.bitmask" => None,
    "i64x2.extend_low_i32x4_s" => None, "i64x2.extend_high_i32x4_s" => None,
    "i64x2.extend_low_i32x4_u" => None, "i64x2.extend_high_i32x4_u" => None,
    "i64x2.shl" => None, "i64x2.shr_s" => None, "i64x2.shr_u" => None,
    "i64x2.add" => None, "i64x2.sub" => None, "i64x2.mul" => None,
    "i64x2.extmul_low_i32x4_s" => None, "i64x2.extmul_high_i32x4_s" => None,
    "i64x2.extmul_low_i32x4_u" => None, "i64x2.extmul_high_i32x4_u" => None,

    // SIMD floating point
    "f32x4.ceil" => None, "f32x4.floor" => None, "f32x4.trunc" => None, "f32x4.nearest" => None,
    "f32x4.abs" => None, "f32x4.neg" => None, "f32x4.sqrt" => None,
    "f32x4.add" => None, "f32x4.sub" => None, "f32x4.mul" => None, "f32x4.div" => None,
    "f32x4.min" => None, "f32x4.max" => None, "f32x4.pmin" => None, "f32x4.pmax" => None,
    "f64x2.ceil" => None, "f64x2.floor" => None, "f64x2.trunc" => None, "f64x2.nearest" => None,
    "f64x2.abs" => None, "f64x2.neg" => None, "f64x2.sqrt" => None,
    "f64x2.add" => None, "f64x2.sub" => None, "f64x2.mul" => None, "f64x2.div" => None,
    "f64x2.min" => None, "f64x2.max" => None, "f64x2.pmin" => None, "f64x2.pmax" => None,

    // SIMD conversions
    "i32x4.trunc_sat_f32x4_s" => None, "i32x4.trunc_sat_f32x4_u" => None,
    "f32x4.convert_i32x4_s" => None, "f32x4.convert_i32x4_u" => None,
    "i32x4.trunc_sat_f64x2_s_zero" => None, "i32x4.trunc_sat_f64x2_u_zero" => None,
    "f64x2.convert_low_i32x4_s" => None, "f64x2.convert_low_i32x4_u" => None,
    "f32x4.demote_f64x2_zero" => None, "f64x2.promote_low_f32x4" => None,
}

static BY_NAME: Lazy<HashMap<&'static str, Opcode>> = Lazy::new(|| {
    OPCODES
        .iter()
        .enumerate()
        .map(|(i, info)| (info.name, Opcode(i as u16)))
        .collect()
});

const SIMD_PREFIXES: [&str; 7] = ["v128.", "i8x16.", "i16x8.", "i32x4.", "i64x2.", "f32x4.", "f64x2."];

/// An instruction mnemonic, addressed by its row in the instruction table.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Opcode(u16);

impl Opcode {
    pub const BLOCK: Opcode = Opcode(2);
    pub const LOOP: Opcode = Opcode(3);
    pub const IF: Opcode = Opcode(4);
    pub const ELSE: Opcode = Opcode(5);
    pub const END: Opcode = Opcode(6);
    pub const I32_CONST: Opcode = Opcode(60);

    /// Looks up a mnemonic such as `i32.add`.
    pub fn from_name(name: &str) -> Option<Opcode> {
        BY_NAME.get(name).copied()
    }

    fn info(self) -> &'static OpInfo {
        &OPCODES[self.0 as usize]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn imm(self) -> ImmKind {
        self.info().imm
    }

    pub fn is_simd(self) -> bool {
        let name = self.name();
        SIMD_PREFIXES.iter().any(|p| name.starts_with(p))
    }

    /// Every mnemonic in the table.
    pub fn names() -> impl Iterator<Item = &'static str> {
        OPCODES.iter().map(|info| info.name)
    }
}

impl fmt::Debug for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Opcode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}
