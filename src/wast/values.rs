//! Script constants: action arguments and expected results.
//!
//! Floats are kept as raw bits so NaN payloads and signed zeros survive
//! unchanged. Expected results may additionally carry NaN patterns, which
//! match a class of bit patterns rather than one value.

use crate::ast::RefType;
use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;
use std::fmt;

/// A concrete value: an action argument, or a result reported back by a
/// driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Value {
    I32(i32),
    I64(i64),
    F32(u32),
    F64(u64),
    V128([u8; 16]),
    RefNull(RefType),
    /// A host reference, written `ref.extern N`.
    RefExtern(u32),
    /// A non-null function reference, identified by the driver.
    RefFunc(u32),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::I32(v) => write!(f, "i32:{}", v),
            Value::I64(v) => write!(f, "i64:{}", v),
            Value::F32(bits) => write!(f, "f32:{} ({:#010x})", f32::from_bits(*bits), bits),
            Value::F64(bits) => write!(f, "f64:{} ({:#018x})", f64::from_bits(*bits), bits),
            Value::V128(bytes) => write!(f, "v128:{:#034x}", u128::from_le_bytes(*bytes)),
            Value::RefNull(RefType::Func) => write!(f, "ref.null func"),
            Value::RefNull(RefType::Extern) => write!(f, "ref.null extern"),
            Value::RefExtern(n) => write!(f, "ref.extern {}", n),
            Value::RefFunc(n) => write!(f, "ref.func {}", n),
        }
    }
}

/// The two NaN classes a result may be checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NanPattern {
    /// Only the canonical payload (quiet bit alone), either sign.
    Canonical,
    /// Any NaN with the quiet bit set.
    Arithmetic,
}

impl NanPattern {
    pub fn from_keyword(word: &str) -> Option<NanPattern> {
        match word {
            "nan:canonical" => Some(NanPattern::Canonical),
            "nan:arithmetic" => Some(NanPattern::Arithmetic),
            _ => None,
        }
    }

    pub fn matches_f32(self, bits: u32) -> bool {
        const CANONICAL: u32 = 0x7fc0_0000;
        match self {
            NanPattern::Canonical => bits & 0x7fff_ffff == CANONICAL,
            NanPattern::Arithmetic => bits & CANONICAL == CANONICAL,
        }
    }

    pub fn matches_f64(self, bits: u64) -> bool {
        const CANONICAL: u64 = 0x7ff8_0000_0000_0000;
        match self {
            NanPattern::Canonical => bits & 0x7fff_ffff_ffff_ffff == CANONICAL,
            NanPattern::Arithmetic => bits & CANONICAL == CANONICAL,
        }
    }
}

impl fmt::Display for NanPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NanPattern::Canonical => "nan:canonical",
            NanPattern::Arithmetic => "nan:arithmetic",
        })
    }
}

/// One float lane of an expected vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Lane<T> {
    Bits(T),
    Nan(NanPattern),
}

/// An expected result of `assert_return`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Expected {
    /// Bit-for-bit equal to this value.
    Exact(Value),
    F32Nan(NanPattern),
    F64Nan(NanPattern),
    /// A vector with at least one NaN-pattern lane.
    F32x4([Lane<u32>; 4]),
    F64x2([Lane<u64>; 2]),
    /// `(ref.func)`: any non-null function reference.
    AnyRefFunc,
    /// `(ref.extern)`: any host reference.
    AnyRefExtern,
}

impl Expected {
    /// Whether `actual` satisfies this expectation.
    pub fn accepts(&self, actual: &Value) -> bool {
        match (self, actual) {
            (Expected::Exact(expected), actual) => expected == actual,
            (Expected::F32Nan(p), Value::F32(bits)) => p.matches_f32(*bits),
            (Expected::F64Nan(p), Value::F64(bits)) => p.matches_f64(*bits),
            (Expected::F32x4(lanes), Value::V128(bytes)) => lanes.iter().enumerate().all(|(i, lane)| {
                let bits = LittleEndian::read_u32(&bytes[i * 4..]);
                match lane {
                    Lane::Bits(expected) => *expected == bits,
                    Lane::Nan(p) => p.matches_f32(bits),
                }
            }),
            (Expected::F64x2(lanes), Value::V128(bytes)) => lanes.iter().enumerate().all(|(i, lane)| {
                let bits = LittleEndian::read_u64(&bytes[i * 8..]);
                match lane {
                    Lane::Bits(expected) => *expected == bits,
                    Lane::Nan(p) => p.matches_f64(bits),
                }
            }),
            (Expected::AnyRefFunc, Value::RefFunc(_)) => true,
            (Expected::AnyRefExtern, Value::RefExtern(_)) => true,
            _ => false,
        }
    }
}
