//! Conversion of numeric literal tokens into values.
//!
//! The lexer keeps digits as written. Here underscore placement is checked
//! (an underscore must sit between two digits), integers are range-checked
//! against their target width, and floats are rounded to their target
//! precision straight from the source text so that `f32` values never go
//! through an intermediate `f64`.

use super::error::ParseError;
use super::token::{FloatLit, IntLit, Span, TokenKind};
use byteorder::{ByteOrder, LittleEndian};
use fhex::FromHex;

fn malformed(span: Span) -> ParseError {
    ParseError::lexical("malformed number literal", span)
}

fn out_of_range(span: Span) -> ParseError {
    ParseError::structural("constant out of range", span)
}

/// Strip underscores from a digit run after checking each one sits between
/// two digits of the run's radix. Exponent digits are always decimal.
fn clean_digits(text: &str, hex: bool, span: Span) -> Result<String, ParseError> {
    let bytes = text.as_bytes();
    let mut in_exponent = false;

    for (i, &b) in bytes.iter().enumerate() {
        if b == b'_' {
            let digit = |c: u8| {
                if hex && !in_exponent {
                    c.is_ascii_hexdigit()
                } else {
                    c.is_ascii_digit()
                }
            };
            let before = i.checked_sub(1).map(|j| bytes[j]);
            let after = bytes.get(i + 1).copied();
            if !before.map_or(false, digit) || !after.map_or(false, digit) {
                return Err(malformed(span));
            }
        } else if matches!(b, b'p' | b'P') || (!hex && matches!(b, b'e' | b'E')) {
            in_exponent = true;
        }
    }
    Ok(text.chars().filter(|&c| c != '_').collect())
}

/// The magnitude of an integer literal.
fn magnitude(lit: &IntLit, span: Span) -> Result<u64, ParseError> {
    let digits = clean_digits(&lit.digits, lit.hex, span)?;
    let radix = if lit.hex { 16 } else { 10 };
    u64::from_str_radix(&digits, radix).map_err(|_| out_of_range(span))
}

/// An integer of `bits` width, accepting both the signed and the unsigned
/// interpretation, returned as its two's-complement bit pattern.
pub fn int_bits(lit: &IntLit, bits: u32, span: Span) -> Result<u64, ParseError> {
    let value = magnitude(lit, span)?;
    let modulus = 1u128 << bits;
    if lit.negative {
        if u128::from(value) > modulus / 2 {
            return Err(out_of_range(span));
        }
        Ok(((modulus - u128::from(value)) % modulus) as u64)
    } else {
        if u128::from(value) >= modulus {
            return Err(out_of_range(span));
        }
        Ok(value)
    }
}

/// An unsigned 32-bit literal: indices, limits, alignments and offsets.
pub fn to_u32(lit: &IntLit, span: Span) -> Result<u32, ParseError> {
    if lit.has_sign {
        return Err(ParseError::structural("expected an unsigned integer", span));
    }
    let value = magnitude(lit, span)?;
    u32::try_from(value).map_err(|_| out_of_range(span))
}

pub fn to_i32(lit: &IntLit, span: Span) -> Result<i32, ParseError> {
    Ok(int_bits(lit, 32, span)? as u32 as i32)
}

pub fn to_i64(lit: &IntLit, span: Span) -> Result<i64, ParseError> {
    Ok(int_bits(lit, 64, span)? as i64)
}

/// Parse a memory argument value such as the `16` in `offset=16`.
pub fn memarg_value(text: &str, span: Span) -> Result<u64, ParseError> {
    let (hex, digits) = match text.strip_prefix("0x") {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let valid = !digits.is_empty()
        && digits
            .bytes()
            .all(|b| b == b'_' || if hex { b.is_ascii_hexdigit() } else { b.is_ascii_digit() });
    if !valid {
        return Err(malformed(span));
    }
    let lit = IntLit {
        negative: false,
        has_sign: false,
        hex,
        digits: digits.to_string(),
    };
    magnitude(&lit, span)
}

/// Normalise hex float text (no sign, no `0x`) into the form fhex reads.
fn hex_float_source(text: &str) -> String {
    let (mantissa, exponent) = match text.find(|c: char| c == 'p' || c == 'P') {
        Some(i) => (&text[..i], &text[i + 1..]),
        None => (text, "0"),
    };
    let exponent = exponent.strip_prefix('+').unwrap_or(exponent);
    let dot = if mantissa.ends_with('.') { "0" } else { "" };
    format!("0x{}{}p{}", mantissa.to_ascii_lowercase(), dot, exponent)
}

macro_rules! float_bits {
    ($fn_name:ident, $float:ty, $bits:ty, $mantissa_bits:expr) => {
        /// The IEEE 754 bit pattern of a float constant. Integer tokens are
        /// accepted too, as in `f64.const 1`.
        pub fn $fn_name(kind: &TokenKind, span: Span) -> Result<$bits, ParseError> {
            const SIGN: $bits = 1 << (<$bits>::BITS - 1);
            const MANTISSA: $bits = (1 << $mantissa_bits) - 1;
            const EXPONENT: $bits = !SIGN & !MANTISSA;
            const QUIET: $bits = 1 << ($mantissa_bits - 1);

            let finite = |value: Option<$float>| -> Result<$bits, ParseError> {
                match value {
                    Some(v) if v.is_finite() => Ok(v.to_bits()),
                    Some(_) => Err(out_of_range(span)),
                    None => Err(malformed(span)),
                }
            };

            let (negative, magnitude) = match kind {
                TokenKind::Integer(lit) => {
                    let digits = clean_digits(&lit.digits, lit.hex, span)?;
                    let value = if lit.hex {
                        <$float>::from_hex(&hex_float_source(&digits)).map_or(None, Some)
                    } else {
                        digits.parse::<$float>().ok()
                    };
                    (lit.negative, finite(value)?)
                }
                TokenKind::Float(FloatLit::Decimal { negative, text }) => {
                    let digits = clean_digits(text, false, span)?;
                    (*negative, finite(digits.parse::<$float>().ok())?)
                }
                TokenKind::Float(FloatLit::Hex { negative, text }) => {
                    let digits = clean_digits(text, true, span)?;
                    let value = <$float>::from_hex(&hex_float_source(&digits)).map_or(None, Some);
                    (*negative, finite(value)?)
                }
                TokenKind::Float(FloatLit::Inf { negative }) => (*negative, EXPONENT),
                TokenKind::Float(FloatLit::Nan { negative, payload: None }) => (*negative, EXPONENT | QUIET),
                TokenKind::Float(FloatLit::Nan {
                    negative,
                    payload: Some(payload),
                }) => {
                    let digits = clean_digits(payload, true, span)?;
                    let payload = <$bits>::from_str_radix(&digits, 16).map_err(|_| out_of_range(span))?;
                    if payload == 0 || payload > MANTISSA {
                        return Err(out_of_range(span));
                    }
                    (*negative, EXPONENT | payload)
                }
                other => return Err(ParseError::expected("a number", &other.describe(), span)),
            };

            Ok(if negative { magnitude | SIGN } else { magnitude })
        }
    };
}

float_bits!(f32_bits, f32, u32, 23);
float_bits!(f64_bits, f64, u64, 52);

/// Lane interpretation of a `v128.const`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum V128Shape {
    I8x16,
    I16x8,
    I32x4,
    I64x2,
    F32x4,
    F64x2,
}

impl V128Shape {
    pub fn from_keyword(word: &str) -> Option<V128Shape> {
        Some(match word {
            "i8x16" => V128Shape::I8x16,
            "i16x8" => V128Shape::I16x8,
            "i32x4" => V128Shape::I32x4,
            "i64x2" => V128Shape::I64x2,
            "f32x4" => V128Shape::F32x4,
            "f64x2" => V128Shape::F64x2,
            _ => return None,
        })
    }

    pub fn lanes(self) -> usize {
        match self {
            V128Shape::I8x16 => 16,
            V128Shape::I16x8 => 8,
            V128Shape::I32x4 | V128Shape::F32x4 => 4,
            V128Shape::I64x2 | V128Shape::F64x2 => 2,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, V128Shape::F32x4 | V128Shape::F64x2)
    }

    /// Bytes per lane.
    pub fn width(self) -> usize {
        16 / self.lanes()
    }

    /// Convert one lane literal to its bit pattern.
    pub fn lane_bits(self, kind: &TokenKind, span: Span) -> Result<u64, ParseError> {
        match (self, kind) {
            (V128Shape::F32x4, _) => Ok(u64::from(f32_bits(kind, span)?)),
            (V128Shape::F64x2, _) => f64_bits(kind, span),
            (_, TokenKind::Integer(lit)) => int_bits(lit, 8 * self.width() as u32, span),
            (_, other) => Err(ParseError::expected("an integer lane", &other.describe(), span)),
        }
    }

    /// Store a lane's bits little-endian at position `lane`.
    pub fn write_lane(self, bytes: &mut [u8; 16], lane: usize, value: u64) {
        let width = self.width();
        let slot = &mut bytes[lane * width..(lane + 1) * width];
        match width {
            1 => slot[0] = value as u8,
            2 => LittleEndian::write_u16(slot, value as u16),
            4 => LittleEndian::write_u32(slot, value as u32),
            _ => LittleEndian::write_u64(slot, value),
        }
    }
}
