//! Seams to the components a script driver supplies: a decoder for binary
//! modules and the comparison used by `assert_return`.

use super::command::{Action, Directive};
use super::values::{Expected, Value};
use thiserror::Error;
use tracing::trace;

/// Decodes the bytes of a `(module binary ...)` form. This crate only
/// carries the bytes; decoding belongs to the driver.
pub trait BinaryDecoder {
    type Module;
    type Error;

    fn decode(&self, bytes: &[u8]) -> Result<Self::Module, Self::Error>;
}

/// Why a set of results failed an `assert_return`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Mismatch {
    #[error("expected {expected} results, got {actual}")]
    Count { expected: usize, actual: usize },

    #[error("result {index}: expected {expected:?}, got {actual}")]
    Value {
        index: usize,
        expected: Expected,
        actual: Value,
    },
}

/// Judges the results of an action against an `assert_return`.
///
/// Closures of the right shape implement this, so a driver can pass
/// `&mut |actual, expected| ...` directly.
pub trait ResultOracle {
    fn check(&mut self, actual: &[Value], expected: &[Expected]) -> Result<(), Mismatch>;
}

impl<F> ResultOracle for F
where
    F: FnMut(&[Value], &[Expected]) -> Result<(), Mismatch>,
{
    fn check(&mut self, actual: &[Value], expected: &[Expected]) -> Result<(), Mismatch> {
        self(actual, expected)
    }
}

/// The stock comparison: counts must agree and every result must satisfy
/// its expectation, floats bit for bit unless a NaN pattern was given.
pub fn match_results(actual: &[Value], expected: &[Expected]) -> Result<(), Mismatch> {
    if actual.len() != expected.len() {
        return Err(Mismatch::Count {
            expected: expected.len(),
            actual: actual.len(),
        });
    }
    for (index, (value, exp)) in actual.iter().zip(expected).enumerate() {
        if !exp.accepts(value) {
            return Err(Mismatch::Value {
                index,
                expected: exp.clone(),
                actual: *value,
            });
        }
    }
    Ok(())
}

/// Runs `oracle` over the results a driver produced for `directive`.
///
/// Returns `None` when the directive is not an `assert_return`.
pub fn check_assert_return<O>(directive: &Directive, actual: &[Value], oracle: &mut O) -> Option<Result<(), Mismatch>>
where
    O: ResultOracle + ?Sized,
{
    let Directive::AssertReturn { span, action, expected } = directive else {
        return None;
    };
    let name = match action {
        Action::Invoke { name, .. } | Action::Get { name, .. } => name.as_str(),
    };
    let outcome = oracle.check(actual, expected);
    trace!(line = span.line, action = name, ok = outcome.is_ok(), "assert_return");
    Some(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::RefType;
    use crate::wast::values::NanPattern;
    use crate::wat::Span;

    fn assert_return(expected: Vec<Expected>) -> Directive {
        Directive::AssertReturn {
            span: Span::ZERO,
            action: Action::Invoke {
                module: 0,
                name: "f".into(),
                args: vec![],
            },
            expected,
        }
    }

    #[test]
    fn stock_comparison() {
        let expected = [Expected::Exact(Value::I32(1)), Expected::F32Nan(NanPattern::Canonical)];
        assert_eq!(match_results(&[Value::I32(1), Value::F32(0xffc0_0000)], &expected), Ok(()));
        assert_eq!(
            match_results(&[Value::I32(1)], &expected),
            Err(Mismatch::Count { expected: 2, actual: 1 })
        );
        assert!(matches!(
            match_results(&[Value::I32(2), Value::F32(0x7fc0_0000)], &expected),
            Err(Mismatch::Value { index: 0, .. })
        ));
    }

    #[test]
    fn closures_are_oracles() {
        let mut calls = 0;
        let mut oracle = |actual: &[Value], expected: &[Expected]| {
            calls += 1;
            match_results(actual, expected)
        };
        let directive = assert_return(vec![Expected::Exact(Value::RefNull(RefType::Extern))]);
        let outcome = check_assert_return(&directive, &[Value::RefNull(RefType::Extern)], &mut oracle);
        assert_eq!(outcome, Some(Ok(())));
        assert_eq!(calls, 1);
    }

    #[test]
    fn other_directives_are_skipped() {
        let directive = Directive::Register {
            span: Span::ZERO,
            as_name: "M".into(),
            module: 0,
        };
        let mut oracle = |_: &[Value], _: &[Expected]| -> Result<(), Mismatch> { panic!("not an assert_return") };
        assert_eq!(check_assert_return(&directive, &[], &mut oracle), None);
    }

    #[test]
    fn mismatch_messages() {
        let err = Mismatch::Value {
            index: 1,
            expected: Expected::Exact(Value::I64(7)),
            actual: Value::I64(8),
        };
        assert_eq!(err.to_string(), "result 1: expected Exact(I64(7)), got i64:8");
    }
}
