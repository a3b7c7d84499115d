//! Type syntax: value types, limits, function signatures and type uses.

use super::error::ParseError;
use super::literal;
use super::resolve::{Namespace, Resolver};
use super::sexpr::{SExpr, SExprList};
use super::token::Span;
use crate::ast::{FuncType, GlobalType, Limits, MemoryType, RefType, TableType, ValType};
use crate::config::Config;

/// What to do with `$name`s on parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamNames {
    /// Bind them (and every anonymous parameter) as locals.
    Bind,
    /// Accept and drop them, as in type definitions and imports.
    Ignore,
    /// Reject them, as in block types and `call_indirect`.
    Reject,
}

pub fn valtype(item: &SExpr, config: &Config) -> Result<ValType, ParseError> {
    let ty = match item.as_keyword() {
        Some("i32") => ValType::I32,
        Some("i64") => ValType::I64,
        Some("f32") => ValType::F32,
        Some("f64") => ValType::F64,
        Some("v128") if config.simd => ValType::V128,
        Some("v128") => return Err(ParseError::structural("v128 requires SIMD support", item.span())),
        Some("funcref") => ValType::FuncRef,
        Some("externref") => ValType::ExternRef,
        _ => return Err(ParseError::expected("value type", &item.describe(), item.span())),
    };
    Ok(ty)
}

/// `funcref` or `externref`.
pub fn reftype(item: &SExpr) -> Result<RefType, ParseError> {
    match item.as_keyword() {
        Some("funcref") => Ok(RefType::Func),
        Some("externref") => Ok(RefType::Extern),
        _ => Err(ParseError::expected("reference type", &item.describe(), item.span())),
    }
}

/// The heap type after `ref.null`: `func` or `extern`.
pub fn heaptype(item: Option<&SExpr>, span: Span) -> Result<RefType, ParseError> {
    match item.and_then(SExpr::as_keyword) {
        Some("func") => Ok(RefType::Func),
        Some("extern") => Ok(RefType::Extern),
        _ => Err(ParseError::expected(
            "heap type",
            &item.map_or_else(|| "end of list".into(), SExpr::describe),
            item.map_or(span, SExpr::span),
        )),
    }
}

/// `min max?`
pub fn limits(items: &[SExpr], pos: &mut usize, span: Span) -> Result<Limits, ParseError> {
    let min = match items.get(*pos) {
        Some(item) => match item.as_integer() {
            Some(lit) => literal::to_u32(lit, item.span())?,
            None => return Err(ParseError::expected("limits", &item.describe(), item.span())),
        },
        None => return Err(ParseError::expected("limits", "end of list", span)),
    };
    *pos += 1;

    let max = match items.get(*pos).and_then(|item| item.as_integer().map(|lit| (lit, item.span()))) {
        Some((lit, span)) => {
            *pos += 1;
            Some(literal::to_u32(lit, span)?)
        }
        None => None,
    };
    Ok(Limits { min, max })
}

/// `limits reftype`
pub fn tabletype(items: &[SExpr], pos: &mut usize, span: Span) -> Result<TableType, ParseError> {
    let limits = limits(items, pos, span)?;
    let elem = match items.get(*pos) {
        Some(item) => reftype(item)?,
        None => return Err(ParseError::expected("reference type", "end of list", span)),
    };
    *pos += 1;
    Ok(TableType { limits, elem })
}

pub fn memorytype(items: &[SExpr], pos: &mut usize, span: Span) -> Result<MemoryType, ParseError> {
    Ok(MemoryType {
        limits: limits(items, pos, span)?,
    })
}

/// `valtype` or `(mut valtype)`
pub fn globaltype(item: Option<&SExpr>, span: Span, config: &Config) -> Result<GlobalType, ParseError> {
    let Some(item) = item else {
        return Err(ParseError::expected("global type", "end of list", span));
    };
    match item.as_list() {
        Some(list) if list.head_keyword() == Some("mut") => {
            let [_, ty] = list.items else {
                return Err(ParseError::structural("expected one type in (mut ...)", list.span));
            };
            Ok(GlobalType {
                ty: valtype(ty, config)?,
                mutable: true,
            })
        }
        _ => Ok(GlobalType {
            ty: valtype(item, config)?,
            mutable: false,
        }),
    }
}

/// `(param ...)* (result ...)*` starting at `pos`. Parameter names are
/// reported to `on_param` in order, `None` for anonymous ones.
fn params_and_results(
    items: &[SExpr],
    pos: &mut usize,
    config: &Config,
    mut on_param: impl FnMut(Option<&str>, Span) -> Result<(), ParseError>,
) -> Result<FuncType, ParseError> {
    let mut ty = FuncType::default();

    while let Some(list) = items.get(*pos).and_then(SExpr::as_list) {
        match list.head_keyword() {
            Some("param") => {
                if !ty.results.is_empty() {
                    return Err(ParseError::structural("unexpected param after result", list.span));
                }
                match list.get(1).and_then(SExpr::as_id) {
                    Some(name) => {
                        let [_, _, t] = list.items else {
                            return Err(ParseError::structural("expected one type for a named param", list.span));
                        };
                        on_param(Some(name), list.span)?;
                        ty.params.push(valtype(t, config)?);
                    }
                    None => {
                        for t in list.tail() {
                            on_param(None, t.span())?;
                            ty.params.push(valtype(t, config)?);
                        }
                    }
                }
            }
            Some("result") => {
                for t in list.tail() {
                    ty.results.push(valtype(t, config)?);
                }
            }
            _ => break,
        }
        *pos += 1;
    }
    Ok(ty)
}

/// The body of `(func ...)` in a type definition.
pub fn functype(list: SExprList<'_>, config: &Config) -> Result<FuncType, ParseError> {
    list.expect_head("func")?;
    let mut pos = 1;
    let ty = params_and_results(list.items, &mut pos, config, |_, _| Ok(()))?;
    match list.get(pos) {
        Some(extra) => Err(ParseError::expected("param or result", &extra.describe(), extra.span())),
        None => Ok(ty),
    }
}

/// A signature: `(type x)? (param ...)* (result ...)*`.
///
/// Returns the explicit type index if one was given, and the signature
/// itself. With both forms present they must agree.
pub fn signature(
    res: &mut Resolver,
    items: &[SExpr],
    pos: &mut usize,
    names: ParamNames,
    span: Span,
) -> Result<(Option<u32>, FuncType), ParseError> {
    let explicit = match items.get(*pos).and_then(SExpr::as_list) {
        Some(list) if list.head_keyword() == Some("type") => {
            let [_, index] = list.items else {
                return Err(ParseError::structural("expected one index in (type ...)", list.span));
            };
            *pos += 1;
            Some(res.resolve(Namespace::Type, index)?)
        }
        _ => None,
    };

    let start = *pos;
    let config = *res.config();
    let mut bound = Vec::new();
    let inline = params_and_results(items, pos, &config, |name, span| {
        if names == ParamNames::Reject && name.is_some() {
            return Err(ParseError::structural("unexpected named parameter", span));
        }
        bound.push((name.map(String::from), span));
        Ok(())
    })?;

    let ty = match explicit {
        Some(index) => {
            let declared = res.type_at(index).cloned().unwrap_or_default();
            if *pos > start && declared != inline {
                return Err(ParseError::structural("inline function type does not match type use", span));
            }
            if *pos == start {
                bound = vec![(None, span); declared.params.len()];
            }
            declared
        }
        None => inline,
    };

    if names == ParamNames::Bind {
        for (name, span) in &bound {
            res.declare(Namespace::Local, name.as_deref(), *span)?;
        }
    }
    Ok((explicit, ty))
}

/// A type use, interning an inline signature when no index is given.
pub fn typeuse(
    res: &mut Resolver,
    items: &[SExpr],
    pos: &mut usize,
    names: ParamNames,
    span: Span,
) -> Result<u32, ParseError> {
    match signature(res, items, pos, names, span)? {
        (Some(index), _) => Ok(index),
        (None, ty) => Ok(res.intern_type(ty)),
    }
}
