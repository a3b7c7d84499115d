//! Script (.wast) parsing.
//!
//! Scripts share the WAT token and S-expression layers. Each top-level
//! form becomes one [`Directive`]; a run of bare module fields is gathered
//! into one implicit module. Modules are numbered in definition order and
//! actions refer to them by that number, resolved here from `$name`s or
//! from "the most recent module".

use super::command::{Action, Directive, ModuleSource, Script};
use super::values::{Expected, Lane, NanPattern, Value};
use crate::config::Config;
use crate::wat::literal::{self, V128Shape};
use crate::wat::sexpr::{Reader, SExpr, SExprList};
use crate::wat::{self, types, ParseError, Span, Token, TokenKind};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Parses a script with the default [`Config`].
pub fn parse_script(source: &str) -> Result<Script, ParseError> {
    parse_script_with(source.as_bytes(), &Config::default())
}

pub fn parse_script_with(source: &[u8], config: &Config) -> Result<Script, ParseError> {
    let forms = Reader::with_config(source, config).collect::<Result<Vec<_>, _>>()?;
    let mut builder = ScriptBuilder::new(*config);

    let mut rest = forms.as_slice();
    while let Some(form) = rest.first() {
        if is_module_field(form) {
            let run = rest.iter().take_while(|f| is_module_field(f)).count();
            let (fields, tail) = rest.split_at(run);
            builder.implicit_module(fields)?;
            rest = tail;
        } else {
            builder.directive(form)?;
            rest = &rest[1..];
        }
    }

    let script = builder.finish();
    debug!(
        directives = script.directives.len(),
        modules = script.modules().count(),
        "parsed script"
    );
    Ok(script)
}

fn is_module_field(form: &SExpr) -> bool {
    const FIELDS: [&str; 10] = [
        "type", "import", "func", "table", "memory", "global", "export", "start", "elem", "data",
    ];
    form.as_list()
        .and_then(|list| list.head_keyword())
        .map_or(false, |kw| FIELDS.contains(&kw))
}

struct ScriptBuilder {
    config: Config,
    /// `$name` to module number; a later definition shadows an earlier one.
    names: HashMap<String, usize>,
    modules: usize,
    directives: Vec<Directive>,
}

impl ScriptBuilder {
    fn new(config: Config) -> Self {
        Self {
            config,
            names: HashMap::new(),
            modules: 0,
            directives: Vec::new(),
        }
    }

    fn finish(self) -> Script {
        Script {
            directives: self.directives,
        }
    }

    fn push(&mut self, directive: Directive) {
        trace!(
            keyword = directive.keyword(),
            line = directive.span().line,
            "directive"
        );
        self.directives.push(directive);
    }

    fn define(&mut self, span: Span, name: Option<&str>, source: ModuleSource) {
        let index = self.modules;
        self.modules += 1;
        if let Some(name) = name {
            self.names.insert(name.to_string(), index);
        }
        self.push(Directive::Module {
            span,
            name: name.map(String::from),
            index,
            source,
        });
    }

    fn implicit_module(&mut self, fields: &[SExpr]) -> Result<(), ParseError> {
        let (Some(first), Some(last)) = (fields.first(), fields.last()) else {
            return Ok(());
        };
        let module = wat::module_from_fields(None, fields, &self.config)?;
        self.define(
            first.span().through(last.span()),
            None,
            ModuleSource::Text(Box::new(module)),
        );
        Ok(())
    }

    fn directive(&mut self, form: &SExpr) -> Result<(), ParseError> {
        let list = form.expect_list()?;
        let Some(keyword) = list.head_keyword() else {
            return Err(ParseError::expected(
                "directive",
                &list.head().map_or_else(|| "'()'".into(), SExpr::describe),
                list.span,
            ));
        };
        let span = list.span;

        let directive = match keyword {
            "module" => {
                let (name, source) = self.module_source(list, false)?;
                self.define(span, name, source);
                return Ok(());
            }
            "register" => {
                let as_name = export_name(list.get(1), span)?;
                let mut pos = 2;
                let module = self.module_ref(list.items, &mut pos, span)?;
                no_more(list.items, pos)?;
                Directive::Register { span, as_name, module }
            }
            "invoke" | "get" => Directive::Action {
                span,
                action: self.action(Some(form), span)?,
            },
            "assert_return" => {
                let action = self.action(list.get(1), span)?;
                let expected = list
                    .items
                    .get(2..)
                    .unwrap_or(&[])
                    .iter()
                    .map(|item| constant(item, true))
                    .collect::<Result<Vec<_>, _>>()?;
                Directive::AssertReturn { span, action, expected }
            }
            "assert_trap" => {
                let message = message(list, span)?;
                match list.get(1) {
                    Some(target) if target.is_list_headed_by("module") => Directive::AssertModuleTrap {
                        span,
                        module: self.module_source(target.expect_list()?, true)?.1,
                        message,
                    },
                    target => Directive::AssertTrap {
                        span,
                        action: self.action(target, span)?,
                        message,
                    },
                }
            }
            "assert_exhaustion" => Directive::AssertExhaustion {
                span,
                message: message(list, span)?,
                action: self.action(list.get(1), span)?,
            },
            "assert_invalid" | "assert_malformed" | "assert_unlinkable" | "assert_uninstantiable" => {
                let message = message(list, span)?;
                let module = match list.get(1) {
                    Some(target) => self.module_source(target.expect_list()?, true)?.1,
                    None => return Err(ParseError::expected("module", "end of list", span)),
                };
                match keyword {
                    "assert_invalid" => Directive::AssertInvalid { span, module, message },
                    "assert_malformed" => Directive::AssertMalformed { span, module, message },
                    "assert_unlinkable" => Directive::AssertUnlinkable { span, module, message },
                    _ => Directive::AssertUninstantiable { span, module, message },
                }
            }
            other => return Err(ParseError::structural(format!("unknown directive '{}'", other), span)),
        };

        self.push(directive);
        Ok(())
    }

    /// `(module $id? field*)`, `(module $id? binary "..."*)` or
    /// `(module $id? quote "..."*)`.
    ///
    /// Inside assertions (`lenient`) inline text that fails to parse is kept
    /// as [`ModuleSource::Malformed`] rather than aborting the script.
    fn module_source<'a>(
        &self,
        list: SExprList<'a>,
        lenient: bool,
    ) -> Result<(Option<&'a str>, ModuleSource), ParseError> {
        list.expect_head("module")?;
        let mut pos = 1;
        let name = list.get(pos).and_then(SExpr::as_id);
        if name.is_some() {
            pos += 1;
        }

        let source = match list.get(pos).and_then(SExpr::as_keyword) {
            Some("binary") => ModuleSource::Binary(strings(&list.items[pos + 1..])?.concat()),
            Some("quote") => ModuleSource::Quote(strings(&list.items[pos + 1..])?.join(&b' ')),
            _ => match wat::module_from_list(list, &self.config) {
                Ok(module) => ModuleSource::Text(Box::new(module)),
                Err(e) if lenient => {
                    trace!(error = %e, "kept malformed module");
                    ModuleSource::Malformed(e)
                }
                Err(e) => return Err(e),
            },
        };
        Ok((name, source))
    }

    /// An optional `$name` at `pos`, defaulting to the most recent module.
    fn module_ref(&self, items: &[SExpr], pos: &mut usize, span: Span) -> Result<usize, ParseError> {
        match items.get(*pos).and_then(SExpr::as_id) {
            Some(name) => {
                *pos += 1;
                self.names
                    .get(name)
                    .copied()
                    .ok_or_else(|| ParseError::resolution(format!("unknown module ${}", name), span))
            }
            None => self
                .modules
                .checked_sub(1)
                .ok_or_else(|| ParseError::resolution("no module defined", span)),
        }
    }

    /// `(invoke $mod? "name" const*)` or `(get $mod? "name")`.
    fn action(&self, item: Option<&SExpr>, span: Span) -> Result<Action, ParseError> {
        let Some(item) = item else {
            return Err(ParseError::expected("action", "end of list", span));
        };
        let list = item.expect_list()?;
        let mut pos = 1;
        match list.head_keyword() {
            Some("invoke") => {
                let module = self.module_ref(list.items, &mut pos, list.span)?;
                let name = export_name(list.get(pos), list.span)?;
                let args = list.items[pos + 1..]
                    .iter()
                    .map(argument)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Action::Invoke { module, name, args })
            }
            Some("get") => {
                let module = self.module_ref(list.items, &mut pos, list.span)?;
                let name = export_name(list.get(pos), list.span)?;
                no_more(list.items, pos + 1)?;
                Ok(Action::Get { module, name })
            }
            _ => Err(ParseError::expected("action", &item.describe(), item.span())),
        }
    }
}

fn no_more(items: &[SExpr], pos: usize) -> Result<(), ParseError> {
    match items.get(pos) {
        Some(extra) => Err(ParseError::structural(format!("unexpected {}", extra.describe()), extra.span())),
        None => Ok(()),
    }
}

fn export_name(item: Option<&SExpr>, span: Span) -> Result<String, ParseError> {
    let Some(item) = item else {
        return Err(ParseError::expected("string", "end of list", span));
    };
    let bytes = item.expect_string()?;
    String::from_utf8(bytes.to_vec()).map_err(|_| ParseError::structural("malformed UTF-8 encoding", item.span()))
}

/// The failure text that ends every `assert_*` other than `assert_return`.
fn message(list: SExprList<'_>, span: Span) -> Result<String, ParseError> {
    let Some(item) = list.get(2) else {
        return Err(ParseError::expected("failure message", "end of list", span));
    };
    let text = String::from_utf8_lossy(item.expect_string()?).into_owned();
    no_more(list.items, 3)?;
    Ok(text)
}

fn strings(items: &[SExpr]) -> Result<Vec<&[u8]>, ParseError> {
    items.iter().map(SExpr::expect_string).collect()
}

/// An action argument: a constant without patterns.
fn argument(item: &SExpr) -> Result<Value, ParseError> {
    match constant(item, false)? {
        Expected::Exact(value) => Ok(value),
        _ => Err(ParseError::structural("expected a constant value", item.span())),
    }
}

fn nan_pattern(token: &Token) -> Option<NanPattern> {
    match &token.kind {
        TokenKind::Keyword(word) => NanPattern::from_keyword(word),
        _ => None,
    }
}

fn patterns_not_allowed(span: Span) -> ParseError {
    ParseError::structural("NaN patterns are only allowed in expected results", span)
}

fn atom<'a>(item: Option<&'a SExpr>, span: Span) -> Result<&'a Token, ParseError> {
    match item {
        Some(SExpr::Atom(token)) => Ok(token),
        Some(other) => Err(ParseError::expected("a number", &other.describe(), other.span())),
        None => Err(ParseError::expected("a number", "end of list", span)),
    }
}

/// A constant form. With `expected` set, NaN patterns and the `(ref.func)`
/// and `(ref.extern)` wildcards are accepted.
fn constant(item: &SExpr, expected: bool) -> Result<Expected, ParseError> {
    let list = item.expect_list()?;
    let span = list.span;
    let Some(head) = list.head_keyword() else {
        return Err(ParseError::expected("constant", &item.describe(), span));
    };

    let (value, arity) = match head {
        "i32.const" | "i64.const" => {
            let token = atom(list.get(1), span)?;
            let TokenKind::Integer(lit) = &token.kind else {
                return Err(ParseError::expected("an integer", &token.kind.describe(), token.span));
            };
            let value = if head == "i32.const" {
                Value::I32(literal::to_i32(lit, token.span)?)
            } else {
                Value::I64(literal::to_i64(lit, token.span)?)
            };
            (Expected::Exact(value), 2)
        }
        "f32.const" | "f64.const" => {
            let token = atom(list.get(1), span)?;
            let value = match (nan_pattern(token), head == "f32.const") {
                (Some(_), _) if !expected => return Err(patterns_not_allowed(token.span)),
                (Some(p), true) => Expected::F32Nan(p),
                (Some(p), false) => Expected::F64Nan(p),
                (None, true) => Expected::Exact(Value::F32(literal::f32_bits(&token.kind, token.span)?)),
                (None, false) => Expected::Exact(Value::F64(literal::f64_bits(&token.kind, token.span)?)),
            };
            (value, 2)
        }
        "v128.const" => (vector(list, expected)?, list.len()),
        "ref.null" => (
            Expected::Exact(Value::RefNull(types::heaptype(list.get(1), span)?)),
            2,
        ),
        "ref.extern" | "ref.func" => match list.get(1) {
            Some(index) => {
                let Some(lit) = index.as_integer() else {
                    return Err(ParseError::expected("an integer", &index.describe(), index.span()));
                };
                let n = literal::to_u32(lit, index.span())?;
                let value = if head == "ref.extern" {
                    Value::RefExtern(n)
                } else {
                    Value::RefFunc(n)
                };
                (Expected::Exact(value), 2)
            }
            None if expected && head == "ref.extern" => (Expected::AnyRefExtern, 1),
            None if expected => (Expected::AnyRefFunc, 1),
            None => return Err(ParseError::expected("an integer", "end of list", span)),
        },
        other => return Err(ParseError::structural(format!("unknown constant '{}'", other), span)),
    };

    no_more(list.items, arity)?;
    Ok(value)
}

/// `(v128.const shape lane*)`, where float lanes of an expected result may
/// be NaN patterns.
fn vector(list: SExprList<'_>, expected: bool) -> Result<Expected, ParseError> {
    let span = list.span;
    let shape = match list.get(1) {
        Some(item) => item
            .as_keyword()
            .and_then(V128Shape::from_keyword)
            .ok_or_else(|| ParseError::expected("vector shape", &item.describe(), item.span()))?,
        None => return Err(ParseError::expected("vector shape", "end of list", span)),
    };
    let items = list.items.get(2..).unwrap_or(&[]);
    if items.len() != shape.lanes() {
        return Err(ParseError::structural(
            format!("expected {} lanes, found {}", shape.lanes(), items.len()),
            span,
        ));
    }

    let mut lanes = Vec::with_capacity(items.len());
    for item in items {
        let token = atom(Some(item), span)?;
        lanes.push(match nan_pattern(token) {
            Some(_) if !expected => return Err(patterns_not_allowed(token.span)),
            Some(p) if shape.is_float() => Lane::Nan(p),
            Some(_) => return Err(ParseError::expected("an integer lane", &token.kind.describe(), token.span)),
            None => Lane::Bits(shape.lane_bits(&token.kind, token.span)?),
        });
    }

    if lanes.iter().all(|lane| matches!(lane, Lane::Bits(_))) {
        let mut bytes = [0u8; 16];
        for (i, lane) in lanes.iter().enumerate() {
            if let Lane::Bits(bits) = lane {
                shape.write_lane(&mut bytes, i, *bits);
            }
        }
        return Ok(Expected::Exact(Value::V128(bytes)));
    }

    Ok(match shape {
        V128Shape::F32x4 => {
            let mut out = [Lane::Bits(0u32); 4];
            for (slot, lane) in out.iter_mut().zip(&lanes) {
                *slot = match *lane {
                    Lane::Bits(bits) => Lane::Bits(bits as u32),
                    Lane::Nan(p) => Lane::Nan(p),
                };
            }
            Expected::F32x4(out)
        }
        _ => {
            let mut out = [Lane::Bits(0u64); 2];
            for (slot, lane) in out.iter_mut().zip(&lanes) {
                *slot = *lane;
            }
            Expected::F64x2(out)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wat::ErrorKind;
    use rstest::rstest;

    fn parse(source: &str) -> Script {
        parse_script(source).unwrap()
    }

    fn only(source: &str) -> Directive {
        let mut script = parse(source);
        assert_eq!(script.directives.len(), 1, "{:?}", script.directives);
        script.directives.remove(0)
    }

    #[test]
    fn directives_in_order() {
        let script = parse(
            r#"
            (module $m (func (export "f") (result i32) i32.const 1))
            (register "M" $m)
            (invoke "f")
            (assert_return (invoke "f") (i32.const 1))
            (assert_trap (invoke "f") "unreachable")
            "#,
        );
        let keywords: Vec<_> = script.directives.iter().map(Directive::keyword).collect();
        assert_eq!(keywords, ["module", "register", "invoke", "assert_return", "assert_trap"]);
    }

    #[test]
    fn bare_fields_form_one_module() {
        let script = parse(
            r#"
            (func (export "a"))
            (memory 1)
            (assert_return (invoke "a"))
            (func)
            "#,
        );
        let indices: Vec<_> = script
            .modules()
            .map(|d| match d {
                Directive::Module { index, source, .. } => (*index, source.module().map(|m| m.funcs.len())),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(indices, [(0, Some(1)), (1, Some(1))]);
        assert_eq!(script.directives.len(), 3);
    }

    #[test]
    fn module_references() {
        let script = parse(
            r#"
            (module $a)
            (module $b)
            (get $a "g")
            (invoke "f")
            (module $a)
            (register "x" $a)
            "#,
        );
        let refs: Vec<_> = script
            .directives
            .iter()
            .filter_map(|d| match d {
                Directive::Action {
                    action: Action::Get { module, .. } | Action::Invoke { module, .. },
                    ..
                } => Some(*module),
                Directive::Register { module, .. } => Some(*module),
                _ => None,
            })
            .collect();
        assert_eq!(refs, [0, 1, 2]);
    }

    #[rstest]
    #[case(r#"(invoke "f")"#)]
    #[case(r#"(module) (get $nope "g")"#)]
    #[case(r#"(register "M")"#)]
    fn unresolved_modules(#[case] source: &str) {
        assert_eq!(parse_script(source).unwrap_err().kind, ErrorKind::Resolution);
    }

    #[test]
    fn constants() {
        let script = parse(
            r#"(module)
               (assert_return (invoke "f" (i32.const -1) (f64.const -0.5) (ref.null extern))
                 (f32.const nan:canonical) (f64.const nan:arithmetic) (ref.func) (ref.extern 3))"#,
        );
        let Directive::AssertReturn { action, expected, .. } = &script.directives[1] else {
            panic!("expected assert_return");
        };
        let Action::Invoke { args, .. } = action else {
            panic!("expected invoke");
        };
        assert_eq!(
            args,
            &[
                Value::I32(-1),
                Value::F64((-0.5f64).to_bits()),
                Value::RefNull(crate::ast::RefType::Extern)
            ]
        );
        assert_eq!(
            expected,
            &[
                Expected::F32Nan(NanPattern::Canonical),
                Expected::F64Nan(NanPattern::Arithmetic),
                Expected::AnyRefFunc,
                Expected::Exact(Value::RefExtern(3)),
            ]
        );
    }

    #[test]
    fn nan_patterns_only_in_expectations() {
        let err = parse_script(r#"(module) (invoke "f" (f32.const nan:canonical))"#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Structural);
        assert_eq!(err.message, "NaN patterns are only allowed in expected results");
    }

    #[test]
    fn vector_expectations() {
        let script = parse(
            r#"(module)
               (assert_return (invoke "f")
                 (v128.const f32x4 nan:canonical 1.0 0 -0)
                 (v128.const i16x8 1 2 3 4 5 6 7 -1))"#,
        );
        let Directive::AssertReturn { expected, .. } = &script.directives[1] else {
            panic!("expected assert_return");
        };
        assert_eq!(
            expected[0],
            Expected::F32x4([
                Lane::Nan(NanPattern::Canonical),
                Lane::Bits(0x3f80_0000),
                Lane::Bits(0),
                Lane::Bits(0x8000_0000),
            ])
        );
        let Expected::Exact(Value::V128(bytes)) = expected[1] else {
            panic!("expected an exact vector");
        };
        assert_eq!(bytes[..4], [1, 0, 2, 0]);
        assert_eq!(bytes[14..], [0xff, 0xff]);
    }

    #[test]
    fn binary_and_quoted_modules() {
        let script = parse(
            r#"
            (module $bin binary "\00asm" "\01\00\00\00")
            (assert_malformed (module quote "(func" "i32.const)") "unexpected token")
            "#,
        );
        let Directive::Module { source, name, .. } = &script.directives[0] else {
            panic!("expected module");
        };
        assert_eq!(name.as_deref(), Some("bin"));
        assert_eq!(source, &ModuleSource::Binary(b"\0asm\x01\0\0\0".to_vec()));

        let Directive::AssertMalformed { module, message, .. } = &script.directives[1] else {
            panic!("expected assert_malformed");
        };
        assert_eq!(module, &ModuleSource::Quote(b"(func i32.const)".to_vec()));
        assert_eq!(message, "unexpected token");
        assert!(module.parse_quote().unwrap().is_err());
    }

    #[test]
    fn assertion_modules_may_be_malformed() {
        let script = parse(r#"(assert_invalid (module (func (call $missing))) "unknown function")"#);
        let Directive::AssertInvalid { module, .. } = &script.directives[0] else {
            panic!("expected assert_invalid");
        };
        let ModuleSource::Malformed(err) = module else {
            panic!("expected a malformed module");
        };
        assert_eq!(err.kind, ErrorKind::Resolution);
        assert_eq!(script.modules().count(), 0);
    }

    #[test]
    fn top_level_module_errors_abort() {
        let err = parse_script("(module (func (call $missing)))").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Resolution);
    }

    #[test]
    fn module_traps() {
        let directive = only(r#"(assert_trap (module (func $s unreachable) (start $s)) "unreachable")"#);
        let Directive::AssertModuleTrap { module, .. } = directive else {
            panic!("expected a module trap");
        };
        assert_eq!(module.module().and_then(|m| m.start), Some(0));
    }

    #[rstest]
    #[case("(frobnicate)")]
    #[case(r#"(module) (assert_trap (invoke "f"))"#)]
    #[case(r#"(module) (invoke "f" (i32.const))"#)]
    #[case(r#"(module) (invoke "f" (v128.const i32x4 1 2))"#)]
    #[case(r#"(module) (get "g" (i32.const 0))"#)]
    fn malformed_directives(#[case] source: &str) {
        assert_eq!(parse_script(source).unwrap_err().kind, ErrorKind::Structural);
    }
}
