//! Instruction flattening.
//!
//! Bodies may mix the plain form (`i32.const 1 i32.const 2 i32.add`) with the
//! folded form (`(i32.add (i32.const 1) (i32.const 2))`). Both produce the
//! same flat sequence: a folded instruction emits its operands left to right,
//! then itself. `if` conditions come before the `if` header.
//!
//! Every block header is patched with the position of its `end` (and, for
//! `if`, its `else`) once the block closes, so consumers never need to
//! re-scan for structure.

use super::error::ParseError;
use super::literal::{self, V128Shape};
use super::resolve::{Namespace, Resolver};
use super::sexpr::{SExpr, SExprList};
use super::token::{IntLit, Span, Token, TokenKind};
use super::types::{self, ParamNames};
use crate::ast::{BlockType, ImmKind, Immediate, Instruction, MemArg, Opcode};

/// Flattens an instruction sequence such as a function body, a global
/// initialiser or an offset expression.
pub fn parse_expr(res: &mut Resolver, items: &[SExpr]) -> Result<Vec<Instruction>, ParseError> {
    let mut flattener = Flattener { res, out: Vec::new() };
    let mut pos = 0;
    flattener.instrs(items, &mut pos)?;
    match items.get(pos) {
        Some(stray) => Err(unexpected(stray)),
        None => Ok(flattener.out),
    }
}

fn unexpected(item: &SExpr) -> ParseError {
    ParseError::structural(format!("unexpected {}", item.describe()), item.span())
}

fn nan_pattern(span: Span) -> ParseError {
    ParseError::structural("NaN patterns are only allowed in expected results", span)
}

struct Flattener<'r> {
    res: &'r mut Resolver,
    out: Vec<Instruction>,
}

impl Flattener<'_> {
    fn emit(&mut self, op: Opcode, imm: Immediate, span: Span) -> u32 {
        self.out.push(Instruction::new(op, imm, span));
        self.out.len() as u32 - 1
    }

    /// Instructions up to the end of `items` or a bare `else`/`end`, which is
    /// left for the caller.
    fn instrs(&mut self, items: &[SExpr], pos: &mut usize) -> Result<(), ParseError> {
        while let Some(item) = items.get(*pos) {
            let token = match item {
                SExpr::List { .. } => {
                    self.folded(item)?;
                    *pos += 1;
                    continue;
                }
                SExpr::Atom(token) => token,
            };
            match &token.kind {
                TokenKind::Keyword(kw) if kw == "else" || kw == "end" => return Ok(()),
                TokenKind::Keyword(kw) => {
                    let op = self.opcode(kw, token.span)?;
                    *pos += 1;
                    self.plain(op, items, pos, token.span)?;
                }
                TokenKind::Reserved(word) => {
                    return Err(ParseError::structural(format!("unknown operator {}", word), token.span));
                }
                other => return Err(ParseError::expected("instruction", &other.describe(), token.span)),
            }
        }
        Ok(())
    }

    fn opcode(&self, name: &str, span: Span) -> Result<Opcode, ParseError> {
        let op = Opcode::from_name(name)
            .ok_or_else(|| ParseError::structural(format!("unknown instruction '{}'", name), span))?;
        if op.is_simd() && !self.res.config().simd {
            return Err(ParseError::structural(format!("{} requires SIMD support", name), span));
        }
        Ok(op)
    }

    fn plain(&mut self, op: Opcode, items: &[SExpr], pos: &mut usize, span: Span) -> Result<(), ParseError> {
        match op {
            Opcode::BLOCK | Opcode::LOOP | Opcode::IF => self.flat_block(op, items, pos, span),
            _ => {
                let imm = self.immediates(op, items, pos, span)?;
                self.emit(op, imm, span);
                Ok(())
            }
        }
    }

    // ========================================================================
    // Blocks
    // ========================================================================

    fn blocktype(&mut self, items: &[SExpr], pos: &mut usize, span: Span) -> Result<BlockType, ParseError> {
        let (explicit, ty) = types::signature(self.res, items, pos, ParamNames::Reject, span)?;
        Ok(match explicit {
            Some(index) => BlockType::Type(index),
            None => match (ty.params.as_slice(), ty.results.as_slice()) {
                ([], []) => BlockType::Empty,
                ([], [single]) => BlockType::Value(*single),
                _ => BlockType::Type(self.res.intern_type(ty)),
            },
        })
    }

    /// Emits a block header and enters its label scope.
    fn open(&mut self, op: Opcode, ty: BlockType, label: Option<&str>, span: Span) -> usize {
        let imm = if op == Opcode::IF {
            Immediate::If {
                ty,
                else_at: None,
                end: 0,
            }
        } else {
            Immediate::Block { ty, end: 0 }
        };
        let header = self.emit(op, imm, span);
        self.res.push_label(label);
        header as usize
    }

    /// Emits the `end`, leaves the label scope and patches the header.
    fn close(&mut self, header: usize, else_pos: Option<u32>, span: Span) {
        let end_pos = self.emit(Opcode::END, Immediate::None, span);
        self.res.pop_label();
        match self.out.get_mut(header).map(|instr| &mut instr.imm) {
            Some(Immediate::Block { end, .. }) => *end = end_pos,
            Some(Immediate::If { else_at, end, .. }) => {
                *else_at = else_pos;
                *end = end_pos;
            }
            _ => {}
        }
    }

    /// `block`, `loop` or `if` in plain form, after the mnemonic.
    fn flat_block(&mut self, op: Opcode, items: &[SExpr], pos: &mut usize, span: Span) -> Result<(), ParseError> {
        let label = take_label(items, pos);
        let ty = self.blocktype(items, pos, span)?;
        let header = self.open(op, ty, label, span);
        self.instrs(items, pos)?;

        let mut else_pos = None;
        if op == Opcode::IF {
            if let Some(item) = items.get(*pos).filter(|item| item.as_keyword() == Some("else")) {
                *pos += 1;
                closing_label(items, pos, label)?;
                else_pos = Some(self.emit(Opcode::ELSE, Immediate::None, item.span()));
                self.instrs(items, pos)?;
            }
        }

        match items.get(*pos) {
            Some(item) if item.as_keyword() == Some("end") => {
                *pos += 1;
                closing_label(items, pos, label)?;
                self.close(header, else_pos, item.span());
                Ok(())
            }
            Some(stray) => Err(unexpected(stray)),
            None => Err(ParseError::structural("unclosed block", span)),
        }
    }

    fn folded(&mut self, item: &SExpr) -> Result<(), ParseError> {
        let list = item.expect_list()?;
        let Some(head) = list.head() else {
            return Err(ParseError::structural("empty instruction", list.span));
        };
        let Some(name) = head.as_keyword() else {
            return Err(ParseError::expected("instruction", &head.describe(), head.span()));
        };
        let op = self.opcode(name, head.span())?;
        let items = list.items;
        let mut pos = 1;

        match op {
            Opcode::BLOCK | Opcode::LOOP => {
                let label = take_label(items, &mut pos);
                let ty = self.blocktype(items, &mut pos, list.span)?;
                let header = self.open(op, ty, label, list.span);
                self.instrs(items, &mut pos)?;
                if let Some(stray) = items.get(pos) {
                    return Err(unexpected(stray));
                }
                self.close(header, None, list.span);
            }
            Opcode::IF => self.folded_if(list)?,
            Opcode::ELSE | Opcode::END => return Err(unexpected(head)),
            _ => {
                let imm = self.immediates(op, items, &mut pos, head.span())?;
                for operand in items.iter().skip(pos) {
                    if operand.as_list().is_none() {
                        return Err(ParseError::expected("folded instruction", &operand.describe(), operand.span()));
                    }
                    self.folded(operand)?;
                }
                self.emit(op, imm, list.span);
            }
        }
        Ok(())
    }

    /// `(if label? blocktype cond* (then instr*) (else instr*)?)`
    fn folded_if(&mut self, list: SExprList<'_>) -> Result<(), ParseError> {
        let items = list.items;
        let mut pos = 1;
        let label = take_label(items, &mut pos);
        let ty = self.blocktype(items, &mut pos, list.span)?;

        while let Some(item) = items.get(pos) {
            if item.is_list_headed_by("then") {
                break;
            }
            if item.as_list().is_none() {
                return Err(ParseError::expected("'(then ...)'", &item.describe(), item.span()));
            }
            self.folded(item)?;
            pos += 1;
        }

        let Some(then) = items.get(pos).and_then(SExpr::as_list) else {
            return Err(ParseError::structural("expected '(then ...)'", list.span));
        };
        pos += 1;

        let header = self.open(Opcode::IF, ty, label, list.span);
        self.branch(then)?;

        let mut else_pos = None;
        if let Some(alt) = items.get(pos).and_then(SExpr::as_list) {
            if alt.head_keyword() == Some("else") {
                else_pos = Some(self.emit(Opcode::ELSE, Immediate::None, alt.span));
                self.branch(alt)?;
                pos += 1;
            }
        }
        if let Some(stray) = items.get(pos) {
            return Err(unexpected(stray));
        }
        self.close(header, else_pos, list.span);
        Ok(())
    }

    /// The body of `(then ...)` or `(else ...)`.
    fn branch(&mut self, list: SExprList<'_>) -> Result<(), ParseError> {
        let mut pos = 1;
        self.instrs(list.items, &mut pos)?;
        match list.get(pos) {
            Some(stray) => Err(unexpected(stray)),
            None => Ok(()),
        }
    }

    // ========================================================================
    // Immediates
    // ========================================================================

    fn index(&self, ns: Namespace, items: &[SExpr], pos: &mut usize, span: Span) -> Result<u32, ParseError> {
        match items.get(*pos) {
            Some(item) if Resolver::is_index(item) => {
                *pos += 1;
                self.res.resolve(ns, item)
            }
            Some(item) => Err(ParseError::expected(&format!("{} index", ns), &item.describe(), item.span())),
            None => Err(ParseError::expected(&format!("{} index", ns), "end of list", span)),
        }
    }

    fn optional_index(&self, ns: Namespace, items: &[SExpr], pos: &mut usize) -> Result<Option<u32>, ParseError> {
        match items.get(*pos) {
            Some(item) if Resolver::is_index(item) => {
                *pos += 1;
                self.res.resolve(ns, item).map(Some)
            }
            _ => Ok(None),
        }
    }

    fn immediates(&mut self, op: Opcode, items: &[SExpr], pos: &mut usize, span: Span) -> Result<Immediate, ParseError> {
        let imm = match op.imm() {
            ImmKind::None => Immediate::None,
            ImmKind::Block => {
                return Err(ParseError::structural(format!("unexpected '{}'", op), span));
            }
            ImmKind::Label => Immediate::Label(self.index(Namespace::Label, items, pos, span)?),
            ImmKind::BrTable => {
                let mut targets = Vec::new();
                while let Some(target) = self.optional_index(Namespace::Label, items, pos)? {
                    targets.push(target);
                }
                let default = targets
                    .pop()
                    .ok_or_else(|| ParseError::structural("br_table needs at least one label", span))?;
                Immediate::BrTable { targets, default }
            }
            ImmKind::Func => Immediate::Index(self.index(Namespace::Func, items, pos, span)?),
            ImmKind::Local => Immediate::Index(self.index(Namespace::Local, items, pos, span)?),
            ImmKind::Global => Immediate::Index(self.index(Namespace::Global, items, pos, span)?),
            ImmKind::Elem => Immediate::Index(self.index(Namespace::Elem, items, pos, span)?),
            ImmKind::Data => Immediate::Index(self.index(Namespace::Data, items, pos, span)?),
            ImmKind::Table => Immediate::Index(self.optional_index(Namespace::Table, items, pos)?.unwrap_or(0)),
            ImmKind::CallIndirect => {
                let table = self.optional_index(Namespace::Table, items, pos)?.unwrap_or(0);
                let ty = types::typeuse(self.res, items, pos, ParamNames::Reject, span)?;
                Immediate::CallIndirect { table, ty }
            }
            ImmKind::TableCopy => match self.optional_index(Namespace::Table, items, pos)? {
                Some(dst) => Immediate::Pair(dst, self.index(Namespace::Table, items, pos, span)?),
                None => Immediate::Pair(0, 0),
            },
            ImmKind::TableInit => {
                let two = items.get(*pos + 1).map_or(false, Resolver::is_index);
                let table = if two {
                    self.index(Namespace::Table, items, pos, span)?
                } else {
                    0
                };
                Immediate::Pair(table, self.index(Namespace::Elem, items, pos, span)?)
            }
            ImmKind::Mem(natural) => Immediate::Memory(memarg(items, pos, natural)?),
            ImmKind::MemLane(natural) => Immediate::MemoryLane {
                mem: memarg(items, pos, natural)?,
                lane: lane_index(items, pos, span)?,
            },
            ImmKind::Lane => Immediate::Lane(lane_index(items, pos, span)?),
            ImmKind::I32 => {
                let (lit, span) = integer(items, pos, span)?;
                Immediate::I32(literal::to_i32(lit, span)?)
            }
            ImmKind::I64 => {
                let (lit, span) = integer(items, pos, span)?;
                Immediate::I64(literal::to_i64(lit, span)?)
            }
            ImmKind::F32 => {
                let token = number(items, pos, span)?;
                Immediate::F32(literal::f32_bits(&token.kind, token.span)?)
            }
            ImmKind::F64 => {
                let token = number(items, pos, span)?;
                Immediate::F64(literal::f64_bits(&token.kind, token.span)?)
            }
            ImmKind::V128 => Immediate::V128(v128_const(items, pos, span)?),
            ImmKind::Shuffle => {
                let mut lanes = [0u8; 16];
                for lane in lanes.iter_mut() {
                    *lane = lane_index(items, pos, span)?;
                }
                Immediate::Shuffle(lanes)
            }
            ImmKind::RefType => {
                let ty = types::heaptype(items.get(*pos), span)?;
                *pos += 1;
                Immediate::RefType(ty)
            }
            ImmKind::Select => {
                let mut results = Vec::new();
                while let Some(list) = items.get(*pos).and_then(SExpr::as_list) {
                    if list.head_keyword() != Some("result") {
                        break;
                    }
                    for t in list.tail() {
                        results.push(types::valtype(t, self.res.config())?);
                    }
                    *pos += 1;
                }
                Immediate::Select(results)
            }
        };
        Ok(imm)
    }
}

fn take_label<'a>(items: &'a [SExpr], pos: &mut usize) -> Option<&'a str> {
    let name = items.get(*pos).and_then(SExpr::as_id)?;
    *pos += 1;
    Some(name)
}

/// The optional label repeated after `else` or `end`, which must name the
/// block being closed.
fn closing_label(items: &[SExpr], pos: &mut usize, label: Option<&str>) -> Result<(), ParseError> {
    if let Some(item) = items.get(*pos) {
        if let Some(name) = item.as_id() {
            if label != Some(name) {
                return Err(ParseError::structural(format!("mismatching label ${}", name), item.span()));
            }
            *pos += 1;
        }
    }
    Ok(())
}

fn next_atom<'a>(items: &'a [SExpr], pos: &mut usize, what: &str, span: Span) -> Result<&'a Token, ParseError> {
    match items.get(*pos) {
        Some(SExpr::Atom(token)) => {
            *pos += 1;
            Ok(token)
        }
        Some(other) => Err(ParseError::expected(what, &other.describe(), other.span())),
        None => Err(ParseError::expected(what, "end of list", span)),
    }
}

fn integer<'a>(items: &'a [SExpr], pos: &mut usize, span: Span) -> Result<(&'a IntLit, Span), ParseError> {
    let token = next_atom(items, pos, "an integer", span)?;
    match &token.kind {
        TokenKind::Integer(lit) => Ok((lit, token.span)),
        other => Err(ParseError::expected("an integer", &other.describe(), token.span)),
    }
}

/// A numeric operand of a float or vector constant.
fn number<'a>(items: &'a [SExpr], pos: &mut usize, span: Span) -> Result<&'a Token, ParseError> {
    let token = next_atom(items, pos, "a number", span)?;
    match &token.kind {
        TokenKind::Keyword(kw) if kw.starts_with("nan:") => Err(nan_pattern(token.span)),
        _ => Ok(token),
    }
}

fn lane_index(items: &[SExpr], pos: &mut usize, span: Span) -> Result<u8, ParseError> {
    let (lit, span) = integer(items, pos, span)?;
    let value = literal::to_u32(lit, span)?;
    u8::try_from(value).map_err(|_| ParseError::structural("constant out of range", span))
}

/// Reads `offset=N` then `align=N`, both optional. Alignment is stored as
/// its log2.
fn memarg(items: &[SExpr], pos: &mut usize, natural: u32) -> Result<MemArg, ParseError> {
    let mut arg = MemArg { align: natural, offset: 0 };
    if let Some((value, span)) = memarg_field(items, pos, "offset=")? {
        arg.offset = u32::try_from(value).map_err(|_| ParseError::structural("constant out of range", span))?;
    }
    if let Some((value, span)) = memarg_field(items, pos, "align=")? {
        if !value.is_power_of_two() || value > u64::from(u32::MAX) {
            return Err(ParseError::structural("alignment must be a power of two", span));
        }
        arg.align = value.trailing_zeros();
    }
    Ok(arg)
}

fn memarg_field(items: &[SExpr], pos: &mut usize, prefix: &str) -> Result<Option<(u64, Span)>, ParseError> {
    let Some(token) = items.get(*pos).and_then(SExpr::as_atom) else {
        return Ok(None);
    };
    let TokenKind::Reserved(word) = &token.kind else {
        return Ok(None);
    };
    let Some(text) = word.strip_prefix(prefix) else {
        return Ok(None);
    };
    *pos += 1;
    Ok(Some((literal::memarg_value(text, token.span)?, token.span)))
}

fn v128_const(items: &[SExpr], pos: &mut usize, span: Span) -> Result<[u8; 16], ParseError> {
    let shape = match items.get(*pos) {
        Some(item) => item
            .as_keyword()
            .and_then(V128Shape::from_keyword)
            .ok_or_else(|| ParseError::expected("vector shape", &item.describe(), item.span()))?,
        None => return Err(ParseError::expected("vector shape", "end of list", span)),
    };
    *pos += 1;

    let mut bytes = [0u8; 16];
    for lane in 0..shape.lanes() {
        let token = number(items, pos, span)?;
        let bits = shape.lane_bits(&token.kind, token.span)?;
        shape.write_lane(&mut bytes, lane, bits);
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::wat::error::ErrorKind;
    use crate::wat::sexpr::read;

    /// Flattens the items of `(body ...)` with functions `$f` and `$g` bound.
    fn flatten_with(source: &str, config: Config) -> Result<Vec<Instruction>, ParseError> {
        let sexpr = read(source).unwrap();
        let list = sexpr.as_list().unwrap();
        let mut res = Resolver::new(config);
        res.declare(Namespace::Func, Some("f"), Span::ZERO).unwrap();
        res.declare(Namespace::Func, Some("g"), Span::ZERO).unwrap();
        res.declare(Namespace::Local, Some("x"), Span::ZERO).unwrap();
        parse_expr(&mut res, list.tail())
    }

    fn flatten(source: &str) -> Result<Vec<Instruction>, ParseError> {
        flatten_with(source, Config::default())
    }

    fn names(instrs: &[Instruction]) -> Vec<&'static str> {
        instrs.iter().map(Instruction::name).collect()
    }

    #[test]
    fn folded_matches_plain() {
        let folded = flatten("(body (i32.add (i32.const 1) (i32.const 2)))").unwrap();
        let plain = flatten("(body i32.const 1 i32.const 2 i32.add)").unwrap();
        assert_eq!(names(&folded), ["i32.const", "i32.const", "i32.add"]);
        let imms = |v: &[Instruction]| v.iter().map(|i| i.imm.clone()).collect::<Vec<_>>();
        assert_eq!(imms(&folded), imms(&plain));
    }

    #[test]
    fn operands_flatten_left_to_right() {
        let instrs = flatten("(body (call $g (local.get $x) (call $f (i32.const 7))))").unwrap();
        assert_eq!(names(&instrs), ["local.get", "i32.const", "call", "call"]);
        assert_eq!(instrs[2].imm, Immediate::Index(0));
        assert_eq!(instrs[3].imm, Immediate::Index(1));
    }

    #[test]
    fn folded_if_puts_condition_first() {
        let instrs = flatten("(body (if (result i32) (local.get 0) (then (i32.const 1)) (else (i32.const 2))))").unwrap();
        assert_eq!(names(&instrs), ["local.get", "if", "i32.const", "else", "i32.const", "end"]);
        assert_eq!(
            instrs[1].imm,
            Immediate::If {
                ty: BlockType::Value(crate::ast::ValType::I32),
                else_at: Some(3),
                end: 5,
            }
        );
    }

    #[test]
    fn plain_if_else() {
        let instrs = flatten("(body local.get 0 if $l nop else $l nop end $l)").unwrap();
        assert_eq!(names(&instrs), ["local.get", "if", "nop", "else", "nop", "end"]);
        assert!(matches!(instrs[1].imm, Immediate::If { else_at: Some(3), end: 5, .. }));
    }

    #[test]
    fn label_depths() {
        let instrs = flatten("(body (block $L (br $L)))").unwrap();
        assert_eq!(instrs[1].imm, Immediate::Label(0));

        let instrs = flatten("(body (block $L (block (br $L) (br 0))))").unwrap();
        assert_eq!(instrs[2].imm, Immediate::Label(1));
        assert_eq!(instrs[3].imm, Immediate::Label(0));
    }

    #[test]
    fn block_headers_point_at_end() {
        let instrs = flatten("(body block loop nop end end)").unwrap();
        assert_eq!(instrs[0].imm, Immediate::Block { ty: BlockType::Empty, end: 4 });
        assert_eq!(instrs[1].imm, Immediate::Block { ty: BlockType::Empty, end: 3 });
    }

    #[test]
    fn br_table_default_is_last() {
        let instrs = flatten("(body (block $a (block $b (br_table $a $b 0 (local.get 0)))))").unwrap();
        assert_eq!(
            instrs[3].imm,
            Immediate::BrTable {
                targets: vec![1, 0],
                default: 0,
            }
        );
    }

    #[test]
    fn memargs() {
        let instrs = flatten("(body i32.load offset=16 align=2 i64.store8 i32.load offset=0x10)").unwrap();
        assert_eq!(instrs[0].imm, Immediate::Memory(MemArg { align: 1, offset: 16 }));
        assert_eq!(instrs[1].imm, Immediate::Memory(MemArg { align: 0, offset: 0 }));
        assert_eq!(instrs[2].imm, Immediate::Memory(MemArg { align: 2, offset: 16 }));

        let err = flatten("(body i32.load align=3)").unwrap_err();
        assert_eq!(err.message, "alignment must be a power of two");
    }

    #[test]
    fn multi_value_block_types_are_interned() {
        let sexpr = read("(body (block (param i32) (result i32 i32) (i32.const 1)))").unwrap();
        let mut res = Resolver::new(Config::default());
        let instrs = parse_expr(&mut res, sexpr.as_list().unwrap().tail()).unwrap();
        assert_eq!(instrs[0].imm, Immediate::Block { ty: BlockType::Type(0), end: 2 });
        assert_eq!(res.type_at(0).unwrap().results.len(), 2);
    }

    #[test]
    fn v128_and_shuffle() {
        let instrs = flatten("(body v128.const i32x4 1 2 3 -1)").unwrap();
        let Immediate::V128(bytes) = instrs[0].imm else { panic!() };
        assert_eq!(&bytes[..4], &[1, 0, 0, 0]);
        assert_eq!(&bytes[12..], &[0xff; 4]);

        let lanes = (0..16).map(|i| i.to_string()).collect::<Vec<_>>().join(" ");
        let instrs = flatten(&format!("(body i8x16.shuffle {})", lanes)).unwrap();
        assert!(matches!(instrs[0].imm, Immediate::Shuffle(l) if l[15] == 15));
    }

    #[test]
    fn structural_errors() {
        for source in [
            "(body block nop)",
            "(body nop end)",
            "(body else)",
            "(body (if (i32.const 1)))",
            "(body block $a end $b)",
            "(body (then nop))",
            "(body (i32.add 1))",
            "(body offset=4)",
        ] {
            let err = flatten(source).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Structural, "{}", source);
        }
    }

    #[test]
    fn nan_patterns_rejected_in_code() {
        let err = flatten("(body f32.const nan:canonical)").unwrap_err();
        assert_eq!(err.message, "NaN patterns are only allowed in expected results");
        assert!(flatten("(body f32.const nan:0x200000)").is_ok());
    }

    #[test]
    fn simd_can_be_disabled() {
        assert!(flatten_with("(body i8x16.splat)", Config::new().simd(false)).is_err());
        assert!(flatten("(body (i32x4.splat (i32.const 0)))").is_ok());
    }

    #[test]
    fn unknown_names_are_resolution_errors() {
        let err = flatten("(body call $missing)").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Resolution);
        let err = flatten("(body br $nowhere)").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Resolution);
    }
}
