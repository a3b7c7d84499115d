#[cfg(test)]
mod tests {
    use kasm_text::ast::{BlockType, ExternKind, FuncType, ImportDesc, Immediate, Instruction, ValType};
    use kasm_text::wat::{self, ErrorKind, Lexer, TokenKind};
    use kasm_text::{Config, ParseError};
    use proptest::prelude::*;
    use rstest::rstest;

    fn body(source: &str) -> Vec<Instruction> {
        let module = wat::parse_module(source).unwrap();
        module.funcs.into_iter().next().expect("one function").body
    }

    fn shape(instrs: &[Instruction]) -> Vec<(&'static str, Immediate)> {
        instrs.iter().map(|i| (i.name(), i.imm.clone())).collect()
    }

    fn error(source: &str) -> ParseError {
        wat::parse_module(source).unwrap_err()
    }

    #[test]
    fn folded_and_plain_bodies_agree() {
        let folded = body(
            "(module (func (param i32) (result i32)
                (i32.add (i32.mul (local.get 0) (i32.const 2)) (i32.const 1))))",
        );
        let plain = body(
            "(module (func (param i32) (result i32)
                local.get 0 i32.const 2 i32.mul i32.const 1 i32.add))",
        );
        assert_eq!(shape(&folded), shape(&plain));
        assert_eq!(folded.len(), 5);
    }

    #[test]
    fn nested_block_label_depths() {
        let instrs = body(
            "(module (func
                (block $outer
                  (loop $inner
                    (br $outer)
                    (br $inner)
                    (br 1)))))",
        );
        let labels: Vec<_> = instrs
            .iter()
            .filter_map(|i| match i.imm {
                Immediate::Label(depth) => Some(depth),
                _ => None,
            })
            .collect();
        assert_eq!(labels, [1, 0, 1]);
    }

    #[test]
    fn block_headers_locate_their_end() {
        let instrs = body(
            "(module (func (result i32)
                (if (result i32) (i32.const 1)
                  (then (i32.const 2))
                  (else (i32.const 3)))))",
        );
        let Immediate::If { ty, else_at, end } = instrs[1].imm.clone() else {
            panic!("expected if header, got {:?}", instrs[1]);
        };
        assert_eq!(ty, BlockType::Value(ValType::I32));
        assert_eq!(instrs[else_at.unwrap() as usize].name(), "else");
        assert_eq!(instrs[end as usize].name(), "end");
        assert_eq!(end as usize, instrs.len() - 1);
    }

    #[test]
    fn duplicate_function_names() {
        let err = error("(module (func $f) (func $f))");
        assert_eq!(err.kind, ErrorKind::Resolution);
        assert_eq!(err.to_string(), "1:19: duplicate function $f");
    }

    #[rstest]
    #[case("(module (func (call $missing)))", "unknown function $missing")]
    #[case("(module (func (local.get $x)))", "unknown local $x")]
    #[case("(module (global $g i32 (i32.const 0)) (func (local.get $g)))", "namespace mismatch: $g is a global, not a local")]
    fn unresolved_names(#[case] source: &str, #[case] message: &str) {
        let err = error(source);
        assert_eq!(err.kind, ErrorKind::Resolution);
        assert_eq!(err.message, message);
    }

    #[test]
    fn hex_float_constant() {
        let instrs = body("(module (func (result f64) f64.const 0x1.8p1))");
        assert_eq!(instrs[0].imm, Immediate::F64(3.0f64.to_bits()));
    }

    #[rstest]
    #[case("1__000")]
    #[case("1_")]
    #[case("0x_1")]
    fn misplaced_underscores(#[case] literal: &str) {
        let err = error(&format!("(module (func i32.const {} drop))", literal));
        assert_eq!(err.kind, ErrorKind::Lexical, "{}", literal);
    }

    #[rstest]
    #[case("i32.const 4294967296")]
    #[case("i32.const -2147483649")]
    #[case("f32.const 1e40")]
    fn constants_out_of_range(#[case] instr: &str) {
        let err = error(&format!("(module (func {} drop))", instr));
        assert_eq!(err.kind, ErrorKind::Structural);
        assert_eq!(err.message, "constant out of range");
    }

    #[test]
    fn unclosed_comment_is_one_lexical_error() {
        let results: Vec<_> = Lexer::new("(module (; never closed").collect();
        let errors: Vec<_> = results.iter().filter(|r| r.is_err()).collect();
        assert_eq!(errors.len(), 1);
        assert!(results.last().unwrap().is_err());
        assert_eq!(errors[0].as_ref().unwrap_err().kind, ErrorKind::Lexical);
    }

    #[test]
    fn keywords_and_reserved_words() {
        let kinds: Vec<_> = Lexer::new("i32.add offset=8 frobnicate")
            .map(|t| t.unwrap().kind)
            .collect();
        assert_eq!(
            kinds,
            [
                TokenKind::Keyword("i32.add".into()),
                TokenKind::Reserved("offset=8".into()),
                TokenKind::Reserved("frobnicate".into()),
            ]
        );
        let err = error("(module (func frobnicate))");
        assert_eq!(err.kind, ErrorKind::Structural);
    }

    #[test]
    fn imports_precede_definitions() {
        let module = wat::parse_module(
            r#"(module
                (import "env" "f" (func $imp (param i32)))
                (func $local (call $imp (i32.const 0))))"#,
        )
        .unwrap();
        assert_eq!(module.imported(ExternKind::Func), 1);
        assert_eq!(module.funcs[0].body[1].imm, Immediate::Index(0));

        let err = error(r#"(module (func) (import "env" "f" (func)))"#);
        assert_eq!(err.kind, ErrorKind::Structural);
        assert_eq!(err.message, "import after function");
    }

    #[test]
    fn inline_type_uses_are_interned_after_explicit_types() {
        let module = wat::parse_module(
            "(module
                (type $v (func))
                (func (param i32) (result i32) local.get 0)
                (func (param i32) (result i32) local.get 0)
                (func (type $v)))",
        )
        .unwrap();
        assert_eq!(
            module.types,
            [
                FuncType::default(),
                FuncType {
                    params: vec![ValType::I32],
                    results: vec![ValType::I32],
                },
            ]
        );
        let tys: Vec<_> = module.funcs.iter().map(|f| f.ty).collect();
        assert_eq!(tys, [1, 1, 0]);
    }

    #[test]
    fn inline_import_and_export_abbreviations() {
        let module = wat::parse_module(
            r#"(module
                (func $f (import "m" "f") (param i32))
                (memory (export "mem") (data "hi"))
                (func (export "g") (export "h")))"#,
        )
        .unwrap();
        assert!(matches!(module.imports[0].desc, ImportDesc::Func(_)));
        let exports: Vec<_> = module.exports.iter().map(|e| (e.name.as_str(), e.kind, e.index)).collect();
        assert_eq!(
            exports,
            [
                ("mem", ExternKind::Memory, 0),
                ("g", ExternKind::Func, 1),
                ("h", ExternKind::Func, 1),
            ]
        );
        assert_eq!(module.memories[0].limits.min, 1);
        assert_eq!(module.data[0].bytes, b"hi");
    }

    #[test]
    fn depth_limit() {
        let deep = format!("(module (func {}{}))", "(block ".repeat(100), ")".repeat(100));
        assert!(wat::parse_module_with(deep.as_bytes(), &Config::new().max_depth(64)).is_err());
        assert!(wat::parse_module_with(deep.as_bytes(), &Config::default()).is_ok());
    }

    #[test]
    fn parse_results_cross_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<kasm_text::ast::Module>();
        assert_send_sync::<ParseError>();

        let handle = std::thread::spawn(|| wat::parse_module("(module (func nop))"));
        assert!(handle.join().unwrap().is_ok());
    }

    proptest! {
        #[test]
        fn i32_constants_round_trip(n in any::<i32>()) {
            let instrs = body(&format!("(module (func i32.const {} drop))", n));
            prop_assert_eq!(instrs[0].imm.clone(), Immediate::I32(n));
        }

        #[test]
        fn atoms_keep_their_source_text(
            atoms in prop::collection::vec("[a-z][a-z0-9._]{0,8}|\\$[a-z]{1,5}|[0-9]{1,6}", 1..8)
        ) {
            let source = atoms.join(" ");
            let tokens: Vec<_> = Lexer::new(&source).collect::<Result<_, _>>().unwrap();
            let texts: Vec<_> = tokens.iter().map(|t| t.text(&source)).collect();
            prop_assert_eq!(texts, atoms.iter().map(String::as_str).collect::<Vec<_>>());
        }

        #[test]
        fn arbitrary_input_never_panics(source in "[()a-z0-9$\" ;.=_-]{0,64}") {
            let _ = wat::parse_module(&source);
        }
    }
}
