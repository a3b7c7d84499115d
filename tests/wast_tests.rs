#[cfg(test)]
mod tests {
    use kasm_text::ast::Module;
    use kasm_text::wast::{
        check_assert_return, match_results, parse_script, Action, BinaryDecoder, Directive, Expected, Mismatch,
        ModuleSource, NanPattern, Value,
    };
    use kasm_text::ErrorKind;
    use rstest::rstest;

    const SCRIPT: &str = r#"
        (module $math
          (func (export "add") (param i32 i32) (result i32)
            (i32.add (local.get 0) (local.get 1)))
          (func (export "nan") (result f32) (f32.const nan))
          (global (export "g") i32 (i32.const 7)))
        (register "math" $math)
        (assert_return (invoke "add" (i32.const 1) (i32.const 2)) (i32.const 3))
        (assert_return (invoke "nan") (f32.const nan:canonical))
        (assert_return (get "g") (i32.const 7))
        (assert_trap (invoke "add" (i32.const 0)) "type mismatch")
        (assert_exhaustion (invoke $math "add") "call stack exhausted")
        (module binary "\00asm" "\01\00\00\00")
        (assert_invalid (module (func (result i32))) "type mismatch")
        (assert_malformed (module quote "(func (i32.const))") "unexpected token")
        (assert_unlinkable (module (import "math" "missing" (func))) "unknown import")
    "#;

    #[test]
    fn directives_come_back_in_source_order() {
        let script = parse_script(SCRIPT).unwrap();
        let keywords: Vec<_> = script.directives.iter().map(Directive::keyword).collect();
        assert_eq!(
            keywords,
            [
                "module",
                "register",
                "assert_return",
                "assert_return",
                "assert_return",
                "assert_trap",
                "assert_exhaustion",
                "module",
                "assert_invalid",
                "assert_malformed",
                "assert_unlinkable",
            ]
        );
        assert_eq!(script.modules().count(), 2);
    }

    #[test]
    fn actions_refer_to_modules_by_position() {
        let script = parse_script(SCRIPT).unwrap();
        let modules: Vec<_> = script
            .directives
            .iter()
            .filter_map(|d| match d {
                Directive::AssertReturn { action, .. }
                | Directive::AssertTrap { action, .. }
                | Directive::AssertExhaustion { action, .. } => Some(action),
                _ => None,
            })
            .map(|a| match a {
                Action::Invoke { module, .. } | Action::Get { module, .. } => *module,
            })
            .collect();
        assert_eq!(modules, [0, 0, 0, 0, 0]);
    }

    #[rstest]
    #[case(r#"(module) (invoke "f" (f32.const nan:canonical))"#)]
    #[case(r#"(module) (assert_trap (invoke "f" (f64.const nan:arithmetic)) "x")"#)]
    #[case(r#"(module) (invoke "f" (v128.const f32x4 nan:canonical 0 0 0))"#)]
    fn nan_patterns_only_in_expected_results(#[case] source: &str) {
        let err = parse_script(source).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Structural);
    }

    #[test]
    fn oracle_sees_each_assert_return() {
        let script = parse_script(SCRIPT).unwrap();
        let mut seen = Vec::new();
        let mut oracle = |actual: &[Value], expected: &[Expected]| -> Result<(), Mismatch> {
            seen.push(expected.to_vec());
            match_results(actual, expected)
        };

        let results: Vec<_> = script
            .directives
            .iter()
            .filter_map(|d| check_assert_return(d, &[Value::F32(0x7fc0_0000)], &mut oracle))
            .collect();

        assert_eq!(results.len(), 3);
        assert!(results[0].is_err());
        assert_eq!(results[1], Ok(()));
        assert_eq!(seen[1], [Expected::F32Nan(NanPattern::Canonical)]);
    }

    struct MagicOnly;

    impl BinaryDecoder for MagicOnly {
        type Module = u32;
        type Error = String;

        fn decode(&self, bytes: &[u8]) -> Result<u32, String> {
            match bytes {
                [0, b'a', b's', b'm', v0, v1, v2, v3] => Ok(u32::from_le_bytes([*v0, *v1, *v2, *v3])),
                _ => Err("bad magic".to_string()),
            }
        }
    }

    #[test]
    fn binary_modules_go_to_the_decoder() {
        let script = parse_script(SCRIPT).unwrap();
        let binary = script
            .modules()
            .find_map(|d| match d {
                Directive::Module { index: 1, source, .. } => Some(source),
                _ => None,
            })
            .unwrap();
        assert_eq!(binary.decode(&MagicOnly), Some(Ok(1)));
        assert!(binary.module().is_none());

        let text = ModuleSource::Text(Box::new(Module::default()));
        assert_eq!(text.decode(&MagicOnly), None);
    }

    #[test]
    fn quoted_modules_parse_on_request() {
        let script = parse_script(SCRIPT).unwrap();
        let quoted = script
            .directives
            .iter()
            .find_map(|d| match d {
                Directive::AssertMalformed { module, .. } => Some(module),
                _ => None,
            })
            .unwrap();
        let err = quoted.parse_quote().unwrap().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Structural);
    }

    #[test]
    fn assertion_modules_are_not_numbered() {
        let script = parse_script(
            r#"
            (assert_invalid (module (func (call 5))) "unknown function")
            (module $only)
            (get "g")
            "#,
        )
        .unwrap();
        let Directive::Action { action: Action::Get { module, .. }, .. } = &script.directives[2] else {
            panic!("expected get");
        };
        assert_eq!(*module, 0);
    }

    #[test]
    fn scripts_serialize_to_json() {
        let script = parse_script(r#"(module binary "\00asm") (assert_return (invoke "f" (i64.const -1)))"#).unwrap();
        let json = serde_json::to_value(&script).unwrap();
        let directives = json["directives"].as_array().unwrap();
        assert_eq!(directives[0]["Module"]["source"]["Binary"], "AGFzbQ==");
        assert_eq!(
            directives[1]["AssertReturn"]["action"]["Invoke"]["args"][0]["I64"],
            -1
        );
    }

    #[test]
    fn errors_report_position() {
        let err = parse_script("(module)\n  (assert_return (invoke $nope \"f\"))").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Resolution);
        assert_eq!(err.to_string(), "2:18: unknown module $nope");
    }
}
