#![no_main]

use libfuzzer_sys::fuzz_target;

use kasm_text::wat::Lexer;

fuzz_target!(|data: &[u8]| {
    // Raw bytes: non-ASCII outside strings is a lexical error.
    let mut tokens = Lexer::from_bytes(data);
    for result in tokens.by_ref() {
        if result.is_err() {
            break;
        }
    }
    // Fused after an error or end of input.
    assert!(tokens.next().is_none());
});
