#![no_main]

use libfuzzer_sys::fuzz_target;

use kasm_text::wast::parse_script_with;
use kasm_text::Config;

fuzz_target!(|data: &[u8]| {
    if let Ok(script) = parse_script_with(data, &Config::default()) {
        for directive in &script.directives {
            if let kasm_text::wast::Directive::AssertMalformed { module, .. } = directive {
                let _ = module.parse_quote();
            }
        }
    }
});
