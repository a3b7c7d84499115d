#![no_main]

use libfuzzer_sys::fuzz_target;

use kasm_text::{wat, Config};

fuzz_target!(|data: &[u8]| {
    let _ = wat::parse_module_with(data, &Config::default());
});
