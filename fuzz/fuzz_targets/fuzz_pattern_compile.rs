#![no_main]
use docexec::Document;
use docexec::query::Matcher;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 8192 {
        return;
    }
    // Arbitrary bytes as a pattern: framing or compile errors are fine, panics are not.
    let Ok(pattern) = Document::borrowed(data) else { return };
    if let Ok(m) = Matcher::compile(&pattern) {
        let _ = m.matches(&pattern);
    }
});
