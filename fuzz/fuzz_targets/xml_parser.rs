#![no_main]
use libfuzzer_sys::fuzz_target;
use xmlsort::XmlParser;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = XmlParser::new(s).parse();
    }
});
