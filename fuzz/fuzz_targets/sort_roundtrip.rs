#![no_main]
use libfuzzer_sys::fuzz_target;
use xmlsort::{format_str, SortConfig};

const CONFIG: &str = r##"{
  "relevantKeys": {
    "a": "name",
    "b": { "by": "#text", "order": "desc", "numeric": true, "attributes": "alphabetical" },
    "root": ["b", "a"]
  },
  "nonSortKeys": ["c"]
}"##;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(config) = SortConfig::from_json_str(CONFIG) else {
        return;
    };
    if let Ok(once) = format_str(s, &config) {
        let twice = format_str(&once, &config).expect("formatted output must parse");
        assert_eq!(once, twice, "formatting is not idempotent");
    }
});
