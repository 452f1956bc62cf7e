#![no_main]
use libfuzzer_sys::fuzz_target;
use spdx_inventory::parsers::SpdxJsonParser;

/// Fuzz the SPDX JSON parser directly.
///
/// Wraps input in an SPDX JSON envelope to reach the element
/// deserializers rather than failing on the document header.
fuzz_target!(|data: &[u8]| {
    let parser = SpdxJsonParser::new();
    let _ = parser.parse_bytes(data);

    if let Ok(s) = std::str::from_utf8(data)
        && s.len() < 10_000
    {
        let wrapped = format!(
            r#"{{"spdxVersion":"SPDX-2.3","SPDXID":"SPDXRef-DOCUMENT","name":"fuzz",
                "documentNamespace":"https://example.com/fuzz","packages":[{s}]}}"#,
        );
        let _ = parser.parse_str(&wrapped);
    }
});
