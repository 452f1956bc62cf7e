#![no_main]
use libfuzzer_sys::fuzz_target;
use spdx_inventory::document::LicenseExpression;
use spdx_inventory::import::is_combined;

fuzz_target!(|data: &str| {
    if let Ok(expr) = LicenseExpression::parse(data) {
        let _ = expr.leaves();
        let _ = expr.to_string();
    }
    let _ = is_combined(data);
});
