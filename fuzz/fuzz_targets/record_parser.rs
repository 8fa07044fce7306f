#![no_main]

use csvtally::parse_record;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Parsing errors are fine; we only care about panics.
        let fields: Vec<&str> = input.split(',').collect();
        if let Ok(record) = parse_record(&fields) {
            assert!(record.value.is_finite());
        }
    }
});
