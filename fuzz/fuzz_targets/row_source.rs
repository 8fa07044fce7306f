#![no_main]

use csvtally::config::CsvTallyConfig;
use csvtally::config::ErrorReportStyle;
use csvtally::{analyze_rows, RowSource};
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let Ok(source) = RowSource::from_reader("fuzz", Box::new(Cursor::new(data.to_vec())), b',')
    else {
        return;
    };

    let mut config = CsvTallyConfig::default();
    config.performance.threads = 2;
    config.performance.batch_size = Some(4);
    config.processing.error_report.style = ErrorReportStyle::Off;

    if let Ok(outcome) = analyze_rows(source, &config) {
        let labelled: u64 = outcome.report.labels.values().sum();
        assert_eq!(labelled, outcome.report.count);
    }
});
