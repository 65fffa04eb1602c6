#![no_main]
use libfuzzer_sys::fuzz_target;

use kover_report::coverage::file_coverage;
use kover_report::model::CounterKind;

fuzz_target!(|data: &[u8]| {
    // Matching must not panic for any parsed report and path list.
    let Some(split) = data.iter().position(|&b| b == 0) else {
        return;
    };
    let (xml, paths) = data.split_at(split);
    if let (Ok(report), Ok(paths)) = (
        kover_report::parsers::jacoco::parse(xml),
        std::str::from_utf8(&paths[1..]),
    ) {
        let changed = kover_report::changed::parse_path_list(paths);
        let result = file_coverage(&report, &changed, &CounterKind::Line);
        assert!(result.percentage >= 0.0 && result.percentage <= 100.0);
    }
});
