#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = dustspec::loader::read_sol_file(data, "fuzz");

    // Raw ingestion goes through the LTST label and UTC parsers.
    if let Ok(rows) = dustspec::loader::ingest_raw(data, "fuzz") {
        let mut sink = Vec::new();
        let _ = dustspec::loader::write_sol_file(&mut sink, &rows);
    }
});
