#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Malformed catalogs must come back as errors, never panics.
    if let Ok(catalog) = dustspec::catalog::EventCatalog::from_reader(data) {
        for entry in catalog.entries() {
            let _ = catalog.lookup(entry.id);
        }
        let _ = catalog.season_histogram();
        let _ = catalog.quiet_sols(dustspec::catalog::LAST_MISSION_SOL);
    }
});
