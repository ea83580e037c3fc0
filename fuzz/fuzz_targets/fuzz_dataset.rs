//! Fuzz target for the JSON dataset format.

#![no_main]

use libfuzzer_sys::fuzz_target;
use ql_core::TrialDataset;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(dataset) = TrialDataset::from_json(text) {
        assert_eq!(dataset.len(), dataset.num_subjects() * dataset.num_trials());
        let again = TrialDataset::from_arrays(&dataset.to_arrays()).expect("re-validates");
        assert_eq!(dataset, again);
    }
});
