#![no_main]

use gitty_git::ReferenceSet;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let listing = String::from_utf8_lossy(data);
    let set = ReferenceSet::parse_listing(&listing);
    std::hint::black_box(set.len());
});
