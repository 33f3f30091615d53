#![no_main]

use gitty_git::parse_commit_block;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let block = String::from_utf8_lossy(data);
    if let Ok(record) = parse_commit_block(&block) {
        assert!(!record.id.as_str().is_empty());
        let _ = record.author_date();
    }
});
