#![no_main]

use libfuzzer_sys::fuzz_target;
use unftp_xfer::server::commands::{parse_offset, parse_type};

fuzz_target!(|data: &[u8]| {
    if let Ok(arg) = std::str::from_utf8(data) {
        if let Ok(offset) = parse_offset(arg) {
            assert_eq!(arg.trim().trim_start_matches('+').parse::<u64>().ok(), Some(offset));
        }
        let _ = parse_type(arg);
    }
});
