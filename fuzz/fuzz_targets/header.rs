#![no_main]
use libfuzzer_sys::fuzz_target;

use wpress_core::{is_eof, Header};

fuzz_target!(|data: &[u8]| {
    let header = match Header::parse(data) {
        Ok(header) => header,
        Err(_) => return,
    };

    match header.entry() {
        Ok(entry) => {
            assert!(!is_eof(data), "decoded the end of archive block");
            // Re-encoding may overflow a field but must not panic
            let _ = entry.header();
        }
        Err(_) => (),
    }
});
