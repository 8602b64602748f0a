#![no_main]

use libfuzzer_sys::fuzz_target;
use nativescope::analysis::analyze_mem;

fuzz_target!(|data: &[u8]| {
    let _ = analyze_mem("fuzz", data.to_vec());
});
