#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Decoding never grows the input
    let decoded = querylog::utils::percent_decode(data);
    assert!(decoded.len() <= data.len());
    let _ = querylog::utils::percent_decode_lossy(data);
});
