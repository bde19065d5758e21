#![no_main]

use libfuzzer_sys::fuzz_target;
use opentherm_rs::{decode_mclk_timeout, encode_mclk_timeout};

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    // Arbitrary wire encodings must decode without panicking
    let encoded = u16::from_be_bytes([data[0], data[1]]);
    let _ = decode_mclk_timeout(encoded);

    // Encoding never undershoots the requested timeout
    let mclk = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
    let encoded = encode_mclk_timeout(mclk);
    assert!(decode_mclk_timeout(encoded) >= mclk.max(1));
});
