//! Property tests for the macro-clock timeout compression: a decoded timeout
//! must never be shorter than the value that was encoded.

use opentherm_rs::{decode_mclk_timeout, encode_mclk_timeout};
use proptest::prelude::*;

#[test]
fn small_values_encode_exactly() {
    for x in 1..=256u32 {
        assert_eq!(decode_mclk_timeout(encode_mclk_timeout(x)), x);
    }
}

#[test]
fn known_encodings() {
    assert_eq!(encode_mclk_timeout(100), 0x0063);
    assert_eq!(decode_mclk_timeout(0x0063), 100);
    // 1000 is not representable; the encoder rounds up to 1001
    assert_eq!(encode_mclk_timeout(1000), 0x02FA);
    assert_eq!(decode_mclk_timeout(0x02FA), 1001);
}

#[test]
fn mantissa_scales_by_power_of_two() {
    // (250 << 2) + 1
    assert_eq!(decode_mclk_timeout(0x02FA), 1001);
    // (16 << 8) + 1
    assert_eq!(decode_mclk_timeout(0x0810), 4097);
    // Zero mantissa decodes to the minimum representable tick count
    assert_eq!(decode_mclk_timeout(0x0500), 1);
}

#[test]
fn saturates_at_u32_max() {
    assert_eq!(decode_mclk_timeout(encode_mclk_timeout(u32::MAX)), u32::MAX);
}

proptest! {
    #[test]
    fn decode_never_undercuts_encode(x in 0u32..=u32::MAX) {
        let decoded = decode_mclk_timeout(encode_mclk_timeout(x));
        prop_assert!(decoded >= x, "decoded {decoded} < requested {x}");
    }

    #[test]
    fn rounding_loss_is_bounded_by_one_mantissa_step(x in 1u32..=100_000_000u32) {
        let encoded = encode_mclk_timeout(x);
        let decoded = decode_mclk_timeout(encoded);
        let exponent = (encoded >> 8) as u32;
        // The encoder rounds up at most one mantissa step per shift
        prop_assert!(decoded - x <= (1u32 << exponent));
    }
}
