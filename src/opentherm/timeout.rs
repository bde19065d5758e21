//! Macro-clock timeout compression.
//!
//! Remote-parameter timeout fields carry a macro-clock tick count compressed
//! into one byte pair: the high byte is a binary exponent, the low byte a
//! mantissa, and the represented value is `(mantissa << exponent) + 1` ticks.
//! The encoding is lossy; the encoder rounds the mantissa up on every shift so
//! a decoded timeout is never shorter than the requested one.

/// Expand an exponent/mantissa byte pair into macro-clock ticks.
///
/// Saturates at `u32::MAX`; encodings near the top of the range can expand
/// past 32 bits.
pub fn decode_mclk_timeout(encoded: u16) -> u32 {
    let exponent = (encoded >> 8) as u32;
    let mantissa = (encoded & 0xFF) as u64;
    if mantissa != 0 && exponent > 32 {
        return u32::MAX;
    }
    ((mantissa << exponent.min(32)) + 1).min(u32::MAX as u64) as u32
}

/// Compress a macro-clock tick count into an exponent/mantissa byte pair.
///
/// Guarantees `decode_mclk_timeout(encode_mclk_timeout(x)) >= x` for every
/// `x`; the result is the smallest representable value satisfying that bound.
pub fn encode_mclk_timeout(mclk: u32) -> u16 {
    let mut exponent: u16 = 0;
    let mut mantissa = mclk.saturating_sub(1);
    while mantissa > 0xFF {
        // Round up so halving never drops below the requested magnitude
        mantissa = mantissa.div_ceil(2);
        exponent += 1;
    }
    (exponent << 8) | mantissa as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_values_are_exact() {
        assert_eq!(encode_mclk_timeout(100), 0x0063);
        assert_eq!(decode_mclk_timeout(0x0063), 100);
    }

    #[test]
    fn zero_and_one() {
        assert_eq!(decode_mclk_timeout(encode_mclk_timeout(0)), 1);
        assert_eq!(decode_mclk_timeout(encode_mclk_timeout(1)), 1);
    }

    #[test]
    fn large_values_round_up() {
        let encoded = encode_mclk_timeout(1000);
        assert_eq!(encoded, 0x02FA);
        assert_eq!(decode_mclk_timeout(encoded), 1001);
    }

    #[test]
    fn never_decodes_short() {
        for x in [2u32, 255, 256, 257, 511, 65_535, 1_000_000, u32::MAX] {
            assert!(decode_mclk_timeout(encode_mclk_timeout(x)) >= x);
        }
    }
}
