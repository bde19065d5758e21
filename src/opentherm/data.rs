//! Payload unit conversions for the 16-bit data value field.
//!
//! Most analogue items travel as f8.8 signed fixed point (value/256). The
//! Status item (id 0) carries the master flags in the high byte and the slave
//! flags in the low byte.

use bitflags::bitflags;

bitflags! {
    /// Master status flags, high byte of the Status data value
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
    pub struct MasterStatus: u8 {
        const CH_ENABLE      = 0x01;
        const DHW_ENABLE     = 0x02;
        const COOLING_ENABLE = 0x04;
        const OTC_ENABLE     = 0x08;
        const CH2_ENABLE     = 0x10;
    }
}

bitflags! {
    /// Slave status flags, low byte of the Status data value
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
    pub struct SlaveStatus: u8 {
        const FAULT          = 0x01;
        const CH_ACTIVE      = 0x02;
        const DHW_ACTIVE     = 0x04;
        const FLAME_ON       = 0x08;
        const COOLING_ACTIVE = 0x10;
        const CH2_ACTIVE     = 0x20;
        const DIAGNOSTIC     = 0x40;
    }
}

/// Decode an f8.8 fixed-point data value (two's complement, /256)
pub fn f88_to_float(data: u16) -> f32 {
    if data & 0x8000 != 0 {
        -((0x10000u32 - data as u32) as f32) / 256.0
    } else {
        data as f32 / 256.0
    }
}

/// Encode an `f32` as f8.8 fixed point (two's complement, *256)
pub fn float_to_f88(value: f32) -> u16 {
    (value * 256.0) as i32 as u16
}

/// Encode a temperature setpoint as f8.8, clamped to the 0..=100 °C range the
/// protocol defines for setpoint writes
pub fn temperature_to_f88(temperature: f32) -> u16 {
    let clamped = temperature.clamp(0.0, 100.0);
    (clamped * 256.0) as u16
}

/// Compose the Status (id 0) data value from the master flags. The slave byte
/// is sent as zero and filled in by the slave's READ-ACK.
pub fn status_data(master: MasterStatus) -> u16 {
    (master.bits() as u16) << 8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn f88_positive() {
        assert_eq!(f88_to_float(0x2800), 40.0);
        assert_eq!(f88_to_float(0x0180), 1.5);
    }

    #[test]
    fn f88_negative() {
        assert_eq!(f88_to_float(0xFF80), -0.5);
        assert_eq!(f88_to_float(0xF600), -10.0);
    }

    #[test]
    fn f88_roundtrip() {
        for v in [-40.0f32, -0.25, 0.0, 21.5, 90.75] {
            assert_eq!(f88_to_float(float_to_f88(v)), v);
        }
    }

    #[test]
    fn temperature_clamps() {
        assert_eq!(temperature_to_f88(-5.0), 0);
        assert_eq!(temperature_to_f88(150.0), 100 * 256);
        assert_eq!(temperature_to_f88(55.5), 0x3780);
    }

    #[test]
    fn status_byte_layout() {
        let master = MasterStatus::CH_ENABLE | MasterStatus::DHW_ENABLE;
        assert_eq!(status_data(master), 0x0300);
    }
}
