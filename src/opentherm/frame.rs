//! # OpenTherm Frame Codec
//!
//! This module builds and parses the 32-bit OpenTherm frame word:
//!
//! ```text
//! Bit 31     : parity bit (odd parity over the full word)
//! Bits 30..28: message type
//! Bits 27..24: spare, always zero
//! Bits 23..16: data-item identifier
//! Bits 15..0 : data value
//! ```
//!
//! Frames are built by bit position and never mutated after construction.
//! `Frame::build` applies the parity fixup: bit 31 is set exactly when the
//! remaining 31 bits have an odd population count, so every well-formed frame
//! has an even total set-bit count.
//!
//! ## Usage
//!
//! ```rust
//! use opentherm_rs::opentherm::frame::Frame;
//! use opentherm_rs::opentherm::message::{DataId, MessageType};
//!
//! let request = Frame::build(MessageType::ReadData, DataId::Tboiler, 0);
//! assert!(request.is_valid_request());
//!
//! let response = Frame::build(MessageType::ReadAck, DataId::Tboiler, 0x2800);
//! assert!(response.is_valid_response());
//! assert_eq!(response.f88(), 40.0);
//! ```

use crate::constants::{
    OPENTHERM_DATA_ID_MASK, OPENTHERM_DATA_ID_SHIFT, OPENTHERM_DATA_VALUE_MASK,
    OPENTHERM_MSG_TYPE_MASK, OPENTHERM_MSG_TYPE_SHIFT, OPENTHERM_PARITY_BIT,
};
use crate::opentherm::data::{status_data, temperature_to_f88, MasterStatus, SlaveStatus};
use crate::opentherm::message::{DataId, MessageType};

/// A 32-bit OpenTherm frame
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    raw: u32,
}

/// Odd population count over the full word
fn odd_ones(raw: u32) -> bool {
    raw.count_ones() % 2 == 1
}

impl Frame {
    /// Build a frame with parity fixup applied
    pub fn build(msg_type: MessageType, data_id: DataId, data: u16) -> Frame {
        Frame::build_raw_id(msg_type, data_id as u8, data)
    }

    /// Build a frame for a data id outside the standard set
    pub fn build_raw_id(msg_type: MessageType, data_id: u8, data: u16) -> Frame {
        let mut raw = data as u32;
        raw |= ((msg_type as u32) & OPENTHERM_MSG_TYPE_MASK) << OPENTHERM_MSG_TYPE_SHIFT;
        raw |= (data_id as u32) << OPENTHERM_DATA_ID_SHIFT;
        if odd_ones(raw) {
            raw |= OPENTHERM_PARITY_BIT;
        }
        Frame { raw }
    }

    /// Wrap a raw 32-bit word without validation
    pub fn from_raw(raw: u32) -> Frame {
        Frame { raw }
    }

    /// The raw 32-bit word
    pub fn raw(self) -> u32 {
        self.raw
    }

    /// The 3-bit message type field
    pub fn msg_type(self) -> MessageType {
        MessageType::from_bits(
            ((self.raw >> OPENTHERM_MSG_TYPE_SHIFT) & OPENTHERM_MSG_TYPE_MASK) as u8,
        )
    }

    /// The 8-bit data-item identifier
    pub fn data_id_raw(self) -> u8 {
        ((self.raw >> OPENTHERM_DATA_ID_SHIFT) & OPENTHERM_DATA_ID_MASK) as u8
    }

    /// The data-item identifier, if it is in the standard set
    pub fn data_id(self) -> Option<DataId> {
        DataId::from_u8(self.data_id_raw())
    }

    /// The 16-bit data value field
    pub fn data_value(self) -> u16 {
        (self.raw & OPENTHERM_DATA_VALUE_MASK) as u16
    }

    /// Check the parity bit: a well-formed frame has an even total set-bit
    /// count
    pub fn has_valid_parity(self) -> bool {
        !odd_ones(self.raw)
    }

    /// A master accepts only READ-ACK / WRITE-ACK replies with good parity
    pub fn is_valid_response(self) -> bool {
        self.has_valid_parity()
            && matches!(self.msg_type(), MessageType::ReadAck | MessageType::WriteAck)
    }

    /// A slave accepts only READ-DATA / WRITE-DATA requests with good parity
    pub fn is_valid_request(self) -> bool {
        self.has_valid_parity()
            && matches!(
                self.msg_type(),
                MessageType::ReadData | MessageType::WriteData
            )
    }

    // ------------------------------------------------------------------
    // Payload views
    // ------------------------------------------------------------------

    /// The data value as f8.8 fixed point
    pub fn f88(self) -> f32 {
        crate::opentherm::data::f88_to_float(self.data_value())
    }

    /// The data value as a signed 16-bit quantity
    pub fn s16(self) -> i16 {
        self.data_value() as i16
    }

    /// High byte of the data value
    pub fn data_high_byte(self) -> u8 {
        (self.data_value() >> 8) as u8
    }

    /// Low byte of the data value
    pub fn data_low_byte(self) -> u8 {
        (self.data_value() & 0xFF) as u8
    }

    /// Slave status flags from a Status (id 0) reply
    pub fn slave_status(self) -> SlaveStatus {
        SlaveStatus::from_bits_truncate(self.data_low_byte())
    }

    pub fn is_fault(self) -> bool {
        self.slave_status().contains(SlaveStatus::FAULT)
    }

    pub fn is_central_heating_active(self) -> bool {
        self.slave_status().contains(SlaveStatus::CH_ACTIVE)
    }

    pub fn is_hot_water_active(self) -> bool {
        self.slave_status().contains(SlaveStatus::DHW_ACTIVE)
    }

    pub fn is_flame_on(self) -> bool {
        self.slave_status().contains(SlaveStatus::FLAME_ON)
    }

    pub fn is_cooling_active(self) -> bool {
        self.slave_status().contains(SlaveStatus::COOLING_ACTIVE)
    }

    pub fn is_diagnostic(self) -> bool {
        self.slave_status().contains(SlaveStatus::DIAGNOSTIC)
    }

    // ------------------------------------------------------------------
    // Convenience builders
    // ------------------------------------------------------------------

    /// Build the periodic Status exchange carrying the master enable flags
    pub fn status_request(master: MasterStatus) -> Frame {
        Frame::build(MessageType::ReadData, DataId::Status, status_data(master))
    }

    /// Build a CH setpoint write, clamped to 0..=100 °C
    pub fn ch_setpoint_request(temperature: f32) -> Frame {
        Frame::build(
            MessageType::WriteData,
            DataId::TSet,
            temperature_to_f88(temperature),
        )
    }

    /// Build a plain read request for a data item
    pub fn read_request(data_id: DataId) -> Frame {
        Frame::build(MessageType::ReadData, data_id, 0)
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({}, 0x{:04X})",
            self.msg_type(),
            self.data_id_raw(),
            self.data_value()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_status_request_is_all_zero() {
        let frame = Frame::build(MessageType::ReadData, DataId::Status, 0);
        assert_eq!(frame.raw(), 0x0000_0000);
        assert!(frame.is_valid_request());
    }

    #[test]
    fn parity_fixup_sets_bit_31() {
        // (1 << 28) | (1 << 16) | 0x3200 has five set bits, so the fixup fires
        let frame = Frame::build(MessageType::WriteData, DataId::TSet, 0x3200);
        assert_eq!(frame.raw(), 0x9001_3200);
        assert!(frame.has_valid_parity());
    }

    #[test]
    fn field_accessors() {
        let frame = Frame::from_raw(0x9001_3200);
        assert_eq!(frame.msg_type(), MessageType::WriteData);
        assert_eq!(frame.data_id(), Some(DataId::TSet));
        assert_eq!(frame.data_value(), 0x3200);
        assert_eq!(frame.f88(), 50.0);
    }

    #[test]
    fn display_format() {
        let frame = Frame::build(MessageType::ReadData, DataId::Tboiler, 0);
        assert_eq!(frame.to_string(), "READ_DATA(25, 0x0000)");
    }
}
