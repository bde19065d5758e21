#![no_main]

use libfuzzer_sys::fuzz_target;
use opentherm_rs::{Frame, MessageType};

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }
    let raw = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
    let frame = Frame::from_raw(raw);

    // Every accessor must be total over arbitrary 32-bit words
    let _ = frame.msg_type();
    let _ = frame.data_id();
    let _ = frame.data_id_raw();
    let _ = frame.data_value();
    let _ = frame.f88();
    let _ = frame.s16();
    let _ = frame.data_high_byte();
    let _ = frame.data_low_byte();
    let _ = frame.slave_status();
    let _ = frame.to_string();

    // Validity implies an even set-bit count
    if frame.is_valid_request() || frame.is_valid_response() {
        assert!(frame.has_valid_parity());
        assert_eq!(raw.count_ones() % 2, 0);
    }

    // Rebuilding from the decoded fields must produce a parity-valid frame
    // carrying the same id and value.
    let rebuilt = Frame::build_raw_id(frame.msg_type(), frame.data_id_raw(), frame.data_value());
    assert!(rebuilt.has_valid_parity());
    assert_eq!(rebuilt.data_id_raw(), frame.data_id_raw());
    assert_eq!(rebuilt.data_value(), frame.data_value());

    // A rebuilt acknowledgement must validate as a response
    let ack = Frame::build_raw_id(MessageType::ReadAck, frame.data_id_raw(), frame.data_value());
    assert!(ack.is_valid_response());
});
