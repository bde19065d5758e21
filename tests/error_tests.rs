//! Unit tests for the `OpenThermError` enum and its associated `Display`
//! trait implementation.

use opentherm_rs::error::OpenThermError;

/// Tests that the `NotInitialized` variant is correctly formatted.
#[test]
fn test_not_initialized_error() {
    let err = OpenThermError::NotInitialized;
    assert_eq!(err.to_string(), "Bus not initialized");
}

/// Tests that the `BusNotReady` variant is correctly formatted.
#[test]
fn test_bus_not_ready_error() {
    let err = OpenThermError::BusNotReady;
    assert_eq!(err.to_string(), "Bus not ready");
}

/// Tests that the `ResponseTimeout` variant is correctly formatted.
#[test]
fn test_response_timeout_error() {
    let err = OpenThermError::ResponseTimeout;
    assert_eq!(err.to_string(), "Response timeout");
}

/// Tests that the `InvalidFrame` variant formats the raw word in hex.
#[test]
fn test_invalid_frame_error() {
    let err = OpenThermError::InvalidFrame(0x9001_3201);
    assert_eq!(err.to_string(), "Invalid frame: 0x90013201");
}

/// Tests that the `UnknownMessageType` variant is correctly formatted.
#[test]
fn test_unknown_message_type_error() {
    let err = OpenThermError::UnknownMessageType("bogus".to_string());
    assert_eq!(err.to_string(), "Unknown message type: bogus");
}

/// Tests that the `InvalidHexString` variant is correctly formatted.
#[test]
fn test_invalid_hex_string_error() {
    let err = OpenThermError::InvalidHexString;
    assert_eq!(err.to_string(), "Invalid hexadecimal string");
}

/// Tests that the `QueueFull` variant is correctly formatted.
#[test]
fn test_queue_full_error() {
    let err = OpenThermError::QueueFull;
    assert_eq!(err.to_string(), "Request queue full");
}

/// Tests that the `Other` variant is correctly formatted.
#[test]
fn test_other_error() {
    let err = OpenThermError::Other("Test error message".to_string());
    assert_eq!(err.to_string(), "Other error: Test error message");
}

/// Tests that HAL errors convert and format through the `Hal` variant.
#[test]
fn test_hal_error_conversion() {
    let err: OpenThermError = opentherm_rs::HalError::Gpio("pin busy".to_string()).into();
    assert_eq!(err.to_string(), "HAL error: GPIO operation error: pin busy");
}
