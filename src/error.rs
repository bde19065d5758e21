//! # OpenTherm Error Handling
//!
//! This module defines the OpenThermError enum, which represents the different
//! error types that can occur in the opentherm-rs crate.

use thiserror::Error;

/// Represents the different error types that can occur in the OpenTherm crate.
#[derive(Debug, Error)]
pub enum OpenThermError {
    /// Indicates the bus has not been initialized via `begin()`.
    #[error("Bus not initialized")]
    NotInitialized,

    /// Indicates the bus is mid-exchange and cannot accept a new request.
    #[error("Bus not ready")]
    BusNotReady,

    /// Indicates no response arrived within the response timeout.
    #[error("Response timeout")]
    ResponseTimeout,

    /// Indicates a received frame failed the parity or message-type check.
    #[error("Invalid frame: 0x{0:08X}")]
    InvalidFrame(u32),

    /// Indicates an unknown message type string was provided.
    #[error("Unknown message type: {0}")]
    UnknownMessageType(String),

    /// Indicates an invalid hexadecimal string was provided.
    #[error("Invalid hexadecimal string")]
    InvalidHexString,

    /// Indicates the hub request queue is full.
    #[error("Request queue full")]
    QueueFull,

    /// Indicates a hardware abstraction layer failure.
    #[error("HAL error: {0}")]
    Hal(#[from] crate::hal::HalError),

    /// A catch-all error for uncategorized cases.
    #[error("Other error: {0}")]
    Other(String),
}
