//! OpenTherm Protocol Constants
//!
//! This module defines constants used in the OpenTherm protocol implementation,
//! based on the OpenTherm 2.2 protocol specification. Frame fields are packed
//! and unpacked with the explicit masks and shifts below rather than any
//! layout-dependent struct overlay.

/// Number of data bits in an OpenTherm frame (excluding start/stop bits)
pub const OPENTHERM_FRAME_BITS: u8 = 32;

/// Bit position of the parity bit
pub const OPENTHERM_PARITY_BIT: u32 = 1 << 31;

/// Shift for the 3-bit message type field
pub const OPENTHERM_MSG_TYPE_SHIFT: u32 = 28;

/// Mask for the 3-bit message type field (after shifting)
pub const OPENTHERM_MSG_TYPE_MASK: u32 = 0x07;

/// Shift for the 8-bit data-item identifier field
pub const OPENTHERM_DATA_ID_SHIFT: u32 = 16;

/// Mask for the 8-bit data-item identifier field (after shifting)
pub const OPENTHERM_DATA_ID_MASK: u32 = 0xFF;

/// Mask for the 16-bit data value field
pub const OPENTHERM_DATA_VALUE_MASK: u32 = 0xFFFF;

// ----------------------------------------------------------------------------
// Bit timing (bi-phase encoding, ~1000 bps equivalent bit time)
// ----------------------------------------------------------------------------

/// Nominal duration of one bit cell in microseconds
pub const BIT_PERIOD_US: u64 = 1000;

/// Duration of one half-bit (active/idle swap point) in microseconds
pub const HALF_BIT_PERIOD_US: u64 = 500;

/// Edge-spacing threshold separating mid-bit transitions from cell-boundary
/// transitions. Edges closer than this to the previously accepted edge belong
/// to the same bit cell and are ignored by the receiver.
pub const EDGE_SPACING_THRESHOLD_US: u64 = 750;

// ----------------------------------------------------------------------------
// Exchange timing (defaults for `LinkTiming`)
// ----------------------------------------------------------------------------

/// Time allowed for a complete response after a request has been sent.
/// OpenTherm 2.2 allows the slave up to 800 ms to answer; 1 s keeps margin.
pub const RESPONSE_TIMEOUT_US: u64 = 1_000_000;

/// Quiet period between two consecutive exchanges on the bus
pub const INTER_FRAME_DELAY_US: u64 = 100_000;

/// Idle time driven on the line at startup before the slave is addressable
pub const ACTIVATION_DELAY_US: u64 = 1_000_000;

/// Poll interval used by the blocking `send_request` while waiting for Ready
pub const SEND_POLL_INTERVAL_US: u64 = 100;

// ----------------------------------------------------------------------------
// Hub defaults
// ----------------------------------------------------------------------------

/// Maximum number of queued requests before the hub starts discarding
pub const DEFAULT_QUEUE_LIMIT: usize = 20;

/// Interval at which the CH setpoint is rewritten. The boiler reverts to a
/// built-in default as a safety measure if the setpoint write stops arriving.
pub const SETPOINT_REFRESH_US: u64 = 2_000_000;
