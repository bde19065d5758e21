//! # Hardware Abstraction Layer for the OpenTherm Line
//!
//! This module defines the traits the transport core needs from the platform:
//! a two-level line driver for the output pin and a microsecond-resolution
//! monotonic clock. Platform-specific implementations live in submodules and
//! are gated behind cargo features; a simulated implementation for tests lives
//! in [`crate::opentherm::line_mock`].

use std::time::{Duration, Instant};

use thiserror::Error;

/// Errors that can occur during HAL operations
#[derive(Debug, Error)]
pub enum HalError {
    #[error("GPIO operation error: {0}")]
    Gpio(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Logical level of the OpenTherm line.
///
/// The OpenTherm interface circuit inverts between the logic pin and the
/// current loop; "active" on the wire is driven as a low output level and read
/// back as a high input level.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LineLevel {
    Low,
    High,
}

impl LineLevel {
    /// Check whether this level is the high (active input) level
    pub fn is_high(self) -> bool {
        self == LineLevel::High
    }
}

/// Driver for the OpenTherm output line.
///
/// Implementations must switch the line within a few microseconds; the
/// transmitter relies on this for the 500 µs half-bit timing.
pub trait LineDriver: Send {
    /// Drive the line to the active state
    fn set_active(&mut self);

    /// Drive the line to the idle state
    fn set_idle(&mut self);
}

/// Microsecond-resolution monotonic time source.
///
/// `delay_micros` must hold half-bit accuracy (well under 500 µs of jitter);
/// ordinary sleep granularity is too coarse on most hosts.
pub trait Clock: Send + Sync {
    /// Microseconds elapsed since an arbitrary fixed origin
    fn now_micros(&self) -> u64;

    /// Block the calling context for the given number of microseconds
    fn delay_micros(&self, micros: u64);
}

/// Monotonic clock backed by [`std::time::Instant`].
///
/// Delays are implemented as a spin wait to hold the half-bit timing budget.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_micros(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }

    fn delay_micros(&self, micros: u64) {
        let deadline = Instant::now() + Duration::from_micros(micros);
        while Instant::now() < deadline {
            std::hint::spin_loop();
        }
    }
}

// Platform implementations
#[cfg(feature = "raspberry-pi")]
pub mod raspberry_pi;

#[cfg(feature = "raspberry-pi")]
pub use raspberry_pi::{attach_edge_interrupt, OpenThermPins, RpiHalError, RpiLineDriver};
