//! # Raspberry Pi HAL Implementation
//!
//! Line driver and edge-interrupt wiring for Raspberry Pi 4 and 5, driving an
//! OpenTherm interface circuit (e.g. a DIYLESS or Ihor Melnyk adapter board)
//! through two GPIO lines.
//!
//! ## Hardware Setup
//!
//! All pin numbers use BCM GPIO numbering (not physical pin numbers):
//!
//! ```text
//! Pi Pin │ BCM GPIO │ Adapter Pin │ Function
//! ───────┼──────────┼─────────────┼──────────────────
//! 18     │ GPIO 24  │ OT-IN       │ Receive (input)
//! 16     │ GPIO 23  │ OT-OUT      │ Transmit (output)
//! ```
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use opentherm_rs::hal::raspberry_pi::{attach_edge_interrupt, OpenThermPins, RpiLineDriver};
//! use opentherm_rs::hal::SystemClock;
//! use opentherm_rs::opentherm::link::{BusRole, OpenThermBus};
//!
//! let pins = OpenThermPins::default();
//! let line = RpiLineDriver::new(&pins)?;
//! let clock = SystemClock::new();
//! let mut bus = OpenThermBus::new(line, clock, BusRole::Master);
//!
//! // Route input-pin edges into the receiver state machine.
//! let mut input = RpiLineDriver::input_pin(&pins)?;
//! attach_edge_interrupt(&mut input, bus.edge_handle(), clock)?;
//!
//! bus.begin();
//! # Ok::<(), opentherm_rs::hal::raspberry_pi::RpiHalError>(())
//! ```

use crate::hal::{Clock, LineDriver, LineLevel};
use crate::opentherm::link::EdgeHandle;
use rppal::gpio::{Gpio, InputPin, Level, OutputPin, Trigger};
use thiserror::Error;

/// Errors specific to the Raspberry Pi HAL implementation
#[derive(Error, Debug)]
pub enum RpiHalError {
    /// GPIO initialization failed
    #[error("GPIO initialization failed: {0}")]
    GpioInit(#[from] rppal::gpio::Error),

    /// Invalid configuration parameter
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// GPIO pin assignment for the OpenTherm adapter
#[derive(Debug, Clone)]
pub struct OpenThermPins {
    /// Receive pin (input) - edges drive the receiver state machine
    pub input: u8,
    /// Transmit pin (output) - driven by the bit transmitter
    pub output: u8,
}

impl Default for OpenThermPins {
    fn default() -> Self {
        Self {
            input: 24,  // GPIO 24 (Pin 18)
            output: 23, // GPIO 23 (Pin 16)
        }
    }
}

/// OpenTherm line driver backed by an rppal output pin.
///
/// The adapter circuit inverts: driving the pin low puts the current loop in
/// its active state, driving it high leaves the loop idle.
pub struct RpiLineDriver {
    out_pin: OutputPin,
}

impl RpiLineDriver {
    /// Claim the output pin and leave the line idle
    pub fn new(pins: &OpenThermPins) -> Result<Self, RpiHalError> {
        if pins.input == pins.output {
            return Err(RpiHalError::InvalidConfig(format!(
                "input and output cannot share GPIO {}",
                pins.input
            )));
        }
        let gpio = Gpio::new()?;
        let mut out_pin = gpio.get(pins.output)?.into_output();
        out_pin.set_high();
        Ok(RpiLineDriver { out_pin })
    }

    /// Claim the receive pin as an input, ready for interrupt attachment
    pub fn input_pin(pins: &OpenThermPins) -> Result<InputPin, RpiHalError> {
        let gpio = Gpio::new()?;
        Ok(gpio.get(pins.input)?.into_input())
    }
}

impl LineDriver for RpiLineDriver {
    fn set_active(&mut self) {
        self.out_pin.set_low();
    }

    fn set_idle(&mut self) {
        self.out_pin.set_high();
    }
}

/// Route pin-change interrupts from the receive pin into the receiver state
/// machine.
///
/// The `EdgeHandle` and a clone of the bus clock move into the rppal callback,
/// so the interrupt context carries its own state instead of going through a
/// process-wide singleton. The callback runs on rppal's interrupt thread and
/// only takes the short receiver-state lock.
pub fn attach_edge_interrupt<C>(
    pin: &mut InputPin,
    handle: EdgeHandle,
    clock: C,
) -> Result<(), RpiHalError>
where
    C: Clock + Clone + 'static,
{
    pin.set_async_interrupt(Trigger::Both, move |level| {
        let line_level = match level {
            Level::High => LineLevel::High,
            Level::Low => LineLevel::Low,
        };
        handle.on_edge(line_level, clock.now_micros());
    })?;
    Ok(())
}
