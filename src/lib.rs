//! # opentherm-rs - A Rust Crate for OpenTherm Boiler Protocol Communication
//!
//! The opentherm-rs crate provides a Rust-based implementation of the
//! OpenTherm protocol, the two-wire bidirectional serial protocol between a
//! central-heating master (thermostat/controller) and a boiler slave, using
//! bi-phase encoding at ~1000 bps equivalent bit time.
//!
//! ## Features
//!
//! - Build and validate 32-bit OpenTherm frames (parity fixup, message type
//!   and data id vocabulary, f8.8 payload conversions)
//! - Drive the bit-level transport: Manchester-style transmit on an output
//!   line, edge-interrupt-driven receive state machine, cooperative
//!   `process()` polling with timeout and inter-frame delay handling
//! - Run a boiler hub: bounded request queue, periodic setpoint refresh, and
//!   decoded boiler readings
//! - Simulated line and clock for hardware-free testing
//! - Raspberry Pi GPIO support behind the `raspberry-pi` feature
//!
//! ## Usage
//!
//! ```rust
//! use opentherm_rs::{
//!     BusRole, DataId, Frame, MessageType, OpenThermBus, SimulatedClock, SimulatedLine,
//! };
//!
//! let clock = SimulatedClock::new();
//! let line = SimulatedLine::new(clock.clone());
//! let mut bus = OpenThermBus::new(line, clock, BusRole::Master);
//! bus.begin();
//!
//! let request = Frame::build(MessageType::ReadData, DataId::Tboiler, 0);
//! bus.send_request_async(request).unwrap();
//! ```

pub mod constants;
pub mod error;
pub mod hal;
pub mod hub;
pub mod instrumentation;
pub mod logging;
pub mod opentherm;

pub use crate::error::OpenThermError;
pub use crate::logging::{init_logger, log_info};

// Core OpenTherm types
pub use hal::{Clock, HalError, LineDriver, LineLevel, SystemClock};
pub use hub::{BoilerReadings, HubConfig, OpenThermHub, StepStatus};
pub use instrumentation::ExchangeStats;
pub use opentherm::data::{
    f88_to_float, float_to_f88, temperature_to_f88, MasterStatus, SlaveStatus,
};
pub use opentherm::frame::Frame;
pub use opentherm::line_mock::{response_edges, LineTransition, SimulatedClock, SimulatedLine};
pub use opentherm::link::{
    BusRole, BusStatus, EdgeHandle, ExchangeStatus, LinkTiming, OpenThermBus,
};
pub use opentherm::message::{DataId, MessageType};
pub use opentherm::timeout::{decode_mclk_timeout, encode_mclk_timeout};
