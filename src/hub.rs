//! # OpenTherm Boiler Hub
//!
//! This module provides the OpenThermHub struct, which serves as the main
//! entry point for running a boiler as an OpenTherm master: it queues
//! requests, drives the transport one cooperative tick at a time, and folds
//! valid replies into a decoded readings snapshot.
//!
//! The hub owns the retry policy boundary: it performs no retries itself.
//! Failed exchanges surface as `StepStatus::Error` plus a warning log, and
//! the periodic schedule naturally re-reads every item.

use std::collections::VecDeque;

use log::{debug, warn};
use serde::Serialize;

use crate::constants::{DEFAULT_QUEUE_LIMIT, SETPOINT_REFRESH_US};
use crate::error::OpenThermError;
use crate::hal::{Clock, LineDriver};
use crate::instrumentation::ExchangeStats;
use crate::opentherm::data::{temperature_to_f88, MasterStatus};
use crate::opentherm::frame::Frame;
use crate::opentherm::link::{EdgeHandle, ExchangeStatus, OpenThermBus};
use crate::opentherm::message::{DataId, MessageType};

/// Result of one cooperative hub tick, for an external scheduler
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepStatus {
    /// Work remains: a request is queued or an exchange is in flight
    Pending,
    /// Queue drained and bus idle
    Done,
    /// The exchange completed by this tick failed (timeout or invalid frame)
    Error,
}

/// Hub configuration
#[derive(Clone, Debug)]
pub struct HubConfig {
    /// Maximum queued requests before new ones are discarded with a warning
    pub queue_limit: usize,
    /// Interval at which the CH setpoint write is repeated. The boiler falls
    /// back to a built-in default if the write stops arriving.
    pub setpoint_refresh_micros: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        HubConfig {
            queue_limit: DEFAULT_QUEUE_LIMIT,
            setpoint_refresh_micros: SETPOINT_REFRESH_US,
        }
    }
}

/// Decoded boiler state, refreshed by the periodic poll schedule
#[derive(Clone, Debug, Default, Serialize)]
pub struct BoilerReadings {
    pub fault: Option<bool>,
    pub ch_active: Option<bool>,
    pub dhw_active: Option<bool>,
    pub flame_on: Option<bool>,
    pub cooling_active: Option<bool>,
    pub diagnostic: Option<bool>,
    /// Boiler flow water temperature in °C
    pub boiler_temperature: Option<f32>,
    /// Return water temperature in °C
    pub return_temperature: Option<f32>,
    /// CH water pressure in bar
    pub ch_pressure: Option<f32>,
    /// Relative modulation level in percent
    pub modulation: Option<f32>,
    /// DHW setpoint bounds (min, max) in °C, read once
    pub dhw_setpoint_bounds: Option<(u8, u8)>,
    /// Max CH setpoint bounds (min, max) in °C, read once
    pub ch_setpoint_bounds: Option<(u8, u8)>,
    /// DHW setpoint the boiler acknowledged
    pub confirmed_dhw_setpoint: Option<f32>,
}

/// OpenTherm master hub: request queue plus readings decoder on top of one
/// bus.
pub struct OpenThermHub<L: LineDriver, C: Clock> {
    bus: OpenThermBus<L, C>,
    config: HubConfig,
    queue: VecDeque<Frame>,
    readings: BoilerReadings,
    ch_enabled: bool,
    dhw_enabled: bool,
    cooling_enabled: bool,
    ch_setpoint: f32,
    dhw_setpoint: f32,
    last_setpoint_write_micros: u64,
}

impl<L: LineDriver, C: Clock> OpenThermHub<L, C> {
    /// Wrap an initialized bus. Call `OpenThermBus::begin` first.
    pub fn new(bus: OpenThermBus<L, C>, config: HubConfig) -> Self {
        let last_setpoint_write_micros = bus.now_micros();
        OpenThermHub {
            bus,
            config,
            queue: VecDeque::new(),
            readings: BoilerReadings::default(),
            ch_enabled: false,
            dhw_enabled: false,
            cooling_enabled: false,
            ch_setpoint: 0.0,
            dhw_setpoint: 0.0,
            last_setpoint_write_micros,
        }
    }

    /// Latest decoded boiler state
    pub fn readings(&self) -> &BoilerReadings {
        &self.readings
    }

    /// Exchange statistics of the underlying bus
    pub fn stats(&self) -> &ExchangeStats {
        self.bus.stats()
    }

    /// Handle for the platform's edge-interrupt registration
    pub fn edge_handle(&self) -> EdgeHandle {
        self.bus.edge_handle()
    }

    /// Number of queued requests
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is drained and no exchange is in flight
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.bus.is_ready()
    }

    pub fn set_ch_enabled(&mut self, enabled: bool) {
        if self.ch_enabled != enabled {
            debug!("{} CH", if enabled { "Enabled" } else { "Disabled" });
            self.ch_enabled = enabled;
            self.enqueue_status_request();
        }
    }

    pub fn set_dhw_enabled(&mut self, enabled: bool) {
        if self.dhw_enabled != enabled {
            debug!("{} DHW", if enabled { "Enabled" } else { "Disabled" });
            self.dhw_enabled = enabled;
            self.enqueue_status_request();
        }
    }

    pub fn set_cooling_enabled(&mut self, enabled: bool) {
        if self.cooling_enabled != enabled {
            debug!("{} cooling", if enabled { "Enabled" } else { "Disabled" });
            self.cooling_enabled = enabled;
            self.enqueue_status_request();
        }
    }

    /// Change the CH setpoint; it is written immediately and then refreshed
    /// on the configured interval
    pub fn set_ch_setpoint(&mut self, temperature: f32) {
        self.ch_setpoint = temperature;
        let _ = self.enqueue_request(Frame::build(
            MessageType::WriteData,
            DataId::TSet,
            temperature_to_f88(temperature),
        ));
    }

    /// Change the DHW setpoint; rewritten until the boiler acknowledges it
    pub fn set_dhw_setpoint(&mut self, temperature: f32) {
        self.dhw_setpoint = temperature;
        self.readings.confirmed_dhw_setpoint = None;
        let _ = self.enqueue_request(Frame::build(
            MessageType::WriteData,
            DataId::TdhwSet,
            temperature_to_f88(temperature),
        ));
    }

    /// Enqueue a plain read for one data item
    pub fn request_read(&mut self, data_id: DataId) -> Result<(), OpenThermError> {
        self.enqueue_request(Frame::read_request(data_id))
    }

    /// Enqueue the periodic read set: temperatures, pressure, modulation,
    /// the one-shot bound reads, and a status exchange
    pub fn schedule_poll(&mut self) {
        let _ = self.request_read(DataId::Tret);
        let _ = self.request_read(DataId::Tboiler);
        let _ = self.request_read(DataId::ChPressure);
        let _ = self.request_read(DataId::RelModLevel);
        if self.readings.dhw_setpoint_bounds.is_none() {
            let _ = self.request_read(DataId::TdhwSetBounds);
        }
        if self.readings.ch_setpoint_bounds.is_none() {
            let _ = self.request_read(DataId::MaxTSetBounds);
        }
        self.enqueue_status_request();
    }

    /// One cooperative tick: send the next queued frame if the bus is idle,
    /// keep the setpoint fresh, and fold any completed exchange into the
    /// readings.
    pub fn step(&mut self) -> StepStatus {
        if self.bus.is_ready() {
            if let Some(frame) = self.queue.pop_front() {
                // The bus was checked Ready above; an error here means the
                // hub state machine itself is broken.
                if let Err(e) = self.bus.send_request_async(frame) {
                    warn!("Failed to send queued request {frame}: {e}");
                    return StepStatus::Error;
                }
            }
        }

        let now = self.bus.now_micros();
        if now.wrapping_sub(self.last_setpoint_write_micros) > self.config.setpoint_refresh_micros {
            self.last_setpoint_write_micros = now;
            let _ = self.enqueue_request(Frame::build(
                MessageType::WriteData,
                DataId::TSet,
                temperature_to_f88(self.ch_setpoint),
            ));
            if self.readings.confirmed_dhw_setpoint != Some(self.dhw_setpoint) {
                let _ = self.enqueue_request(Frame::build(
                    MessageType::WriteData,
                    DataId::TdhwSet,
                    temperature_to_f88(self.dhw_setpoint),
                ));
            }
        }

        if let Some((frame, outcome)) = self.bus.process() {
            match outcome {
                ExchangeStatus::Success => self.apply_response(frame),
                ExchangeStatus::Timeout | ExchangeStatus::Invalid => return StepStatus::Error,
                ExchangeStatus::None => {}
            }
        }

        if self.is_idle() {
            StepStatus::Done
        } else {
            StepStatus::Pending
        }
    }

    /// Master status request carrying the current enable flags
    fn enqueue_status_request(&mut self) {
        let mut master = MasterStatus::empty();
        master.set(MasterStatus::CH_ENABLE, self.ch_enabled);
        master.set(MasterStatus::DHW_ENABLE, self.dhw_enabled);
        master.set(MasterStatus::COOLING_ENABLE, self.cooling_enabled);
        let _ = self.enqueue_request(Frame::status_request(master));
    }

    fn enqueue_request(&mut self, frame: Frame) -> Result<(), OpenThermError> {
        if self.queue.len() >= self.config.queue_limit {
            warn!("Queue full. Discarded request: {frame}");
            return Err(OpenThermError::QueueFull);
        }
        debug!("Enqueued request: {frame}");
        self.queue.push_back(frame);
        Ok(())
    }

    fn apply_response(&mut self, frame: Frame) {
        let Some(data_id) = frame.data_id() else {
            return;
        };
        match data_id {
            DataId::Status => {
                self.readings.fault = Some(frame.is_fault());
                self.readings.ch_active = Some(frame.is_central_heating_active());
                self.readings.dhw_active = Some(frame.is_hot_water_active());
                self.readings.flame_on = Some(frame.is_flame_on());
                self.readings.cooling_active = Some(frame.is_cooling_active());
                self.readings.diagnostic = Some(frame.is_diagnostic());
            }
            DataId::Tret => self.readings.return_temperature = Some(frame.f88()),
            DataId::Tboiler => self.readings.boiler_temperature = Some(frame.f88()),
            DataId::ChPressure => self.readings.ch_pressure = Some(frame.f88()),
            DataId::RelModLevel => self.readings.modulation = Some(frame.f88()),
            DataId::TdhwSetBounds => {
                self.readings.dhw_setpoint_bounds =
                    Some((frame.data_low_byte(), frame.data_high_byte()));
            }
            DataId::MaxTSetBounds => {
                self.readings.ch_setpoint_bounds =
                    Some((frame.data_low_byte(), frame.data_high_byte()));
            }
            DataId::TdhwSet => {
                if frame.msg_type() == MessageType::WriteAck {
                    self.readings.confirmed_dhw_setpoint = Some(frame.f88());
                }
            }
            _ => {}
        }
    }
}
