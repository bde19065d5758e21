//! # OpenTherm Bit-Level Transport
//!
//! This module drives the Manchester-style bi-phase waveform on the output
//! line and decodes replies from edge events on the input line.
//!
//! Every bit occupies a 1 ms cell split into two 500 µs half-periods of
//! opposite level; a logical 1 is active-then-idle, a logical 0 is
//! idle-then-active. A frame on the wire is a start bit (1), the 32 data bits
//! MSB-first, and a stop bit (1).
//!
//! ## Execution contexts
//!
//! The transmitter and the [`OpenThermBus::process`] poller run in the
//! cooperative polling context. The receiver runs in interrupt context: the
//! platform routes every input-pin edge into [`EdgeHandle::on_edge`], which
//! advances the receiver state machine one transition at a time. The shared
//! receiver state (status, response word, bit index, timestamp) sits behind a
//! mutex, and the poller always reads status and timestamp together under
//! that lock so the pair is consistent.
//!
//! ## Failure semantics
//!
//! A timeout or a parity/type mismatch never corrupts bus state. The machine
//! unconditionally returns to `Ready` after the inter-frame delay (or
//! immediately on timeout), so the caller may always retry. No retries are
//! performed here; that policy belongs to the hub layer.

use std::sync::{Arc, Mutex};

use log::{debug, warn};

use crate::constants::{
    EDGE_SPACING_THRESHOLD_US, INTER_FRAME_DELAY_US, OPENTHERM_FRAME_BITS, RESPONSE_TIMEOUT_US,
    ACTIVATION_DELAY_US, HALF_BIT_PERIOD_US, SEND_POLL_INTERVAL_US,
};
use crate::error::OpenThermError;
use crate::hal::{Clock, LineDriver, LineLevel};
use crate::instrumentation::ExchangeStats;
use crate::opentherm::frame::Frame;

/// Protocol status of the bus. Exactly one instance exists per physical bus;
/// transitions are driven by the edge interrupt and the `process` poller.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BusStatus {
    NotInitialized,
    Ready,
    Delay,
    RequestSending,
    ResponseWaiting,
    ResponseStartBit,
    ResponseReceiving,
    ResponseReady,
    ResponseInvalid,
}

/// Outcome of a completed exchange, as reported by `process`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExchangeStatus {
    /// No exchange has completed yet
    None,
    /// A frame arrived and passed the parity and message-type checks
    Success,
    /// A frame arrived but failed framing, parity or message-type checks
    Invalid,
    /// No complete frame arrived within the response timeout
    Timeout,
}

impl ExchangeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ExchangeStatus::None => "NONE",
            ExchangeStatus::Success => "SUCCESS",
            ExchangeStatus::Invalid => "INVALID",
            ExchangeStatus::Timeout => "TIMEOUT",
        }
    }
}

/// Which side of the bus this instance plays
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BusRole {
    /// Thermostat side: sends requests, validates READ-ACK/WRITE-ACK replies
    Master,
    /// Boiler side: receives requests, validates READ-DATA/WRITE-DATA
    Slave,
}

/// Exchange timing, exposed as configuration with protocol defaults.
///
/// OpenTherm 2.2 allows the slave up to 800 ms to answer; the 1 s default
/// response timeout keeps margin over that bound.
#[derive(Copy, Clone, Debug)]
pub struct LinkTiming {
    /// Time allowed for a complete response after the request stop bit
    pub response_timeout_us: u64,
    /// Quiet period between two consecutive exchanges
    pub inter_frame_delay_us: u64,
    /// Idle time driven at `begin` before the slave is addressable
    pub activation_delay_us: u64,
}

impl Default for LinkTiming {
    fn default() -> Self {
        LinkTiming {
            response_timeout_us: RESPONSE_TIMEOUT_US,
            inter_frame_delay_us: INTER_FRAME_DELAY_US,
            activation_delay_us: ACTIVATION_DELAY_US,
        }
    }
}

/// Receiver state shared between the interrupt context and the poller.
///
/// Owned exclusively by the interrupt handler while receiving; the poller
/// takes the accumulated word by value once the status says a frame is
/// complete.
#[derive(Debug)]
struct Shared {
    status: BusStatus,
    response: u32,
    response_bit_index: u8,
    /// Timestamp of the last accepted edge (or of the request stop bit)
    response_timestamp: u64,
}

/// Clonable handle for the interrupt context.
///
/// A clone of this handle is moved into the platform's edge-interrupt
/// callback, so the interrupt carries its own context instead of reaching
/// through a process-wide singleton.
#[derive(Clone)]
pub struct EdgeHandle {
    shared: Arc<Mutex<Shared>>,
    role: BusRole,
}

impl EdgeHandle {
    /// Advance the receiver state machine for one input-pin edge.
    ///
    /// `level` is the pin level after the edge, `now_micros` the edge
    /// timestamp on the bus clock. Safe to call from an interrupt thread; the
    /// critical section is a handful of field accesses.
    pub fn on_edge(&self, level: LineLevel, now_micros: u64) {
        let mut shared = match self.shared.lock() {
            Ok(guard) => guard,
            // A poisoned lock means a poller panic; drop the edge.
            Err(_) => return,
        };

        if shared.status == BusStatus::Ready {
            // A slave arms its receiver on the first rising edge; a master
            // ignores line noise while idle.
            if self.role == BusRole::Slave && level.is_high() {
                shared.status = BusStatus::ResponseWaiting;
            } else {
                return;
            }
        }

        let elapsed = now_micros.wrapping_sub(shared.response_timestamp);
        match shared.status {
            BusStatus::ResponseWaiting => {
                if level.is_high() {
                    shared.status = BusStatus::ResponseStartBit;
                } else {
                    shared.status = BusStatus::ResponseInvalid;
                }
                shared.response_timestamp = now_micros;
            }
            BusStatus::ResponseStartBit => {
                // The mid-bit falling edge of the start bit must arrive
                // within the same bit cell.
                if elapsed < EDGE_SPACING_THRESHOLD_US && !level.is_high() {
                    shared.status = BusStatus::ResponseReceiving;
                    shared.response_timestamp = now_micros;
                    shared.response_bit_index = 0;
                } else {
                    shared.status = BusStatus::ResponseInvalid;
                    shared.response_timestamp = now_micros;
                }
            }
            BusStatus::ResponseReceiving => {
                // Edges closer than the threshold are cell-boundary
                // transitions and carry no data.
                if elapsed > EDGE_SPACING_THRESHOLD_US {
                    if shared.response_bit_index < OPENTHERM_FRAME_BITS {
                        let bit = !level.is_high() as u32;
                        shared.response = (shared.response << 1) | bit;
                        shared.response_bit_index += 1;
                        shared.response_timestamp = now_micros;
                    } else {
                        // Stop bit
                        shared.status = BusStatus::ResponseReady;
                        shared.response_timestamp = now_micros;
                    }
                }
            }
            _ => {}
        }
    }
}

/// Callback invoked by `process` with each completed exchange
pub type ExchangeCallback = Box<dyn FnMut(Frame, ExchangeStatus) + Send>;

/// One OpenTherm bus: a line driver, a clock, and the protocol state machine.
pub struct OpenThermBus<L: LineDriver, C: Clock> {
    line: L,
    clock: C,
    role: BusRole,
    timing: LinkTiming,
    shared: Arc<Mutex<Shared>>,
    last_response: u32,
    last_exchange: ExchangeStatus,
    stats: ExchangeStats,
    callback: Option<ExchangeCallback>,
}

impl<L: LineDriver, C: Clock> OpenThermBus<L, C> {
    /// Create a bus in the `NotInitialized` state
    pub fn new(line: L, clock: C, role: BusRole) -> Self {
        Self::with_timing(line, clock, role, LinkTiming::default())
    }

    /// Create a bus with custom exchange timing
    pub fn with_timing(line: L, clock: C, role: BusRole, timing: LinkTiming) -> Self {
        OpenThermBus {
            line,
            clock,
            role,
            timing,
            shared: Arc::new(Mutex::new(Shared {
                status: BusStatus::NotInitialized,
                response: 0,
                response_bit_index: 0,
                response_timestamp: 0,
            })),
            last_response: 0,
            last_exchange: ExchangeStatus::None,
            stats: ExchangeStats::default(),
            callback: None,
        }
    }

    /// Drive the line idle, wait out the activation delay, and become Ready
    pub fn begin(&mut self) {
        self.line.set_idle();
        self.clock.delay_micros(self.timing.activation_delay_us);
        self.lock().status = BusStatus::Ready;
    }

    /// Register a callback invoked with each completed exchange
    pub fn set_exchange_callback(&mut self, callback: ExchangeCallback) {
        self.callback = Some(callback);
    }

    /// Handle for the platform's edge-interrupt registration
    pub fn edge_handle(&self) -> EdgeHandle {
        EdgeHandle {
            shared: Arc::clone(&self.shared),
            role: self.role,
        }
    }

    /// Whether a new exchange can start
    pub fn is_ready(&self) -> bool {
        self.lock().status == BusStatus::Ready
    }

    /// Current protocol status
    pub fn status(&self) -> BusStatus {
        self.lock().status
    }

    /// The response word of the most recently completed exchange
    pub fn last_response(&self) -> Frame {
        Frame::from_raw(self.last_response)
    }

    /// Outcome of the most recently completed exchange
    pub fn last_exchange_status(&self) -> ExchangeStatus {
        self.last_exchange
    }

    /// Per-bus exchange statistics
    pub fn stats(&self) -> &ExchangeStats {
        &self.stats
    }

    /// Microseconds on the bus clock
    pub fn now_micros(&self) -> u64 {
        self.clock.now_micros()
    }

    /// Send a request and arm the receiver without waiting for the reply.
    ///
    /// Blocks for the 34 bit times of the transmission itself (~34 ms).
    pub fn send_request_async(&mut self, request: Frame) -> Result<(), OpenThermError> {
        {
            let mut shared = self.lock();
            match shared.status {
                BusStatus::NotInitialized => return Err(OpenThermError::NotInitialized),
                BusStatus::Ready => {}
                _ => return Err(OpenThermError::BusNotReady),
            }
            shared.status = BusStatus::RequestSending;
            shared.response = 0;
            shared.response_bit_index = 0;
        }
        self.last_exchange = ExchangeStatus::None;
        self.stats.requests_sent += 1;
        debug!("Sending request: {request}");

        self.write_frame(request);

        let now = self.clock.now_micros();
        let mut shared = self.lock();
        shared.status = BusStatus::ResponseWaiting;
        shared.response_timestamp = now;
        Ok(())
    }

    /// Blocking request/response exchange.
    ///
    /// Spins `process` until the bus settles back to Ready (success, invalid
    /// frame, or the response timeout), then reports the outcome. This is the
    /// only blocking operation in the crate.
    pub fn send_request(&mut self, request: Frame) -> Result<Frame, OpenThermError> {
        self.send_request_async(request)?;
        while !self.is_ready() {
            self.process();
            self.clock.delay_micros(SEND_POLL_INTERVAL_US);
        }
        match self.last_exchange {
            ExchangeStatus::Success => Ok(Frame::from_raw(self.last_response)),
            ExchangeStatus::Timeout => Err(OpenThermError::ResponseTimeout),
            _ => Err(OpenThermError::InvalidFrame(self.last_response)),
        }
    }

    /// Send-only reply path for slave mode; returns to Ready immediately
    pub fn send_response(&mut self, response: Frame) -> Result<(), OpenThermError> {
        {
            let mut shared = self.lock();
            if shared.status == BusStatus::NotInitialized {
                return Err(OpenThermError::NotInitialized);
            }
            shared.status = BusStatus::RequestSending;
            shared.response = 0;
            shared.response_bit_index = 0;
        }
        debug!("Sending response: {response}");
        self.write_frame(response);
        self.lock().status = BusStatus::Ready;
        Ok(())
    }

    /// Poll-context driver: times out stale exchanges, settles completed
    /// receptions, and enforces the inter-frame delay.
    ///
    /// Returns the completed exchange, if this call finished one. Must be
    /// called regularly (every few milliseconds) while an exchange is in
    /// flight.
    pub fn process(&mut self) -> Option<(Frame, ExchangeStatus)> {
        // Status and timestamp are read together under the lock so the pair
        // is consistent with respect to the interrupt context.
        let (status, timestamp) = {
            let shared = self.lock();
            (shared.status, shared.response_timestamp)
        };

        if status == BusStatus::Ready {
            return None;
        }

        let now = self.clock.now_micros();
        let elapsed = now.wrapping_sub(timestamp);

        if status != BusStatus::NotInitialized
            && status != BusStatus::Delay
            && elapsed > self.timing.response_timeout_us
        {
            let response = {
                let mut shared = self.lock();
                shared.status = BusStatus::Ready;
                shared.response
            };
            return Some(self.finish_exchange(response, ExchangeStatus::Timeout));
        }

        match status {
            BusStatus::ResponseInvalid => {
                let response = {
                    let mut shared = self.lock();
                    shared.status = BusStatus::Delay;
                    shared.response
                };
                Some(self.finish_exchange(response, ExchangeStatus::Invalid))
            }
            BusStatus::ResponseReady => {
                let response = {
                    let mut shared = self.lock();
                    shared.status = BusStatus::Delay;
                    shared.response
                };
                let frame = Frame::from_raw(response);
                let valid = match self.role {
                    BusRole::Master => frame.is_valid_response(),
                    BusRole::Slave => frame.is_valid_request(),
                };
                let outcome = if valid {
                    ExchangeStatus::Success
                } else {
                    ExchangeStatus::Invalid
                };
                Some(self.finish_exchange(response, outcome))
            }
            BusStatus::Delay => {
                if elapsed > self.timing.inter_frame_delay_us {
                    self.lock().status = BusStatus::Ready;
                }
                None
            }
            _ => None,
        }
    }

    fn finish_exchange(&mut self, response: u32, outcome: ExchangeStatus) -> (Frame, ExchangeStatus) {
        let frame = Frame::from_raw(response);
        self.last_response = response;
        self.last_exchange = outcome;
        self.stats.record(outcome);
        match outcome {
            ExchangeStatus::Success => debug!("Received response: {frame}"),
            ExchangeStatus::Invalid => warn!("Received invalid frame: {frame}"),
            ExchangeStatus::Timeout => warn!("Exchange timeout"),
            ExchangeStatus::None => {}
        }
        if let Some(callback) = self.callback.as_mut() {
            callback(frame, outcome);
        }
        (frame, outcome)
    }

    /// Drive start bit, 32 data bits MSB-first, stop bit, then leave the line
    /// idle
    fn write_frame(&mut self, frame: Frame) {
        self.send_bit(true); // start bit
        for i in (0..OPENTHERM_FRAME_BITS).rev() {
            self.send_bit(frame.raw() & (1 << i) != 0);
        }
        self.send_bit(true); // stop bit
        self.line.set_idle();
    }

    /// One bit cell: two half-periods of opposite level
    fn send_bit(&mut self, high: bool) {
        if high {
            self.line.set_active();
        } else {
            self.line.set_idle();
        }
        self.clock.delay_micros(HALF_BIT_PERIOD_US);
        if high {
            self.line.set_idle();
        } else {
            self.line.set_active();
        }
        self.clock.delay_micros(HALF_BIT_PERIOD_US);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Shared> {
        // The interrupt side never panics while holding the lock; treat
        // poisoning as unreachable.
        self.shared.lock().unwrap_or_else(|e| e.into_inner())
    }
}
