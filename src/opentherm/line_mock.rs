//! Simulated line and clock for testing
//!
//! This module provides a simulated OpenTherm line that records every level
//! transition the transmitter drives, plus a manually-advanced microsecond
//! clock, so transport behavior can be tested without hardware or real time.

use std::sync::{Arc, Mutex};

use crate::constants::{BIT_PERIOD_US, HALF_BIT_PERIOD_US, OPENTHERM_FRAME_BITS};
use crate::hal::{Clock, LineDriver, LineLevel};
use crate::opentherm::frame::Frame;

/// Microsecond clock under test control.
///
/// `delay_micros` advances simulated time, so blocking transport paths
/// terminate instantly in tests.
#[derive(Clone)]
pub struct SimulatedClock {
    now_micros: Arc<Mutex<u64>>,
}

impl SimulatedClock {
    pub fn new() -> Self {
        SimulatedClock {
            now_micros: Arc::new(Mutex::new(0)),
        }
    }

    /// Move simulated time forward
    pub fn advance(&self, micros: u64) {
        *self.now_micros.lock().unwrap() += micros;
    }
}

impl Default for SimulatedClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SimulatedClock {
    fn now_micros(&self) -> u64 {
        *self.now_micros.lock().unwrap()
    }

    fn delay_micros(&self, micros: u64) {
        self.advance(micros);
    }
}

/// A recorded output-line transition
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LineTransition {
    pub at_micros: u64,
    pub level: LineLevel,
}

/// Simulated output line that logs every driven level with its timestamp
#[derive(Clone)]
pub struct SimulatedLine {
    transitions: Arc<Mutex<Vec<LineTransition>>>,
    clock: SimulatedClock,
}

impl SimulatedLine {
    pub fn new(clock: SimulatedClock) -> Self {
        SimulatedLine {
            transitions: Arc::new(Mutex::new(Vec::new())),
            clock,
        }
    }

    /// All transitions driven so far
    pub fn transitions(&self) -> Vec<LineTransition> {
        self.transitions.lock().unwrap().clone()
    }

    /// Drop the recorded transitions
    pub fn clear(&self) {
        self.transitions.lock().unwrap().clear();
    }
}

impl LineDriver for SimulatedLine {
    fn set_active(&mut self) {
        let at_micros = self.clock.now_micros();
        self.transitions.lock().unwrap().push(LineTransition {
            at_micros,
            level: LineLevel::Low,
        });
    }

    fn set_idle(&mut self) {
        let at_micros = self.clock.now_micros();
        self.transitions.lock().unwrap().push(LineTransition {
            at_micros,
            level: LineLevel::High,
        });
    }
}

/// Render the edge sequence a well-timed reply produces at the receiver.
///
/// Only the edges the receiver state machine acts on are emitted: the two
/// start-bit transitions, one mid-bit transition per data bit (1 ms apart,
/// level low for a 1 bit), and the stop-bit transition that completes the
/// frame. Cell-boundary transitions are below the edge-spacing threshold and
/// would be ignored anyway.
pub fn response_edges(frame: Frame, first_edge_at: u64) -> Vec<(u64, LineLevel)> {
    let mut edges = Vec::with_capacity(OPENTHERM_FRAME_BITS as usize + 3);
    // Start bit: rising edge, then the mid-bit fall half a cell later
    edges.push((first_edge_at, LineLevel::High));
    let mut at = first_edge_at + HALF_BIT_PERIOD_US;
    edges.push((at, LineLevel::Low));
    // Data bits MSB-first: the mid-bit transition carries the bit value
    for i in (0..OPENTHERM_FRAME_BITS).rev() {
        at += BIT_PERIOD_US;
        let level = if frame.raw() & (1 << i) != 0 {
            LineLevel::Low
        } else {
            LineLevel::High
        };
        edges.push((at, level));
    }
    // Stop bit transition flags the frame complete
    at += BIT_PERIOD_US;
    edges.push((at, LineLevel::High));
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_clock_advances() {
        let clock = SimulatedClock::new();
        assert_eq!(clock.now_micros(), 0);
        clock.delay_micros(500);
        clock.advance(250);
        assert_eq!(clock.now_micros(), 750);
    }

    #[test]
    fn line_records_transitions_with_timestamps() {
        let clock = SimulatedClock::new();
        let mut line = SimulatedLine::new(clock.clone());
        line.set_active();
        clock.advance(500);
        line.set_idle();

        let transitions = line.transitions();
        assert_eq!(
            transitions,
            vec![
                LineTransition {
                    at_micros: 0,
                    level: LineLevel::Low
                },
                LineTransition {
                    at_micros: 500,
                    level: LineLevel::High
                },
            ]
        );
    }

    #[test]
    fn response_edge_count() {
        let frame = Frame::from_raw(0x4019_2800);
        let edges = response_edges(frame, 1000);
        // start (2 edges) + 32 data bits + stop
        assert_eq!(edges.len(), 35);
        assert_eq!(edges[0], (1000, LineLevel::High));
        assert_eq!(edges[1], (1500, LineLevel::Low));
        // Bit 31 of 0x40192800 is 0, so the first data edge is high
        assert_eq!(edges[2], (2500, LineLevel::High));
    }
}
