//! # Per-Bus Exchange Statistics
//!
//! This module tracks exchange outcomes per bus, enabling identification of
//! flaky wiring or misbehaving boilers from the counters alone. The counters
//! are updated by the transport's `process` poller and are serializable for
//! export alongside the decoded readings.

use serde::Serialize;

use crate::opentherm::link::ExchangeStatus;

/// Counters over the lifetime of one bus instance
#[derive(Debug, Default, Clone, Serialize)]
pub struct ExchangeStats {
    /// Requests driven onto the line
    pub requests_sent: u64,
    /// Exchanges that completed with a valid frame
    pub responses_ok: u64,
    /// Exchanges that completed with a framing/parity/type failure
    pub invalid_frames: u64,
    /// Exchanges that hit the response timeout
    pub timeouts: u64,
}

impl ExchangeStats {
    /// Fold one completed exchange into the counters
    pub fn record(&mut self, outcome: ExchangeStatus) {
        match outcome {
            ExchangeStatus::Success => self.responses_ok += 1,
            ExchangeStatus::Invalid => self.invalid_frames += 1,
            ExchangeStatus::Timeout => self.timeouts += 1,
            ExchangeStatus::None => {}
        }
    }

    /// Completed exchanges, successful or not
    pub fn exchanges_completed(&self) -> u64 {
        self.responses_ok + self.invalid_frames + self.timeouts
    }

    /// Fraction of completed exchanges that succeeded, or 1.0 before any
    /// exchange completes
    pub fn success_rate(&self) -> f64 {
        let completed = self.exchanges_completed();
        if completed == 0 {
            1.0
        } else {
            self.responses_ok as f64 / completed as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_outcomes() {
        let mut stats = ExchangeStats::default();
        stats.record(ExchangeStatus::Success);
        stats.record(ExchangeStatus::Success);
        stats.record(ExchangeStatus::Timeout);
        stats.record(ExchangeStatus::Invalid);
        assert_eq!(stats.responses_ok, 2);
        assert_eq!(stats.timeouts, 1);
        assert_eq!(stats.invalid_frames, 1);
        assert_eq!(stats.exchanges_completed(), 4);
        assert_eq!(stats.success_rate(), 0.5);
    }

    #[test]
    fn empty_stats_report_full_success() {
        let stats = ExchangeStats::default();
        assert_eq!(stats.success_rate(), 1.0);
    }
}
