//! Tick-rate gate
//!
//! The host polls as often as it likes; the gate lets at most one physics
//! step through per period. Late polls run a single step, never a backlog.

use crate::consts::TICK_PERIOD_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickGate {
    period_ms: u64,
    last_tick_ms: Option<u64>,
}

impl Default for TickGate {
    fn default() -> Self {
        Self::new(TICK_PERIOD_MS)
    }
}

impl TickGate {
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms,
            last_tick_ms: None,
        }
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// Time of the last step that went through
    pub fn last_tick_ms(&self) -> Option<u64> {
        self.last_tick_ms
    }

    /// Whether a step is due at `now_ms`. The first poll is always due.
    pub fn is_due(&self, now_ms: u64) -> bool {
        match self.last_tick_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.period_ms,
        }
    }

    /// Consume a step if one is due. The next step is measured from `now_ms`,
    /// not from the ideal schedule, so no drift is carried over.
    pub fn try_advance(&mut self, now_ms: u64) -> bool {
        if !self.is_due(now_ms) {
            return false;
        }
        self.last_tick_ms = Some(now_ms);
        true
    }
}
