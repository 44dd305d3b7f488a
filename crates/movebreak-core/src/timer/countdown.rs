//! Phase countdown.
//!
//! Turns clock ticks into a remaining-seconds countdown. The countdown never
//! goes below zero and reports expiry exactly once per [`PhaseTimer::begin`].
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = PhaseTimer::new(clock);
//! timer.begin(1500);
//! // For every tick the clock delivers:
//! if let Some(step) = timer.on_tick(tick) {
//!     render(step.remaining_secs);
//!     if step.expired { /* flip phase */ }
//! }
//! ```

use super::clock::{Tick, TickSource};

/// What one accepted tick did to the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownStep {
    pub remaining_secs: u64,
    /// Set on the tick that brought the countdown to zero.
    pub expired: bool,
}

pub struct PhaseTimer<C> {
    clock: C,
    remaining_secs: u64,
    running: bool,
    /// Generation of the clock stream this countdown listens to.
    generation: Option<u64>,
}

impl<C: TickSource> PhaseTimer<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            remaining_secs: 0,
            running: false,
            generation: None,
        }
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Start counting down from `duration_secs`.
    pub fn begin(&mut self, duration_secs: u64) {
        self.remaining_secs = duration_secs;
        self.running = true;
        self.generation = Some(self.clock.start());
    }

    /// Stop and rewind to `duration_secs` without expiring. Returns the value
    /// to display.
    pub fn reset(&mut self, duration_secs: u64) -> u64 {
        self.halt();
        self.remaining_secs = duration_secs;
        self.remaining_secs
    }

    /// Consume one tick. Ticks from an old clock stream, or arriving while
    /// stopped, are ignored.
    pub fn on_tick(&mut self, tick: Tick) -> Option<CountdownStep> {
        if !self.running || self.generation != Some(tick.generation) {
            return None;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        let expired = self.remaining_secs == 0;
        if expired {
            self.halt();
        }
        Some(CountdownStep {
            remaining_secs: self.remaining_secs,
            expired,
        })
    }

    fn halt(&mut self) {
        self.clock.stop();
        self.running = false;
        self.generation = None;
    }
}
