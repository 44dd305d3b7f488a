mod clock;
mod countdown;
mod phase;

pub use clock::{Clock, Tick, TickSource};
pub use countdown::{CountdownStep, PhaseTimer};
pub use phase::{format_remaining, Phase, PhaseDurations, TimerState};

#[cfg(test)]
pub(crate) use countdown::tests::ManualClock;
