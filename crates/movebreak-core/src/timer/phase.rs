use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Work,
    Break,
}

impl Phase {
    /// The phase that follows this one. Phases strictly alternate.
    pub fn next(self) -> Self {
        match self {
            Phase::Work => Phase::Break,
            Phase::Break => Phase::Work,
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            Phase::Work => "Let's get to work!",
            Phase::Break => "Get up and take a break!",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Work => "work",
            Phase::Break => "break",
        }
    }
}

/// Lengths of the two phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDurations {
    pub work_secs: u64,
    pub break_secs: u64,
}

impl PhaseDurations {
    /// Uses saturating arithmetic so absurd minute counts cannot overflow.
    pub fn from_minutes(work_minutes: u32, break_minutes: u32) -> Self {
        Self {
            work_secs: u64::from(work_minutes).saturating_mul(60),
            break_secs: u64::from(break_minutes).saturating_mul(60),
        }
    }

    pub fn for_phase(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Work => self.work_secs,
            Phase::Break => self.break_secs,
        }
    }
}

/// Point-in-time view of the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub phase: Phase,
    pub remaining_secs: u64,
    pub running: bool,
}

/// Render seconds as `H:MM:SS`, dropping the hour segment when it is zero.
pub fn format_remaining(seconds: u64) -> String {
    let hours = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}:{mins:02}:{secs:02}")
    } else {
        format!("{mins:02}:{secs:02}")
    }
}
