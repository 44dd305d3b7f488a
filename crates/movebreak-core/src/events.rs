use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::exercises::Exercise;
use crate::timer::Phase;

/// Every visible state change produces an Event.
/// The presentation layer consumes them from the session's event channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Countdown display update. `display` is `H:MM:SS` with zero hours omitted.
    TimerTick {
        phase: Phase,
        remaining_secs: u64,
        display: String,
        at: DateTime<Utc>,
    },
    TimerStarted {
        phase: Phase,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    PhaseChanged {
        from: Phase,
        to: Phase,
        headline: String,
        at: DateTime<Utc>,
    },
    ExerciseShown {
        exercise: Exercise,
        at: DateTime<Utc>,
    },
    /// Whether next/block controls are usable.
    ExerciseControls {
        enabled: bool,
        /// Block additionally needs a signed-in user.
        can_block: bool,
        at: DateTime<Utc>,
    },
    ExercisePanelHidden {
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::TimerTick { at, .. }
            | Event::TimerStarted { at, .. }
            | Event::TimerReset { at }
            | Event::PhaseChanged { at, .. }
            | Event::ExerciseShown { at, .. }
            | Event::ExerciseControls { at, .. }
            | Event::ExercisePanelHidden { at } => *at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = Event::PhaseChanged {
            from: Phase::Work,
            to: Phase::Break,
            headline: Phase::Break.headline().into(),
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "PhaseChanged");
        assert_eq!(json["to"], "break");
    }
}
