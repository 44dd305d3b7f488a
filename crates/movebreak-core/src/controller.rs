//! Work/break state machine.
//!
//! ## Transitions
//!
//! ```text
//! Work --start--> Work (counting)
//! Work --expired--> Break (counting, exercises fetched)
//! Break --expired--> Work (stopped)
//! any --reset--> Work (stopped, start re-armed)
//! ```
//!
//! `start` is accepted once per reset.
//!
//! The controller owns the countdown and the phase durations. It never talks
//! to the backend itself; it signals the rotator and turns whatever the
//! rotator hands back into [`Event`]s.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;

use crate::alarm::Alarm;
use crate::events::Event;
use crate::exercises::{Completion, Exercise, ExerciseRotator, UserId};
use crate::timer::{format_remaining, Phase, PhaseDurations, PhaseTimer, Tick, TickSource, TimerState};

pub struct PhaseController<C> {
    phase: Phase,
    durations: PhaseDurations,
    user_id: Option<UserId>,
    timer: PhaseTimer<C>,
    rotator: ExerciseRotator,
    alarm: Arc<dyn Alarm>,
    events: mpsc::UnboundedSender<Event>,
    controls_enabled: bool,
    start_armed: bool,
}

impl<C: TickSource> PhaseController<C> {
    /// Starts idle in [`Phase::Work`] with the full work duration on display.
    pub fn new(
        durations: PhaseDurations,
        user_id: Option<UserId>,
        clock: C,
        rotator: ExerciseRotator,
        alarm: Arc<dyn Alarm>,
        events: mpsc::UnboundedSender<Event>,
    ) -> Self {
        let mut timer = PhaseTimer::new(clock);
        timer.reset(durations.work_secs);
        Self {
            phase: Phase::Work,
            durations,
            user_id,
            timer,
            rotator,
            alarm,
            events,
            controls_enabled: false,
            start_armed: true,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> TimerState {
        TimerState {
            phase: self.phase,
            remaining_secs: self.timer.remaining_secs(),
            running: self.timer.is_running(),
        }
    }

    pub fn durations(&self) -> PhaseDurations {
        self.durations
    }

    /// `start` is accepted once after construction or a reset, and never
    /// while the countdown is running.
    pub fn can_start(&self) -> bool {
        self.start_armed && !self.timer.is_running()
    }

    /// Blocking needs a signed-in user.
    pub fn can_block(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn rotator(&self) -> &ExerciseRotator {
        &self.rotator
    }

    pub fn timer(&self) -> &PhaseTimer<C> {
        &self.timer
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Emit the initial display: idle countdown and exercise controls off.
    pub fn announce(&self) {
        self.emit_tick(self.timer.remaining_secs());
        self.emit(Event::ExerciseControls {
            enabled: false,
            can_block: self.can_block(),
            at: Utc::now(),
        });
    }

    /// Begin counting down the current phase. Refused while already running
    /// and until the next reset once used.
    pub fn start(&mut self) -> bool {
        if self.timer.is_running() {
            tracing::warn!(phase = self.phase.as_str(), "start ignored: timer already running");
            return false;
        }
        if !self.start_armed {
            tracing::warn!(phase = self.phase.as_str(), "start ignored: reset required");
            return false;
        }
        self.start_armed = false;
        let duration_secs = self.durations.for_phase(self.phase);
        self.timer.begin(duration_secs);
        tracing::info!(phase = self.phase.as_str(), duration_secs, "timer started");
        self.emit(Event::TimerStarted {
            phase: self.phase,
            duration_secs,
            at: Utc::now(),
        });
        true
    }

    /// Stop, rewind to a fresh work phase and hide the exercise panel.
    pub fn reset(&mut self) {
        let from = self.phase;
        let shown = self.timer.reset(self.durations.work_secs);
        self.phase = Phase::Work;
        self.rotator.reset();
        self.controls_enabled = false;
        self.start_armed = true;
        tracing::info!(from = from.as_str(), "timer reset");

        self.emit(Event::TimerReset { at: Utc::now() });
        if from != Phase::Work {
            self.emit_phase_changed(from);
        }
        self.emit_tick(shown);
        self.emit(Event::ExercisePanelHidden { at: Utc::now() });
        self.emit(Event::ExerciseControls {
            enabled: false,
            can_block: self.can_block(),
            at: Utc::now(),
        });
    }

    pub fn on_tick(&mut self, tick: Tick) {
        let Some(step) = self.timer.on_tick(tick) else {
            return;
        };
        self.emit_tick(step.remaining_secs);
        if step.expired {
            self.on_phase_expired();
        }
    }

    pub fn on_completion(&mut self, completion: Completion) {
        match self.rotator.apply(completion) {
            Some(exercise) => self.show(exercise),
            None => self.restore_held_exercise(),
        }
    }

    /// Show the next exercise in the rotation. Only meaningful during a break.
    ///
    /// With nothing loaded, or after a failed fetch, this asks the backend
    /// again instead; the fetched exercise is shown when it arrives.
    pub fn next_exercise(&mut self) -> bool {
        if self.phase == Phase::Break && self.rotator.needs_refresh() {
            tracing::info!("retrying exercise fetch");
            return self.rotator.refresh();
        }
        if !self.exercise_controls_usable("next") {
            return false;
        }
        match self.rotator.advance().cloned() {
            Some(exercise) => {
                self.show(exercise);
                true
            }
            None => false,
        }
    }

    /// Block the exercise on display for the configured user.
    pub fn block_current(&mut self) -> bool {
        let Some(user_id) = self.user_id else {
            tracing::warn!("block ignored: no signed-in user");
            return false;
        };
        if !self.exercise_controls_usable("block") {
            return false;
        }
        let Some(exercise_id) = self.rotator.current().map(|e| e.id) else {
            return false;
        };
        self.rotator.block(user_id, exercise_id)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn on_phase_expired(&mut self) {
        if let Err(e) = self.alarm.play() {
            tracing::warn!(error = %e, "alarm failed");
        }

        let from = self.phase;
        self.phase = from.next();
        tracing::info!(from = from.as_str(), to = self.phase.as_str(), "phase changed");
        self.emit_phase_changed(from);

        match self.phase {
            Phase::Break => {
                let duration_secs = self.durations.break_secs;
                self.timer.begin(duration_secs);
                self.emit(Event::TimerStarted {
                    phase: Phase::Break,
                    duration_secs,
                    at: Utc::now(),
                });
                self.emit_tick(duration_secs);
                self.rotator.refresh();
            }
            Phase::Work => {
                self.rotator.reset();
                let shown = self.timer.reset(self.durations.work_secs);
                self.emit_tick(shown);
                self.controls_enabled = false;
                self.emit(Event::ExerciseControls {
                    enabled: false,
                    can_block: self.can_block(),
                    at: Utc::now(),
                });
            }
        }
    }

    /// A failed fetch leaves the previous queue in place. During a break that
    /// queue stays usable.
    fn restore_held_exercise(&mut self) {
        if self.phase != Phase::Break
            || self.controls_enabled
            || self.rotator.is_busy()
            || self.rotator.is_empty()
        {
            return;
        }
        if let Some(exercise) = self.rotator.current().cloned() {
            self.show(exercise);
        }
    }

    fn exercise_controls_usable(&self, action: &str) -> bool {
        if self.phase != Phase::Break || !self.controls_enabled {
            tracing::warn!(action, phase = self.phase.as_str(), "exercise control unavailable");
            return false;
        }
        if self.rotator.is_empty() {
            tracing::warn!(action, "exercise control unavailable: no exercises loaded");
            return false;
        }
        true
    }

    fn show(&mut self, exercise: Exercise) {
        if self.phase != Phase::Break {
            tracing::debug!(exercise = %exercise.id, "not showing exercise outside a break");
            return;
        }
        self.emit(Event::ExerciseShown {
            exercise,
            at: Utc::now(),
        });
        if !self.controls_enabled {
            self.controls_enabled = true;
            self.emit(Event::ExerciseControls {
                enabled: true,
                can_block: self.can_block(),
                at: Utc::now(),
            });
        }
    }

    fn emit_tick(&self, remaining_secs: u64) {
        self.emit(Event::TimerTick {
            phase: self.phase,
            remaining_secs,
            display: format_remaining(remaining_secs),
            at: Utc::now(),
        });
    }

    fn emit_phase_changed(&self, from: Phase) {
        self.emit(Event::PhaseChanged {
            from,
            to: self.phase,
            headline: self.phase.headline().to_string(),
            at: Utc::now(),
        });
    }

    fn emit(&self, event: Event) {
        if self.events.send(event).is_err() {
            tracing::debug!("event receiver dropped");
        }
    }
}
