//! Session run loop.
//!
//! A session owns one [`PhaseController`] and feeds it from three channels:
//! clock ticks, exercise completions and user commands. Everything runs on a
//! single task, so the controller never sees two events at once. Pending ticks
//! are always drained before completions, which means a network result is
//! applied only after every tick that fired while it was in flight.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::alarm::Alarm;
use crate::controller::PhaseController;
use crate::events::Event;
use crate::exercises::{Completion, ExerciseApi, ExerciseRotator, FilterContext, UserId};
use crate::notify::NotificationSink;
use crate::timer::{Clock, PhaseDurations, Tick, TickSource};

/// User actions accepted by a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Reset,
    Next,
    Block,
    Shutdown,
}

/// Everything a session needs from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub durations: PhaseDurations,
    pub user_id: Option<UserId>,
    pub filter: FilterContext,
}

/// Sending side of a session's command channel.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl SessionHandle {
    /// Queue a command. Returns `false` once the session has ended.
    pub fn send(&self, command: Command) -> bool {
        self.commands.send(command).is_ok()
    }
}

pub struct Session<C = Clock> {
    controller: PhaseController<C>,
    ticks: mpsc::UnboundedReceiver<Tick>,
    completions: mpsc::UnboundedReceiver<Completion>,
    commands: mpsc::UnboundedReceiver<Command>,
}

impl Session {
    /// Wire up a session. Returns the session, a handle for commands and the
    /// receiver for display events.
    pub fn new(
        settings: SessionSettings,
        client: Arc<dyn ExerciseApi>,
        notifier: Arc<dyn NotificationSink>,
        alarm: Arc<dyn Alarm>,
    ) -> (Self, SessionHandle, mpsc::UnboundedReceiver<Event>) {
        let (tick_tx, ticks) = mpsc::unbounded_channel();
        let (completion_tx, completions) = mpsc::unbounded_channel();
        let (command_tx, commands) = mpsc::unbounded_channel();
        let (event_tx, events) = mpsc::unbounded_channel();

        let rotator = ExerciseRotator::new(client, settings.filter, notifier, completion_tx);
        let controller = PhaseController::new(
            settings.durations,
            settings.user_id,
            Clock::new(tick_tx),
            rotator,
            alarm,
            event_tx,
        );

        let session = Self::from_parts(controller, ticks, completions, commands);
        (session, SessionHandle { commands: command_tx }, events)
    }
}

impl<C: TickSource> Session<C> {
    /// Assemble a session around an existing controller. The receivers must
    /// be the other ends of the channels handed to its clock and rotator.
    pub fn from_parts(
        controller: PhaseController<C>,
        ticks: mpsc::UnboundedReceiver<Tick>,
        completions: mpsc::UnboundedReceiver<Completion>,
        commands: mpsc::UnboundedReceiver<Command>,
    ) -> Self {
        Self {
            controller,
            ticks,
            completions,
            commands,
        }
    }

    pub fn controller(&self) -> &PhaseController<C> {
        &self.controller
    }

    /// Drive the session until [`Command::Shutdown`] arrives or every handle
    /// is dropped.
    pub async fn run(mut self) {
        self.controller.announce();
        loop {
            tokio::select! {
                biased;

                Some(tick) = self.ticks.recv() => self.controller.on_tick(tick),
                Some(completion) = self.completions.recv() => {
                    self.controller.on_completion(completion);
                }
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.dispatch(command),
                },
            }
        }
        tracing::info!("session ended");
    }

    fn dispatch(&mut self, command: Command) {
        tracing::debug!(?command, "command received");
        match command {
            Command::Start => {
                self.controller.start();
            }
            Command::Reset => self.controller.reset(),
            Command::Next => {
                self.controller.next_exercise();
            }
            Command::Block => {
                self.controller.block_current();
            }
            Command::Shutdown => {}
        }
    }
}
