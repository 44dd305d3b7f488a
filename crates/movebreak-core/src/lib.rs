//! # Movebreak Core Library
//!
//! Core logic for Movebreak, a work/break interval timer that suggests
//! exercises during breaks. Front ends (the `movebreak` CLI) are thin layers
//! over this crate.
//!
//! ## Architecture
//!
//! - **Timer**: a one-second [`Clock`] feeding a [`PhaseTimer`] countdown
//! - **Controller**: the Work/Break state machine ([`PhaseController`])
//! - **Exercises**: backend client and the cyclic [`ExerciseRotator`]
//! - **Session**: single-task event loop tying it all together
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Session`]: run loop; accepts [`Command`]s and emits [`Event`]s
//! - [`ExerciseApi`]: trait for exercise backends
//! - [`NotificationSink`]: where warnings and errors end up
//! - [`Config`]: application configuration management

pub mod alarm;
pub mod controller;
pub mod error;
pub mod events;
pub mod exercises;
pub mod notify;
pub mod session;
pub mod storage;
pub mod timer;

pub use alarm::{Alarm, SilentAlarm, TerminalBell};
pub use controller::PhaseController;
pub use error::{AlarmError, ClientError, ConfigError, CoreError};
pub use events::Event;
pub use exercises::{
    Completion, Exercise, ExerciseApi, ExerciseBatch, ExerciseId, ExerciseRotator, FilterContext,
    HttpExerciseClient, UserId,
};
pub use notify::{Notice, NoticeBoard, NoticeLevel, NotificationSink};
pub use session::{Command, Session, SessionHandle, SessionSettings};
pub use storage::Config;
pub use timer::{format_remaining, Clock, Phase, PhaseDurations, PhaseTimer, Tick, TickSource, TimerState};
