//! One-second tick source.
//!
//! Each call to [`TickSource::start`] opens a new stream with a fresh
//! generation and cancels the previous one, so at most one stream is live.
//! Ticks that were already queued by a cancelled stream still carry the old
//! generation and are ignored by the countdown.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
}

pub trait TickSource: Send {
    /// Begin a new tick stream, replacing any running one. Returns the
    /// generation stamped on its ticks.
    fn start(&mut self) -> u64;

    /// Stop the current stream. Safe to call when nothing is running.
    fn stop(&mut self);
}

pub struct Clock {
    period: Duration,
    ticks: mpsc::UnboundedSender<Tick>,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl Clock {
    pub const PERIOD: Duration = Duration::from_secs(1);

    pub fn new(ticks: mpsc::UnboundedSender<Tick>) -> Self {
        Self::with_period(ticks, Self::PERIOD)
    }

    pub fn with_period(ticks: mpsc::UnboundedSender<Tick>, period: Duration) -> Self {
        Self {
            period,
            ticks,
            generation: 0,
            task: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl TickSource for Clock {
    fn start(&mut self) -> u64 {
        self.stop();
        self.generation += 1;

        let generation = self.generation;
        let period = self.period;
        let ticks = self.ticks.clone();
        self.task = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if ticks.send(Tick { generation }).is_err() {
                    break;
                }
            }
        }));
        generation
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Clock {
    fn drop(&mut self) {
        self.stop();
    }
}
