//! Cyclic exercise queue.
//!
//! The rotator holds a shuffled copy of whatever the backend returned and
//! walks it with a cursor taken modulo the queue length, so "next" never runs
//! out. Network work is spawned onto the runtime and reported back as a
//! [`Completion`]; the owner feeds completions into [`ExerciseRotator::apply`]
//! on the same loop that drives everything else.
//!
//! ## Serialization
//!
//! Only one mutating operation (refresh, block, advance) runs at a time. A
//! mutation requested while a network call is in flight is rejected and
//! logged. [`ExerciseRotator::reset`] bumps the epoch; completions stamped
//! with an older epoch are dropped.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use tokio::sync::mpsc;

use super::client::ExerciseApi;
use super::types::{Exercise, ExerciseBatch, ExerciseId, FilterContext, UserId};
use crate::error::ClientError;
use crate::notify::NotificationSink;

pub const NO_MATCH_WARNING: &str = "No exercises found for current equipment/target settings. \
Please try adjusting your selections. Displaying default bodyweight exercises.";
pub const FETCH_FAILED: &str = "Could not retrieve exercises.";
pub const BLOCK_UNAUTHORIZED: &str = "Unauthorized to block exercise.";
pub const BLOCK_FAILED: &str = "Could not block exercise.";

/// Result of a network call started by the rotator.
#[derive(Debug)]
pub enum Completion {
    Fetched {
        epoch: u64,
        result: Result<ExerciseBatch, ClientError>,
    },
    Blocked {
        epoch: u64,
        exercise_id: ExerciseId,
        result: Result<(), ClientError>,
    },
}

impl Completion {
    pub fn epoch(&self) -> u64 {
        match self {
            Completion::Fetched { epoch, .. } | Completion::Blocked { epoch, .. } => *epoch,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingOp {
    Refresh,
    Block(ExerciseId),
}

pub struct ExerciseRotator {
    client: Arc<dyn ExerciseApi>,
    filter: FilterContext,
    notifier: Arc<dyn NotificationSink>,
    completions: mpsc::UnboundedSender<Completion>,
    queue: Vec<Exercise>,
    cursor: usize,
    epoch: u64,
    pending: Option<PendingOp>,
    fetch_failed: bool,
    rng: Pcg64,
}

impl ExerciseRotator {
    pub fn new(
        client: Arc<dyn ExerciseApi>,
        filter: FilterContext,
        notifier: Arc<dyn NotificationSink>,
        completions: mpsc::UnboundedSender<Completion>,
    ) -> Self {
        Self {
            client,
            filter,
            notifier,
            completions,
            queue: Vec::new(),
            cursor: 0,
            epoch: 0,
            pending: None,
            fetch_failed: false,
            rng: Pcg64::from_entropy(),
        }
    }

    /// Use a fixed shuffle seed.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = Pcg64::seed_from_u64(seed);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Whether a refresh or block is waiting on the backend.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether the queue is empty or the most recent fetch failed. Either
    /// way the next explicit request should go back to the backend.
    pub fn needs_refresh(&self) -> bool {
        self.queue.is_empty() || self.fetch_failed
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.queue
    }

    /// The exercise under the cursor.
    ///
    /// Calling this on an empty queue is a caller bug.
    pub fn current(&self) -> Option<&Exercise> {
        debug_assert!(!self.queue.is_empty(), "current() on an empty exercise queue");
        if self.queue.is_empty() {
            return None;
        }
        self.queue.get(self.cursor % self.queue.len())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Ask the backend for a fresh set. Returns `false` if another operation
    /// is still in flight.
    pub fn refresh(&mut self) -> bool {
        if let Some(op) = self.pending {
            tracing::warn!(?op, "refresh rejected: exercise operation in flight");
            return false;
        }
        self.pending = Some(PendingOp::Refresh);
        self.spawn_fetch();
        true
    }

    /// Step to the next exercise, wrapping after the last one.
    pub fn advance(&mut self) -> Option<&Exercise> {
        if let Some(op) = self.pending {
            tracing::warn!(?op, "advance rejected: exercise operation in flight");
            return None;
        }
        debug_assert!(!self.queue.is_empty(), "advance() on an empty exercise queue");
        if self.queue.is_empty() {
            return None;
        }
        self.step();
        self.current()
    }

    /// Persist a block for `exercise_id`. The queue is only touched once the
    /// backend acknowledges it.
    pub fn block(&mut self, user_id: UserId, exercise_id: ExerciseId) -> bool {
        if let Some(op) = self.pending {
            tracing::warn!(?op, %exercise_id, "block rejected: exercise operation in flight");
            return false;
        }
        self.pending = Some(PendingOp::Block(exercise_id));

        let client = Arc::clone(&self.client);
        let completions = self.completions.clone();
        let epoch = self.epoch;
        tokio::spawn(async move {
            let result = client.block_exercise(user_id, exercise_id).await;
            let completion = Completion::Blocked {
                epoch,
                exercise_id,
                result,
            };
            if completions.send(completion).is_err() {
                tracing::debug!(%exercise_id, "completion receiver dropped");
            }
        });
        true
    }

    /// Forget any in-flight operation. Its completion will be discarded.
    pub fn reset(&mut self) {
        self.epoch += 1;
        if let Some(op) = self.pending.take() {
            tracing::debug!(?op, epoch = self.epoch, "abandoning in-flight exercise operation");
        }
    }

    /// Fold a finished network call into the queue. Returns the exercise to
    /// display, if the completion produced a new one.
    pub fn apply(&mut self, completion: Completion) -> Option<Exercise> {
        if completion.epoch() != self.epoch {
            tracing::debug!(
                stale = completion.epoch(),
                current = self.epoch,
                "discarding stale exercise completion"
            );
            return None;
        }

        match completion {
            Completion::Fetched { result, .. } => {
                if self.pending != Some(PendingOp::Refresh) {
                    tracing::debug!("ignoring unrequested fetch completion");
                    return None;
                }
                self.pending = None;
                self.load(result)
            }
            Completion::Blocked {
                exercise_id,
                result,
                ..
            } => {
                if self.pending != Some(PendingOp::Block(exercise_id)) {
                    tracing::debug!(%exercise_id, "ignoring unrequested block completion");
                    return None;
                }
                self.pending = None;
                match result {
                    Ok(()) => self.remove_blocked(exercise_id),
                    Err(ClientError::Authorization { status }) => {
                        tracing::warn!(%exercise_id, status, "block rejected by backend");
                        self.notifier.error(BLOCK_UNAUTHORIZED);
                        None
                    }
                    Err(e) => {
                        tracing::warn!(%exercise_id, error = %e, "block request failed");
                        self.notifier.error(BLOCK_FAILED);
                        None
                    }
                }
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn spawn_fetch(&self) {
        let client = Arc::clone(&self.client);
        let filter = self.filter.clone();
        let completions = self.completions.clone();
        let epoch = self.epoch;
        tokio::spawn(async move {
            let result = client.fetch_exercises(&filter).await;
            if completions.send(Completion::Fetched { epoch, result }).is_err() {
                tracing::debug!("completion receiver dropped");
            }
        });
    }

    fn step(&mut self) {
        self.cursor = (self.cursor + 1) % self.queue.len();
    }

    fn load(&mut self, result: Result<ExerciseBatch, ClientError>) -> Option<Exercise> {
        let batch = match result {
            Ok(batch) => batch,
            Err(e) => {
                tracing::warn!(error = %e, "exercise fetch failed");
                self.fetch_failed = true;
                self.notifier.error(FETCH_FAILED);
                return None;
            }
        };
        self.fetch_failed = false;

        if !batch.exercises_found {
            self.notifier.warn(NO_MATCH_WARNING);
        }
        if batch.exercises.is_empty() {
            tracing::warn!(kept = self.queue.len(), "backend returned no exercises");
            return None;
        }

        let mut exercises = batch.exercises;
        exercises.shuffle(&mut self.rng);
        tracing::info!(count = exercises.len(), "exercise queue refreshed");
        self.queue = exercises;
        self.cursor = 0;
        self.current().cloned()
    }

    fn remove_blocked(&mut self, exercise_id: ExerciseId) -> Option<Exercise> {
        let Some(pos) = self.position_of(exercise_id) else {
            tracing::debug!(%exercise_id, "blocked exercise no longer queued");
            return None;
        };
        self.queue.remove(pos);

        if self.queue.is_empty() {
            self.cursor = 0;
            self.refresh();
            return None;
        }

        // Back up one slot so the step lands on the exercise that moved into `pos`.
        let len = self.queue.len();
        self.cursor = (pos + len - 1) % len;
        self.step();
        self.current().cloned()
    }

    fn position_of(&self, exercise_id: ExerciseId) -> Option<usize> {
        if self.queue.is_empty() {
            return None;
        }
        let at_cursor = self.cursor % self.queue.len();
        if self.queue[at_cursor].id == exercise_id {
            return Some(at_cursor);
        }
        self.queue.iter().position(|e| e.id == exercise_id)
    }
}
