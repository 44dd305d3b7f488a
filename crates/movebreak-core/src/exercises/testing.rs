//! Scripted backend for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::client::ExerciseApi;
use super::types::{Exercise, ExerciseBatch, ExerciseId, FilterContext, UserId};
use crate::error::ClientError;

/// Replays queued responses in order. Runs out into network errors.
#[derive(Default)]
pub(crate) struct ScriptedApi {
    fetches: Mutex<VecDeque<Result<ExerciseBatch, ClientError>>>,
    blocks: Mutex<VecDeque<Result<(), ClientError>>>,
    fetch_calls: AtomicUsize,
    block_calls: AtomicUsize,
}

impl ScriptedApi {
    pub fn push_fetch(&self, result: Result<ExerciseBatch, ClientError>) {
        self.fetches.lock().unwrap().push_back(result);
    }

    pub fn push_block(&self, result: Result<(), ClientError>) {
        self.blocks.lock().unwrap().push_back(result);
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn block_calls(&self) -> usize {
        self.block_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExerciseApi for ScriptedApi {
    async fn fetch_exercises(&self, _filter: &FilterContext) -> Result<ExerciseBatch, ClientError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.fetches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Network("no scripted fetch".into())))
    }

    async fn block_exercise(
        &self,
        _user_id: UserId,
        _exercise_id: ExerciseId,
    ) -> Result<(), ClientError> {
        self.block_calls.fetch_add(1, Ordering::SeqCst);
        self.blocks
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Network("no scripted block".into())))
    }
}

pub(crate) fn exercise(id: u64) -> Exercise {
    Exercise {
        id: ExerciseId(id),
        name: format!("exercise {id}"),
        image_url: format!("https://cdn.example/{id}.gif"),
        instructions: vec![format!("do exercise {id}")],
        equipment: None,
        target: None,
    }
}

pub(crate) fn batch(ids: &[u64], exercises_found: bool) -> ExerciseBatch {
    ExerciseBatch {
        exercises: ids.iter().copied().map(exercise).collect(),
        exercises_found,
    }
}
