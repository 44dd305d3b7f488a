mod client;
mod rotator;
mod types;

pub use client::{ExerciseApi, HttpExerciseClient};
pub use rotator::{
    Completion, ExerciseRotator, BLOCK_FAILED, BLOCK_UNAUTHORIZED, FETCH_FAILED, NO_MATCH_WARNING,
};
pub use types::{Exercise, ExerciseBatch, ExerciseId, FilterContext, UserId};

#[cfg(test)]
pub(crate) mod testing;
