mod exercise;
mod id;
mod workout;

pub use exercise::{Difficulty, Exercise, ExerciseFilter};
pub use id::{ExerciseId, Name, WorkoutId};
pub(crate) use workout::bump;
pub use workout::{ExerciseSet, Workout, WorkoutExercise, WorkoutFilter, now};

/// Whether a put may insert a new record, replace an existing one, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    CreateOnly,
    /// Replace the record if it exists, insert it otherwise.
    Overwrite,
    /// Replace an existing record; a missing one is `NotFound`.
    UpdateOnly,
}
