//! The seam the rest of the application talks to. Errors from the store are
//! passed through unchanged after being logged.

use log::{debug, error, warn};

use crate::db::Store;
use crate::domain::{
    Exercise, ExerciseFilter, ExerciseId, ExerciseSet, Workout, WorkoutExercise, WorkoutFilter,
    WorkoutId, WriteMode,
};
use crate::error::{Result, StoreError};
use crate::read_model::WorkoutWithExercises;

pub trait ExerciseRepository {
    fn create_exercise(&self, exercise: Exercise) -> Result<Exercise>;
    fn get_exercise(&self, id: &ExerciseId) -> Result<Exercise>;
    fn list_exercises(&self, filter: &ExerciseFilter) -> Result<Vec<Exercise>>;
    fn update_exercise(&self, exercise: Exercise) -> Result<Exercise>;
    fn delete_exercise(&self, id: &ExerciseId) -> Result<()>;
}

pub trait WorkoutRepository {
    fn create_workout(&self, workout: Workout) -> Result<Workout>;
    fn get_workout(&self, id: &WorkoutId) -> Result<Workout>;
    fn list_workouts(&self, filter: &WorkoutFilter) -> Result<Vec<Workout>>;
    fn update_workout(&self, workout: Workout) -> Result<Workout>;
    fn delete_workout(&self, id: &WorkoutId) -> Result<()>;
    fn add_exercise(
        &self,
        workout_id: &WorkoutId,
        exercise_id: &ExerciseId,
        position: u32,
    ) -> Result<WorkoutExercise>;
    fn remove_exercise(&self, association_id: i64) -> Result<()>;
    fn reorder(&self, workout_id: &WorkoutId, new_order: &[i64]) -> Result<()>;
    fn next_position(&self, workout_id: &WorkoutId) -> Result<u32>;
    fn get_with_exercises(&self, id: &WorkoutId) -> Result<WorkoutWithExercises>;
    fn log_set(
        &self,
        association_id: i64,
        weight_kg: f64,
        reps: u32,
        completed: bool,
    ) -> Result<ExerciseSet>;
    fn update_set(
        &self,
        set_id: i64,
        weight_kg: f64,
        reps: u32,
        completed: bool,
    ) -> Result<ExerciseSet>;
    fn delete_set(&self, set_id: i64) -> Result<()>;
}

macro_rules! log_on_error {
    ($result: expr, $action: literal, $entity: literal) => {{
        let result = $result;
        if let Err(ref err) = result {
            match err {
                StoreError::NotFound(_) => debug!("failed to {} {}: {err}", $action, $entity),
                StoreError::StorageUnavailable(_) => {
                    warn!("failed to {} {}: {err}", $action, $entity)
                }
                _ => error!("failed to {} {}: {err}", $action, $entity),
            }
        }
        result
    }};
}

#[derive(Clone)]
pub struct Repository {
    store: Store,
}

impl Repository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }
}

impl ExerciseRepository for Repository {
    fn create_exercise(&self, exercise: Exercise) -> Result<Exercise> {
        log_on_error!(
            self.store
                .put_exercise(&exercise, WriteMode::CreateOnly)
                .map(|()| exercise),
            "create",
            "exercise"
        )
    }

    fn get_exercise(&self, id: &ExerciseId) -> Result<Exercise> {
        log_on_error!(self.store.get_exercise(id), "get", "exercise")
    }

    fn list_exercises(&self, filter: &ExerciseFilter) -> Result<Vec<Exercise>> {
        log_on_error!(self.store.list_exercises(filter), "list", "exercises")
    }

    fn update_exercise(&self, exercise: Exercise) -> Result<Exercise> {
        log_on_error!(
            self.store
                .put_exercise(&exercise, WriteMode::UpdateOnly)
                .map(|()| exercise),
            "update",
            "exercise"
        )
    }

    fn delete_exercise(&self, id: &ExerciseId) -> Result<()> {
        log_on_error!(self.store.delete_exercise(id), "delete", "exercise")
    }
}

impl WorkoutRepository for Repository {
    fn create_workout(&self, workout: Workout) -> Result<Workout> {
        log_on_error!(
            self.store.put_workout(&workout, WriteMode::CreateOnly),
            "create",
            "workout"
        )
    }

    fn get_workout(&self, id: &WorkoutId) -> Result<Workout> {
        log_on_error!(self.store.get_workout(id), "get", "workout")
    }

    fn list_workouts(&self, filter: &WorkoutFilter) -> Result<Vec<Workout>> {
        log_on_error!(self.store.list_workouts(filter), "list", "workouts")
    }

    fn update_workout(&self, workout: Workout) -> Result<Workout> {
        log_on_error!(
            self.store.put_workout(&workout, WriteMode::UpdateOnly),
            "update",
            "workout"
        )
    }

    fn delete_workout(&self, id: &WorkoutId) -> Result<()> {
        log_on_error!(self.store.delete_workout(id), "delete", "workout")
    }

    fn add_exercise(
        &self,
        workout_id: &WorkoutId,
        exercise_id: &ExerciseId,
        position: u32,
    ) -> Result<WorkoutExercise> {
        log_on_error!(
            self.store
                .add_exercise_to_workout(workout_id, exercise_id, position),
            "add",
            "workout exercise"
        )
    }

    fn remove_exercise(&self, association_id: i64) -> Result<()> {
        log_on_error!(
            self.store.remove_exercise_from_workout(association_id),
            "remove",
            "workout exercise"
        )
    }

    fn reorder(&self, workout_id: &WorkoutId, new_order: &[i64]) -> Result<()> {
        log_on_error!(
            self.store.reorder_workout_exercises(workout_id, new_order),
            "reorder",
            "workout exercises"
        )
    }

    fn next_position(&self, workout_id: &WorkoutId) -> Result<u32> {
        log_on_error!(
            self.store.next_free_position(workout_id),
            "get",
            "next position"
        )
    }

    fn get_with_exercises(&self, id: &WorkoutId) -> Result<WorkoutWithExercises> {
        log_on_error!(
            self.store.get_workout_with_exercises(id),
            "get",
            "workout with exercises"
        )
    }

    fn log_set(
        &self,
        association_id: i64,
        weight_kg: f64,
        reps: u32,
        completed: bool,
    ) -> Result<ExerciseSet> {
        log_on_error!(
            self.store.log_set(association_id, weight_kg, reps, completed),
            "log",
            "set"
        )
    }

    fn update_set(
        &self,
        set_id: i64,
        weight_kg: f64,
        reps: u32,
        completed: bool,
    ) -> Result<ExerciseSet> {
        log_on_error!(
            self.store.update_set(set_id, weight_kg, reps, completed),
            "update",
            "set"
        )
    }

    fn delete_set(&self, set_id: i64) -> Result<()> {
        log_on_error!(self.store.delete_set(set_id), "delete", "set")
    }
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::domain::{Difficulty, Name};

    fn repository() -> Repository {
        Repository::new(Store::open_in_memory().unwrap())
    }

    fn plank() -> Exercise {
        Exercise::new(
            ExerciseId::new("plank").unwrap(),
            Name::new("Plank").unwrap(),
            Difficulty::Beginner,
        )
    }

    #[test]
    fn test_create_twice_is_constraint_violation() {
        let repository = repository();
        repository.create_exercise(plank()).unwrap();

        assert!(matches!(
            repository.create_exercise(plank()),
            Err(StoreError::ConstraintViolation(_))
        ));
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let repository = repository();

        assert!(matches!(
            repository.update_exercise(plank()),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            repository.update_workout(Workout::new(
                WorkoutId::new("w1").unwrap(),
                Name::new("Core").unwrap(),
                Weekday::Wed,
            )),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_update_after_delete_does_not_recreate() {
        let repository = repository();
        let workout = repository
            .create_workout(Workout::new(
                WorkoutId::new("w1").unwrap(),
                Name::new("Core").unwrap(),
                Weekday::Wed,
            ))
            .unwrap();
        repository.create_exercise(plank()).unwrap();

        repository.delete_workout(&workout.id).unwrap();
        repository.delete_exercise(&plank().id).unwrap();

        assert!(matches!(
            repository.update_workout(workout.clone()),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            repository.update_exercise(plank()),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            repository.get_workout(&workout.id),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            repository.get_exercise(&plank().id),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_update_exercise_keeps_identity() {
        let repository = repository();
        repository.create_exercise(plank()).unwrap();

        let mut edited = plank();
        edited.description = "Hold a straight line".into();
        edited.default_sets = 4;
        repository.update_exercise(edited.clone()).unwrap();

        assert_eq!(repository.get_exercise(&edited.id).unwrap(), edited);
    }

    #[test]
    fn test_update_workout_bumps_updated_at_and_keeps_created_at() {
        let repository = repository();
        let created = repository
            .create_workout(Workout::new(
                WorkoutId::new("w1").unwrap(),
                Name::new("Core").unwrap(),
                Weekday::Wed,
            ))
            .unwrap();

        let mut edited = created.clone();
        edited.name = Name::new("Core & Cardio").unwrap();
        edited.created_at = created.created_at + chrono::TimeDelta::days(3);
        edited.updated_at = edited.created_at;
        let updated = repository.update_workout(edited).unwrap();

        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
        assert_eq!(repository.get_workout(&created.id).unwrap(), updated);
    }

    #[test]
    fn test_invalid_argument_passes_through() {
        let repository = repository();
        let mut exercise = plank();
        exercise.default_reps = 0;

        assert!(matches!(
            repository.create_exercise(exercise),
            Err(StoreError::InvalidArgument(_))
        ));
    }
}
