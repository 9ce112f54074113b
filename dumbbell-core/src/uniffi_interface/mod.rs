//! Bindings for the mobile app. Every call hops onto the shared runtime's
//! blocking pool; the store itself stays synchronous.

pub mod errors;
pub mod logging;
pub mod objects;

use std::sync::OnceLock;

use log::debug;

use crate::config::StoreConfig;
use crate::db::Store;
use crate::domain::{ExerciseFilter, ExerciseId, Name, Workout, WorkoutFilter, WorkoutId};
use crate::recommendation::RecommendationEngine;
use crate::repository::{ExerciseRepository, Repository, WorkoutRepository};
use crate::runtime::run_blocking;
use crate::seed;
use errors::DumbbellError;
use objects::{
    DayOfWeek, ExerciseRecord, ExerciseSetRecord, SuggestionRecord, WorkoutExerciseRecord,
    WorkoutRecord, WorkoutWithExercisesRecord,
};

static REPOSITORY: OnceLock<Repository> = OnceLock::new();

fn repository() -> Result<Repository, DumbbellError> {
    REPOSITORY
        .get()
        .cloned()
        .ok_or_else(|| DumbbellError::StorageUnavailable {
            message: "database is not set up; call setup_database first".to_string(),
        })
}

#[uniffi::export]
async fn setup_database(path: String) -> Result<(), DumbbellError> {
    if REPOSITORY.get().is_some() {
        debug!("Database already set up, ignoring {path}");
        return Ok(());
    }

    let store = run_blocking(move || Store::open(&StoreConfig::new(path))).await?;
    if REPOSITORY.set(Repository::new(store)).is_err() {
        debug!("Database was set up concurrently, keeping the first store");
    }
    Ok(())
}

#[uniffi::export]
async fn seed_catalog() -> Result<u32, DumbbellError> {
    let repository = repository()?;
    let inserted = run_blocking(move || seed::seed_catalog(repository.store())).await?;
    Ok(u32::try_from(inserted).unwrap_or(u32::MAX))
}

#[uniffi::export]
async fn list_exercises(
    muscle: Option<String>,
    equipment: Option<String>,
) -> Result<Vec<ExerciseRecord>, DumbbellError> {
    let repository = repository()?;
    let filter = ExerciseFilter {
        muscle,
        equipment,
        difficulty: None,
    };
    let exercises = run_blocking(move || repository.list_exercises(&filter)).await?;
    Ok(exercises.into_iter().map(Into::into).collect())
}

#[uniffi::export]
async fn get_exercise(id: String) -> Result<ExerciseRecord, DumbbellError> {
    let repository = repository()?;
    let exercise =
        run_blocking(move || repository.get_exercise(&ExerciseId::new(&id)?)).await?;
    Ok(exercise.into())
}

#[uniffi::export]
async fn create_exercise(exercise: ExerciseRecord) -> Result<ExerciseRecord, DumbbellError> {
    let repository = repository()?;
    let created =
        run_blocking(move || repository.create_exercise(exercise.try_into()?)).await?;
    Ok(created.into())
}

#[uniffi::export]
async fn update_exercise(exercise: ExerciseRecord) -> Result<ExerciseRecord, DumbbellError> {
    let repository = repository()?;
    let updated =
        run_blocking(move || repository.update_exercise(exercise.try_into()?)).await?;
    Ok(updated.into())
}

#[uniffi::export]
async fn delete_exercise(id: String) -> Result<(), DumbbellError> {
    let repository = repository()?;
    run_blocking(move || repository.delete_exercise(&ExerciseId::new(&id)?)).await?;
    Ok(())
}

#[uniffi::export]
async fn list_workouts(day: Option<DayOfWeek>) -> Result<Vec<WorkoutRecord>, DumbbellError> {
    let repository = repository()?;
    let filter = WorkoutFilter {
        day_of_week: day.map(Into::into),
    };
    let workouts = run_blocking(move || repository.list_workouts(&filter)).await?;
    Ok(workouts.into_iter().map(Into::into).collect())
}

#[uniffi::export]
async fn create_workout(
    name: String,
    day: DayOfWeek,
    target_muscle_groups: Vec<String>,
) -> Result<WorkoutRecord, DumbbellError> {
    let repository = repository()?;
    let created = run_blocking(move || {
        let workout = Workout::new(WorkoutId::generate(), Name::new(&name)?, day.into())
            .with_target_muscle_groups(target_muscle_groups);
        repository.create_workout(workout)
    })
    .await?;
    Ok(created.into())
}

#[uniffi::export]
async fn update_workout(
    id: String,
    name: String,
    day: DayOfWeek,
    target_muscle_groups: Vec<String>,
) -> Result<WorkoutRecord, DumbbellError> {
    let repository = repository()?;
    let updated = run_blocking(move || {
        let mut workout = repository.get_workout(&WorkoutId::new(&id)?)?;
        workout.name = Name::new(&name)?;
        workout.day_of_week = day.into();
        workout.target_muscle_groups = target_muscle_groups;
        repository.update_workout(workout)
    })
    .await?;
    Ok(updated.into())
}

#[uniffi::export]
async fn delete_workout(id: String) -> Result<(), DumbbellError> {
    let repository = repository()?;
    run_blocking(move || repository.delete_workout(&WorkoutId::new(&id)?)).await?;
    Ok(())
}

/// Adds the exercise at `position`, or after the last entry when none is given.
#[uniffi::export]
async fn add_exercise_to_workout(
    workout_id: String,
    exercise_id: String,
    position: Option<u32>,
) -> Result<WorkoutExerciseRecord, DumbbellError> {
    let repository = repository()?;
    let added = run_blocking(move || {
        let workout_id = WorkoutId::new(&workout_id)?;
        let position = match position {
            Some(position) => position,
            None => repository.next_position(&workout_id)?,
        };
        repository.add_exercise(&workout_id, &ExerciseId::new(&exercise_id)?, position)
    })
    .await?;
    Ok(added.into())
}

#[uniffi::export]
async fn remove_exercise_from_workout(association_id: i64) -> Result<(), DumbbellError> {
    let repository = repository()?;
    run_blocking(move || repository.remove_exercise(association_id)).await?;
    Ok(())
}

#[uniffi::export]
async fn reorder_workout_exercises(
    workout_id: String,
    new_order: Vec<i64>,
) -> Result<(), DumbbellError> {
    let repository = repository()?;
    run_blocking(move || repository.reorder(&WorkoutId::new(&workout_id)?, &new_order)).await?;
    Ok(())
}

#[uniffi::export]
async fn get_workout_with_exercises(
    workout_id: String,
) -> Result<WorkoutWithExercisesRecord, DumbbellError> {
    let repository = repository()?;
    let view =
        run_blocking(move || repository.get_with_exercises(&WorkoutId::new(&workout_id)?))
            .await?;
    Ok(view.into())
}

#[uniffi::export]
async fn log_set(
    association_id: i64,
    weight_kg: f64,
    reps: u32,
    completed: bool,
) -> Result<ExerciseSetRecord, DumbbellError> {
    let repository = repository()?;
    let set =
        run_blocking(move || repository.log_set(association_id, weight_kg, reps, completed))
            .await?;
    Ok(set.into())
}

#[uniffi::export]
async fn suggest_exercises(
    workout_id: String,
    limit: u32,
) -> Result<Vec<SuggestionRecord>, DumbbellError> {
    let repository = repository()?;
    let suggestions = run_blocking(move || {
        RecommendationEngine::new(repository)
            .recommend_exercises(&WorkoutId::new(&workout_id)?, limit as usize)
    })
    .await?;
    Ok(suggestions.into_iter().map(Into::into).collect())
}
