//! Workout-with-exercises view, assembled from the base tables on every read.

use std::fmt;

use diesel::SqliteConnection;
use log::warn;

use crate::db::{Store, operations};
use crate::domain::{Exercise, ExerciseId, ExerciseSet, Workout, WorkoutExercise, WorkoutId};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseWithSets {
    pub association: WorkoutExercise,
    pub exercise: Exercise,
    pub sets: Vec<ExerciseSet>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyWarning {
    /// The entry points at an exercise that no longer exists; it was left out.
    MissingExercise {
        association_id: i64,
        exercise_id: ExerciseId,
    },
}

impl fmt::Display for ConsistencyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsistencyWarning::MissingExercise {
                association_id,
                exercise_id,
            } => write!(
                f,
                "workout entry {association_id} references missing exercise {exercise_id}"
            ),
        }
    }
}

/// Point-in-time snapshot of a workout and its exercises in position order.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutWithExercises {
    pub workout: Workout,
    pub exercises: Vec<ExerciseWithSets>,
    pub warnings: Vec<ConsistencyWarning>,
}

impl WorkoutWithExercises {
    pub fn exercise_ids(&self) -> Vec<&ExerciseId> {
        self.exercises.iter().map(|e| &e.exercise.id).collect()
    }

    pub fn is_consistent(&self) -> bool {
        self.warnings.is_empty()
    }
}

pub(crate) fn assemble(
    conn: &mut SqliteConnection,
    workout_id: &WorkoutId,
) -> Result<WorkoutWithExercises> {
    let workout = operations::get_workout(conn, workout_id)?;
    let associations = operations::workout_exercises(conn, workout_id)?;
    let catalog = operations::exercises_by_id(
        conn,
        associations.iter().map(|a| a.exercise_id.as_str()).collect(),
    )?;
    let mut sets = operations::sets_for_workout(conn, workout_id)?;

    let mut exercises = Vec::with_capacity(associations.len());
    let mut warnings = Vec::new();

    for association in associations {
        // The same exercise may sit at several positions.
        let Some(exercise) = catalog.get(association.exercise_id.as_str()).cloned() else {
            let warning = ConsistencyWarning::MissingExercise {
                association_id: association.id,
                exercise_id: association.exercise_id.clone(),
            };
            warn!("Workout {workout_id}: {warning}");
            warnings.push(warning);
            continue;
        };
        let sets = sets.remove(&association.id).unwrap_or_default();
        exercises.push(ExerciseWithSets {
            association,
            exercise,
            sets,
        });
    }
    Ok(WorkoutWithExercises {
        workout,
        exercises,
        warnings,
    })
}

impl Store {
    pub fn get_workout_with_exercises(&self, workout_id: &WorkoutId) -> Result<WorkoutWithExercises> {
        self.read(|conn| assemble(conn, workout_id))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;
    use diesel::connection::SimpleConnection;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::domain::{Difficulty, Name, WriteMode};

    fn store_with_workout(exercise_ids: &[&str]) -> (Store, WorkoutId) {
        let store = Store::open_in_memory().unwrap();
        let workout_id = WorkoutId::new("w1").unwrap();
        store
            .put_workout(
                &Workout::new(workout_id.clone(), Name::new("Full Body").unwrap(), Weekday::Mon),
                WriteMode::CreateOnly,
            )
            .unwrap();
        for (position, id) in exercise_ids.iter().enumerate() {
            let exercise_id = ExerciseId::new(id).unwrap();
            let exercise = Exercise::new(
                exercise_id.clone(),
                Name::new(&id.to_uppercase()).unwrap(),
                Difficulty::Beginner,
            );
            store.put_exercise(&exercise, WriteMode::Overwrite).unwrap();
            store
                .add_exercise_to_workout(&workout_id, &exercise_id, position as u32)
                .unwrap();
        }
        (store, workout_id)
    }

    fn ids(view: &WorkoutWithExercises) -> Vec<&str> {
        view.exercise_ids().into_iter().map(ExerciseId::as_str).collect()
    }

    #[test]
    fn test_sets_attached_to_their_entry() {
        let (store, workout_id) = store_with_workout(&["e1", "e2"]);
        let entries = store.workout_exercises(&workout_id).unwrap();
        store.log_set(entries[1].id, 60.0, 8, true).unwrap();
        store.log_set(entries[1].id, 62.5, 6, false).unwrap();

        let view = store.get_workout_with_exercises(&workout_id).unwrap();

        assert!(view.exercises[0].sets.is_empty());
        let sets: Vec<(u32, f64, u32, bool)> = view.exercises[1]
            .sets
            .iter()
            .map(|s| (s.set_index, s.weight_kg, s.reps, s.completed))
            .collect();
        assert_eq!(sets, vec![(1, 60.0, 8, true), (2, 62.5, 6, false)]);
    }

    #[test]
    fn test_repeated_exercise_appears_at_each_position() {
        let (store, workout_id) = store_with_workout(&["e1"]);
        store
            .add_exercise_to_workout(&workout_id, &ExerciseId::new("e1").unwrap(), 1)
            .unwrap();

        let view = store.get_workout_with_exercises(&workout_id).unwrap();

        assert_eq!(ids(&view), vec!["e1", "e1"]);
    }

    #[test]
    fn test_dangling_entry_is_omitted_with_warning() {
        let (store, workout_id) = store_with_workout(&["e1", "e2", "e3"]);
        let dangling = store.workout_exercises(&workout_id).unwrap()[1].id;
        {
            let mut pooled = store.conn().unwrap();
            let conn: &mut SqliteConnection = &mut pooled;
            conn.batch_execute(
                "PRAGMA foreign_keys = OFF; \
                 DELETE FROM exercises WHERE id = 'e2'; \
                 PRAGMA foreign_keys = ON;",
            )
            .unwrap();
        }

        let view = store.get_workout_with_exercises(&workout_id).unwrap();

        assert_eq!(ids(&view), vec!["e1", "e3"]);
        assert!(!view.is_consistent());
        assert_eq!(
            view.warnings,
            vec![ConsistencyWarning::MissingExercise {
                association_id: dangling,
                exercise_id: ExerciseId::new("e2").unwrap(),
            }]
        );
    }

    #[test]
    fn test_missing_workout_is_not_found() {
        let store = Store::open_in_memory().unwrap();
        assert!(matches!(
            store.get_workout_with_exercises(&WorkoutId::new("nope").unwrap()),
            Err(crate::error::StoreError::NotFound(_))
        ));
    }
}
