//! Starter exercise catalog bundled with the library.

use std::time::Duration;

use log::info;
use serde::Deserialize;

use crate::db::{Store, operations};
use crate::domain::{Exercise, ExerciseId, Name, WriteMode};
use crate::error::{Result, StoreError};

const CATALOG: &str = include_str!("../seed/exercises.json");

#[derive(Debug, Deserialize)]
struct SeedExercise {
    id: String,
    name: String,
    description: String,
    target_muscles: Vec<String>,
    equipment: Vec<String>,
    default_sets: u32,
    default_reps: u32,
    default_rest_secs: u64,
    thumbnail_url: Option<String>,
    difficulty: String,
}

impl TryFrom<SeedExercise> for Exercise {
    type Error = StoreError;

    fn try_from(seed: SeedExercise) -> Result<Self> {
        let exercise = Exercise {
            id: ExerciseId::new(&seed.id)?,
            name: Name::new(&seed.name)?,
            description: seed.description,
            target_muscles: seed.target_muscles,
            equipment: seed.equipment,
            default_sets: seed.default_sets,
            default_reps: seed.default_reps,
            default_rest: Duration::from_secs(seed.default_rest_secs),
            thumbnail_url: seed.thumbnail_url,
            difficulty: seed.difficulty.parse()?,
        };
        exercise.validate()?;
        Ok(exercise)
    }
}

/// The bundled catalog, in file order.
pub fn catalog() -> Result<Vec<Exercise>> {
    let entries: Vec<SeedExercise> = serde_json::from_str(CATALOG)
        .map_err(|e| StoreError::InvalidArgument(format!("bundled catalog: {e}")))?;
    entries.into_iter().map(Exercise::try_from).collect()
}

/// Inserts every catalog exercise not yet in the store, in one transaction.
/// Returns how many were added; existing entries are left untouched.
pub fn seed_catalog(store: &Store) -> Result<usize> {
    let exercises = catalog()?;
    let inserted = store.write(|conn| {
        let mut inserted = 0;
        for exercise in &exercises {
            if !operations::exercise_exists(conn, &exercise.id)? {
                operations::put_exercise(conn, exercise, WriteMode::CreateOnly)?;
                inserted += 1;
            }
        }
        Ok(inserted)
    })?;

    info!(
        "Seeded {inserted} of {} catalog exercises",
        exercises.len()
    );
    Ok(inserted)
}
