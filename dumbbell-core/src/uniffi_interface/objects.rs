use std::time::Duration;

use chrono::Weekday;

use crate::domain::{
    Difficulty, Exercise, ExerciseId, ExerciseSet, Name, Workout, WorkoutExercise,
};
use crate::error::StoreError;
use crate::read_model::{ExerciseWithSets, WorkoutWithExercises};
use crate::recommendation::Suggestion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl From<Difficulty> for DifficultyLevel {
    fn from(d: Difficulty) -> Self {
        match d {
            Difficulty::Beginner => DifficultyLevel::Beginner,
            Difficulty::Intermediate => DifficultyLevel::Intermediate,
            Difficulty::Advanced => DifficultyLevel::Advanced,
        }
    }
}

impl From<DifficultyLevel> for Difficulty {
    fn from(d: DifficultyLevel) -> Self {
        match d {
            DifficultyLevel::Beginner => Difficulty::Beginner,
            DifficultyLevel::Intermediate => Difficulty::Intermediate,
            DifficultyLevel::Advanced => Difficulty::Advanced,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

impl From<DayOfWeek> for Weekday {
    fn from(day: DayOfWeek) -> Self {
        match day {
            DayOfWeek::Monday => Weekday::Mon,
            DayOfWeek::Tuesday => Weekday::Tue,
            DayOfWeek::Wednesday => Weekday::Wed,
            DayOfWeek::Thursday => Weekday::Thu,
            DayOfWeek::Friday => Weekday::Fri,
            DayOfWeek::Saturday => Weekday::Sat,
            DayOfWeek::Sunday => Weekday::Sun,
        }
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct ExerciseRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub target_muscles: Vec<String>,
    pub equipment: Vec<String>,
    pub default_sets: u32,
    pub default_reps: u32,
    pub default_rest_ms: u64,
    pub thumbnail_url: Option<String>,
    pub difficulty: DifficultyLevel,
}

impl From<Exercise> for ExerciseRecord {
    fn from(e: Exercise) -> Self {
        ExerciseRecord {
            id: e.id.into(),
            name: e.name.to_string(),
            description: e.description,
            target_muscles: e.target_muscles,
            equipment: e.equipment,
            default_sets: e.default_sets,
            default_reps: e.default_reps,
            default_rest_ms: u64::try_from(e.default_rest.as_millis()).unwrap_or(u64::MAX),
            thumbnail_url: e.thumbnail_url,
            difficulty: e.difficulty.into(),
        }
    }
}

impl TryFrom<ExerciseRecord> for Exercise {
    type Error = StoreError;

    fn try_from(r: ExerciseRecord) -> Result<Self, StoreError> {
        Ok(Exercise {
            id: ExerciseId::new(&r.id)?,
            name: Name::new(&r.name)?,
            description: r.description,
            target_muscles: r.target_muscles,
            equipment: r.equipment,
            default_sets: r.default_sets,
            default_reps: r.default_reps,
            default_rest: Duration::from_millis(r.default_rest_ms),
            thumbnail_url: r.thumbnail_url,
            difficulty: r.difficulty.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct WorkoutRecord {
    pub id: String,
    pub name: String,
    pub day_of_week: DayOfWeek,
    pub target_muscle_groups: Vec<String>,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

impl From<Workout> for WorkoutRecord {
    fn from(w: Workout) -> Self {
        WorkoutRecord {
            id: w.id.into(),
            name: w.name.to_string(),
            day_of_week: w.day_of_week.into(),
            target_muscle_groups: w.target_muscle_groups,
            created_at_ms: w.created_at.timestamp_millis(),
            updated_at_ms: w.updated_at.timestamp_millis(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct WorkoutExerciseRecord {
    pub id: i64,
    pub workout_id: String,
    pub exercise_id: String,
    pub position: u32,
}

impl From<WorkoutExercise> for WorkoutExerciseRecord {
    fn from(a: WorkoutExercise) -> Self {
        WorkoutExerciseRecord {
            id: a.id,
            workout_id: a.workout_id.into(),
            exercise_id: a.exercise_id.into(),
            position: a.position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct ExerciseSetRecord {
    pub id: i64,
    pub workout_exercise_id: i64,
    pub set_index: u32,
    pub weight_kg: f64,
    pub reps: u32,
    pub completed: bool,
}

impl From<ExerciseSet> for ExerciseSetRecord {
    fn from(s: ExerciseSet) -> Self {
        ExerciseSetRecord {
            id: s.id,
            workout_exercise_id: s.workout_exercise_id,
            set_index: s.set_index,
            weight_kg: s.weight_kg,
            reps: s.reps,
            completed: s.completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct ExerciseWithSetsRecord {
    pub association: WorkoutExerciseRecord,
    pub exercise: ExerciseRecord,
    pub sets: Vec<ExerciseSetRecord>,
}

impl From<ExerciseWithSets> for ExerciseWithSetsRecord {
    fn from(e: ExerciseWithSets) -> Self {
        ExerciseWithSetsRecord {
            association: e.association.into(),
            exercise: e.exercise.into(),
            sets: e.sets.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct WorkoutWithExercisesRecord {
    pub workout: WorkoutRecord,
    pub exercises: Vec<ExerciseWithSetsRecord>,
    pub warnings: Vec<String>,
}

impl From<WorkoutWithExercises> for WorkoutWithExercisesRecord {
    fn from(view: WorkoutWithExercises) -> Self {
        WorkoutWithExercisesRecord {
            workout: view.workout.into(),
            exercises: view.exercises.into_iter().map(Into::into).collect(),
            warnings: view.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct SuggestionRecord {
    pub exercise: ExerciseRecord,
    pub matched_muscles: Vec<String>,
}

impl From<Suggestion> for SuggestionRecord {
    fn from(s: Suggestion) -> Self {
        SuggestionRecord {
            exercise: s.exercise.into(),
            matched_muscles: s.matched_muscles,
        }
    }
}
