use std::time::Duration;

use chrono::{DateTime, Utc, Weekday};
use diesel::prelude::*;

use crate::db::schema;
use crate::domain::{
    Difficulty, Exercise, ExerciseId, ExerciseSet, Name, Workout, WorkoutExercise, WorkoutId,
};
use crate::error::{Result, StoreError};

// Exercise rows
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = schema::exercises)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExerciseRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub target_muscles: String,
    pub equipment: String,
    pub default_sets: i32,
    pub default_reps: i32,
    pub default_rest_ms: i64,
    pub thumbnail_url: Option<String>,
    pub difficulty: String,
}

impl ExerciseRow {
    pub fn from_domain(exercise: &Exercise) -> Result<Self> {
        let rest_ms = i64::try_from(exercise.default_rest.as_millis()).map_err(|_| {
            StoreError::InvalidArgument(format!("exercise {}: rest time too long", exercise.id))
        })?;

        Ok(Self {
            id: exercise.id.to_string(),
            name: exercise.name.to_string(),
            description: exercise.description.clone(),
            target_muscles: encode_tags(&exercise.target_muscles)?,
            equipment: encode_tags(&exercise.equipment)?,
            default_sets: to_db_int(exercise.default_sets, "default set count")?,
            default_reps: to_db_int(exercise.default_reps, "default rep count")?,
            default_rest_ms: rest_ms,
            thumbnail_url: exercise.thumbnail_url.clone(),
            difficulty: exercise.difficulty.as_str().to_string(),
        })
    }
}

impl TryFrom<ExerciseRow> for Exercise {
    type Error = StoreError;

    fn try_from(row: ExerciseRow) -> Result<Self> {
        let corrupt = |detail: String| StoreError::corrupt("exercise", format!("{}: {detail}", row.id));

        Ok(Exercise {
            id: ExerciseId::new(&row.id).map_err(|e| corrupt(e.to_string()))?,
            name: Name::new(&row.name).map_err(|e| corrupt(e.to_string()))?,
            description: row.description.clone(),
            target_muscles: decode_tags(&row.target_muscles).map_err(&corrupt)?,
            equipment: decode_tags(&row.equipment).map_err(&corrupt)?,
            default_sets: from_db_int(row.default_sets).map_err(&corrupt)?,
            default_reps: from_db_int(row.default_reps).map_err(&corrupt)?,
            default_rest: u64::try_from(row.default_rest_ms)
                .map(Duration::from_millis)
                .map_err(|e| corrupt(e.to_string()))?,
            thumbnail_url: row.thumbnail_url.clone(),
            difficulty: row
                .difficulty
                .parse::<Difficulty>()
                .map_err(|e| corrupt(e.to_string()))?,
        })
    }
}

// Workout rows
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = schema::workouts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WorkoutRow {
    pub id: String,
    pub name: String,
    pub day_of_week: i32,
    pub target_muscle_groups: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl WorkoutRow {
    pub fn from_domain(workout: &Workout) -> Result<Self> {
        Ok(Self {
            id: workout.id.to_string(),
            name: workout.name.to_string(),
            day_of_week: weekday_to_db(workout.day_of_week),
            target_muscle_groups: encode_tags(&workout.target_muscle_groups)?,
            created_at: workout.created_at.timestamp_millis(),
            updated_at: workout.updated_at.timestamp_millis(),
        })
    }
}

impl TryFrom<WorkoutRow> for Workout {
    type Error = StoreError;

    fn try_from(row: WorkoutRow) -> Result<Self> {
        let corrupt = |detail: String| StoreError::corrupt("workout", format!("{}: {detail}", row.id));

        Ok(Workout {
            id: WorkoutId::new(&row.id).map_err(|e| corrupt(e.to_string()))?,
            name: Name::new(&row.name).map_err(|e| corrupt(e.to_string()))?,
            day_of_week: weekday_from_db(row.day_of_week).map_err(&corrupt)?,
            target_muscle_groups: decode_tags(&row.target_muscle_groups).map_err(&corrupt)?,
            created_at: timestamp_from_db(row.created_at).map_err(&corrupt)?,
            updated_at: timestamp_from_db(row.updated_at).map_err(&corrupt)?,
        })
    }
}

// Workout exercise rows
#[derive(Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = schema::workout_exercises)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WorkoutExerciseRow {
    pub id: i64,
    pub workout_id: String,
    pub exercise_id: String,
    pub position: i32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = schema::workout_exercises)]
pub struct NewWorkoutExercise<'a> {
    pub workout_id: &'a str,
    pub exercise_id: &'a str,
    pub position: i32,
}

impl TryFrom<WorkoutExerciseRow> for WorkoutExercise {
    type Error = StoreError;

    fn try_from(row: WorkoutExerciseRow) -> Result<Self> {
        let corrupt = |detail: String| {
            StoreError::corrupt("workout exercise", format!("{}: {detail}", row.id))
        };

        Ok(WorkoutExercise {
            id: row.id,
            workout_id: WorkoutId::new(&row.workout_id).map_err(|e| corrupt(e.to_string()))?,
            exercise_id: ExerciseId::new(&row.exercise_id).map_err(|e| corrupt(e.to_string()))?,
            position: from_db_int(row.position).map_err(&corrupt)?,
        })
    }
}

// Exercise set rows
#[derive(Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = schema::exercise_sets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExerciseSetRow {
    pub id: i64,
    pub workout_exercise_id: i64,
    pub set_index: i32,
    pub weight_kg: f64,
    pub reps: i32,
    pub completed: bool,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = schema::exercise_sets)]
pub struct NewExerciseSet {
    pub workout_exercise_id: i64,
    pub set_index: i32,
    pub weight_kg: f64,
    pub reps: i32,
    pub completed: bool,
}

impl TryFrom<ExerciseSetRow> for ExerciseSet {
    type Error = StoreError;

    fn try_from(row: ExerciseSetRow) -> Result<Self> {
        let corrupt =
            |detail: String| StoreError::corrupt("exercise set", format!("{}: {detail}", row.id));

        Ok(ExerciseSet {
            id: row.id,
            workout_exercise_id: row.workout_exercise_id,
            set_index: from_db_int(row.set_index).map_err(&corrupt)?,
            weight_kg: row.weight_kg,
            reps: from_db_int(row.reps).map_err(&corrupt)?,
            completed: row.completed,
        })
    }
}

pub(crate) fn to_db_int<T>(value: T, what: &str) -> Result<i32>
where
    T: TryInto<i32> + Copy + std::fmt::Display,
{
    value
        .try_into()
        .map_err(|_| StoreError::InvalidArgument(format!("{what} {value} is out of range")))
}

fn from_db_int(value: i32) -> std::result::Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("negative value {value}"))
}

fn encode_tags(tags: &[String]) -> Result<String> {
    serde_json::to_string(tags)
        .map_err(|e| StoreError::InvalidArgument(format!("unencodable tags: {e}")))
}

fn decode_tags(json: &str) -> std::result::Result<Vec<String>, String> {
    serde_json::from_str(json).map_err(|e| format!("tags {json:?}: {e}"))
}

fn weekday_to_db(day: Weekday) -> i32 {
    day.num_days_from_monday() as i32
}

fn weekday_from_db(value: i32) -> std::result::Result<Weekday, String> {
    match value {
        0 => Ok(Weekday::Mon),
        1 => Ok(Weekday::Tue),
        2 => Ok(Weekday::Wed),
        3 => Ok(Weekday::Thu),
        4 => Ok(Weekday::Fri),
        5 => Ok(Weekday::Sat),
        6 => Ok(Weekday::Sun),
        other => Err(format!("day of week {other}")),
    }
}

fn timestamp_from_db(millis: i64) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| format!("timestamp {millis}"))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Weekday::Mon, 0)]
    #[case(Weekday::Thu, 3)]
    #[case(Weekday::Sun, 6)]
    fn test_weekday_mapping(#[case] day: Weekday, #[case] value: i32) {
        assert_eq!(weekday_to_db(day), value);
        assert_eq!(weekday_from_db(value), Ok(day));
    }

    #[rstest]
    #[case(0_usize, Some(0))]
    #[case(i32::MAX as usize, Some(i32::MAX))]
    #[case(i32::MAX as usize + 1, None)]
    #[case(usize::MAX, None)]
    fn test_to_db_int_checks_range(#[case] value: usize, #[case] expected: Option<i32>) {
        match (to_db_int(value, "position"), expected) {
            (Ok(stored), Some(expected)) => assert_eq!(stored, expected),
            (Err(StoreError::InvalidArgument(message)), None) => {
                assert!(message.starts_with("position "), "{message}")
            }
            (other, _) => panic!("unexpected {other:?} for {value}"),
        }
    }

    #[test]
    fn test_weekday_out_of_range() {
        assert!(weekday_from_db(7).is_err());
    }

    #[test]
    fn test_exercise_row_keeps_tags_verbatim() {
        let exercise = Exercise::new(
            ExerciseId::new("row").unwrap(),
            Name::new("Row").unwrap(),
            Difficulty::Beginner,
        )
        .with_target_muscles(["Latissimus Dorsi", "Biceps"]);

        let row = ExerciseRow::from_domain(&exercise).unwrap();

        assert_eq!(row.target_muscles, r#"["Latissimus Dorsi","Biceps"]"#);
        assert_eq!(row.default_rest_ms, 60_000);
        assert_eq!(row.difficulty, "beginner");
    }

    #[test]
    fn test_corrupt_exercise_row() {
        let row = ExerciseRow {
            id: "row".into(),
            name: "Row".into(),
            description: String::new(),
            target_muscles: "not json".into(),
            equipment: "[]".into(),
            default_sets: 3,
            default_reps: 10,
            default_rest_ms: 0,
            thumbnail_url: None,
            difficulty: "beginner".into(),
        };

        assert!(matches!(
            Exercise::try_from(row),
            Err(StoreError::StorageUnavailable(_))
        ));
    }

    #[test]
    fn test_workout_row_round_trip() {
        let created = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let workout = Workout {
            id: WorkoutId::new("w1").unwrap(),
            name: Name::new("Push").unwrap(),
            day_of_week: Weekday::Fri,
            target_muscle_groups: vec!["chest".into(), "triceps".into()],
            created_at: created,
            updated_at: created,
        };

        let row = WorkoutRow::from_domain(&workout).unwrap();

        assert_eq!(row.day_of_week, 4);
        assert_eq!(Workout::try_from(row).unwrap(), workout);
    }
}
