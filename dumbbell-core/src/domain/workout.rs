use chrono::{DateTime, TimeDelta, Utc, Weekday};

use super::exercise::is_clean_tag;
use crate::domain::{ExerciseId, Name, WorkoutId};
use crate::error::StoreError;

/// A training session template assigned to a day of the week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workout {
    pub id: WorkoutId,
    pub name: Name,
    pub day_of_week: Weekday,
    pub target_muscle_groups: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workout {
    pub fn new(id: WorkoutId, name: Name, day_of_week: Weekday) -> Self {
        let now = now();
        Self {
            id,
            name,
            day_of_week,
            target_muscle_groups: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_target_muscle_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_muscle_groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if self.updated_at < self.created_at {
            return Err(StoreError::InvalidArgument(format!(
                "workout {}: updated_at precedes created_at",
                self.id
            )));
        }
        if self
            .target_muscle_groups
            .iter()
            .any(|group| !is_clean_tag(group))
        {
            return Err(StoreError::InvalidArgument(format!(
                "workout {}: muscle group is empty or padded with whitespace",
                self.id
            )));
        }
        Ok(())
    }
}

/// Places an exercise at `position` within a workout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutExercise {
    pub id: i64,
    pub workout_id: WorkoutId,
    pub exercise_id: ExerciseId,
    pub position: u32,
}

/// One logged set of an exercise within a workout.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseSet {
    pub id: i64,
    pub workout_exercise_id: i64,
    pub set_index: u32,
    pub weight_kg: f64,
    pub reps: u32,
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkoutFilter {
    pub day_of_week: Option<Weekday>,
}

impl WorkoutFilter {
    pub fn day(day_of_week: Weekday) -> Self {
        Self {
            day_of_week: Some(day_of_week),
        }
    }

    pub fn matches(&self, workout: &Workout) -> bool {
        self.day_of_week.is_none_or(|day| day == workout.day_of_week)
    }
}

/// Current time truncated to the millisecond precision the store keeps.
pub fn now() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(Utc::now().timestamp_millis()).unwrap_or_default()
}

/// Next `updated_at` value; strictly later than `previous`.
pub(crate) fn bump(previous: DateTime<Utc>) -> DateTime<Utc> {
    now().max(previous + TimeDelta::milliseconds(1))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn leg_day() -> Workout {
        Workout::new(
            WorkoutId::new("w1").unwrap(),
            Name::new("Leg Day").unwrap(),
            Weekday::Mon,
        )
    }

    #[test]
    fn test_new_workout_timestamps() {
        let workout = leg_day();
        assert_eq!(workout.created_at, workout.updated_at);
        assert_eq!(workout.created_at.timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn test_bump_is_strictly_monotonic() {
        let future = now() + TimeDelta::hours(1);
        assert_eq!(bump(future), future + TimeDelta::milliseconds(1));

        let past = now() - TimeDelta::hours(1);
        assert!(bump(past) > past + TimeDelta::milliseconds(1));
    }

    #[test]
    fn test_validate() {
        assert_eq!(leg_day().validate(), Ok(()));

        let mut workout = leg_day();
        workout.updated_at = workout.created_at - TimeDelta::seconds(1);
        assert!(workout.validate().is_err());

        let workout = leg_day().with_target_muscle_groups(["legs", ""]);
        assert!(workout.validate().is_err());

        let workout = leg_day().with_target_muscle_groups([" legs"]);
        assert!(matches!(
            workout.validate(),
            Err(StoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_filter_matches() {
        assert!(WorkoutFilter::default().matches(&leg_day()));
        assert!(WorkoutFilter::day(Weekday::Mon).matches(&leg_day()));
        assert!(!WorkoutFilter::day(Weekday::Tue).matches(&leg_day()));
    }
}
