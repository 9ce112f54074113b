//! Exercise suggestions for a workout. Reads through the repositories only,
//! the same way an on-device model would.

use std::cmp::Reverse;
use std::collections::HashSet;

use log::debug;

use crate::domain::{Exercise, ExerciseFilter, WorkoutId};
use crate::error::Result;
use crate::repository::{ExerciseRepository, WorkoutRepository};

#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub exercise: Exercise,
    /// Target muscles shared with the workout's muscle groups.
    pub matched_muscles: Vec<String>,
}

impl Suggestion {
    pub fn score(&self) -> usize {
        self.matched_muscles.len()
    }
}

pub struct RecommendationEngine<R> {
    repository: R,
}

impl<R> RecommendationEngine<R>
where
    R: ExerciseRepository + WorkoutRepository,
{
    pub fn new(repository: R) -> Self {
        RecommendationEngine { repository }
    }

    /// Catalog exercises not yet in the workout that hit at least one of its
    /// target muscle groups, best overlap first, then by name.
    pub fn recommend_exercises(&self, workout_id: &WorkoutId, limit: usize) -> Result<Vec<Suggestion>> {
        let view = self.repository.get_with_exercises(workout_id)?;
        let present: HashSet<_> = view.exercise_ids().into_iter().cloned().collect();
        let wanted: HashSet<String> = view
            .workout
            .target_muscle_groups
            .iter()
            .map(|group| group.trim().to_ascii_lowercase())
            .collect();

        let mut suggestions: Vec<Suggestion> = self
            .repository
            .list_exercises(&ExerciseFilter::default())?
            .into_iter()
            .filter(|exercise| !present.contains(&exercise.id))
            .filter_map(|exercise| {
                let matched_muscles: Vec<String> = exercise
                    .target_muscles
                    .iter()
                    .filter(|muscle| wanted.contains(&muscle.trim().to_ascii_lowercase()))
                    .cloned()
                    .collect();
                (!matched_muscles.is_empty()).then_some(Suggestion {
                    exercise,
                    matched_muscles,
                })
            })
            .collect();

        // Stable sort keeps the name order from the repository for equal scores.
        suggestions.sort_by_key(|s| Reverse(s.score()));
        suggestions.truncate(limit);

        debug!(
            "Recommending {} exercises for workout {workout_id}",
            suggestions.len()
        );
        Ok(suggestions)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::db::Store;
    use crate::domain::{Difficulty, ExerciseId, Name, Workout};
    use crate::repository::Repository;

    fn exercise(id: &str, name: &str, muscles: &[&str]) -> Exercise {
        Exercise::new(
            ExerciseId::new(id).unwrap(),
            Name::new(name).unwrap(),
            Difficulty::Beginner,
        )
        .with_target_muscles(muscles.iter().copied())
    }

    fn engine() -> (RecommendationEngine<Repository>, WorkoutId) {
        let repository = Repository::new(Store::open_in_memory().unwrap());
        for e in [
            exercise("squat", "Squat", &["Quadriceps", "Glutes"]),
            exercise("lunge", "Lunge", &["quadriceps"]),
            exercise("hip-thrust", "Hip Thrust", &["Glutes"]),
            exercise("curl", "Curl", &["Biceps"]),
            exercise("leg-press", "Leg Press", &["Quadriceps", "Glutes"]),
        ] {
            repository.create_exercise(e).unwrap();
        }
        let workout = repository
            .create_workout(
                Workout::new(
                    WorkoutId::new("legs").unwrap(),
                    Name::new("Legs").unwrap(),
                    Weekday::Tue,
                )
                .with_target_muscle_groups(["Quadriceps", "Glutes"]),
            )
            .unwrap();
        repository
            .add_exercise(&workout.id, &ExerciseId::new("squat").unwrap(), 0)
            .unwrap();
        (RecommendationEngine::new(repository), workout.id)
    }

    #[test]
    fn test_ranks_by_overlap_then_name() {
        let (engine, workout_id) = engine();

        let suggestions = engine.recommend_exercises(&workout_id, 10).unwrap();
        let ranked: Vec<(&str, usize)> = suggestions
            .iter()
            .map(|s| (s.exercise.id.as_str(), s.score()))
            .collect();

        assert_eq!(
            ranked,
            vec![("leg-press", 2), ("hip-thrust", 1), ("lunge", 1)]
        );
    }

    #[test]
    fn test_limit() {
        let (engine, workout_id) = engine();
        assert_eq!(engine.recommend_exercises(&workout_id, 1).unwrap().len(), 1);
        assert!(engine.recommend_exercises(&workout_id, 0).unwrap().is_empty());
    }
}
