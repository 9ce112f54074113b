use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::{ExerciseId, Name};
use crate::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StoreError::InvalidArgument(format!("unknown difficulty {s:?}")))
    }
}

/// Catalog entry. Identity is the `id`; every other field may be edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub id: ExerciseId,
    pub name: Name,
    pub description: String,
    pub target_muscles: Vec<String>,
    pub equipment: Vec<String>,
    pub default_sets: u32,
    pub default_reps: u32,
    pub default_rest: Duration,
    pub thumbnail_url: Option<String>,
    pub difficulty: Difficulty,
}

impl Exercise {
    /// An exercise with three sets of ten and a one minute rest.
    pub fn new(id: ExerciseId, name: Name, difficulty: Difficulty) -> Self {
        Self {
            id,
            name,
            description: String::new(),
            target_muscles: Vec::new(),
            equipment: Vec::new(),
            default_sets: 3,
            default_reps: 10,
            default_rest: Duration::from_secs(60),
            thumbnail_url: None,
            difficulty,
        }
    }

    pub fn with_target_muscles<I, S>(mut self, muscles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_muscles = muscles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_equipment<I, S>(mut self, equipment: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.equipment = equipment.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if self.default_sets == 0 {
            return Err(StoreError::InvalidArgument(format!(
                "exercise {}: default set count must be positive",
                self.id
            )));
        }
        if self.default_reps == 0 {
            return Err(StoreError::InvalidArgument(format!(
                "exercise {}: default rep count must be positive",
                self.id
            )));
        }
        if self.default_rest.subsec_nanos() % 1_000_000 != 0 {
            return Err(StoreError::InvalidArgument(format!(
                "exercise {}: rest time must be whole milliseconds",
                self.id
            )));
        }
        if let Some(tag) = self
            .target_muscles
            .iter()
            .chain(&self.equipment)
            .find(|tag| !is_clean_tag(tag))
        {
            return Err(StoreError::InvalidArgument(format!(
                "exercise {}: tag {tag:?} is empty or padded with whitespace",
                self.id
            )));
        }
        Ok(())
    }
}

/// Tags are stored verbatim, so they must be non-empty and carry no
/// surrounding whitespace.
pub(crate) fn is_clean_tag(tag: &str) -> bool {
    !tag.is_empty() && tag.trim() == tag
}

/// Predicate over stored exercise attributes. Tag comparisons ignore ASCII case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExerciseFilter {
    pub muscle: Option<String>,
    pub equipment: Option<String>,
    pub difficulty: Option<Difficulty>,
}

impl ExerciseFilter {
    pub fn muscle(muscle: impl Into<String>) -> Self {
        Self {
            muscle: Some(muscle.into()),
            ..Self::default()
        }
    }

    pub fn equipment(equipment: impl Into<String>) -> Self {
        Self {
            equipment: Some(equipment.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, exercise: &Exercise) -> bool {
        fn has_tag(tags: &[String], wanted: &Option<String>) -> bool {
            wanted.as_deref().is_none_or(|wanted| {
                tags.iter()
                    .any(|tag| tag.trim().eq_ignore_ascii_case(wanted.trim()))
            })
        }

        has_tag(&exercise.target_muscles, &self.muscle)
            && has_tag(&exercise.equipment, &self.equipment)
            && self.difficulty.is_none_or(|d| d == exercise.difficulty)
    }
}
