use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::StoreError;

static ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("identifier pattern compiles"));

const MAX_NAME_LEN: usize = 128;

macro_rules! string_id {
    ($name: ident, $entity: literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: &str) -> Result<Self, StoreError> {
                if ID_PATTERN.is_match(id) {
                    Ok(Self(id.to_string()))
                } else {
                    Err(StoreError::InvalidArgument(format!(
                        "invalid {} id {:?}",
                        $entity, id
                    )))
                }
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = StoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }
    };
}

string_id!(ExerciseId, "exercise");
string_id!(WorkoutId, "workout");

impl WorkoutId {
    pub fn generate() -> Self {
        WorkoutId(uuid::Uuid::new_v4().to_string())
    }
}

/// A trimmed, non-empty display name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(String);

impl Name {
    pub fn new(name: &str) -> Result<Self, StoreError> {
        let trimmed_name = name.trim();

        if trimmed_name.is_empty() {
            return Err(StoreError::InvalidArgument(
                "name must not be empty".to_string(),
            ));
        }

        let len = trimmed_name.chars().count();

        if len > MAX_NAME_LEN {
            return Err(StoreError::InvalidArgument(format!(
                "name must be {MAX_NAME_LEN} characters or fewer ({len} > {MAX_NAME_LEN})"
            )));
        }

        Ok(Name(trimmed_name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("e1", true)]
    #[case("barbell-squat", true)]
    #[case("Bench_Press_2", true)]
    #[case("3f0c2a9e-8a55-4a43-9a1f-0d6b1f7c2e11", true)]
    #[case("", false)]
    #[case("with space", false)]
    #[case("slash/id", false)]
    #[case(
        "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
        false
    )]
    fn test_exercise_id_new(#[case] id: &str, #[case] valid: bool) {
        assert_eq!(ExerciseId::new(id).is_ok(), valid);
    }

    #[test]
    fn test_invalid_id_is_invalid_argument() {
        assert!(matches!(
            WorkoutId::new("no good"),
            Err(StoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_generated_workout_ids_are_valid_and_distinct() {
        let a = WorkoutId::generate();
        let b = WorkoutId::generate();
        assert!(WorkoutId::new(a.as_str()).is_ok());
        assert_ne!(a, b);
    }

    #[rstest]
    #[case("Squat", Ok("Squat"))]
    #[case("  Leg Day  ", Ok("Leg Day"))]
    #[case("", Err(()))]
    #[case("   ", Err(()))]
    fn test_name_new(#[case] name: &str, #[case] expected: Result<&str, ()>) {
        assert_eq!(
            Name::new(name).as_ref().map(Name::as_str).map_err(|_| ()),
            expected
        );
    }

    #[test]
    fn test_name_too_long() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(
            Name::new(&long),
            Err(StoreError::InvalidArgument(_))
        ));
    }
}
