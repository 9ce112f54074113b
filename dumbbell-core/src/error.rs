use std::fmt::Display;

use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// Failure kinds surfaced by the store and passed through the repositories unchanged.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

impl StoreError {
    pub(crate) fn not_found(entity: &str, id: impl Display) -> Self {
        StoreError::NotFound(format!("{entity} {id}"))
    }

    pub(crate) fn corrupt(entity: &str, detail: impl Display) -> Self {
        StoreError::StorageUnavailable(format!("corrupt {entity} row: {detail}"))
    }

    /// Only infrastructure failures are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::StorageUnavailable(_))
    }
}

impl From<DieselError> for StoreError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => StoreError::NotFound("record".to_string()),
            DieselError::DatabaseError(kind, info) => match kind {
                DatabaseErrorKind::UniqueViolation
                | DatabaseErrorKind::ForeignKeyViolation
                | DatabaseErrorKind::CheckViolation
                | DatabaseErrorKind::NotNullViolation => {
                    StoreError::ConstraintViolation(info.message().to_string())
                }
                _ => StoreError::StorageUnavailable(info.message().to_string()),
            },
            other => StoreError::StorageUnavailable(other.to_string()),
        }
    }
}

impl From<diesel::r2d2::PoolError> for StoreError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        StoreError::StorageUnavailable(format!("connection pool: {err}"))
    }
}

impl From<diesel::ConnectionError> for StoreError {
    fn from(err: diesel::ConnectionError) -> Self {
        StoreError::StorageUnavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_diesel_not_found_maps_to_not_found() {
        assert!(matches!(
            StoreError::from(DieselError::NotFound),
            StoreError::NotFound(_)
        ));
    }

    #[test]
    fn test_rollback_maps_to_storage_unavailable() {
        assert!(matches!(
            StoreError::from(DieselError::RollbackTransaction),
            StoreError::StorageUnavailable(_)
        ));
    }

    #[rstest]
    #[case(StoreError::NotFound("workout w1".into()), false)]
    #[case(StoreError::ConstraintViolation("dup".into()), false)]
    #[case(StoreError::InvalidArgument("bad".into()), false)]
    #[case(StoreError::StorageUnavailable("locked".into()), true)]
    fn test_is_retryable(#[case] error: StoreError, #[case] expected: bool) {
        assert_eq!(error.is_retryable(), expected);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            StoreError::not_found("exercise", "e1").to_string(),
            "not found: exercise e1"
        );
    }
}
