use thiserror::Error as ThisError;
use uniffi::Error;

use crate::error::StoreError;

#[derive(Debug, ThisError, Error)]
#[non_exhaustive]
pub enum DumbbellError {
    #[error("not found: {message}")]
    NotFound { message: String },
    #[error("constraint violation: {message}")]
    ConstraintViolation { message: String },
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
    #[error("storage unavailable: {message}")]
    StorageUnavailable { message: String },
}

impl From<StoreError> for DumbbellError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(message) => DumbbellError::NotFound { message },
            StoreError::ConstraintViolation(message) => {
                DumbbellError::ConstraintViolation { message }
            }
            StoreError::InvalidArgument(message) => DumbbellError::InvalidArgument { message },
            StoreError::StorageUnavailable(message) => {
                DumbbellError::StorageUnavailable { message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_preserved() {
        assert!(matches!(
            DumbbellError::from(StoreError::NotFound("workout w1".into())),
            DumbbellError::NotFound { message } if message == "workout w1"
        ));
        assert!(matches!(
            DumbbellError::from(StoreError::ConstraintViolation("dup".into())),
            DumbbellError::ConstraintViolation { .. }
        ));
        assert!(matches!(
            DumbbellError::from(StoreError::InvalidArgument("bad".into())),
            DumbbellError::InvalidArgument { .. }
        ));
        assert!(matches!(
            DumbbellError::from(StoreError::StorageUnavailable("locked".into())),
            DumbbellError::StorageUnavailable { .. }
        ));
    }
}
