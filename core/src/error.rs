//! Domain errors for the todo core.
//!
//! # Design
//! Store-level failures are translated into `TodoError` at the repository
//! boundary, so nothing above the repository ever sees a `StoreError`.
//! `ErrorKind` is the coarse classification transports map onto their own
//! status codes.

use thiserror::Error;

/// Broad error classes used by transports to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller supplied something malformed.
    Validation,
    /// The addressed todo does not exist.
    NotFound,
    /// The (title, activeAt) uniqueness constraint was violated.
    Conflict,
    /// Caller misuse or a storage failure.
    Internal,
}

#[derive(Debug, Error)]
pub enum TodoError {
    #[error("title length limit exceeded: {length} characters, at most {max} allowed")]
    TitleTooLong { length: usize, max: usize },

    #[error("invalid date format: {0:?}, expected YYYY-MM-DD")]
    InvalidDateFormat(String),

    #[error("invalid id: {0:?}")]
    InvalidId(String),

    #[error("unknown status: {0:?}")]
    UnknownStatus(String),

    #[error("unknown comparison operator: {0:?}")]
    UnknownComparisonOperator(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("todo not found")]
    NotFound,

    #[error("todo already exists")]
    Conflict,

    #[error("nothing to update")]
    NothingToUpdate,

    #[error("storage error: {0}")]
    Storage(String),
}

impl TodoError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TodoError::TitleTooLong { .. }
            | TodoError::InvalidDateFormat(_)
            | TodoError::InvalidId(_)
            | TodoError::UnknownStatus(_)
            | TodoError::UnknownComparisonOperator(_)
            | TodoError::MissingField(_) => ErrorKind::Validation,
            TodoError::NotFound => ErrorKind::NotFound,
            TodoError::Conflict => ErrorKind::Conflict,
            TodoError::NothingToUpdate | TodoError::Storage(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_are_validation() {
        assert_eq!(
            TodoError::TitleTooLong { length: 201, max: 200 }.kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            TodoError::InvalidDateFormat("2023-13-04".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            TodoError::UnknownComparisonOperator("NE".into()).kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn nothing_to_update_is_internal() {
        assert_eq!(TodoError::NothingToUpdate.kind(), ErrorKind::Internal);
        assert_eq!(TodoError::storage("disk full").kind(), ErrorKind::Internal);
    }

    #[test]
    fn display_mentions_offending_value() {
        let err = TodoError::InvalidDateFormat("2023/08/04".into());
        assert_eq!(
            err.to_string(),
            "invalid date format: \"2023/08/04\", expected YYYY-MM-DD"
        );
    }
}
