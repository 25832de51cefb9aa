//! Caller-visible error taxonomy of the voting operations.

use crate::motion::{MotionError, MotionId};
use crate::store::StoreError;

/// Result type for voting operations.
pub type VotingResult<T> = Result<T, VotingError>;

/// Each variant maps to a distinct outcome at the transport boundary.
#[derive(Debug, thiserror::Error)]
pub enum VotingError {
    #[error("Motion not found: {0}")]
    NotFound(MotionId),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Eligibility oracle error: {0}")]
    OracleError(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<MotionError> for VotingError {
    fn from(err: MotionError) -> Self {
        match err {
            MotionError::BlankTitle
            | MotionError::TitleTooShort { .. }
            | MotionError::BlankMember
            | MotionError::DurationOverflow => VotingError::Validation(err.to_string()),
            MotionError::AlreadyOpened(_) | MotionError::NotOpened(_) | MotionError::Closed(_) => {
                VotingError::InvalidState(err.to_string())
            }
            MotionError::DuplicateVote { .. } => VotingError::Conflict(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motion_errors_map_to_taxonomy() {
        let id = MotionId::new();

        assert!(matches!(
            VotingError::from(MotionError::BlankTitle),
            VotingError::Validation(_)
        ));
        assert!(matches!(
            VotingError::from(MotionError::AlreadyOpened(id)),
            VotingError::InvalidState(_)
        ));
        assert!(matches!(
            VotingError::from(MotionError::Closed(id)),
            VotingError::InvalidState(_)
        ));
        assert!(matches!(
            VotingError::from(MotionError::DuplicateVote {
                motion_id: id,
                member_id: "111".to_string()
            }),
            VotingError::Conflict(_)
        ));
    }
}
