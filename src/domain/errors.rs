use thiserror::Error;

use super::room::RoomStatus;

/// Errors surfaced by the lottery domain and its repositories
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LotteryError {
    #[error("{0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Participant with name \"{0}\" already exists in this room")]
    DuplicateParticipant(String),

    #[error("Registration is closed for this room")]
    RegistrationClosed,

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: RoomStatus, to: RoomStatus },

    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Admin code does not match this room")]
    Unauthorized,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl LotteryError {
    pub fn room_not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("Room not found: {}", id))
    }

    pub fn prize_not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("Prize not found: {}", id))
    }

    pub fn participant_not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("Participant not found: {}", id))
    }
}

pub type LotteryResult<T> = Result<T, LotteryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_participant_message_names_the_participant() {
        let err = LotteryError::DuplicateParticipant("Alice".to_string());
        assert_eq!(
            err.to_string(),
            "Participant with name \"Alice\" already exists in this room"
        );
    }

    #[test]
    fn transition_message_uses_status_names() {
        let err = LotteryError::InvalidStatusTransition {
            from: RoomStatus::Finished,
            to: RoomStatus::Waiting,
        };
        assert_eq!(
            err.to_string(),
            "Invalid status transition from finished to waiting"
        );
    }
}
