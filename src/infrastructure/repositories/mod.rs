// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

pub mod memory;
pub mod postgres_participant_repository;
pub mod postgres_prize_repository;
pub mod postgres_room_repository;
mod rows;

pub use memory::InMemoryLotteryStore;
pub use postgres_participant_repository::PostgresParticipantRepository;
pub use postgres_prize_repository::PostgresPrizeRepository;
pub use postgres_room_repository::PostgresRoomRepository;

use crate::domain::errors::LotteryError;
use crate::domain::room::RoomStatus;

const UNIQUE_VIOLATION: &str = "23505";

/// Wraps a sqlx error with what was being attempted
pub(crate) fn storage_error(action: &'static str) -> impl Fn(sqlx::Error) -> LotteryError {
    move |e| {
        tracing::error!(error = %e, "Failed to {}", action);
        LotteryError::Storage(format!("Failed to {}: {}", action, e))
    }
}

/// Whether the error is a unique constraint violation
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|db| db.code())
        .map_or(false, |code| code == UNIQUE_VIOLATION)
}

/// A status-guarded write found the room in another status
pub(crate) fn room_moved(expected: RoomStatus, actual: RoomStatus) -> LotteryError {
    LotteryError::Conflict(format!(
        "Room is now {}, expected {}; reload and retry",
        actual, expected
    ))
}
