use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::LotteryResult;
use crate::domain::participant::Participant;

/// Repository trait for participants
#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    /// Insert a participant
    ///
    /// Fails with `LotteryError::DuplicateParticipant` if the room already
    /// has someone with the same name, ignoring case, and with
    /// `LotteryError::RegistrationClosed` unless the stored room is waiting
    /// with registration open at the moment of the write.
    async fn insert(&self, participant: &Participant) -> LotteryResult<()>;

    async fn find_by_id(&self, id: Uuid) -> LotteryResult<Option<Participant>>;

    /// All participants of a room, by join time
    async fn list_by_room(&self, room_id: Uuid) -> LotteryResult<Vec<Participant>>;

    /// Persist the name; the duplicate rule of `insert` applies
    async fn update(&self, participant: &Participant) -> LotteryResult<Participant>;
}
