use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::LotteryResult;
use crate::domain::participant::Participant;
use crate::domain::prize::Prize;

/// Repository trait for prizes
#[async_trait]
pub trait PrizeRepository: Send + Sync {
    async fn insert(&self, prize: &Prize) -> LotteryResult<()>;

    async fn find_by_id(&self, id: Uuid) -> LotteryResult<Option<Prize>>;

    /// All prizes of a room, by sort order then creation time
    async fn list_by_room(&self, room_id: Uuid) -> LotteryResult<Vec<Prize>>;

    /// Highest sort order in the room, `None` when it has no prizes
    async fn max_sort_order(&self, room_id: Uuid) -> LotteryResult<Option<i32>>;

    /// Persist name, description and sort order
    async fn update(&self, prize: &Prize) -> LotteryResult<Prize>;

    async fn delete(&self, id: Uuid) -> LotteryResult<()>;

    /// Awards `prize_id` to `participant_id` in one atomic step
    ///
    /// Succeeds only if both rows belong to `room_id`, the prize has no
    /// winner yet and the participant has not won. Any other state yields
    /// `LotteryError::Conflict`, so concurrent draws cannot double-award.
    async fn assign_winner(
        &self,
        room_id: Uuid,
        prize_id: Uuid,
        participant_id: Uuid,
    ) -> LotteryResult<(Prize, Participant)>;
}
