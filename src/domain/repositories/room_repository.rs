use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::LotteryResult;
use crate::domain::room::{Room, RoomSettings, RoomStatus};

/// Detail columns an admin edit writes; `None` leaves the stored value alone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomChanges {
    pub name: Option<String>,
    pub registration_open: Option<bool>,
    pub settings: Option<RoomSettings>,
}

impl RoomChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.registration_open.is_none() && self.settings.is_none()
    }
}

/// Repository trait for the Room aggregate
///
/// Writes are column-scoped and guarded by the stored status, so a caller
/// holding a stale copy gets `Conflict` instead of overwriting newer state.
/// Deleting a room removes its prizes and participants as well.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Insert a newly created room
    async fn insert(&self, room: &Room) -> LotteryResult<()>;

    async fn find_by_id(&self, id: Uuid) -> LotteryResult<Option<Room>>;

    async fn find_by_public_code(&self, code: &str) -> LotteryResult<Option<Room>>;

    async fn find_by_secret_code(&self, code: &str) -> LotteryResult<Option<Room>>;

    /// Whether a public code is already taken
    async fn public_code_exists(&self, code: &str) -> LotteryResult<bool>;

    /// Write the given detail columns if the room is still in `expected`
    ///
    /// Returns `Conflict` when the stored status differs.
    async fn update_details(
        &self,
        id: Uuid,
        expected: RoomStatus,
        changes: &RoomChanges,
    ) -> LotteryResult<Room>;

    /// Move the room from `from` to `to`, closing registration when it leaves waiting
    ///
    /// Returns `Conflict` when the stored status is no longer `from`.
    async fn transition(&self, id: Uuid, from: RoomStatus, to: RoomStatus) -> LotteryResult<Room>;

    /// Raise the drawing progress counter; it never moves backwards
    async fn record_progress(&self, id: Uuid, current_prize_index: i32) -> LotteryResult<Room>;

    /// Delete a room and everything it owns
    async fn delete(&self, id: Uuid) -> LotteryResult<()>;
}
