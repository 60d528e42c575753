use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use sqlx::PgPool;
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

use crate::domain::drawing::GameRegistry;
use crate::domain::errors::{LotteryError, LotteryResult};
use crate::domain::participant::{Participant, ParticipantName, ParticipantPatch};
use crate::domain::prize::{Prize, PrizePatch};
use crate::domain::repositories::{
    ParticipantRepository, PrizeRepository, RoomChanges, RoomRepository,
};
use crate::domain::room::{
    PublicCode, Room, RoomEvent, RoomSettings, RoomSettingsPatch, RoomStatus,
};
use crate::infrastructure::repositories::{
    InMemoryLotteryStore, PostgresParticipantRepository, PostgresPrizeRepository,
    PostgresRoomRepository,
};
use crate::realtime::ChangeHub;

/// Attempts at finding a free public code before giving up
const PUBLIC_CODE_ATTEMPTS: usize = 16;

/// Input for creating a room
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewRoom {
    pub name: String,
    #[serde(default)]
    pub settings: Option<RoomSettingsPatch>,
}

/// Partial room update; the current prize index is managed by the drawing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoomPatch {
    pub name: Option<String>,
    pub registration_open: Option<bool>,
    pub status: Option<RoomStatus>,
    pub settings: Option<RoomSettingsPatch>,
}

/// Input for adding a prize; sort order defaults to after the last prize
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPrize {
    pub name: String,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
}

/// Lottery use cases on top of the repository ports
///
/// Cheap to clone; all clones share repositories, hub and random source.
#[derive(Clone)]
pub struct LotteryService {
    pub(super) rooms: Arc<dyn RoomRepository>,
    pub(super) prizes: Arc<dyn PrizeRepository>,
    pub(super) participants: Arc<dyn ParticipantRepository>,
    pub(super) hub: ChangeHub,
    pub(super) games: GameRegistry,
    code_prefix: Arc<str>,
    rng: Arc<Mutex<StdRng>>,
}

impl LotteryService {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        prizes: Arc<dyn PrizeRepository>,
        participants: Arc<dyn ParticipantRepository>,
        hub: ChangeHub,
        code_prefix: &str,
    ) -> Self {
        Self {
            rooms,
            prizes,
            participants,
            hub,
            games: GameRegistry::default(),
            code_prefix: Arc::from(code_prefix),
            rng: Arc::new(Mutex::new(StdRng::from_entropy())),
        }
    }

    /// Service over a fresh in-memory store publishing into `hub`
    pub fn in_memory(hub: ChangeHub, code_prefix: &str) -> Self {
        let store = Arc::new(InMemoryLotteryStore::new(hub.clone()));
        Self::new(store.clone(), store.clone(), store, hub, code_prefix)
    }

    /// Service over PostgreSQL; `hub` should be fed by a `PgChangeRelay`
    pub fn postgres(pool: PgPool, hub: ChangeHub, code_prefix: &str) -> Self {
        Self::new(
            Arc::new(PostgresRoomRepository::new(pool.clone())),
            Arc::new(PostgresPrizeRepository::new(pool.clone())),
            Arc::new(PostgresParticipantRepository::new(pool)),
            hub,
            code_prefix,
        )
    }

    /// Replaces the game types rooms may choose from
    pub fn with_games(mut self, games: GameRegistry) -> Self {
        self.games = games;
        self
    }

    /// Makes every random choice reproducible
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = Arc::new(Mutex::new(StdRng::seed_from_u64(seed)));
        self
    }

    pub fn games(&self) -> &GameRegistry {
        &self.games
    }

    pub(super) fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }

    fn ensure_known_game(&self, settings: &RoomSettings) -> LotteryResult<()> {
        if self.games.contains(&settings.game_type) {
            Ok(())
        } else {
            Err(LotteryError::Validation(format!(
                "Unknown game type: {} (available: {})",
                settings.game_type,
                self.games.ids().join(", ")
            )))
        }
    }

    async fn unique_public_code(&self) -> LotteryResult<PublicCode> {
        for _ in 0..PUBLIC_CODE_ATTEMPTS {
            let code = self.with_rng(|rng| PublicCode::generate(&self.code_prefix, rng));
            if !self.rooms.public_code_exists(code.as_str()).await? {
                return Ok(code);
            }
            tracing::debug!(%code, "public code collision, retrying");
        }
        Err(LotteryError::Conflict(
            "Could not allocate a free room code".to_string(),
        ))
    }

    // ===== Rooms =====

    /// Creates a room in the waiting state with registration open
    pub async fn create_room(&self, input: NewRoom) -> LotteryResult<Room> {
        let settings = RoomSettings::default().merged(&input.settings.unwrap_or_default());
        self.ensure_known_game(&settings)?;

        let code = self.unique_public_code().await?;
        let (room, events) = Room::new(&input.name, code, settings)?;
        self.rooms.insert(&room).await?;

        events.iter().for_each(RoomEvent::record);
        Ok(room)
    }

    pub async fn get_room(&self, id: Uuid) -> LotteryResult<Room> {
        self.rooms
            .find_by_id(id)
            .await?
            .ok_or_else(|| LotteryError::room_not_found(id))
    }

    pub async fn get_room_by_public_code(&self, code: &str) -> LotteryResult<Room> {
        self.rooms
            .find_by_public_code(code)
            .await?
            .ok_or_else(|| LotteryError::room_not_found(code))
    }

    /// Looks a room up by its admin code
    ///
    /// The code itself never appears in the error.
    pub async fn get_room_by_secret_code(&self, code: &str) -> LotteryResult<Room> {
        self.rooms
            .find_by_secret_code(code)
            .await?
            .ok_or_else(|| LotteryError::NotFound("Room not found".to_string()))
    }

    /// Returns the room if `code` is its admin code
    pub async fn authorize_admin(&self, room_id: Uuid, code: &str) -> LotteryResult<Room> {
        let room = self.get_room(room_id).await?;
        if !room.is_admin(code) {
            tracing::warn!(%room_id, "rejected admin code");
            return Err(LotteryError::Unauthorized);
        }
        Ok(room)
    }

    /// Applies a partial update
    ///
    /// Registration can only be reopened while waiting. Moving to `drawing`
    /// is subject to the same readiness checks as `start_drawing`.
    pub async fn update_room(
        &self,
        room_id: Uuid,
        admin_code: &str,
        patch: RoomPatch,
    ) -> LotteryResult<Room> {
        let room = self.authorize_admin(room_id, admin_code).await?;
        let seen = room.status();
        let mut draft = room.clone();
        let mut changes = RoomChanges::default();
        let mut events = Vec::new();

        if let Some(name) = &patch.name {
            draft.rename(name)?;
            changes.name = Some(draft.name().to_string());
        }

        if let Some(settings) = &patch.settings {
            self.ensure_known_game(&draft.settings().merged(settings))?;
            draft.apply_settings(settings);
            changes.settings = Some(draft.settings().clone());
        }

        if let Some(open) = patch.registration_open {
            if open && seen != RoomStatus::Waiting {
                return Err(LotteryError::InvalidState(format!(
                    "Registration cannot be reopened once the room is {}",
                    seen
                )));
            }
            if let Some(event) = draft.set_registration_open(open) {
                events.push(event);
                changes.registration_open = Some(open);
            }
        }

        let target = match patch.status {
            Some(status) if status != seen => {
                if status == RoomStatus::Drawing {
                    self.ensure_ready(&draft).await?;
                }
                events.push(draft.transition_to(status)?);
                Some(status)
            }
            _ => None,
        };

        // Both writes are guarded by the status read above.
        let mut stored = room;
        if !changes.is_empty() {
            stored = self.rooms.update_details(room_id, seen, &changes).await?;
        }
        if let Some(status) = target {
            stored = self.rooms.transition(room_id, seen, status).await?;
        }

        events.iter().for_each(RoomEvent::record);
        Ok(stored)
    }

    /// Deletes the room with all its prizes and participants
    pub async fn delete_room(&self, room_id: Uuid, admin_code: &str) -> LotteryResult<()> {
        self.authorize_admin(room_id, admin_code).await?;
        self.rooms.delete(room_id).await?;
        tracing::info!(%room_id, "room deleted");
        Ok(())
    }

    // ===== Prizes =====

    pub async fn add_prize(
        &self,
        room_id: Uuid,
        admin_code: &str,
        input: NewPrize,
    ) -> LotteryResult<Prize> {
        let room = self.authorize_admin(room_id, admin_code).await?;
        if room.status() != RoomStatus::Waiting {
            return Err(LotteryError::InvalidState(
                "Prizes can only be added before the drawing starts".to_string(),
            ));
        }

        let sort_order = match input.sort_order {
            Some(order) => order,
            None => self
                .prizes
                .max_sort_order(room_id)
                .await?
                .map_or(Some(1), |max| max.checked_add(1))
                .ok_or_else(|| {
                    LotteryError::Validation(
                        "Prize sort order is at its maximum; pass an explicit sort_order"
                            .to_string(),
                    )
                })?,
        };

        let prize = Prize::new(room_id, &input.name, input.description.as_deref(), sort_order)?;
        self.prizes.insert(&prize).await?;
        tracing::info!(%room_id, prize_id = %prize.id(), sort_order, "prize added");
        Ok(prize)
    }

    pub async fn list_prizes(&self, room_id: Uuid) -> LotteryResult<Vec<Prize>> {
        self.get_room(room_id).await?;
        self.prizes.list_by_room(room_id).await
    }

    async fn prize_in_room(&self, room_id: Uuid, prize_id: Uuid) -> LotteryResult<Prize> {
        self.prizes
            .find_by_id(prize_id)
            .await?
            .filter(|p| p.room_id() == room_id)
            .ok_or_else(|| LotteryError::prize_not_found(prize_id))
    }

    pub async fn update_prize(
        &self,
        room_id: Uuid,
        admin_code: &str,
        prize_id: Uuid,
        patch: PrizePatch,
    ) -> LotteryResult<Prize> {
        self.authorize_admin(room_id, admin_code).await?;
        let mut prize = self.prize_in_room(room_id, prize_id).await?;
        prize.apply(&patch)?;
        self.prizes.update(&prize).await
    }

    /// Removes a prize that has not been awarded
    pub async fn delete_prize(
        &self,
        room_id: Uuid,
        admin_code: &str,
        prize_id: Uuid,
    ) -> LotteryResult<()> {
        self.authorize_admin(room_id, admin_code).await?;
        let prize = self.prize_in_room(room_id, prize_id).await?;
        if prize.is_awarded() {
            return Err(LotteryError::Conflict(format!(
                "Prize {} has already been awarded",
                prize.name()
            )));
        }
        self.prizes.delete(prize_id).await
    }

    // ===== Participants =====

    /// Self-registration through the public code link
    pub async fn register_participant(
        &self,
        room_id: Uuid,
        name: &str,
    ) -> LotteryResult<Participant> {
        let room = self.get_room(room_id).await?;
        if !room.registration_open() || room.status() != RoomStatus::Waiting {
            return Err(LotteryError::RegistrationClosed);
        }

        let participant = Participant::new(room_id, ParticipantName::new(name)?);
        self.participants.insert(&participant).await?;
        tracing::info!(%room_id, participant_id = %participant.id(), "participant registered");
        Ok(participant)
    }

    pub async fn list_participants(&self, room_id: Uuid) -> LotteryResult<Vec<Participant>> {
        self.get_room(room_id).await?;
        self.participants.list_by_room(room_id).await
    }

    pub async fn update_participant(
        &self,
        room_id: Uuid,
        admin_code: &str,
        participant_id: Uuid,
        patch: ParticipantPatch,
    ) -> LotteryResult<Participant> {
        self.authorize_admin(room_id, admin_code).await?;
        let mut participant = self
            .participants
            .find_by_id(participant_id)
            .await?
            .filter(|p| p.room_id() == room_id)
            .ok_or_else(|| LotteryError::participant_not_found(participant_id))?;

        if let Some(name) = &patch.name {
            participant.rename(ParticipantName::new(name)?);
        }
        self.participants.update(&participant).await
    }
}
