use super::events::RoomEvent;
use super::value_objects::{PublicCode, RoomSettings, RoomSettingsPatch, RoomStatus, SecretCode};
use crate::domain::errors::{LotteryError, LotteryResult};
use crate::domain::required_text;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const MAX_ROOM_NAME_LEN: usize = 100;

/// Room aggregate root
///
/// A single lottery event. Participants find it by its public code; the
/// organizer administers it with the secret code.
///
/// # Invariants
/// - Name is trimmed and never empty
/// - Status only moves forward (see [`RoomStatus::can_transition_to`])
/// - `current_prize_index` counts the prizes already drawn
///
/// # Example
/// ```
/// use lottery_api::domain::room::{PublicCode, Room, RoomSettings};
///
/// let (room, events) = Room::new(
///     "  New Year Party ",
///     PublicCode::from_string("ROOM-ABC"),
///     RoomSettings::default(),
/// ).expect("valid room");
///
/// assert_eq!(room.name(), "New Year Party");
/// assert!(room.registration_open());
/// assert_eq!(events.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Room {
    id: Uuid,
    public_code: PublicCode,
    secret_code: SecretCode,
    name: String,
    registration_open: bool,
    status: RoomStatus,
    current_prize_index: i32,
    settings: RoomSettings,
    created_at: DateTime<Utc>,
}

impl Room {
    /// Creates a new Room aggregate
    ///
    /// # Returns
    /// * `Ok((Room, Vec<RoomEvent>))` - New room and events generated
    /// * `Err(LotteryError::Validation)` - If the name is empty or too long
    ///
    /// # Business Rules Enforced
    /// - Initial status is always Waiting
    /// - Registration starts open
    /// - A fresh secret code is generated
    pub fn new(
        name: &str,
        public_code: PublicCode,
        settings: RoomSettings,
    ) -> LotteryResult<(Self, Vec<RoomEvent>)> {
        let name = required_text("Room name", name, MAX_ROOM_NAME_LEN)?;

        let room = Self {
            id: Uuid::new_v4(),
            public_code,
            secret_code: SecretCode::generate(),
            name,
            registration_open: true,
            status: RoomStatus::Waiting,
            current_prize_index: 0,
            settings,
            created_at: Utc::now(),
        };

        let events = vec![RoomEvent::Created {
            room_id: room.id,
            public_code: room.public_code.to_string(),
            name: room.name.clone(),
        }];

        Ok((room, events))
    }

    pub fn rename(&mut self, name: &str) -> LotteryResult<()> {
        self.name = required_text("Room name", name, MAX_ROOM_NAME_LEN)?;
        Ok(())
    }

    /// Opens or closes registration
    ///
    /// Returns `None` when the flag already had the requested value.
    pub fn set_registration_open(&mut self, open: bool) -> Option<RoomEvent> {
        if self.registration_open == open {
            return None;
        }
        self.registration_open = open;
        Some(RoomEvent::RegistrationToggled {
            room_id: self.id,
            open,
        })
    }

    pub fn apply_settings(&mut self, patch: &RoomSettingsPatch) {
        self.settings = self.settings.merged(patch);
    }

    pub fn replace_settings(&mut self, settings: RoomSettings) {
        self.settings = settings;
    }

    /// Moves the room to `next`
    ///
    /// # Returns
    /// * `Ok(RoomEvent)` - StatusChanged event generated
    /// * `Err(LotteryError::InvalidStatusTransition)` - If the move goes backwards or nowhere
    pub fn transition_to(&mut self, next: RoomStatus) -> LotteryResult<RoomEvent> {
        if !self.status.can_transition_to(next) {
            return Err(LotteryError::InvalidStatusTransition {
                from: self.status,
                to: next,
            });
        }

        let from = self.status;
        self.status = next;
        if next != RoomStatus::Waiting {
            self.registration_open = false;
        }

        Ok(RoomEvent::StatusChanged {
            room_id: self.id,
            from,
            to: next,
        })
    }

    pub fn start_drawing(&mut self) -> LotteryResult<RoomEvent> {
        self.transition_to(RoomStatus::Drawing)
    }

    pub fn finish(&mut self) -> LotteryResult<RoomEvent> {
        self.transition_to(RoomStatus::Finished)
    }

    pub fn set_current_prize_index(&mut self, index: i32) {
        self.current_prize_index = index;
    }

    /// Checks a candidate admin code against the secret code
    pub fn is_admin(&self, candidate: &str) -> bool {
        self.secret_code.matches(candidate)
    }

    // ===== Getters =====

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn public_code(&self) -> &PublicCode {
        &self.public_code
    }

    pub fn secret_code(&self) -> &SecretCode {
        &self.secret_code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registration_open(&self) -> bool {
        self.registration_open
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    pub fn current_prize_index(&self) -> i32 {
        self.current_prize_index
    }

    pub fn settings(&self) -> &RoomSettings {
        &self.settings
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Reconstructs a Room from persistence layer data
    ///
    /// Only to be used by repository implementations.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persistence(
        id: Uuid,
        public_code: PublicCode,
        secret_code: SecretCode,
        name: String,
        registration_open: bool,
        status: RoomStatus,
        current_prize_index: i32,
        settings: RoomSettings,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            public_code,
            secret_code,
            name,
            registration_open,
            status,
            current_prize_index,
            settings,
            created_at,
        }
    }
}
