use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Represents the lifecycle status of a room
///
/// # Status Transitions
/// ```text
/// Waiting -> Drawing -> Finished
///    └-------------------^
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "room_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    /// Registration phase, prizes may still be configured
    Waiting,
    /// Prizes are being drawn
    Drawing,
    /// Event is over
    Finished,
}

impl RoomStatus {
    /// Checks if a transition from current status to next status is valid
    ///
    /// Statuses only move forward. Staying in the same status is not a
    /// transition.
    ///
    /// # Example
    /// ```
    /// use lottery_api::domain::room::RoomStatus;
    ///
    /// assert!(RoomStatus::Waiting.can_transition_to(RoomStatus::Drawing));
    /// assert!(!RoomStatus::Finished.can_transition_to(RoomStatus::Waiting));
    /// ```
    pub fn can_transition_to(&self, next: RoomStatus) -> bool {
        use RoomStatus::*;
        matches!(
            (self, next),
            (Waiting, Drawing) | (Drawing, Finished) | (Waiting, Finished)
        )
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomStatus::Waiting => write!(f, "waiting"),
            RoomStatus::Drawing => write!(f, "drawing"),
            RoomStatus::Finished => write!(f, "finished"),
        }
    }
}

const CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const CODE_SUFFIX_LEN: usize = 3;

/// Short code shared with participants, e.g. `ROOM-7QX`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicCode(String);

impl PublicCode {
    /// Generates a code with the given prefix and a random base-36 suffix
    pub fn generate<R: Rng + ?Sized>(prefix: &str, rng: &mut R) -> Self {
        let suffix: String = (0..CODE_SUFFIX_LEN)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect();
        PublicCode(format!("{}-{}", prefix, suffix))
    }

    /// Wraps a code read from storage or a request path
    pub fn from_string(code: impl Into<String>) -> Self {
        PublicCode(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unguessable admin code; whoever holds it administers the room
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretCode(String);

impl SecretCode {
    pub fn generate() -> Self {
        SecretCode(Uuid::new_v4().simple().to_string())
    }

    pub fn from_string(code: impl Into<String>) -> Self {
        SecretCode(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }
}

// Keep the secret out of logs.
impl fmt::Debug for SecretCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretCode(***)")
    }
}

/// Order in which prizes are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PrizeOrder {
    /// Ascending sort order
    #[default]
    SmallToLarge,
    /// Descending sort order
    LargeToSmall,
    /// Uniformly random among the undrawn prizes
    Random,
}

pub const DEFAULT_GAME_TYPE: &str = "classic";
pub const DEFAULT_VISUALIZATION: &str = "name-reveal";
pub const DEFAULT_THEME: &str = "new-year";

/// Free-form room configuration stored alongside the room
///
/// Missing fields fall back to the defaults when read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomSettings {
    pub game_type: String,
    pub visualization: String,
    pub theme: String,
    pub prize_order: PrizeOrder,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            game_type: DEFAULT_GAME_TYPE.to_string(),
            visualization: DEFAULT_VISUALIZATION.to_string(),
            theme: DEFAULT_THEME.to_string(),
            prize_order: PrizeOrder::default(),
        }
    }
}

impl RoomSettings {
    /// Returns a copy with every field present in `patch` overridden
    pub fn merged(&self, patch: &RoomSettingsPatch) -> Self {
        Self {
            game_type: patch
                .game_type
                .clone()
                .unwrap_or_else(|| self.game_type.clone()),
            visualization: patch
                .visualization
                .clone()
                .unwrap_or_else(|| self.visualization.clone()),
            theme: patch.theme.clone().unwrap_or_else(|| self.theme.clone()),
            prize_order: patch.prize_order.unwrap_or(self.prize_order),
        }
    }
}

/// Partial settings, as accepted on room creation and update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSettingsPatch {
    pub game_type: Option<String>,
    pub visualization: Option<String>,
    pub theme: Option<String>,
    pub prize_order: Option<PrizeOrder>,
}
