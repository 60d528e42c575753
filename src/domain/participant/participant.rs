use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::value_objects::ParticipantName;
use crate::domain::errors::{LotteryError, LotteryResult};

/// A registered entrant
///
/// # Invariants
/// - `has_won` is true exactly when `prize_id` is set
/// - A participant wins at most one prize
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    id: Uuid,
    room_id: Uuid,
    name: ParticipantName,
    joined_at: DateTime<Utc>,
    has_won: bool,
    prize_id: Option<Uuid>,
}

/// Partial participant update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParticipantPatch {
    pub name: Option<String>,
}

impl Participant {
    pub fn new(room_id: Uuid, name: ParticipantName) -> Self {
        Self {
            id: Uuid::new_v4(),
            room_id,
            name,
            joined_at: Utc::now(),
            has_won: false,
            prize_id: None,
        }
    }

    pub fn rename(&mut self, name: ParticipantName) {
        self.name = name;
    }

    /// Marks the participant as winner of `prize_id`
    pub fn award(&mut self, prize_id: Uuid) -> LotteryResult<()> {
        if self.has_won {
            return Err(LotteryError::Conflict(format!(
                "Participant {} has already won",
                self.name
            )));
        }
        self.has_won = true;
        self.prize_id = Some(prize_id);
        Ok(())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn room_id(&self) -> Uuid {
        self.room_id
    }

    pub fn name(&self) -> &ParticipantName {
        &self.name
    }

    pub fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }

    pub fn has_won(&self) -> bool {
        self.has_won
    }

    pub fn prize_id(&self) -> Option<Uuid> {
        self.prize_id
    }

    /// Reconstructs a Participant from persistence layer data
    pub fn from_persistence(
        id: Uuid,
        room_id: Uuid,
        name: ParticipantName,
        joined_at: DateTime<Utc>,
        has_won: bool,
        prize_id: Option<Uuid>,
    ) -> Self {
        Self {
            id,
            room_id,
            name,
            joined_at,
            has_won,
            prize_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Participant {
        Participant::new(Uuid::new_v4(), ParticipantName::new("Alice").unwrap())
    }

    #[test]
    fn new_participant_has_not_won() {
        let p = alice();
        assert!(!p.has_won());
        assert_eq!(p.prize_id(), None);
        assert_eq!(p.name().as_str(), "Alice");
    }

    #[test]
    fn award_sets_both_fields() {
        let mut p = alice();
        let prize_id = Uuid::new_v4();

        p.award(prize_id).unwrap();

        assert!(p.has_won());
        assert_eq!(p.prize_id(), Some(prize_id));
    }

    #[test]
    fn cannot_win_twice() {
        let mut p = alice();
        p.award(Uuid::new_v4()).unwrap();

        assert!(matches!(
            p.award(Uuid::new_v4()),
            Err(LotteryError::Conflict(_))
        ));
    }
}
