use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::errors::{LotteryError, LotteryResult};
use crate::domain::required_text;

pub const MAX_PRIZE_NAME_LEN: usize = 100;

/// An item to be awarded, drawn in sort order
///
/// # Invariants
/// - Name is trimmed and never empty
/// - A winner, once set, belongs to the same room and is never replaced
#[derive(Debug, Clone, PartialEq)]
pub struct Prize {
    id: Uuid,
    room_id: Uuid,
    name: String,
    description: Option<String>,
    sort_order: i32,
    winner_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

/// Partial prize update; `None` fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrizePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
}

impl Prize {
    pub fn new(
        room_id: Uuid,
        name: &str,
        description: Option<&str>,
        sort_order: i32,
    ) -> LotteryResult<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            room_id,
            name: required_text("Prize name", name, MAX_PRIZE_NAME_LEN)?,
            description: normalize_description(description),
            sort_order,
            winner_id: None,
            created_at: Utc::now(),
        })
    }

    /// Applies a partial update
    ///
    /// An empty description clears it.
    pub fn apply(&mut self, patch: &PrizePatch) -> LotteryResult<()> {
        if let Some(name) = &patch.name {
            self.name = required_text("Prize name", name, MAX_PRIZE_NAME_LEN)?;
        }
        if let Some(description) = &patch.description {
            self.description = normalize_description(Some(description));
        }
        if let Some(sort_order) = patch.sort_order {
            self.sort_order = sort_order;
        }
        Ok(())
    }

    /// Records the winner
    ///
    /// Fails with `Conflict` if the prize has already been awarded.
    pub fn award(&mut self, participant_id: Uuid) -> LotteryResult<()> {
        if let Some(existing) = self.winner_id {
            return Err(LotteryError::Conflict(format!(
                "Prize {} was already awarded to {}",
                self.id, existing
            )));
        }
        self.winner_id = Some(participant_id);
        Ok(())
    }

    pub fn is_awarded(&self) -> bool {
        self.winner_id.is_some()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn room_id(&self) -> Uuid {
        self.room_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn sort_order(&self) -> i32 {
        self.sort_order
    }

    pub fn winner_id(&self) -> Option<Uuid> {
        self.winner_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Reconstructs a Prize from persistence layer data
    pub fn from_persistence(
        id: Uuid,
        room_id: Uuid,
        name: String,
        description: Option<String>,
        sort_order: i32,
        winner_id: Option<Uuid>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            room_id,
            name,
            description,
            sort_order,
            winner_id,
            created_at,
        }
    }
}

fn normalize_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_prize() {
        let room_id = Uuid::new_v4();
        let prize = Prize::new(room_id, " Bicycle ", Some(" Red one "), 3).unwrap();

        assert_eq!(prize.room_id(), room_id);
        assert_eq!(prize.name(), "Bicycle");
        assert_eq!(prize.description(), Some("Red one"));
        assert_eq!(prize.sort_order(), 3);
        assert!(!prize.is_awarded());
    }

    #[test]
    fn blank_description_is_dropped() {
        let prize = Prize::new(Uuid::new_v4(), "Mug", Some("   "), 1).unwrap();
        assert_eq!(prize.description(), None);
    }

    #[test]
    fn empty_name_fails() {
        assert!(Prize::new(Uuid::new_v4(), "", None, 1).is_err());
    }

    #[test]
    fn patch_updates_selected_fields() {
        let mut prize = Prize::new(Uuid::new_v4(), "Mug", Some("Ceramic"), 1).unwrap();

        prize
            .apply(&PrizePatch {
                sort_order: Some(5),
                description: Some(String::new()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(prize.name(), "Mug");
        assert_eq!(prize.sort_order(), 5);
        assert_eq!(prize.description(), None);
    }

    #[test]
    fn award_only_once() {
        let mut prize = Prize::new(Uuid::new_v4(), "Mug", None, 1).unwrap();
        let first = Uuid::new_v4();

        prize.award(first).unwrap();
        assert_eq!(prize.winner_id(), Some(first));

        let err = prize.award(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, LotteryError::Conflict(_)));
        assert_eq!(prize.winner_id(), Some(first));
    }
}
