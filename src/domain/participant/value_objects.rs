use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::errors::LotteryResult;
use crate::domain::required_text;

pub const MAX_PARTICIPANT_NAME_LEN: usize = 64;

/// Display name of a participant
///
/// # Invariants
/// - Trimmed, non-empty, at most 64 characters
/// - Compared case-insensitively within a room through [`ParticipantName::key`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantName(String);

impl ParticipantName {
    /// Creates a new ParticipantName value object
    ///
    /// # Example
    /// ```
    /// use lottery_api::domain::participant::ParticipantName;
    ///
    /// let name = ParticipantName::new("  Alice ").expect("valid name");
    /// assert_eq!(name.as_str(), "Alice");
    /// assert_eq!(name.key(), "alice");
    /// ```
    pub fn new(raw: &str) -> LotteryResult<Self> {
        required_text("Participant name", raw, MAX_PARTICIPANT_NAME_LEN).map(ParticipantName)
    }

    /// Uniqueness key within a room
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }

    pub fn same_as(&self, other: &ParticipantName) -> bool {
        self.key() == other.key()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_name() {
        assert!(ParticipantName::new("Bob").is_ok());
    }

    #[test]
    fn empty_name_is_invalid() {
        assert!(ParticipantName::new("").is_err());
        assert!(ParticipantName::new("    ").is_err());
    }

    #[test]
    fn too_long_name_is_invalid() {
        let name = "a".repeat(MAX_PARTICIPANT_NAME_LEN + 1);
        assert!(ParticipantName::new(&name).is_err());
    }

    #[test]
    fn names_compare_ignoring_case() {
        let a = ParticipantName::new("Zoë").unwrap();
        let b = ParticipantName::new("ZOË").unwrap();
        assert!(a.same_as(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn display_keeps_original_case() {
        let name = ParticipantName::new("McDonald").unwrap();
        assert_eq!(name.to_string(), "McDonald");
    }
}
