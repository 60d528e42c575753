use serde::Serialize;
use std::fmt;

use crate::domain::participant::Participant;
use crate::domain::prize::Prize;
use crate::domain::room::{Room, RoomStatus};

/// Reason a drawing cannot start yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawBlocker {
    NoPrizes,
    NoParticipants,
    RegistrationOpen,
    NotWaiting,
}

impl fmt::Display for DrawBlocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawBlocker::NoPrizes => write!(f, "add at least one prize"),
            DrawBlocker::NoParticipants => write!(f, "at least one participant is required"),
            DrawBlocker::RegistrationOpen => write!(f, "close registration first"),
            DrawBlocker::NotWaiting => write!(f, "room is not waiting for a drawing"),
        }
    }
}

/// Lists everything preventing `room` from starting its drawing
///
/// An empty result means the drawing may start.
pub fn drawing_blockers(
    room: &Room,
    prizes: &[Prize],
    participants: &[Participant],
) -> Vec<DrawBlocker> {
    let mut blockers = Vec::new();

    if prizes.is_empty() {
        blockers.push(DrawBlocker::NoPrizes);
    }
    if participants.is_empty() {
        blockers.push(DrawBlocker::NoParticipants);
    }
    if room.registration_open() {
        blockers.push(DrawBlocker::RegistrationOpen);
    }
    if room.status() != RoomStatus::Waiting {
        blockers.push(DrawBlocker::NotWaiting);
    }

    blockers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::participant::ParticipantName;
    use crate::domain::room::{PublicCode, RoomSettings};

    fn room() -> Room {
        Room::new("Party", PublicCode::from_string("ROOM-1"), RoomSettings::default())
            .unwrap()
            .0
    }

    #[test]
    fn fresh_room_reports_every_blocker_but_status() {
        let blockers = drawing_blockers(&room(), &[], &[]);
        assert_eq!(
            blockers,
            vec![
                DrawBlocker::NoPrizes,
                DrawBlocker::NoParticipants,
                DrawBlocker::RegistrationOpen,
            ]
        );
    }

    #[test]
    fn ready_room_has_no_blockers() {
        let mut room = room();
        room.set_registration_open(false);
        let prizes = vec![Prize::new(room.id(), "Mug", None, 1).unwrap()];
        let participants = vec![Participant::new(
            room.id(),
            ParticipantName::new("Alice").unwrap(),
        )];

        assert!(drawing_blockers(&room, &prizes, &participants).is_empty());
    }

    #[test]
    fn started_room_is_blocked() {
        let mut room = room();
        room.start_drawing().unwrap();
        let prizes = vec![Prize::new(room.id(), "Mug", None, 1).unwrap()];
        let participants = vec![Participant::new(
            room.id(),
            ParticipantName::new("Alice").unwrap(),
        )];

        assert_eq!(
            drawing_blockers(&room, &prizes, &participants),
            vec![DrawBlocker::NotWaiting]
        );
    }
}
