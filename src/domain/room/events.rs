use uuid::Uuid;

use super::value_objects::RoomStatus;

/// Domain events that occur within the Room aggregate
///
/// Used for logging lifecycle moments; the realtime feed is driven by row
/// changes, not by these events.
///
/// # Example
/// ```
/// use lottery_api::domain::room::events::RoomEvent;
/// use uuid::Uuid;
///
/// let event = RoomEvent::Created {
///     room_id: Uuid::new_v4(),
///     public_code: "ROOM-ABC".to_string(),
///     name: "New Year Party".to_string(),
/// };
/// assert_eq!(event.name(), "created");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    /// Fired when a room is created
    Created {
        room_id: Uuid,
        public_code: String,
        name: String,
    },
    /// Fired when registration is opened or closed
    RegistrationToggled { room_id: Uuid, open: bool },
    /// Fired on any forward status change
    StatusChanged {
        room_id: Uuid,
        from: RoomStatus,
        to: RoomStatus,
    },
    /// Fired when a prize is awarded
    PrizeAwarded {
        room_id: Uuid,
        prize_id: Uuid,
        participant_id: Uuid,
    },
}

impl RoomEvent {
    /// Returns the room_id for this event
    pub fn room_id(&self) -> Uuid {
        match self {
            RoomEvent::Created { room_id, .. } => *room_id,
            RoomEvent::RegistrationToggled { room_id, .. } => *room_id,
            RoomEvent::StatusChanged { room_id, .. } => *room_id,
            RoomEvent::PrizeAwarded { room_id, .. } => *room_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RoomEvent::Created { .. } => "created",
            RoomEvent::RegistrationToggled { .. } => "registration_toggled",
            RoomEvent::StatusChanged { .. } => "status_changed",
            RoomEvent::PrizeAwarded { .. } => "prize_awarded",
        }
    }

    /// Emits the event as a structured log line
    pub fn record(&self) {
        match self {
            RoomEvent::Created {
                room_id,
                public_code,
                name,
            } => tracing::info!(%room_id, %public_code, %name, "room created"),
            RoomEvent::RegistrationToggled { room_id, open } => {
                tracing::info!(%room_id, open, "registration toggled")
            }
            RoomEvent::StatusChanged { room_id, from, to } => {
                tracing::info!(%room_id, %from, %to, "room status changed")
            }
            RoomEvent::PrizeAwarded {
                room_id,
                prize_id,
                participant_id,
            } => tracing::info!(%room_id, %prize_id, %participant_id, "prize awarded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_id_is_exposed_for_every_variant() {
        let room_id = Uuid::new_v4();
        let events = vec![
            RoomEvent::Created {
                room_id,
                public_code: "ROOM-123".to_string(),
                name: "Party".to_string(),
            },
            RoomEvent::RegistrationToggled {
                room_id,
                open: false,
            },
            RoomEvent::StatusChanged {
                room_id,
                from: RoomStatus::Waiting,
                to: RoomStatus::Drawing,
            },
            RoomEvent::PrizeAwarded {
                room_id,
                prize_id: Uuid::new_v4(),
                participant_id: Uuid::new_v4(),
            },
        ];

        for event in events {
            assert_eq!(event.room_id(), room_id);
        }
    }

    #[test]
    fn event_names() {
        let event = RoomEvent::RegistrationToggled {
            room_id: Uuid::new_v4(),
            open: true,
        };
        assert_eq!(event.name(), "registration_toggled");
    }
}
