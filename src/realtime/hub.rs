use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

/// Table a change happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    Rooms,
    Prizes,
    Participants,
}

/// Kind of row change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

/// One row change, scoped to the room that owns the row
///
/// Serializes to the same JSON the database triggers send:
/// `{"table":"prizes","op":"UPDATE","room_id":"..."}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: Table,
    pub op: ChangeOp,
    pub room_id: Uuid,
}

impl ChangeEvent {
    pub fn new(table: Table, op: ChangeOp, room_id: Uuid) -> Self {
        Self { table, op, room_id }
    }

    pub fn is_room_deleted(&self) -> bool {
        self.table == Table::Rooms && self.op == ChangeOp::Delete
    }
}

/// What a room subscriber receives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    Change(ChangeEvent),
    /// Events may have been dropped, by lag or a lost database listener; refetch everything
    Resync,
}

impl Notification {
    /// Whether subscribers interested in `table` should refetch
    pub fn touches(&self, table: Table) -> bool {
        match self {
            Notification::Change(event) => event.table == table,
            Notification::Resync => true,
        }
    }
}

/// What travels over the broadcast channel
#[derive(Debug, Clone, Copy)]
enum Message {
    Change(ChangeEvent),
    /// Every subscriber, whatever its room, must refetch
    Resync,
}

/// Broadcast fan-out of change events
#[derive(Debug, Clone)]
pub struct ChangeHub {
    sender: broadcast::Sender<Message>,
}

impl ChangeHub {
    /// Creates a hub buffering up to `capacity` events per subscriber
    ///
    /// # Panics
    /// If `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event; dropped silently when nobody listens
    pub fn publish(&self, event: ChangeEvent) {
        if self.sender.send(Message::Change(event)).is_ok() {
            tracing::trace!(?event, "change published");
        }
    }

    /// Tells every subscriber that changes may have been missed
    pub fn resync_all(&self) {
        if let Ok(receivers) = self.sender.send(Message::Resync) {
            tracing::info!(receivers, "resync broadcast");
        }
    }

    pub fn subscribe(&self, room_id: Uuid) -> RoomSubscription {
        RoomSubscription {
            room_id,
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Changes of a single room
#[derive(Debug)]
pub struct RoomSubscription {
    room_id: Uuid,
    receiver: broadcast::Receiver<Message>,
}

impl RoomSubscription {
    pub fn room_id(&self) -> Uuid {
        self.room_id
    }

    /// Waits for the next change of this room
    ///
    /// Returns `None` once the hub is gone.
    pub async fn next(&mut self) -> Option<Notification> {
        loop {
            match self.receiver.recv().await {
                Ok(Message::Change(event)) if event.room_id == self.room_id => {
                    return Some(Notification::Change(event))
                }
                Ok(Message::Change(_)) => continue,
                Ok(Message::Resync) => return Some(Notification::Resync),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(room_id = %self.room_id, skipped, "subscriber lagged, resyncing");
                    return Some(Notification::Resync);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
