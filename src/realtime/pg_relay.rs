use sqlx::postgres::PgListener;
use sqlx::PgPool;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::hub::{ChangeEvent, ChangeHub};

/// NOTIFY channel the schema triggers publish on
pub const CHANGE_CHANNEL: &str = "lottery_changes";

const RECONNECT_ATTEMPTS: u32 = 8;
const RECONNECT_DELAY: Duration = Duration::from_millis(250);
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(10);

/// Forwards PostgreSQL change notifications into a [`ChangeHub`]
///
/// Every instance of the API runs its own relay, so a write made through any
/// instance (or directly in the database) reaches all subscribers.
pub struct PgChangeRelay {
    pool: PgPool,
    hub: ChangeHub,
}

impl PgChangeRelay {
    pub fn new(pool: PgPool, hub: ChangeHub) -> Self {
        Self { pool, hub }
    }

    /// Listens until the connection can no longer be re-established
    ///
    /// Notifications sent while the listener is disconnected are lost, so
    /// every reconnect is followed by a hub-wide resync.
    pub async fn run(self) -> Result<(), sqlx::Error> {
        let mut listener = self.listen().await?;
        tracing::info!(channel = CHANGE_CHANNEL, "listening for database changes");

        loop {
            match listener.try_recv().await? {
                Some(notification) => forward(&self.hub, notification.payload()),
                None => {
                    tracing::warn!(channel = CHANGE_CHANNEL, "change listener disconnected, reconnecting");
                    listener = self.reconnect().await?;
                    self.hub.resync_all();
                }
            }
        }
    }

    async fn listen(&self) -> Result<PgListener, sqlx::Error> {
        let mut listener = PgListener::connect_with(&self.pool).await?;
        listener.listen(CHANGE_CHANNEL).await?;
        Ok(listener)
    }

    async fn reconnect(&self) -> Result<PgListener, sqlx::Error> {
        let mut delay = RECONNECT_DELAY;
        let mut attempt = 1;
        loop {
            match self.listen().await {
                Ok(listener) => {
                    tracing::info!(attempt, "change listener reconnected");
                    return Ok(listener);
                }
                Err(e) if attempt < RECONNECT_ATTEMPTS => {
                    tracing::warn!(attempt, error = %e, "change listener reconnect failed");
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(MAX_RECONNECT_DELAY);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Runs the relay on the tokio runtime
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            if let Err(e) = self.run().await {
                tracing::error!(error = %e, "change relay stopped");
            }
        })
    }
}

/// Publishes a trigger payload, skipping malformed ones
fn forward(hub: &ChangeHub, payload: &str) {
    match parse_notification(payload) {
        Ok(event) => hub.publish(event),
        Err(e) => tracing::warn!(
            payload,
            error = %e,
            "ignoring malformed change notification"
        ),
    }
}

/// Decodes a trigger payload
pub fn parse_notification(payload: &str) -> Result<ChangeEvent, serde_json::Error> {
    serde_json::from_str(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::hub::{ChangeOp, Notification, Table};
    use uuid::Uuid;

    #[tokio::test]
    async fn forward_publishes_valid_payloads_only() {
        let hub = ChangeHub::new(8);
        let room_id = Uuid::new_v4();
        let mut sub = hub.subscribe(room_id);

        forward(&hub, "not json");
        forward(
            &hub,
            &format!(r#"{{"table":"prizes","op":"INSERT","room_id":"{}"}}"#, room_id),
        );

        assert_eq!(
            sub.next().await.unwrap(),
            Notification::Change(ChangeEvent::new(Table::Prizes, ChangeOp::Insert, room_id))
        );
    }

    #[test]
    fn parses_trigger_payload() {
        let room_id = Uuid::new_v4();
        let payload = format!(
            r#"{{"table" : "participants", "op" : "DELETE", "room_id" : "{}"}}"#,
            room_id
        );

        let event = parse_notification(&payload).unwrap();

        assert_eq!(event.table, Table::Participants);
        assert_eq!(event.op, ChangeOp::Delete);
        assert_eq!(event.room_id, room_id);
    }

    #[test]
    fn rejects_unknown_table() {
        let payload = format!(
            r#"{{"table":"users","op":"INSERT","room_id":"{}"}}"#,
            Uuid::new_v4()
        );
        assert!(parse_notification(&payload).is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_notification("not json").is_err());
    }
}
