use futures_util::stream::{self, Stream};
use std::future::Future;
use uuid::Uuid;

use super::LotteryService;
use crate::domain::errors::LotteryResult;
use crate::domain::participant::Participant;
use crate::domain::prize::Prize;
use crate::domain::room::Room;
use crate::realtime::{Notification, RoomSubscription, Table};

/// Snapshot stream: the current state first, then a fresh snapshot after
/// every change touching `table`
///
/// Ends when the room is deleted, the hub shuts down, or a fetch fails.
fn watch<T, F, Fut>(
    subscription: RoomSubscription,
    table: Table,
    fetch: F,
) -> impl Stream<Item = T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = LotteryResult<T>>,
{
    stream::unfold(
        (subscription, fetch, true),
        move |(mut subscription, fetch, initial)| async move {
            if !initial {
                loop {
                    match subscription.next().await? {
                        Notification::Change(event) if event.is_room_deleted() => return None,
                        notification if notification.touches(table) => break,
                        _ => {}
                    }
                }
            }

            match fetch().await {
                Ok(snapshot) => Some((snapshot, (subscription, fetch, false))),
                Err(err) => {
                    tracing::debug!(room_id = %subscription.room_id(), error = %err, "watch stream closed");
                    None
                }
            }
        },
    )
}

impl LotteryService {
    pub fn watch_room(&self, room_id: Uuid) -> impl Stream<Item = Room> + Send + 'static {
        let service = self.clone();
        watch(self.hub.subscribe(room_id), Table::Rooms, move || {
            let service = service.clone();
            async move { service.get_room(room_id).await }
        })
    }

    pub fn watch_prizes(&self, room_id: Uuid) -> impl Stream<Item = Vec<Prize>> + Send + 'static {
        let service = self.clone();
        watch(self.hub.subscribe(room_id), Table::Prizes, move || {
            let service = service.clone();
            async move { service.list_prizes(room_id).await }
        })
    }

    pub fn watch_participants(
        &self,
        room_id: Uuid,
    ) -> impl Stream<Item = Vec<Participant>> + Send + 'static {
        let service = self.clone();
        watch(self.hub.subscribe(room_id), Table::Participants, move || {
            let service = service.clone();
            async move { service.list_participants(room_id).await }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::InMemoryLotteryStore;
    use crate::realtime::ChangeHub;
    use crate::service::{NewPrize, NewRoom, RoomPatch};
    use futures_util::StreamExt;
    use std::sync::Arc;

    async fn setup() -> (LotteryService, Room) {
        let service = LotteryService::in_memory(ChangeHub::new(64), "ROOM");
        let room = service
            .create_room(NewRoom {
                name: "Party".to_string(),
                settings: None,
            })
            .await
            .unwrap();
        (service, room)
    }

    #[tokio::test]
    async fn room_stream_yields_snapshot_then_updates() {
        let (service, room) = setup().await;
        let mut stream = Box::pin(service.watch_room(room.id()));

        let initial = stream.next().await.unwrap();
        assert!(initial.registration_open());

        service
            .update_room(
                room.id(),
                room.secret_code().as_str(),
                RoomPatch {
                    registration_open: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let updated = stream.next().await.unwrap();
        assert!(!updated.registration_open());
    }

    #[tokio::test]
    async fn room_stream_ends_on_delete() {
        let (service, room) = setup().await;
        let mut stream = Box::pin(service.watch_room(room.id()));
        stream.next().await.unwrap();

        service
            .delete_room(room.id(), room.secret_code().as_str())
            .await
            .unwrap();

        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn participant_stream_ignores_prize_changes() {
        let (service, room) = setup().await;
        let mut stream = Box::pin(service.watch_participants(room.id()));
        assert!(stream.next().await.unwrap().is_empty());

        service
            .add_prize(
                room.id(),
                room.secret_code().as_str(),
                NewPrize {
                    name: "Mug".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        service.register_participant(room.id(), "Alice").await.unwrap();

        let participants = stream.next().await.unwrap();
        assert_eq!(participants.len(), 1);
        assert_eq!(participants[0].name().as_str(), "Alice");
    }

    #[tokio::test]
    async fn prize_stream_sees_new_prizes() {
        let (service, room) = setup().await;
        let mut stream = Box::pin(service.watch_prizes(room.id()));
        assert!(stream.next().await.unwrap().is_empty());

        service
            .add_prize(
                room.id(),
                room.secret_code().as_str(),
                NewPrize {
                    name: "Mug".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let prizes = stream.next().await.unwrap();
        assert_eq!(prizes[0].name(), "Mug");
    }

    #[tokio::test]
    async fn resync_refetches_changes_the_hub_never_saw() {
        // The store reports to a hub nobody watches, like a relay that lost its connection
        let unheard = ChangeHub::new(64);
        let hub = ChangeHub::new(64);
        let store = Arc::new(InMemoryLotteryStore::new(unheard));
        let service =
            LotteryService::new(store.clone(), store.clone(), store, hub.clone(), "ROOM");
        let room = service
            .create_room(NewRoom {
                name: "Party".to_string(),
                settings: None,
            })
            .await
            .unwrap();

        let mut stream = Box::pin(service.watch_participants(room.id()));
        assert!(stream.next().await.unwrap().is_empty());

        service.register_participant(room.id(), "Alice").await.unwrap();
        hub.resync_all();

        let participants = stream.next().await.unwrap();
        assert_eq!(participants.len(), 1);
    }
}
