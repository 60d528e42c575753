use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::errors::{LotteryError, LotteryResult};
use crate::domain::participant::Participant;
use crate::domain::prize::Prize;
use super::room_moved;
use crate::domain::repositories::{
    ParticipantRepository, PrizeRepository, RoomChanges, RoomRepository,
};
use crate::domain::room::{Room, RoomStatus};
use crate::realtime::{ChangeEvent, ChangeHub, ChangeOp, Table};

#[derive(Default)]
struct Tables {
    rooms: HashMap<Uuid, Room>,
    prizes: HashMap<Uuid, Prize>,
    participants: HashMap<Uuid, Participant>,
}

/// Process-local store implementing every repository trait
///
/// Used for single-instance deployments and tests. Unlike the PostgreSQL
/// adapters, which rely on database triggers, it publishes its own change
/// events to the hub after each successful write.
pub struct InMemoryLotteryStore {
    tables: RwLock<Tables>,
    hub: ChangeHub,
}

impl InMemoryLotteryStore {
    pub fn new(hub: ChangeHub) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            hub,
        }
    }

    fn emit(&self, table: Table, op: ChangeOp, room_id: Uuid) {
        self.hub.publish(ChangeEvent::new(table, op, room_id));
    }
}

/// The stored room, provided it is still in `expected`
fn stored_room(tables: &mut Tables, id: Uuid, expected: RoomStatus) -> LotteryResult<&mut Room> {
    let stored = tables
        .rooms
        .get_mut(&id)
        .ok_or_else(|| LotteryError::room_not_found(id))?;
    if stored.status() != expected {
        return Err(room_moved(expected, stored.status()));
    }
    Ok(stored)
}

#[async_trait]
impl RoomRepository for InMemoryLotteryStore {
    async fn insert(&self, room: &Room) -> LotteryResult<()> {
        let mut tables = self.tables.write().await;
        let taken = tables.rooms.values().any(|r| {
            r.id() == room.id()
                || r.public_code() == room.public_code()
                || r.secret_code() == room.secret_code()
        });
        if taken {
            return Err(LotteryError::Conflict(format!(
                "Room {} already exists",
                room.public_code()
            )));
        }
        tables.rooms.insert(room.id(), room.clone());
        drop(tables);

        self.emit(Table::Rooms, ChangeOp::Insert, room.id());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> LotteryResult<Option<Room>> {
        Ok(self.tables.read().await.rooms.get(&id).cloned())
    }

    async fn find_by_public_code(&self, code: &str) -> LotteryResult<Option<Room>> {
        let tables = self.tables.read().await;
        Ok(tables
            .rooms
            .values()
            .find(|r| r.public_code().as_str() == code)
            .cloned())
    }

    async fn find_by_secret_code(&self, code: &str) -> LotteryResult<Option<Room>> {
        let tables = self.tables.read().await;
        Ok(tables.rooms.values().find(|r| r.is_admin(code)).cloned())
    }

    async fn public_code_exists(&self, code: &str) -> LotteryResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.rooms.values().any(|r| r.public_code().as_str() == code))
    }

    async fn update_details(
        &self,
        id: Uuid,
        expected: RoomStatus,
        changes: &RoomChanges,
    ) -> LotteryResult<Room> {
        let mut tables = self.tables.write().await;
        let stored = stored_room(&mut tables, id, expected)?;
        if let Some(name) = &changes.name {
            stored.rename(name)?;
        }
        if let Some(open) = changes.registration_open {
            stored.set_registration_open(open);
        }
        if let Some(settings) = &changes.settings {
            stored.replace_settings(settings.clone());
        }
        let room = stored.clone();
        drop(tables);

        self.emit(Table::Rooms, ChangeOp::Update, id);
        Ok(room)
    }

    async fn transition(&self, id: Uuid, from: RoomStatus, to: RoomStatus) -> LotteryResult<Room> {
        let mut tables = self.tables.write().await;
        let stored = stored_room(&mut tables, id, from)?;
        stored.transition_to(to)?;
        let room = stored.clone();
        drop(tables);

        self.emit(Table::Rooms, ChangeOp::Update, id);
        Ok(room)
    }

    async fn record_progress(&self, id: Uuid, current_prize_index: i32) -> LotteryResult<Room> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .rooms
            .get_mut(&id)
            .ok_or_else(|| LotteryError::room_not_found(id))?;
        if current_prize_index > stored.current_prize_index() {
            stored.set_current_prize_index(current_prize_index);
        }
        let room = stored.clone();
        drop(tables);

        self.emit(Table::Rooms, ChangeOp::Update, id);
        Ok(room)
    }

    async fn delete(&self, id: Uuid) -> LotteryResult<()> {
        let mut tables = self.tables.write().await;
        if tables.rooms.remove(&id).is_none() {
            return Err(LotteryError::room_not_found(id));
        }
        let prizes_before = tables.prizes.len();
        tables.prizes.retain(|_, p| p.room_id() != id);
        let removed_prizes = prizes_before - tables.prizes.len();
        let participants_before = tables.participants.len();
        tables.participants.retain(|_, p| p.room_id() != id);
        let removed_participants = participants_before - tables.participants.len();
        drop(tables);

        if removed_prizes > 0 {
            self.emit(Table::Prizes, ChangeOp::Delete, id);
        }
        if removed_participants > 0 {
            self.emit(Table::Participants, ChangeOp::Delete, id);
        }
        self.emit(Table::Rooms, ChangeOp::Delete, id);
        Ok(())
    }
}

#[async_trait]
impl PrizeRepository for InMemoryLotteryStore {
    async fn insert(&self, prize: &Prize) -> LotteryResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.rooms.contains_key(&prize.room_id()) {
            return Err(LotteryError::room_not_found(prize.room_id()));
        }
        tables.prizes.insert(prize.id(), prize.clone());
        drop(tables);

        self.emit(Table::Prizes, ChangeOp::Insert, prize.room_id());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> LotteryResult<Option<Prize>> {
        Ok(self.tables.read().await.prizes.get(&id).cloned())
    }

    async fn list_by_room(&self, room_id: Uuid) -> LotteryResult<Vec<Prize>> {
        let tables = self.tables.read().await;
        let mut prizes: Vec<Prize> = tables
            .prizes
            .values()
            .filter(|p| p.room_id() == room_id)
            .cloned()
            .collect();
        prizes.sort_by_key(|p| (p.sort_order(), p.created_at()));
        Ok(prizes)
    }

    async fn max_sort_order(&self, room_id: Uuid) -> LotteryResult<Option<i32>> {
        let tables = self.tables.read().await;
        Ok(tables
            .prizes
            .values()
            .filter(|p| p.room_id() == room_id)
            .map(Prize::sort_order)
            .max())
    }

    async fn update(&self, prize: &Prize) -> LotteryResult<Prize> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .prizes
            .get_mut(&prize.id())
            .ok_or_else(|| LotteryError::prize_not_found(prize.id()))?;
        // Only the editable fields; the winner is owned by assign_winner.
        let updated = Prize::from_persistence(
            stored.id(),
            stored.room_id(),
            prize.name().to_string(),
            prize.description().map(str::to_string),
            prize.sort_order(),
            stored.winner_id(),
            stored.created_at(),
        );
        *stored = updated.clone();
        drop(tables);

        self.emit(Table::Prizes, ChangeOp::Update, updated.room_id());
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> LotteryResult<()> {
        let mut tables = self.tables.write().await;
        let removed = tables
            .prizes
            .remove(&id)
            .ok_or_else(|| LotteryError::prize_not_found(id))?;
        drop(tables);

        self.emit(Table::Prizes, ChangeOp::Delete, removed.room_id());
        Ok(())
    }

    async fn assign_winner(
        &self,
        room_id: Uuid,
        prize_id: Uuid,
        participant_id: Uuid,
    ) -> LotteryResult<(Prize, Participant)> {
        let mut tables = self.tables.write().await;

        let mut prize = tables
            .prizes
            .get(&prize_id)
            .filter(|p| p.room_id() == room_id && !p.is_awarded())
            .cloned()
            .ok_or_else(|| {
                LotteryError::Conflict(format!("Prize {} is no longer available", prize_id))
            })?;
        let mut participant = tables
            .participants
            .get(&participant_id)
            .filter(|p| p.room_id() == room_id && !p.has_won())
            .cloned()
            .ok_or_else(|| {
                LotteryError::Conflict(format!(
                    "Participant {} is no longer eligible",
                    participant_id
                ))
            })?;

        prize.award(participant_id)?;
        participant.award(prize_id)?;
        tables.prizes.insert(prize_id, prize.clone());
        tables.participants.insert(participant_id, participant.clone());
        drop(tables);

        self.emit(Table::Prizes, ChangeOp::Update, room_id);
        self.emit(Table::Participants, ChangeOp::Update, room_id);
        Ok((prize, participant))
    }
}

#[async_trait]
impl ParticipantRepository for InMemoryLotteryStore {
    async fn insert(&self, participant: &Participant) -> LotteryResult<()> {
        let mut tables = self.tables.write().await;
        let room = tables
            .rooms
            .get(&participant.room_id())
            .ok_or_else(|| LotteryError::room_not_found(participant.room_id()))?;
        if room.status() != RoomStatus::Waiting || !room.registration_open() {
            return Err(LotteryError::RegistrationClosed);
        }
        let duplicate = tables.participants.values().any(|p| {
            p.room_id() == participant.room_id() && p.name().same_as(participant.name())
        });
        if duplicate {
            return Err(LotteryError::DuplicateParticipant(
                participant.name().to_string(),
            ));
        }
        tables
            .participants
            .insert(participant.id(), participant.clone());
        drop(tables);

        self.emit(Table::Participants, ChangeOp::Insert, participant.room_id());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> LotteryResult<Option<Participant>> {
        Ok(self.tables.read().await.participants.get(&id).cloned())
    }

    async fn list_by_room(&self, room_id: Uuid) -> LotteryResult<Vec<Participant>> {
        let tables = self.tables.read().await;
        let mut participants: Vec<Participant> = tables
            .participants
            .values()
            .filter(|p| p.room_id() == room_id)
            .cloned()
            .collect();
        participants.sort_by_key(|p| p.joined_at());
        Ok(participants)
    }

    async fn update(&self, participant: &Participant) -> LotteryResult<Participant> {
        let mut tables = self.tables.write().await;
        let duplicate = tables.participants.values().any(|p| {
            p.id() != participant.id()
                && p.room_id() == participant.room_id()
                && p.name().same_as(participant.name())
        });
        if duplicate {
            return Err(LotteryError::DuplicateParticipant(
                participant.name().to_string(),
            ));
        }
        let stored = tables
            .participants
            .get_mut(&participant.id())
            .ok_or_else(|| LotteryError::participant_not_found(participant.id()))?;
        stored.rename(participant.name().clone());
        let updated = stored.clone();
        drop(tables);

        self.emit(Table::Participants, ChangeOp::Update, updated.room_id());
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::participant::ParticipantName;
    use crate::domain::room::{PublicCode, RoomSettings};

    fn store() -> InMemoryLotteryStore {
        InMemoryLotteryStore::new(ChangeHub::new(64))
    }

    async fn seeded_room(store: &InMemoryLotteryStore, code: &str) -> Room {
        let (room, _) =
            Room::new("Party", PublicCode::from_string(code), RoomSettings::default()).unwrap();
        RoomRepository::insert(store, &room).await.unwrap();
        room
    }

    fn person(room: &Room, name: &str) -> Participant {
        Participant::new(room.id(), ParticipantName::new(name).unwrap())
    }

    #[tokio::test]
    async fn rooms_are_found_by_every_code() {
        let store = store();
        let room = seeded_room(&store, "ROOM-AAA").await;

        let by_public = store.find_by_public_code("ROOM-AAA").await.unwrap();
        let by_secret = store
            .find_by_secret_code(room.secret_code().as_str())
            .await
            .unwrap();

        assert_eq!(by_public.unwrap().id(), room.id());
        assert_eq!(by_secret.unwrap().id(), room.id());
        assert!(store.public_code_exists("ROOM-AAA").await.unwrap());
        assert!(!store.public_code_exists("ROOM-BBB").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_public_code_is_rejected() {
        let store = store();
        seeded_room(&store, "ROOM-AAA").await;
        let (clash, _) =
            Room::new("Other", PublicCode::from_string("ROOM-AAA"), RoomSettings::default())
                .unwrap();

        let err = RoomRepository::insert(&store, &clash).await.unwrap_err();
        assert!(matches!(err, LotteryError::Conflict(_)));
    }

    #[tokio::test]
    async fn participant_names_are_unique_ignoring_case() {
        let store = store();
        let room = seeded_room(&store, "ROOM-AAA").await;
        let other_room = seeded_room(&store, "ROOM-BBB").await;

        ParticipantRepository::insert(&store, &person(&room, "Alice"))
            .await
            .unwrap();
        let err = ParticipantRepository::insert(&store, &person(&room, "ALICE"))
            .await
            .unwrap_err();
        assert_eq!(err, LotteryError::DuplicateParticipant("ALICE".to_string()));

        // Same name in another room is fine.
        ParticipantRepository::insert(&store, &person(&other_room, "alice"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rename_to_taken_name_fails() {
        let store = store();
        let room = seeded_room(&store, "ROOM-AAA").await;
        let alice = person(&room, "Alice");
        let mut bob = person(&room, "Bob");
        ParticipantRepository::insert(&store, &alice).await.unwrap();
        ParticipantRepository::insert(&store, &bob).await.unwrap();

        bob.rename(ParticipantName::new("alice").unwrap());
        let err = ParticipantRepository::update(&store, &bob).await.unwrap_err();
        assert!(matches!(err, LotteryError::DuplicateParticipant(_)));

        // Changing only the case of your own name is allowed.
        let mut alice = alice;
        alice.rename(ParticipantName::new("ALICE").unwrap());
        let renamed = ParticipantRepository::update(&store, &alice).await.unwrap();
        assert_eq!(renamed.name().as_str(), "ALICE");
    }

    #[tokio::test]
    async fn assign_winner_is_one_shot() {
        let store = store();
        let room = seeded_room(&store, "ROOM-AAA").await;
        let prize = Prize::new(room.id(), "Mug", None, 1).unwrap();
        let alice = person(&room, "Alice");
        let bob = person(&room, "Bob");
        PrizeRepository::insert(&store, &prize).await.unwrap();
        ParticipantRepository::insert(&store, &alice).await.unwrap();
        ParticipantRepository::insert(&store, &bob).await.unwrap();

        let (awarded, winner) = store
            .assign_winner(room.id(), prize.id(), alice.id())
            .await
            .unwrap();
        assert_eq!(awarded.winner_id(), Some(alice.id()));
        assert_eq!(winner.prize_id(), Some(prize.id()));

        let err = store
            .assign_winner(room.id(), prize.id(), bob.id())
            .await
            .unwrap_err();
        assert!(matches!(err, LotteryError::Conflict(_)));
    }

    #[tokio::test]
    async fn assign_winner_rejects_cross_room_pairs() {
        let store = store();
        let room = seeded_room(&store, "ROOM-AAA").await;
        let other = seeded_room(&store, "ROOM-BBB").await;
        let prize = Prize::new(room.id(), "Mug", None, 1).unwrap();
        let stranger = person(&other, "Mallory");
        PrizeRepository::insert(&store, &prize).await.unwrap();
        ParticipantRepository::insert(&store, &stranger).await.unwrap();

        let err = store
            .assign_winner(room.id(), prize.id(), stranger.id())
            .await
            .unwrap_err();
        assert!(matches!(err, LotteryError::Conflict(_)));

        let untouched = PrizeRepository::find_by_id(&store, prize.id())
            .await
            .unwrap()
            .unwrap();
        assert!(!untouched.is_awarded());
    }

    #[tokio::test]
    async fn deleting_a_room_cascades() {
        let store = store();
        let room = seeded_room(&store, "ROOM-AAA").await;
        let prize = Prize::new(room.id(), "Mug", None, 1).unwrap();
        PrizeRepository::insert(&store, &prize).await.unwrap();
        ParticipantRepository::insert(&store, &person(&room, "Alice"))
            .await
            .unwrap();

        RoomRepository::delete(&store, room.id()).await.unwrap();

        assert!(PrizeRepository::list_by_room(&store, room.id())
            .await
            .unwrap()
            .is_empty());
        assert!(ParticipantRepository::list_by_room(&store, room.id())
            .await
            .unwrap()
            .is_empty());
        assert!(matches!(
            RoomRepository::delete(&store, room.id()).await,
            Err(LotteryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn writes_publish_changes() {
        let hub = ChangeHub::new(64);
        let store = InMemoryLotteryStore::new(hub.clone());
        let (room, _) =
            Room::new("Party", PublicCode::from_string("ROOM-A"), RoomSettings::default())
                .unwrap();
        let mut sub = hub.subscribe(room.id());

        RoomRepository::insert(&store, &room).await.unwrap();
        PrizeRepository::insert(&store, &Prize::new(room.id(), "Mug", None, 1).unwrap())
            .await
            .unwrap();

        let first = sub.next().await.unwrap();
        let second = sub.next().await.unwrap();
        assert!(first.touches(Table::Rooms));
        assert!(second.touches(Table::Prizes));
    }

    #[tokio::test]
    async fn stale_detail_write_does_not_touch_a_moved_room() {
        let store = store();
        let room = seeded_room(&store, "ROOM-AAA").await;
        store
            .transition(room.id(), RoomStatus::Waiting, RoomStatus::Drawing)
            .await
            .unwrap();
        // Someone read the room while drawing, then it finished
        store
            .transition(room.id(), RoomStatus::Drawing, RoomStatus::Finished)
            .await
            .unwrap();

        let changes = RoomChanges {
            name: Some("Gala".to_string()),
            ..Default::default()
        };
        let err = store
            .update_details(room.id(), RoomStatus::Drawing, &changes)
            .await
            .unwrap_err();
        assert!(matches!(err, LotteryError::Conflict(_)));

        let stored = RoomRepository::find_by_id(&store, room.id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status(), RoomStatus::Finished);
        assert_eq!(stored.name(), "Party");
    }

    #[tokio::test]
    async fn detail_writes_leave_other_columns_alone() {
        let store = store();
        let room = seeded_room(&store, "ROOM-AAA").await;
        store.record_progress(room.id(), 2).await.unwrap();

        let changes = RoomChanges {
            registration_open: Some(false),
            ..Default::default()
        };
        let updated = store
            .update_details(room.id(), RoomStatus::Waiting, &changes)
            .await
            .unwrap();

        assert_eq!(updated.name(), "Party");
        assert!(!updated.registration_open());
        assert_eq!(updated.current_prize_index(), 2);
    }

    #[tokio::test]
    async fn transition_requires_the_expected_status() {
        let store = store();
        let room = seeded_room(&store, "ROOM-AAA").await;

        let drawing = store
            .transition(room.id(), RoomStatus::Waiting, RoomStatus::Drawing)
            .await
            .unwrap();
        assert_eq!(drawing.status(), RoomStatus::Drawing);
        assert!(!drawing.registration_open());

        // A second starter lost the race
        let err = store
            .transition(room.id(), RoomStatus::Waiting, RoomStatus::Drawing)
            .await
            .unwrap_err();
        assert!(matches!(err, LotteryError::Conflict(_)));

        let err = store
            .transition(room.id(), RoomStatus::Drawing, RoomStatus::Waiting)
            .await
            .unwrap_err();
        assert!(matches!(err, LotteryError::InvalidStatusTransition { .. }));

        let err = store
            .transition(Uuid::new_v4(), RoomStatus::Waiting, RoomStatus::Drawing)
            .await
            .unwrap_err();
        assert!(matches!(err, LotteryError::NotFound(_)));
    }

    #[tokio::test]
    async fn progress_never_moves_backwards() {
        let store = store();
        let room = seeded_room(&store, "ROOM-AAA").await;

        store.record_progress(room.id(), 3).await.unwrap();
        let stored = store.record_progress(room.id(), 1).await.unwrap();

        assert_eq!(stored.current_prize_index(), 3);
    }

    #[tokio::test]
    async fn participants_cannot_join_once_drawing_started() {
        let store = store();
        let room = seeded_room(&store, "ROOM-AAA").await;
        store
            .transition(room.id(), RoomStatus::Waiting, RoomStatus::Drawing)
            .await
            .unwrap();

        let err = ParticipantRepository::insert(&store, &person(&room, "Late"))
            .await
            .unwrap_err();
        assert_eq!(err, LotteryError::RegistrationClosed);
        assert!(ParticipantRepository::list_by_room(&store, room.id())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn max_sort_order_per_room() {
        let store = store();
        let room = seeded_room(&store, "ROOM-AAA").await;
        assert_eq!(store.max_sort_order(room.id()).await.unwrap(), None);

        for order in [3, 7, 5] {
            let prize = Prize::new(room.id(), "Prize", None, order).unwrap();
            PrizeRepository::insert(&store, &prize).await.unwrap();
        }

        assert_eq!(store.max_sort_order(room.id()).await.unwrap(), Some(7));
    }
}
