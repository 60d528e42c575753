// Row types as stored in PostgreSQL and their mapping to domain aggregates

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use crate::domain::errors::LotteryError;
use crate::domain::participant::{Participant, ParticipantName};
use crate::domain::prize::Prize;
use crate::domain::room::{PublicCode, Room, RoomSettings, RoomStatus, SecretCode};

pub(crate) const ROOM_COLUMNS: &str = "id, public_code, secret_code, name, registration_open, \
     status, current_prize_index, settings, created_at";

pub(crate) const PRIZE_COLUMNS: &str =
    "id, room_id, name, description, sort_order, winner_id, created_at";

pub(crate) const PARTICIPANT_COLUMNS: &str = "id, room_id, name, has_won, prize_id, joined_at";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct RoomRow {
    pub id: Uuid,
    pub public_code: String,
    pub secret_code: String,
    pub name: String,
    pub registration_open: bool,
    pub status: RoomStatus,
    pub current_prize_index: i32,
    pub settings: Json<RoomSettings>,
    pub created_at: DateTime<Utc>,
}

impl From<RoomRow> for Room {
    fn from(r: RoomRow) -> Self {
        Room::from_persistence(
            r.id,
            PublicCode::from_string(r.public_code),
            SecretCode::from_string(r.secret_code),
            r.name,
            r.registration_open,
            r.status,
            r.current_prize_index,
            r.settings.0,
            r.created_at,
        )
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PrizeRow {
    pub id: Uuid,
    pub room_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub winner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<PrizeRow> for Prize {
    fn from(r: PrizeRow) -> Self {
        Prize::from_persistence(
            r.id,
            r.room_id,
            r.name,
            r.description,
            r.sort_order,
            r.winner_id,
            r.created_at,
        )
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ParticipantRow {
    pub id: Uuid,
    pub room_id: Uuid,
    pub name: String,
    pub has_won: bool,
    pub prize_id: Option<Uuid>,
    pub joined_at: DateTime<Utc>,
}

impl TryFrom<ParticipantRow> for Participant {
    type Error = LotteryError;

    fn try_from(r: ParticipantRow) -> Result<Self, Self::Error> {
        let name = ParticipantName::new(&r.name).map_err(|e| {
            LotteryError::Storage(format!("Invalid participant name from database: {}", e))
        })?;
        Ok(Participant::from_persistence(
            r.id,
            r.room_id,
            name,
            r.joined_at,
            r.has_won,
            r.prize_id,
        ))
    }
}
