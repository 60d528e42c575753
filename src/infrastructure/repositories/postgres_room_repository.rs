use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::rows::{RoomRow, ROOM_COLUMNS};
use super::{room_moved, storage_error};
use crate::domain::errors::{LotteryError, LotteryResult};
use crate::domain::repositories::{RoomChanges, RoomRepository};
use crate::domain::room::{Room, RoomStatus};

/// PostgreSQL implementation of RoomRepository
///
/// Prizes and participants go away with their room through
/// `ON DELETE CASCADE`.
pub struct PostgresRoomRepository {
    pool: PgPool,
}

impl PostgresRoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(
        &self,
        column: &'static str,
        value: &str,
        action: &'static str,
    ) -> LotteryResult<Option<Room>> {
        let row = sqlx::query_as::<_, RoomRow>(&format!(
            "SELECT {} FROM rooms WHERE {} = $1",
            ROOM_COLUMNS, column
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error(action))?;

        Ok(row.map(Room::from))
    }

    /// Explain why a status-guarded write matched no row
    async fn missing_or_moved(&self, id: Uuid, expected: RoomStatus) -> LotteryError {
        match self.find_by_id(id).await {
            Ok(Some(room)) => room_moved(expected, room.status()),
            Ok(None) => LotteryError::room_not_found(id),
            Err(e) => e,
        }
    }
}

#[async_trait]
impl RoomRepository for PostgresRoomRepository {
    async fn insert(&self, room: &Room) -> LotteryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO rooms (
                id, public_code, secret_code, name, registration_open,
                status, current_prize_index, settings, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(room.id())
        .bind(room.public_code().as_str())
        .bind(room.secret_code().as_str())
        .bind(room.name())
        .bind(room.registration_open())
        .bind(room.status())
        .bind(room.current_prize_index())
        .bind(Json(room.settings()))
        .bind(room.created_at())
        .execute(&self.pool)
        .await
        .map_err(storage_error("create room"))?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> LotteryResult<Option<Room>> {
        let row = sqlx::query_as::<_, RoomRow>(&format!(
            "SELECT {} FROM rooms WHERE id = $1",
            ROOM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error("get room"))?;

        Ok(row.map(Room::from))
    }

    async fn find_by_public_code(&self, code: &str) -> LotteryResult<Option<Room>> {
        self.find_one("public_code", code, "get room by public code")
            .await
    }

    async fn find_by_secret_code(&self, code: &str) -> LotteryResult<Option<Room>> {
        self.find_one("secret_code", code, "get room by secret code")
            .await
    }

    async fn public_code_exists(&self, code: &str) -> LotteryResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM rooms WHERE public_code = $1)")
            .bind(code)
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error("check public code"))
    }

    async fn update_details(
        &self,
        id: Uuid,
        expected: RoomStatus,
        changes: &RoomChanges,
    ) -> LotteryResult<Room> {
        let row = sqlx::query_as::<_, RoomRow>(&format!(
            r#"
            UPDATE rooms SET
                name = COALESCE($3, name),
                registration_open = COALESCE($4, registration_open),
                settings = COALESCE($5, settings)
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            ROOM_COLUMNS
        ))
        .bind(id)
        .bind(expected)
        .bind(changes.name.as_deref())
        .bind(changes.registration_open)
        .bind(changes.settings.as_ref().map(Json))
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error("update room"))?;

        match row {
            Some(row) => Ok(Room::from(row)),
            None => Err(self.missing_or_moved(id, expected).await),
        }
    }

    async fn transition(&self, id: Uuid, from: RoomStatus, to: RoomStatus) -> LotteryResult<Room> {
        if !from.can_transition_to(to) {
            return Err(LotteryError::InvalidStatusTransition { from, to });
        }

        let row = sqlx::query_as::<_, RoomRow>(&format!(
            r#"
            UPDATE rooms SET
                status = $3,
                registration_open = registration_open AND $4
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            ROOM_COLUMNS
        ))
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(to == RoomStatus::Waiting)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error("change room status"))?;

        match row {
            Some(row) => Ok(Room::from(row)),
            None => Err(self.missing_or_moved(id, from).await),
        }
    }

    async fn record_progress(&self, id: Uuid, current_prize_index: i32) -> LotteryResult<Room> {
        let row = sqlx::query_as::<_, RoomRow>(&format!(
            r#"
            UPDATE rooms SET current_prize_index = GREATEST(current_prize_index, $2)
            WHERE id = $1
            RETURNING {}
            "#,
            ROOM_COLUMNS
        ))
        .bind(id)
        .bind(current_prize_index)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error("record drawing progress"))?;

        row.map(Room::from)
            .ok_or_else(|| LotteryError::room_not_found(id))
    }

    async fn delete(&self, id: Uuid) -> LotteryResult<()> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_error("delete room"))?;

        if result.rows_affected() == 0 {
            return Err(LotteryError::room_not_found(id));
        }

        Ok(())
    }
}
