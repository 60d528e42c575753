use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::rows::{ParticipantRow, PrizeRow, PARTICIPANT_COLUMNS, PRIZE_COLUMNS};
use super::storage_error;
use crate::domain::errors::{LotteryError, LotteryResult};
use crate::domain::participant::Participant;
use crate::domain::prize::Prize;
use crate::domain::repositories::PrizeRepository;

/// PostgreSQL implementation of PrizeRepository
pub struct PostgresPrizeRepository {
    pool: PgPool,
}

impl PostgresPrizeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrizeRepository for PostgresPrizeRepository {
    async fn insert(&self, prize: &Prize) -> LotteryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO prizes (id, room_id, name, description, sort_order, winner_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(prize.id())
        .bind(prize.room_id())
        .bind(prize.name())
        .bind(prize.description())
        .bind(prize.sort_order())
        .bind(prize.winner_id())
        .bind(prize.created_at())
        .execute(&self.pool)
        .await
        .map_err(storage_error("add prize"))?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> LotteryResult<Option<Prize>> {
        let row = sqlx::query_as::<_, PrizeRow>(&format!(
            "SELECT {} FROM prizes WHERE id = $1",
            PRIZE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error("get prize"))?;

        Ok(row.map(Prize::from))
    }

    async fn list_by_room(&self, room_id: Uuid) -> LotteryResult<Vec<Prize>> {
        let rows = sqlx::query_as::<_, PrizeRow>(&format!(
            "SELECT {} FROM prizes WHERE room_id = $1 ORDER BY sort_order ASC, created_at ASC",
            PRIZE_COLUMNS
        ))
        .bind(room_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error("get prizes"))?;

        Ok(rows.into_iter().map(Prize::from).collect())
    }

    async fn max_sort_order(&self, room_id: Uuid) -> LotteryResult<Option<i32>> {
        sqlx::query_scalar::<_, Option<i32>>("SELECT MAX(sort_order) FROM prizes WHERE room_id = $1")
            .bind(room_id)
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error("get prize order"))
    }

    async fn update(&self, prize: &Prize) -> LotteryResult<Prize> {
        let row = sqlx::query_as::<_, PrizeRow>(&format!(
            r#"
            UPDATE prizes SET name = $2, description = $3, sort_order = $4
            WHERE id = $1
            RETURNING {}
            "#,
            PRIZE_COLUMNS
        ))
        .bind(prize.id())
        .bind(prize.name())
        .bind(prize.description())
        .bind(prize.sort_order())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error("update prize"))?;

        row.map(Prize::from)
            .ok_or_else(|| LotteryError::prize_not_found(prize.id()))
    }

    async fn delete(&self, id: Uuid) -> LotteryResult<()> {
        let result = sqlx::query("DELETE FROM prizes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_error("delete prize"))?;

        if result.rows_affected() == 0 {
            return Err(LotteryError::prize_not_found(id));
        }

        Ok(())
    }

    async fn assign_winner(
        &self,
        room_id: Uuid,
        prize_id: Uuid,
        participant_id: Uuid,
    ) -> LotteryResult<(Prize, Participant)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(storage_error("start drawing transaction"))?;

        let prize = sqlx::query_as::<_, PrizeRow>(&format!(
            r#"
            UPDATE prizes SET winner_id = $1
            WHERE id = $2 AND room_id = $3 AND winner_id IS NULL
            RETURNING {}
            "#,
            PRIZE_COLUMNS
        ))
        .bind(participant_id)
        .bind(prize_id)
        .bind(room_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage_error("award prize"))?
        .ok_or_else(|| {
            LotteryError::Conflict(format!("Prize {} is no longer available", prize_id))
        })?;

        let participant = sqlx::query_as::<_, ParticipantRow>(&format!(
            r#"
            UPDATE participants SET has_won = TRUE, prize_id = $1
            WHERE id = $2 AND room_id = $3 AND has_won = FALSE
            RETURNING {}
            "#,
            PARTICIPANT_COLUMNS
        ))
        .bind(prize_id)
        .bind(participant_id)
        .bind(room_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage_error("record winner"))?
        .ok_or_else(|| {
            LotteryError::Conflict(format!(
                "Participant {} is no longer eligible",
                participant_id
            ))
        })?;

        tx.commit()
            .await
            .map_err(storage_error("commit drawing transaction"))?;

        Ok((Prize::from(prize), Participant::try_from(participant)?))
    }
}
