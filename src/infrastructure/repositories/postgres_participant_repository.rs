use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::rows::{ParticipantRow, PARTICIPANT_COLUMNS};
use super::{is_unique_violation, storage_error};
use crate::domain::errors::{LotteryError, LotteryResult};
use crate::domain::participant::Participant;
use crate::domain::repositories::ParticipantRepository;

/// PostgreSQL implementation of ParticipantRepository
///
/// Name uniqueness is enforced by the `(room_id, lower(name))` unique index.
pub struct PostgresParticipantRepository {
    pool: PgPool,
}

impl PostgresParticipantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_write_error(participant: &Participant, action: &'static str) -> impl Fn(sqlx::Error) -> LotteryError {
    let name = participant.name().to_string();
    move |e| {
        if is_unique_violation(&e) {
            LotteryError::DuplicateParticipant(name.clone())
        } else {
            storage_error(action)(e)
        }
    }
}

#[async_trait]
impl ParticipantRepository for PostgresParticipantRepository {
    async fn insert(&self, participant: &Participant) -> LotteryResult<()> {
        // The share lock orders this insert against a concurrent status change.
        let result = sqlx::query(
            r#"
            INSERT INTO participants (id, room_id, name, has_won, prize_id, joined_at)
            SELECT $1, r.id, $3, $4, $5, $6
            FROM rooms r
            WHERE r.id = $2 AND r.status = 'waiting' AND r.registration_open
            FOR SHARE OF r
            "#,
        )
        .bind(participant.id())
        .bind(participant.room_id())
        .bind(participant.name().as_str())
        .bind(participant.has_won())
        .bind(participant.prize_id())
        .bind(participant.joined_at())
        .execute(&self.pool)
        .await
        .map_err(map_write_error(participant, "add participant"))?;

        if result.rows_affected() == 0 {
            let room_exists =
                sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM rooms WHERE id = $1)")
                    .bind(participant.room_id())
                    .fetch_one(&self.pool)
                    .await
                    .map_err(storage_error("add participant"))?;
            return Err(if room_exists {
                LotteryError::RegistrationClosed
            } else {
                LotteryError::room_not_found(participant.room_id())
            });
        }

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> LotteryResult<Option<Participant>> {
        let row = sqlx::query_as::<_, ParticipantRow>(&format!(
            "SELECT {} FROM participants WHERE id = $1",
            PARTICIPANT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error("get participant"))?;

        row.map(Participant::try_from).transpose()
    }

    async fn list_by_room(&self, room_id: Uuid) -> LotteryResult<Vec<Participant>> {
        let rows = sqlx::query_as::<_, ParticipantRow>(&format!(
            "SELECT {} FROM participants WHERE room_id = $1 ORDER BY joined_at ASC",
            PARTICIPANT_COLUMNS
        ))
        .bind(room_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error("get participants"))?;

        rows.into_iter().map(Participant::try_from).collect()
    }

    async fn update(&self, participant: &Participant) -> LotteryResult<Participant> {
        let row = sqlx::query_as::<_, ParticipantRow>(&format!(
            "UPDATE participants SET name = $2 WHERE id = $1 RETURNING {}",
            PARTICIPANT_COLUMNS
        ))
        .bind(participant.id())
        .bind(participant.name().as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error(participant, "update participant"))?;

        row.map(Participant::try_from)
            .transpose()?
            .ok_or_else(|| LotteryError::participant_not_found(participant.id()))
    }
}
