use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::middleware::AdminCode;
use crate::domain::prize::{Prize, PrizePatch};
use crate::service::{LotteryService, NewPrize};

#[derive(Debug, Serialize)]
pub struct PrizeResponse {
    pub id: Uuid,
    pub room_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub winner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<&Prize> for PrizeResponse {
    fn from(prize: &Prize) -> Self {
        Self {
            id: prize.id(),
            room_id: prize.room_id(),
            name: prize.name().to_string(),
            description: prize.description().map(str::to_string),
            sort_order: prize.sort_order(),
            winner_id: prize.winner_id(),
            created_at: prize.created_at(),
        }
    }
}

/// GET /api/rooms/:id/prizes
pub async fn list_prizes(
    State(service): State<LotteryService>,
    Path(room_id): Path<Uuid>,
) -> Result<Json<Vec<PrizeResponse>>, ApiError> {
    let prizes = service.list_prizes(room_id).await?;
    Ok(Json(prizes.iter().map(PrizeResponse::from).collect()))
}

/// POST /api/rooms/:id/prizes
pub async fn add_prize(
    State(service): State<LotteryService>,
    Path(room_id): Path<Uuid>,
    AdminCode(code): AdminCode,
    Json(req): Json<NewPrize>,
) -> Result<(StatusCode, Json<PrizeResponse>), ApiError> {
    let prize = service.add_prize(room_id, &code, req).await?;
    Ok((StatusCode::CREATED, Json(PrizeResponse::from(&prize))))
}

/// PATCH /api/rooms/:id/prizes/:prize_id
pub async fn update_prize(
    State(service): State<LotteryService>,
    Path((room_id, prize_id)): Path<(Uuid, Uuid)>,
    AdminCode(code): AdminCode,
    Json(patch): Json<PrizePatch>,
) -> Result<Json<PrizeResponse>, ApiError> {
    let prize = service.update_prize(room_id, &code, prize_id, patch).await?;
    Ok(Json(PrizeResponse::from(&prize)))
}

/// DELETE /api/rooms/:id/prizes/:prize_id
pub async fn delete_prize(
    State(service): State<LotteryService>,
    Path((room_id, prize_id)): Path<(Uuid, Uuid)>,
    AdminCode(code): AdminCode,
) -> Result<StatusCode, ApiError> {
    service.delete_prize(room_id, &code, prize_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
