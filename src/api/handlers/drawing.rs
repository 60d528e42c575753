use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use super::rooms::AdminRoomResponse;
use crate::api::errors::ApiError;
use crate::api::middleware::AdminCode;
use crate::domain::drawing::WinnerResult;
use crate::service::{DrawingReadiness, LotteryService};

#[derive(Debug, Serialize)]
pub struct DrawResponse {
    pub winner: WinnerResult,
    pub room: AdminRoomResponse,
    pub finished: bool,
}

/// Whether the drawing can start
///
/// GET /api/rooms/:id/drawing
pub async fn readiness(
    State(service): State<LotteryService>,
    Path(room_id): Path<Uuid>,
) -> Result<Json<DrawingReadiness>, ApiError> {
    Ok(Json(service.drawing_readiness(room_id).await?))
}

/// POST /api/rooms/:id/drawing/start
pub async fn start(
    State(service): State<LotteryService>,
    Path(room_id): Path<Uuid>,
    AdminCode(code): AdminCode,
) -> Result<Json<AdminRoomResponse>, ApiError> {
    let room = service.start_drawing(room_id, &code).await?;
    Ok(Json(AdminRoomResponse::from(&room)))
}

/// Draw the next prize
///
/// POST /api/rooms/:id/drawing/next
pub async fn draw_next(
    State(service): State<LotteryService>,
    Path(room_id): Path<Uuid>,
    AdminCode(code): AdminCode,
) -> Result<Json<DrawResponse>, ApiError> {
    let outcome = service.draw_next(room_id, &code).await?;
    Ok(Json(DrawResponse {
        winner: outcome.winner,
        room: AdminRoomResponse::from(&outcome.room),
        finished: outcome.finished,
    }))
}

/// Draw every remaining prize at once
///
/// POST /api/rooms/:id/drawing/all
pub async fn draw_all(
    State(service): State<LotteryService>,
    Path(room_id): Path<Uuid>,
    AdminCode(code): AdminCode,
) -> Result<Json<Vec<WinnerResult>>, ApiError> {
    Ok(Json(service.draw_all(room_id, &code).await?))
}

/// POST /api/rooms/:id/drawing/finish
pub async fn finish(
    State(service): State<LotteryService>,
    Path(room_id): Path<Uuid>,
    AdminCode(code): AdminCode,
) -> Result<Json<AdminRoomResponse>, ApiError> {
    let room = service.finish_drawing(room_id, &code).await?;
    Ok(Json(AdminRoomResponse::from(&room)))
}

/// GET /api/rooms/:id/winners
pub async fn winners(
    State(service): State<LotteryService>,
    Path(room_id): Path<Uuid>,
) -> Result<Json<Vec<WinnerResult>>, ApiError> {
    Ok(Json(service.winners(room_id).await?))
}
