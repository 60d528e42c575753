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
use crate::domain::room::{Room, RoomSettings, RoomStatus};
use crate::service::{LotteryService, NewRoom, RoomPatch};

/// Room as shown to participants; never carries the secret code
#[derive(Debug, Serialize)]
pub struct RoomResponse {
    pub id: Uuid,
    pub public_code: String,
    pub name: String,
    pub registration_open: bool,
    pub status: RoomStatus,
    pub current_prize_index: i32,
    pub settings: RoomSettings,
    pub created_at: DateTime<Utc>,
}

impl From<&Room> for RoomResponse {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id(),
            public_code: room.public_code().to_string(),
            name: room.name().to_string(),
            registration_open: room.registration_open(),
            status: room.status(),
            current_prize_index: room.current_prize_index(),
            settings: room.settings().clone(),
            created_at: room.created_at(),
        }
    }
}

/// Room as shown to the organizer
#[derive(Debug, Serialize)]
pub struct AdminRoomResponse {
    #[serde(flatten)]
    pub room: RoomResponse,
    pub secret_code: String,
}

impl From<&Room> for AdminRoomResponse {
    fn from(room: &Room) -> Self {
        Self {
            room: RoomResponse::from(room),
            secret_code: room.secret_code().as_str().to_string(),
        }
    }
}

/// Create a new room
///
/// POST /api/rooms
pub async fn create_room(
    State(service): State<LotteryService>,
    Json(req): Json<NewRoom>,
) -> Result<(StatusCode, Json<AdminRoomResponse>), ApiError> {
    let room = service.create_room(req).await?;
    Ok((StatusCode::CREATED, Json(AdminRoomResponse::from(&room))))
}

/// Get a room by ID
///
/// GET /api/rooms/:id
pub async fn get_room(
    State(service): State<LotteryService>,
    Path(id): Path<Uuid>,
) -> Result<Json<RoomResponse>, ApiError> {
    let room = service.get_room(id).await?;
    Ok(Json(RoomResponse::from(&room)))
}

/// Get a room by the code handed out to participants
///
/// GET /api/rooms/code/:public_code
pub async fn get_room_by_public_code(
    State(service): State<LotteryService>,
    Path(code): Path<String>,
) -> Result<Json<RoomResponse>, ApiError> {
    let room = service.get_room_by_public_code(&code).await?;
    Ok(Json(RoomResponse::from(&room)))
}

/// Open the admin view of a room
///
/// GET /api/admin/rooms/:secret_code
pub async fn get_room_by_secret_code(
    State(service): State<LotteryService>,
    Path(code): Path<String>,
) -> Result<Json<AdminRoomResponse>, ApiError> {
    let room = service.get_room_by_secret_code(&code).await?;
    Ok(Json(AdminRoomResponse::from(&room)))
}

/// PATCH /api/rooms/:id
pub async fn update_room(
    State(service): State<LotteryService>,
    Path(id): Path<Uuid>,
    AdminCode(code): AdminCode,
    Json(patch): Json<RoomPatch>,
) -> Result<Json<AdminRoomResponse>, ApiError> {
    let room = service.update_room(id, &code, patch).await?;
    Ok(Json(AdminRoomResponse::from(&room)))
}

/// DELETE /api/rooms/:id
pub async fn delete_room(
    State(service): State<LotteryService>,
    Path(id): Path<Uuid>,
    AdminCode(code): AdminCode,
) -> Result<StatusCode, ApiError> {
    service.delete_room(id, &code).await?;
    Ok(StatusCode::NO_CONTENT)
}
