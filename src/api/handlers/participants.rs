use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::middleware::AdminCode;
use crate::domain::participant::{Participant, ParticipantPatch};
use crate::service::LotteryService;

/// Request body for joining a room
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ParticipantResponse {
    pub id: Uuid,
    pub room_id: Uuid,
    pub name: String,
    pub joined_at: DateTime<Utc>,
    pub has_won: bool,
    pub prize_id: Option<Uuid>,
}

impl From<&Participant> for ParticipantResponse {
    fn from(participant: &Participant) -> Self {
        Self {
            id: participant.id(),
            room_id: participant.room_id(),
            name: participant.name().to_string(),
            joined_at: participant.joined_at(),
            has_won: participant.has_won(),
            prize_id: participant.prize_id(),
        }
    }
}

/// GET /api/rooms/:id/participants
pub async fn list_participants(
    State(service): State<LotteryService>,
    Path(room_id): Path<Uuid>,
) -> Result<Json<Vec<ParticipantResponse>>, ApiError> {
    let participants = service.list_participants(room_id).await?;
    Ok(Json(participants.iter().map(ParticipantResponse::from).collect()))
}

/// Register for a room
///
/// POST /api/rooms/:id/participants
pub async fn register_participant(
    State(service): State<LotteryService>,
    Path(room_id): Path<Uuid>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ParticipantResponse>), ApiError> {
    let participant = service.register_participant(room_id, &req.name).await?;
    Ok((StatusCode::CREATED, Json(ParticipantResponse::from(&participant))))
}

/// PATCH /api/rooms/:id/participants/:participant_id
pub async fn update_participant(
    State(service): State<LotteryService>,
    Path((room_id, participant_id)): Path<(Uuid, Uuid)>,
    AdminCode(code): AdminCode,
    Json(patch): Json<ParticipantPatch>,
) -> Result<Json<ParticipantResponse>, ApiError> {
    let participant = service
        .update_participant(room_id, &code, participant_id, patch)
        .await?;
    Ok(Json(ParticipantResponse::from(&participant)))
}
