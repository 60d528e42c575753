use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream::{Stream, StreamExt};
use serde::Serialize;
use uuid::Uuid;

use super::participants::ParticipantResponse;
use super::prizes::PrizeResponse;
use super::rooms::RoomResponse;
use crate::api::errors::ApiError;
use crate::service::LotteryService;

type EventResult = Result<Event, axum::Error>;

fn snapshot_event<T: Serialize>(name: &'static str, payload: &T) -> EventResult {
    Event::default().event(name).json_data(payload)
}

/// Live room snapshots
///
/// GET /api/rooms/:id/events/room
pub async fn room_events(
    State(service): State<LotteryService>,
    Path(room_id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = EventResult>>, ApiError> {
    service.get_room(room_id).await?;
    let stream = service
        .watch_room(room_id)
        .map(|room| snapshot_event("room", &RoomResponse::from(&room)));
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Live prize list
///
/// GET /api/rooms/:id/events/prizes
pub async fn prize_events(
    State(service): State<LotteryService>,
    Path(room_id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = EventResult>>, ApiError> {
    service.get_room(room_id).await?;
    let stream = service.watch_prizes(room_id).map(|prizes| {
        let body: Vec<PrizeResponse> = prizes.iter().map(PrizeResponse::from).collect();
        snapshot_event("prizes", &body)
    });
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Live participant list
///
/// GET /api/rooms/:id/events/participants
pub async fn participant_events(
    State(service): State<LotteryService>,
    Path(room_id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = EventResult>>, ApiError> {
    service.get_room(room_id).await?;
    let stream = service.watch_participants(room_id).map(|participants| {
        let body: Vec<ParticipantResponse> =
            participants.iter().map(ParticipantResponse::from).collect();
        snapshot_event("participants", &body)
    });
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
