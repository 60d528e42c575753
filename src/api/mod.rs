// API layer module (adapters for controllers)
// Follows Hexagonal Architecture - API is an adapter

pub mod errors;
pub mod handlers;
pub mod middleware;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::service::LotteryService;
use handlers::{drawing, events, health, participants, prizes, rooms};

/// Builds the HTTP router over `service`
pub fn router(service: LotteryService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Rooms
        .route("/api/rooms", post(rooms::create_room))
        .route(
            "/api/rooms/:id",
            get(rooms::get_room)
                .patch(rooms::update_room)
                .delete(rooms::delete_room),
        )
        .route(
            "/api/rooms/code/:public_code",
            get(rooms::get_room_by_public_code),
        )
        .route(
            "/api/admin/rooms/:secret_code",
            get(rooms::get_room_by_secret_code),
        )
        // Prizes
        .route(
            "/api/rooms/:id/prizes",
            get(prizes::list_prizes).post(prizes::add_prize),
        )
        .route(
            "/api/rooms/:id/prizes/:prize_id",
            axum::routing::patch(prizes::update_prize).delete(prizes::delete_prize),
        )
        // Participants
        .route(
            "/api/rooms/:id/participants",
            get(participants::list_participants).post(participants::register_participant),
        )
        .route(
            "/api/rooms/:id/participants/:participant_id",
            axum::routing::patch(participants::update_participant),
        )
        // Drawing
        .route("/api/rooms/:id/drawing", get(drawing::readiness))
        .route("/api/rooms/:id/drawing/start", post(drawing::start))
        .route("/api/rooms/:id/drawing/next", post(drawing::draw_next))
        .route("/api/rooms/:id/drawing/all", post(drawing::draw_all))
        .route("/api/rooms/:id/drawing/finish", post(drawing::finish))
        .route("/api/rooms/:id/winners", get(drawing::winners))
        // Realtime
        .route("/api/rooms/:id/events/room", get(events::room_events))
        .route("/api/rooms/:id/events/prizes", get(events::prize_events))
        .route(
            "/api/rooms/:id/events/participants",
            get(events::participant_events),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Shared state
        .with_state(service)
}
