// Repository traits (ports)
// Implemented by the PostgreSQL adapters and the in-memory store

pub mod participant_repository;
pub mod prize_repository;
pub mod room_repository;

pub use participant_repository::ParticipantRepository;
pub use prize_repository::PrizeRepository;
pub use room_repository::{RoomChanges, RoomRepository};
