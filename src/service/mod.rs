// Application services
// Orchestrate repositories for room lifecycle, registration and drawing

pub mod drawing;
pub mod lottery_service;
pub mod watch;

pub use drawing::{DrawOutcome, DrawingReadiness};
pub use lottery_service::{LotteryService, NewPrize, NewRoom, RoomPatch};
