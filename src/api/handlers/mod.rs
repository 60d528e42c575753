pub mod drawing;
pub mod events;
pub mod health;
pub mod participants;
pub mod prizes;
pub mod rooms;
