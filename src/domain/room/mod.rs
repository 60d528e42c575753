// Room domain module
// Contains the room aggregate root, value objects, and domain events

#![allow(clippy::module_inception)]

pub mod events;
pub mod room;
pub mod value_objects;

pub use events::RoomEvent;
pub use room::Room;
pub use value_objects::{
    PrizeOrder, PublicCode, RoomSettings, RoomSettingsPatch, RoomStatus, SecretCode,
};
