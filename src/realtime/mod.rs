// Realtime change feed
//
// Row changes are fanned out per room through an in-process broadcast hub.
// With PostgreSQL the hub is fed by LISTEN/NOTIFY; the in-memory store
// publishes into it directly.

pub mod hub;
pub mod pg_relay;

pub use hub::{ChangeEvent, ChangeHub, ChangeOp, Notification, RoomSubscription, Table};
pub use pg_relay::PgChangeRelay;
