// Drawing: readiness checks, draw order, and the pluggable game types that
// pick winners.

pub mod game;
pub mod plan;
pub mod readiness;

pub use game::{ClassicGame, GameRegistry, GameType, WinnerResult};
pub use plan::{draw_sequence, next_prize, pick_winner};
pub use readiness::{drawing_blockers, DrawBlocker};
