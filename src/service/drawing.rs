use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use super::LotteryService;
use crate::domain::drawing::{
    draw_sequence, drawing_blockers, next_prize, pick_winner, DrawBlocker, WinnerResult,
};
use crate::domain::errors::{LotteryError, LotteryResult};
use crate::domain::participant::Participant;
use crate::domain::room::{Room, RoomEvent, RoomStatus};

/// Whether a room can start drawing, and how far it has got
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawingReadiness {
    pub status: RoomStatus,
    pub ready: bool,
    pub blockers: Vec<DrawBlocker>,
    pub prizes_total: usize,
    pub prizes_remaining: usize,
    pub eligible_participants: usize,
}

/// Result of drawing a single prize
#[derive(Debug, Clone)]
pub struct DrawOutcome {
    pub winner: WinnerResult,
    pub room: Room,
    /// The draw used up the last prize or the last eligible participant
    pub finished: bool,
}

fn blockers_message(blockers: &[DrawBlocker]) -> String {
    let reasons: Vec<String> = blockers.iter().map(ToString::to_string).collect();
    format!("Drawing cannot start: {}", reasons.join(", "))
}

impl LotteryService {
    pub async fn drawing_readiness(&self, room_id: Uuid) -> LotteryResult<DrawingReadiness> {
        let room = self.get_room(room_id).await?;
        let prizes = self.prizes.list_by_room(room_id).await?;
        let participants = self.participants.list_by_room(room_id).await?;

        let blockers = drawing_blockers(&room, &prizes, &participants);
        Ok(DrawingReadiness {
            status: room.status(),
            ready: blockers.is_empty(),
            blockers,
            prizes_total: prizes.len(),
            prizes_remaining: prizes.iter().filter(|p| !p.is_awarded()).count(),
            eligible_participants: participants.iter().filter(|p| !p.has_won()).count(),
        })
    }

    pub(super) async fn ensure_ready(&self, room: &Room) -> LotteryResult<()> {
        let prizes = self.prizes.list_by_room(room.id()).await?;
        let participants = self.participants.list_by_room(room.id()).await?;

        let blockers = drawing_blockers(room, &prizes, &participants);
        if blockers.is_empty() {
            Ok(())
        } else {
            Err(LotteryError::InvalidState(blockers_message(&blockers)))
        }
    }

    /// Moves a ready room from waiting to drawing
    pub async fn start_drawing(&self, room_id: Uuid, admin_code: &str) -> LotteryResult<Room> {
        let mut room = self.authorize_admin(room_id, admin_code).await?;
        self.ensure_ready(&room).await?;

        let event = room.start_drawing()?;
        let room = self
            .rooms
            .transition(room_id, RoomStatus::Waiting, RoomStatus::Drawing)
            .await?;
        event.record();
        Ok(room)
    }

    async fn finish_room(&self, mut room: Room) -> LotteryResult<Room> {
        let from = room.status();
        let event = room.finish()?;
        let room = self
            .rooms
            .transition(room.id(), from, RoomStatus::Finished)
            .await?;
        event.record();
        Ok(room)
    }

    /// Finishes a room whose draws are used up, unless someone else already did
    async fn finish_exhausted(&self, room: Room) -> LotteryResult<Room> {
        if room.status() != RoomStatus::Drawing {
            return Ok(room);
        }
        let room_id = room.id();
        match self.finish_room(room).await {
            Err(LotteryError::Conflict(_)) => self.get_room(room_id).await,
            other => other,
        }
    }

    /// Draws one prize
    ///
    /// When nothing can be drawn the room is finished and `InvalidState` is
    /// returned.
    pub async fn draw_next(&self, room_id: Uuid, admin_code: &str) -> LotteryResult<DrawOutcome> {
        let room = self.authorize_admin(room_id, admin_code).await?;
        if room.status() != RoomStatus::Drawing {
            return Err(LotteryError::InvalidState(format!(
                "Room is {}, not drawing",
                room.status()
            )));
        }

        let prizes = self.prizes.list_by_room(room_id).await?;
        let participants = self.participants.list_by_room(room_id).await?;
        let order = room.settings().prize_order;

        let picked = self.with_rng(|rng| {
            let prize = next_prize(&prizes, order, &mut *rng)?;
            let winner = pick_winner(&participants, &mut *rng)?;
            Some((prize.id(), winner.id()))
        });

        let Some((prize_id, participant_id)) = picked else {
            self.finish_exhausted(room).await?;
            return Err(LotteryError::InvalidState(
                "Nothing left to draw; the room has been finished".to_string(),
            ));
        };

        let (prize, participant) = self
            .prizes
            .assign_winner(room_id, prize_id, participant_id)
            .await?;
        RoomEvent::PrizeAwarded {
            room_id,
            prize_id,
            participant_id,
        }
        .record();

        let prizes = self.prizes.list_by_room(room_id).await?;
        let awarded = prizes.iter().filter(|p| p.is_awarded()).count();
        let prizes_left = awarded < prizes.len();
        let eligible_left = participants
            .iter()
            .any(|p| !p.has_won() && p.id() != participant_id);

        let room = self.rooms.record_progress(room_id, awarded as i32).await?;
        let exhausted = !(prizes_left && eligible_left);
        let room = if exhausted {
            self.finish_exhausted(room).await?
        } else {
            room
        };
        let finished = room.status() == RoomStatus::Finished;

        Ok(DrawOutcome {
            winner: WinnerResult::new(&participant, &prize),
            room,
            finished,
        })
    }

    /// Draws every remaining prize with the room's game type, then finishes
    ///
    /// A waiting room is started first, subject to the readiness checks.
    /// Prizes taken by a concurrent draw are skipped.
    pub async fn draw_all(
        &self,
        room_id: Uuid,
        admin_code: &str,
    ) -> LotteryResult<Vec<WinnerResult>> {
        let mut room = self.authorize_admin(room_id, admin_code).await?;
        let game = self.games.get(&room.settings().game_type).ok_or_else(|| {
            LotteryError::Validation(format!(
                "Unknown game type: {}",
                room.settings().game_type
            ))
        })?;

        match room.status() {
            RoomStatus::Waiting => {
                self.ensure_ready(&room).await?;
                let event = room.start_drawing()?;
                room = self
                    .rooms
                    .transition(room_id, RoomStatus::Waiting, RoomStatus::Drawing)
                    .await?;
                event.record();
            }
            RoomStatus::Drawing => {}
            RoomStatus::Finished => {
                return Err(LotteryError::InvalidState(
                    "Room is already finished".to_string(),
                ))
            }
        }

        let prizes = self.prizes.list_by_room(room_id).await?;
        let participants = self.participants.list_by_room(room_id).await?;
        let order = room.settings().prize_order;

        let picks = self.with_rng(|rng| {
            let sequence = draw_sequence(&prizes, order, &mut *rng);
            game.select_winners(&participants, &sequence, rng)
        });

        let mut results = Vec::with_capacity(picks.len());
        for pick in picks {
            match self
                .prizes
                .assign_winner(room_id, pick.prize_id, pick.participant_id)
                .await
            {
                Ok((prize, participant)) => {
                    RoomEvent::PrizeAwarded {
                        room_id,
                        prize_id: prize.id(),
                        participant_id: participant.id(),
                    }
                    .record();
                    results.push(WinnerResult::new(&participant, &prize));
                }
                Err(LotteryError::Conflict(reason)) => {
                    tracing::warn!(%room_id, prize_id = %pick.prize_id, %reason, "skipping contested prize");
                }
                Err(err) => return Err(err),
            }
        }

        let awarded = self
            .prizes
            .list_by_room(room_id)
            .await?
            .iter()
            .filter(|p| p.is_awarded())
            .count();
        let room = self.rooms.record_progress(room_id, awarded as i32).await?;
        self.finish_exhausted(room).await?;

        tracing::info!(%room_id, drawn = results.len(), game = game.id(), "drew all prizes");
        Ok(results)
    }

    /// Ends the event, from waiting or drawing
    pub async fn finish_drawing(&self, room_id: Uuid, admin_code: &str) -> LotteryResult<Room> {
        let room = self.authorize_admin(room_id, admin_code).await?;
        self.finish_room(room).await
    }

    /// Awarded prizes in draw-list order with their winners
    pub async fn winners(&self, room_id: Uuid) -> LotteryResult<Vec<WinnerResult>> {
        let prizes = self.list_prizes(room_id).await?;
        let participants = self.participants.list_by_room(room_id).await?;
        let by_id: HashMap<Uuid, &Participant> =
            participants.iter().map(|p| (p.id(), p)).collect();

        Ok(prizes
            .iter()
            .filter_map(|prize| {
                let winner = by_id.get(&prize.winner_id()?)?;
                Some(WinnerResult::new(winner, prize))
            })
            .collect())
    }
}
