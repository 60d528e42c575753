use rand::{Rng, RngCore};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::participant::Participant;
use crate::domain::prize::Prize;

/// A prize paired with the participant who won it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WinnerResult {
    pub participant_id: Uuid,
    pub participant_name: String,
    pub prize_id: Uuid,
    pub prize_name: String,
}

impl WinnerResult {
    pub fn new(participant: &Participant, prize: &Prize) -> Self {
        Self {
            participant_id: participant.id(),
            participant_name: participant.name().to_string(),
            prize_id: prize.id(),
            prize_name: prize.name().to_string(),
        }
    }
}

/// Strategy that assigns winners to a batch of prizes
pub trait GameType: Send + Sync {
    /// Identifier stored in room settings
    fn id(&self) -> &'static str;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Picks winners for `prizes`, which arrive already in draw order
    ///
    /// Participants that have already won are never picked, and no
    /// participant is picked twice. Prizes beyond the number of eligible
    /// participants stay unassigned.
    fn select_winners(
        &self,
        participants: &[Participant],
        prizes: &[&Prize],
        rng: &mut dyn RngCore,
    ) -> Vec<WinnerResult>;
}

/// Uniform random pick from the remaining pool, one prize at a time
#[derive(Debug, Default)]
pub struct ClassicGame;

impl GameType for ClassicGame {
    fn id(&self) -> &'static str {
        "classic"
    }

    fn name(&self) -> &'static str {
        "Classic Lottery"
    }

    fn select_winners(
        &self,
        participants: &[Participant],
        prizes: &[&Prize],
        rng: &mut dyn RngCore,
    ) -> Vec<WinnerResult> {
        let mut pool: Vec<&Participant> = participants.iter().filter(|p| !p.has_won()).collect();
        let mut results = Vec::with_capacity(prizes.len().min(pool.len()));

        for prize in prizes.iter().filter(|p| !p.is_awarded()) {
            if pool.is_empty() {
                break;
            }
            let index = rng.gen_range(0..pool.len());
            let winner = pool.swap_remove(index);
            results.push(WinnerResult::new(winner, prize));
        }

        results
    }
}

/// Lookup table from game-type id to strategy
#[derive(Clone)]
pub struct GameRegistry {
    games: HashMap<String, Arc<dyn GameType>>,
}

impl GameRegistry {
    /// An empty registry
    pub fn empty() -> Self {
        Self {
            games: HashMap::new(),
        }
    }

    pub fn register(&mut self, game: Arc<dyn GameType>) {
        self.games.insert(game.id().to_string(), game);
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn GameType>> {
        self.games.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.games.contains_key(id)
    }

    /// Registered ids, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.games.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for GameRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(ClassicGame));
        registry
    }
}

impl std::fmt::Debug for GameRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameRegistry")
            .field("games", &self.ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::participant::ParticipantName;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn participants(room_id: Uuid, names: &[&str]) -> Vec<Participant> {
        names
            .iter()
            .map(|n| Participant::new(room_id, ParticipantName::new(n).unwrap()))
            .collect()
    }

    fn prizes(room_id: Uuid, count: usize) -> Vec<Prize> {
        (0..count)
            .map(|i| Prize::new(room_id, &format!("Prize {}", i + 1), None, i as i32 + 1).unwrap())
            .collect()
    }

    #[test]
    fn classic_assigns_distinct_winners() {
        let room_id = Uuid::new_v4();
        let people = participants(room_id, &["Alice", "Bob", "Carol", "Dave"]);
        let prizes = prizes(room_id, 3);
        let ordered: Vec<&Prize> = prizes.iter().collect();
        let mut rng = StdRng::seed_from_u64(11);

        let results = ClassicGame.select_winners(&people, &ordered, &mut rng);

        assert_eq!(results.len(), 3);
        let winners: HashSet<Uuid> = results.iter().map(|r| r.participant_id).collect();
        assert_eq!(winners.len(), 3);
        for (result, prize) in results.iter().zip(ordered.iter()) {
            assert_eq!(result.prize_id, prize.id());
        }
    }

    #[test]
    fn classic_stops_when_participants_run_out() {
        let room_id = Uuid::new_v4();
        let people = participants(room_id, &["Alice", "Bob"]);
        let prizes = prizes(room_id, 5);
        let ordered: Vec<&Prize> = prizes.iter().collect();
        let mut rng = StdRng::seed_from_u64(5);

        let results = ClassicGame.select_winners(&people, &ordered, &mut rng);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn classic_skips_previous_winners() {
        let room_id = Uuid::new_v4();
        let mut people = participants(room_id, &["Alice", "Bob"]);
        people[0].award(Uuid::new_v4()).unwrap();
        let prizes = prizes(room_id, 2);
        let ordered: Vec<&Prize> = prizes.iter().collect();
        let mut rng = StdRng::seed_from_u64(5);

        let results = ClassicGame.select_winners(&people, &ordered, &mut rng);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].participant_name, "Bob");
    }

    #[test]
    fn default_registry_knows_classic() {
        let registry = GameRegistry::default();

        assert!(registry.contains("classic"));
        assert_eq!(registry.get("classic").unwrap().name(), "Classic Lottery");
        assert!(registry.get("wheel").is_none());
        assert_eq!(registry.ids(), vec!["classic"]);
    }
}
