use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::participant::Participant;
use crate::domain::prize::Prize;
use crate::domain::room::PrizeOrder;

/// Orders the undrawn prizes the way they will be drawn
///
/// `prizes` is expected in ascending sort order, as repositories return it.
pub fn draw_sequence<'a, R: Rng + ?Sized>(
    prizes: &'a [Prize],
    order: PrizeOrder,
    rng: &mut R,
) -> Vec<&'a Prize> {
    let mut remaining: Vec<&Prize> = prizes.iter().filter(|p| !p.is_awarded()).collect();
    remaining.sort_by_key(|p| (p.sort_order(), p.created_at()));

    match order {
        PrizeOrder::SmallToLarge => {}
        PrizeOrder::LargeToSmall => remaining.reverse(),
        PrizeOrder::Random => remaining.shuffle(rng),
    }

    remaining
}

/// The prize to draw next, if any remain
pub fn next_prize<'a, R: Rng + ?Sized>(
    prizes: &'a [Prize],
    order: PrizeOrder,
    rng: &mut R,
) -> Option<&'a Prize> {
    match order {
        PrizeOrder::Random => {
            let remaining: Vec<&Prize> = prizes.iter().filter(|p| !p.is_awarded()).collect();
            remaining.choose(rng).copied()
        }
        _ => draw_sequence(prizes, order, rng).into_iter().next(),
    }
}

/// Uniform pick among the participants who have not won yet
pub fn pick_winner<'a, R: Rng + ?Sized>(
    participants: &'a [Participant],
    rng: &mut R,
) -> Option<&'a Participant> {
    let eligible: Vec<&Participant> = participants.iter().filter(|p| !p.has_won()).collect();
    eligible.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::participant::ParticipantName;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use uuid::Uuid;

    fn prizes(room_id: Uuid) -> Vec<Prize> {
        vec![
            Prize::new(room_id, "Sticker", None, 1).unwrap(),
            Prize::new(room_id, "Mug", None, 2).unwrap(),
            Prize::new(room_id, "Bicycle", None, 3).unwrap(),
        ]
    }

    fn names(seq: &[&Prize]) -> Vec<String> {
        seq.iter().map(|p| p.name().to_string()).collect()
    }

    #[test]
    fn small_to_large_is_ascending() {
        let mut rng = StdRng::seed_from_u64(1);
        let prizes = prizes(Uuid::new_v4());

        let seq = draw_sequence(&prizes, PrizeOrder::SmallToLarge, &mut rng);
        assert_eq!(names(&seq), vec!["Sticker", "Mug", "Bicycle"]);
    }

    #[test]
    fn large_to_small_is_descending() {
        let mut rng = StdRng::seed_from_u64(1);
        let prizes = prizes(Uuid::new_v4());

        let next = next_prize(&prizes, PrizeOrder::LargeToSmall, &mut rng).unwrap();
        assert_eq!(next.name(), "Bicycle");
    }

    #[test]
    fn awarded_prizes_are_skipped() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut prizes = prizes(Uuid::new_v4());
        prizes[0].award(Uuid::new_v4()).unwrap();

        let next = next_prize(&prizes, PrizeOrder::SmallToLarge, &mut rng).unwrap();
        assert_eq!(next.name(), "Mug");
    }

    #[test]
    fn random_order_is_a_permutation_of_the_remaining() {
        let mut rng = StdRng::seed_from_u64(42);
        let prizes = prizes(Uuid::new_v4());

        let seq = draw_sequence(&prizes, PrizeOrder::Random, &mut rng);
        let unique: HashSet<Uuid> = seq.iter().map(|p| p.id()).collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn nothing_left_to_draw() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut prizes = prizes(Uuid::new_v4());
        for prize in prizes.iter_mut() {
            prize.award(Uuid::new_v4()).unwrap();
        }

        assert!(next_prize(&prizes, PrizeOrder::Random, &mut rng).is_none());
        assert!(next_prize(&prizes, PrizeOrder::SmallToLarge, &mut rng).is_none());
    }

    #[test]
    fn winners_are_never_previous_winners() {
        let room_id = Uuid::new_v4();
        let mut participants: Vec<Participant> = ["Alice", "Bob", "Carol"]
            .iter()
            .map(|n| Participant::new(room_id, ParticipantName::new(n).unwrap()))
            .collect();
        participants[0].award(Uuid::new_v4()).unwrap();
        participants[2].award(Uuid::new_v4()).unwrap();

        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..20 {
            let winner = pick_winner(&participants, &mut rng).unwrap();
            assert_eq!(winner.name().as_str(), "Bob");
        }
    }

    #[test]
    fn no_eligible_participant() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(pick_winner(&[], &mut rng).is_none());
    }
}
