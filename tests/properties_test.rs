//! Property tests for draw invariants

use fairdraw::{derive_seed, get_lottery_result, pick_winner, verify, TicketId};
use proptest::prelude::*;

fn seed_hex() -> impl Strategy<Value = String> {
    prop::array::uniform32(any::<u8>()).prop_map(|bytes| hex::encode(bytes))
}

fn tickets() -> impl Strategy<Value = Vec<TicketId>> {
    prop::collection::vec(0u64..10_000, 1..40)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn winner_is_member(seed in seed_hex(), tickets in tickets()) {
        let selection = pick_winner(&seed, &tickets).unwrap();
        prop_assert!(tickets.contains(&selection.winner));
        prop_assert!(selection.scores.contains_key(&selection.winner));
    }

    #[test]
    fn selection_is_deterministic(seed in seed_hex(), tickets in tickets()) {
        prop_assert_eq!(pick_winner(&seed, &tickets).unwrap(), pick_winner(&seed, &tickets).unwrap());
    }

    #[test]
    fn duplicates_do_not_matter(
        seed in seed_hex(),
        tickets in tickets(),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 0..10),
    ) {
        let mut padded = tickets.clone();
        for pick in &picks {
            padded.push(*pick.get(&tickets));
        }
        let a = pick_winner(&seed, &tickets).unwrap();
        let b = pick_winner(&seed, &padded).unwrap();
        prop_assert_eq!(a.winner, b.winner);
        prop_assert_eq!(a.scores, b.scores);
    }

    #[test]
    fn single_ticket_wins_directly(seed in seed_hex(), ticket in any::<u64>()) {
        let selection = pick_winner(&seed, &[ticket]).unwrap();
        prop_assert_eq!(selection.winner, ticket);
        prop_assert_eq!(selection.proof.method(), "direct");
    }

    #[test]
    fn verification_round_trip(seed in seed_hex(), tickets in tickets()) {
        let winner = pick_winner(&seed, &tickets).unwrap().winner;
        prop_assert!(verify(&seed, &tickets, winner).valid);
        for &other in tickets.iter().filter(|&&t| t != winner) {
            prop_assert!(!verify(&seed, &tickets, other).valid);
        }
    }

    #[test]
    fn seed_is_order_sensitive(
        hashes in prop::collection::vec("[0-9a-f]{64}", 2..6),
    ) {
        let mut reversed = hashes.clone();
        reversed.reverse();
        prop_assume!(reversed != hashes);
        prop_assert_ne!(derive_seed(&hashes).unwrap(), derive_seed(&reversed).unwrap());
    }

    #[test]
    fn published_seed_reproduces_winner(
        hashes in prop::collection::vec("[0-9a-f]{64}", 1..4),
        tickets in tickets(),
    ) {
        let result = get_lottery_result(&hashes, &tickets).unwrap();
        prop_assert!(verify(&result.seed_hex(), &tickets, result.winner()).valid);
        prop_assert!(fairdraw::audit(&result).valid);
    }
}
