//! Property-based tests for hand scoring and the hit/stand policy.

use proptest::prelude::*;

use blackjack_sim::{hand_value, resolve, Action, Hand, Outcome, SimConfig, Simulator};
use blackjack_sim::Strategy as Policy;

/// Strategy: a non-empty run of valid ranks.
fn cards_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(1..=13u8, 1..12)
}

/// Strategy: any valid hit/stand policy.
fn policy_strategy() -> impl Strategy<Value = Policy> {
    (1..=21u8, any::<bool>()).prop_map(|(value, soft)| Policy::new(value, soft).unwrap())
}

proptest! {
    // 1. Scoring is a pure function of the cards
    #[test]
    fn score_deterministic(cards in cards_strategy()) {
        prop_assert_eq!(hand_value(&cards), hand_value(&cards));
    }

    // 2. Incremental pushes agree with scoring the whole list
    #[test]
    fn push_matches_full_score(cards in cards_strategy()) {
        let mut hand = Hand::new();
        for &card in &cards {
            hand.push(card).unwrap();
            prop_assert_eq!(hand.value(), hand_value(hand.cards()));
        }
        prop_assert_eq!(hand.value(), hand_value(&cards));
    }

    // 3. A soft hand has an ace and never exceeds 21
    #[test]
    fn soft_implies_ace_and_no_bust(cards in cards_strategy()) {
        let value = hand_value(&cards);
        prop_assert!(value.soft_ace_count() <= 1);
        if value.is_soft {
            prop_assert!(cards.contains(&1));
            prop_assert!(value.total <= 21);
        }
    }

    // 4. Blackjack needs exactly two cards
    #[test]
    fn blackjack_only_with_two_cards(cards in cards_strategy()) {
        let hand = Hand::from_cards(&cards).unwrap();
        if hand.is_blackjack() {
            prop_assert_eq!(cards.len(), 2);
            prop_assert_eq!(hand.total(), 21);
        }
    }

    // 5. decide follows the threshold table
    #[test]
    fn decide_matches_threshold(policy in policy_strategy(), cards in cards_strategy()) {
        let hand = Hand::from_cards(&cards).unwrap();
        let action = policy.decide(&hand);
        let total = hand.total();
        let threshold = policy.stand_on_value();
        if total < threshold {
            prop_assert_eq!(action, Action::Hit);
        } else if total > threshold || !hand.is_soft() {
            prop_assert_eq!(action, Action::Stand);
        } else {
            let expected = if policy.stand_on_soft() { Action::Stand } else { Action::Hit };
            prop_assert_eq!(action, expected);
        }
    }

    // 6. Swapping sides swaps the winner
    #[test]
    fn resolve_is_antisymmetric(a in cards_strategy(), b in cards_strategy()) {
        let ha = Hand::from_cards(&a).unwrap();
        let hb = Hand::from_cards(&b).unwrap();
        if ha.is_bust() && hb.is_bust() {
            // the player's bust is checked first, so both orders lose for the player
            prop_assert_eq!(resolve(&ha, &hb), Outcome::DealerWin);
            prop_assert_eq!(resolve(&hb, &ha), Outcome::DealerWin);
        } else {
            let forward = resolve(&ha, &hb);
            let backward = resolve(&hb, &ha);
            let mirrored = match forward {
                Outcome::PlayerWin => Outcome::DealerWin,
                Outcome::DealerWin => Outcome::PlayerWin,
                Outcome::Tie => Outcome::Tie,
            };
            prop_assert_eq!(backward, mirrored);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    // 7. Win rates stay within [0, 100] for any pair and trial count
    #[test]
    fn win_rate_bounded(
        player in policy_strategy(),
        dealer in policy_strategy(),
        trials in 1..400u64,
        seed in any::<u64>(),
    ) {
        let sim = Simulator::new(SimConfig::new(trials).with_seed(Some(seed))).unwrap();
        let stats = sim.matchup(&player, &dealer).unwrap();
        prop_assert!((0.0..=100.0).contains(&stats.win_rate()));
        prop_assert_eq!(stats.player_wins + stats.dealer_wins + stats.ties, trials);
    }
}
