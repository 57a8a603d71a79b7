/// Property-based tests for the combination rules using proptest
///
/// These tests check the classic Set rules against the arithmetic of the
/// card encoding across randomly drawn cards.
use proptest::prelude::*;
use set_game::{Card, CombinationRules, SetRules, find_combinations};
use std::collections::BTreeSet;

const FEATURE_SIZE: usize = 3;
const FEATURE_COUNT: usize = 4;

fn rules() -> SetRules {
    SetRules::new(FEATURE_SIZE, FEATURE_COUNT)
}

// Strategy to generate a card of the classic 81-card deck
fn card_strategy() -> impl Strategy<Value = Card> {
    (0u32..81).prop_map(Card)
}

// Strategy to generate two distinct cards
fn card_pair_strategy() -> impl Strategy<Value = (Card, Card)> {
    (card_strategy(), card_strategy()).prop_filter("Cards must differ", |(a, b)| a != b)
}

// Strategy to generate a vec of unique cards
fn unique_cards_strategy(min: usize, max: usize) -> impl Strategy<Value = Vec<Card>> {
    prop::collection::btree_set(card_strategy(), min..=max)
        .prop_map(|cards| cards.into_iter().collect())
}

/// The only card completing a set with `a` and `b`: per feature, the
/// value that makes the three sum to a multiple of three.
fn third_card(a: Card, b: Card) -> Card {
    let fa = a.features(FEATURE_SIZE, FEATURE_COUNT);
    let fb = b.features(FEATURE_SIZE, FEATURE_COUNT);
    let mut id = 0;
    for i in (0..FEATURE_COUNT).rev() {
        let value = (6 - fa[i] - fb[i]) % 3;
        id = id * 3 + value;
    }
    Card(id)
}

proptest! {
    #[test]
    fn test_two_cards_determine_the_third((a, b) in card_pair_strategy()) {
        let c = third_card(a, b);
        prop_assert_ne!(c, a);
        prop_assert_ne!(c, b);
        prop_assert!(rules().is_combination(&[a, b, c]));
    }

    #[test]
    fn test_any_other_third_card_fails((a, b) in card_pair_strategy(), d in card_strategy()) {
        prop_assume!(d != a && d != b && d != third_card(a, b));
        prop_assert!(!rules().is_combination(&[a, b, d]));
    }

    #[test]
    fn test_verdict_ignores_card_order((a, b) in card_pair_strategy(), d in card_strategy()) {
        prop_assume!(d != a && d != b);
        let rules = rules();
        let expected = rules.is_combination(&[a, b, d]);
        prop_assert_eq!(rules.is_combination(&[d, a, b]), expected);
        prop_assert_eq!(rules.is_combination(&[b, d, a]), expected);
    }

    #[test]
    fn test_wrong_group_size_never_valid(cards in unique_cards_strategy(1, 6)) {
        prop_assume!(cards.len() != FEATURE_SIZE);
        prop_assert!(!rules().is_combination(&cards));
    }

    #[test]
    fn test_found_combinations_are_valid_and_distinct(
        cards in unique_cards_strategy(3, 15),
        limit in 1usize..20,
    ) {
        let rules = rules();
        let found = find_combinations(&rules, &cards, FEATURE_SIZE, limit);

        prop_assert!(found.len() <= limit);
        let mut seen = BTreeSet::new();
        for group in &found {
            prop_assert_eq!(group.len(), FEATURE_SIZE);
            prop_assert!(rules.is_combination(group));
            prop_assert!(group.iter().all(|card| cards.contains(card)));
            prop_assert!(seen.insert(group.clone()), "combination reported twice");
        }
    }

    #[test]
    fn test_search_finds_every_completed_pair((a, b) in card_pair_strategy()) {
        let cards = vec![a, b, third_card(a, b)];
        let found = find_combinations(&rules(), &cards, FEATURE_SIZE, usize::MAX);
        prop_assert_eq!(found, vec![cards]);
    }

    #[test]
    fn test_features_round_trip(card in card_strategy()) {
        let features = card.features(FEATURE_SIZE, FEATURE_COUNT);
        prop_assert_eq!(features.len(), FEATURE_COUNT);
        prop_assert!(features.iter().all(|&f| f < 3));
        let id = features.iter().rev().fold(0, |acc, &f| acc * 3 + f);
        prop_assert_eq!(Card(id), card);
    }
}
