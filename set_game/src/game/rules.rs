//! Combination rules: the predicate deciding whether K cards form a set.

use super::entities::Card;

/// Decides whether a group of cards forms a valid combination.
///
/// Implementations must be pure; the dealer calls them while holding the
/// table lock. Any `Fn(&[Card]) -> bool` closure is a valid rule set,
/// which keeps tests free to plug in fixed verdicts.
pub trait CombinationRules: Send + Sync {
    fn is_combination(&self, cards: &[Card]) -> bool;
}

impl<F> CombinationRules for F
where
    F: Fn(&[Card]) -> bool + Send + Sync,
{
    fn is_combination(&self, cards: &[Card]) -> bool {
        self(cards)
    }
}

/// Classic Set rules. A card encodes `feature_count` features, each with
/// `feature_size` possible values. Cards form a set when, feature by
/// feature, the values are either all equal or all distinct.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SetRules {
    feature_size: usize,
    feature_count: usize,
}

impl SetRules {
    #[must_use]
    pub const fn new(feature_size: usize, feature_count: usize) -> Self {
        Self {
            feature_size,
            feature_count,
        }
    }

    /// Number of distinct cards these rules can tell apart.
    #[must_use]
    pub fn deck_capacity(&self) -> usize {
        let exponent = u32::try_from(self.feature_count).unwrap_or(u32::MAX);
        self.feature_size.saturating_pow(exponent)
    }
}

impl Default for SetRules {
    fn default() -> Self {
        Self::new(3, 4)
    }
}

impl CombinationRules for SetRules {
    fn is_combination(&self, cards: &[Card]) -> bool {
        if cards.len() != self.feature_size {
            return false;
        }

        let features: Vec<Vec<u32>> = cards
            .iter()
            .map(|card| card.features(self.feature_size, self.feature_count))
            .collect();

        (0..self.feature_count).all(|feature| {
            let mut values: Vec<u32> = features.iter().map(|f| f[feature]).collect();
            values.sort_unstable();
            values.dedup();
            values.len() == 1 || values.len() == cards.len()
        })
    }
}

/// Search `cards` for up to `limit` combinations of `k` cards.
///
/// Combinations are reported in lexicographic order of their positions in
/// `cards`. A `limit` of zero returns nothing.
pub fn find_combinations<R>(rules: &R, cards: &[Card], k: usize, limit: usize) -> Vec<Vec<Card>>
where
    R: CombinationRules + ?Sized,
{
    let mut found = Vec::new();
    if k == 0 || k > cards.len() || limit == 0 {
        return found;
    }

    let mut indices: Vec<usize> = (0..k).collect();
    let mut picked = Vec::with_capacity(k);
    loop {
        picked.clear();
        picked.extend(indices.iter().map(|&i| cards[i]));
        if rules.is_combination(&picked) {
            found.push(picked.clone());
            if found.len() == limit {
                return found;
            }
        }

        // Advance to the next k-combination of positions.
        let n = cards.len();
        let mut i = k;
        loop {
            if i == 0 {
                return found;
            }
            i -= 1;
            if indices[i] != i + n - k {
                break;
            }
        }
        indices[i] += 1;
        for j in i + 1..k {
            indices[j] = indices[j - 1] + 1;
        }
    }
}

/// Whether at least one combination exists among `cards`.
pub fn has_combination<R>(rules: &R, cards: &[Card], k: usize) -> bool
where
    R: CombinationRules + ?Sized,
{
    !find_combinations(rules, cards, k, 1).is_empty()
}
