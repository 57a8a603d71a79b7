use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a position on the table grid (0..table_size).
pub type Slot = usize;

/// Player identifier. Players are numbered from zero in seat order.
pub type PlayerId = usize;

/// A card identifier. Cards are numbered 0..deck_size; the numbering
/// doubles as the feature encoding used by [`super::rules::SetRules`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub u32);

impl Card {
    /// Decompose the card id into `feature_count` base-`feature_size`
    /// digits, least significant feature first.
    #[must_use]
    pub fn features(self, feature_size: usize, feature_count: usize) -> Vec<u32> {
        let base = u32::try_from(feature_size.max(1)).unwrap_or(u32::MAX);
        let mut rest = self.0;
        let mut features = Vec::with_capacity(feature_count);
        for _ in 0..feature_count {
            features.push(rest % base);
            rest /= base;
        }
        features
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02}", self.0)
    }
}

impl From<u32> for Card {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Outcome of a validation request, delivered by the dealer to the
/// submitting player.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// The marked cards formed a combination.
    Point,
    /// The marked cards did not form a combination.
    Penalty,
    /// The request referred to cards that were already gone.
    Stale,
}

impl Verdict {
    /// Whether this verdict freezes the player afterwards.
    #[must_use]
    pub fn freezes(self) -> bool {
        matches!(self, Self::Point | Self::Penalty)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Point => "point",
            Self::Penalty => "penalty",
            Self::Stale => "stale",
        };
        write!(f, "{repr}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_features_base_three() {
        // 0 + 1*3 + 2*9 + 1*27 = 48
        let card = Card(48);
        assert_eq!(card.features(3, 4), vec![0, 1, 2, 1]);
    }

    #[test]
    fn test_card_features_zero() {
        assert_eq!(Card(0).features(3, 4), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_verdict_freezes() {
        assert!(Verdict::Point.freezes());
        assert!(Verdict::Penalty.freezes());
        assert!(!Verdict::Stale.freezes());
    }

    #[test]
    fn test_verdict_serde() {
        let json = serde_json::to_string(&Verdict::Penalty).unwrap();
        assert_eq!(json, "\"penalty\"");
        let back: Verdict = serde_json::from_str("\"stale\"").unwrap();
        assert_eq!(back, Verdict::Stale);
    }
}
