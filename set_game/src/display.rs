//! Display collaborator: fire-and-forget notifications about table changes.
//!
//! The core never reads anything back from a display. Implementations
//! must be cheap and must not call back into the game, since most
//! notifications are sent while the table lock is held.

use serde::{Deserialize, Serialize};
use std::{
    sync::{Mutex, PoisonError},
    time::Duration,
};

use crate::game::entities::{Card, PlayerId, Slot};

/// Receiver of display notifications
pub trait GameDisplay: Send + Sync {
    fn place_card(&self, card: Card, slot: Slot);
    fn remove_card(&self, slot: Slot);
    fn place_marker(&self, player: PlayerId, slot: Slot);
    fn remove_marker(&self, player: PlayerId, slot: Slot);
    /// Remove every marker from one slot.
    fn remove_markers_at(&self, slot: Slot);
    /// Remove every marker from the whole table.
    fn remove_all_markers(&self);
    fn set_score(&self, player: PlayerId, score: u32);
    fn set_countdown(&self, remaining: Duration, warn: bool);
    /// `None` means the player is no longer frozen.
    fn set_freeze(&self, player: PlayerId, remaining: Option<Duration>);
    fn announce_winners(&self, players: &[PlayerId]);
}

/// Display that discards every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDisplay;

impl GameDisplay for NullDisplay {
    fn place_card(&self, _card: Card, _slot: Slot) {}
    fn remove_card(&self, _slot: Slot) {}
    fn place_marker(&self, _player: PlayerId, _slot: Slot) {}
    fn remove_marker(&self, _player: PlayerId, _slot: Slot) {}
    fn remove_markers_at(&self, _slot: Slot) {}
    fn remove_all_markers(&self) {}
    fn set_score(&self, _player: PlayerId, _score: u32) {}
    fn set_countdown(&self, _remaining: Duration, _warn: bool) {}
    fn set_freeze(&self, _player: PlayerId, _remaining: Option<Duration>) {}
    fn announce_winners(&self, _players: &[PlayerId]) {}
}

/// Display rendering notifications as log lines.
///
/// Table-level changes go to `debug`, scores and winners to `info`, so a
/// default `RUST_LOG=info` shows the course of the game without flooding.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDisplay;

impl GameDisplay for LogDisplay {
    fn place_card(&self, card: Card, slot: Slot) {
        log::debug!("slot {slot:>2} <- card {card}");
    }

    fn remove_card(&self, slot: Slot) {
        log::debug!("slot {slot:>2} cleared");
    }

    fn place_marker(&self, player: PlayerId, slot: Slot) {
        log::debug!("player {player} marked slot {slot}");
    }

    fn remove_marker(&self, player: PlayerId, slot: Slot) {
        log::debug!("player {player} unmarked slot {slot}");
    }

    fn remove_markers_at(&self, slot: Slot) {
        log::debug!("markers cleared at slot {slot}");
    }

    fn remove_all_markers(&self) {
        log::debug!("all markers cleared");
    }

    fn set_score(&self, player: PlayerId, score: u32) {
        log::info!("player {player} score: {score}");
    }

    fn set_countdown(&self, remaining: Duration, warn: bool) {
        if warn {
            log::warn!("{:.2}s left in round", remaining.as_secs_f64());
        } else {
            log::trace!("{}s left in round", remaining.as_secs());
        }
    }

    fn set_freeze(&self, player: PlayerId, remaining: Option<Duration>) {
        match remaining {
            Some(remaining) => {
                log::trace!("player {player} frozen for {}s", remaining.as_secs_f64());
            }
            None => log::trace!("player {player} unfrozen"),
        }
    }

    fn announce_winners(&self, players: &[PlayerId]) {
        log::info!("winner(s): {players:?}");
    }
}

/// A single notification, as captured by [`RecordingDisplay`]
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DisplayEvent {
    PlaceCard { card: Card, slot: Slot },
    RemoveCard { slot: Slot },
    PlaceMarker { player: PlayerId, slot: Slot },
    RemoveMarker { player: PlayerId, slot: Slot },
    RemoveMarkersAt { slot: Slot },
    RemoveAllMarkers,
    Score { player: PlayerId, score: u32 },
    Countdown { remaining_millis: u64, warn: bool },
    Freeze { player: PlayerId, remaining_millis: Option<u64> },
    Winners { players: Vec<PlayerId> },
}

/// Display that keeps every notification in memory, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    events: Mutex<Vec<DisplayEvent>>,
}

impl RecordingDisplay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far
    pub fn events(&self) -> Vec<DisplayEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Recorded events matching a predicate
    pub fn filtered<F>(&self, predicate: F) -> Vec<DisplayEvent>
    where
        F: Fn(&DisplayEvent) -> bool,
    {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|event| predicate(event))
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn record(&self, event: DisplayEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl GameDisplay for RecordingDisplay {
    fn place_card(&self, card: Card, slot: Slot) {
        self.record(DisplayEvent::PlaceCard { card, slot });
    }

    fn remove_card(&self, slot: Slot) {
        self.record(DisplayEvent::RemoveCard { slot });
    }

    fn place_marker(&self, player: PlayerId, slot: Slot) {
        self.record(DisplayEvent::PlaceMarker { player, slot });
    }

    fn remove_marker(&self, player: PlayerId, slot: Slot) {
        self.record(DisplayEvent::RemoveMarker { player, slot });
    }

    fn remove_markers_at(&self, slot: Slot) {
        self.record(DisplayEvent::RemoveMarkersAt { slot });
    }

    fn remove_all_markers(&self) {
        self.record(DisplayEvent::RemoveAllMarkers);
    }

    fn set_score(&self, player: PlayerId, score: u32) {
        self.record(DisplayEvent::Score { player, score });
    }

    fn set_countdown(&self, remaining: Duration, warn: bool) {
        self.record(DisplayEvent::Countdown {
            remaining_millis: millis(remaining),
            warn,
        });
    }

    fn set_freeze(&self, player: PlayerId, remaining: Option<Duration>) {
        self.record(DisplayEvent::Freeze {
            player,
            remaining_millis: remaining.map(millis),
        });
    }

    fn announce_winners(&self, players: &[PlayerId]) {
        self.record(DisplayEvent::Winners {
            players: players.to_vec(),
        });
    }
}

/// Whole milliseconds, saturating at `u64::MAX`
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_display_keeps_order() {
        let display = RecordingDisplay::new();
        display.place_card(Card(7), 2);
        display.place_marker(1, 2);
        display.remove_card(2);

        assert_eq!(
            display.events(),
            vec![
                DisplayEvent::PlaceCard {
                    card: Card(7),
                    slot: 2
                },
                DisplayEvent::PlaceMarker { player: 1, slot: 2 },
                DisplayEvent::RemoveCard { slot: 2 },
            ]
        );
    }

    #[test]
    fn test_recording_display_filter_and_clear() {
        let display = RecordingDisplay::new();
        display.set_score(0, 1);
        display.set_countdown(Duration::from_millis(1500), false);
        display.set_score(1, 2);

        let scores = display.filtered(|e| matches!(e, DisplayEvent::Score { .. }));
        assert_eq!(scores.len(), 2);

        display.clear();
        assert!(display.events().is_empty());
    }

    #[test]
    fn test_display_event_json_tag() {
        let json = serde_json::to_string(&DisplayEvent::RemoveAllMarkers).unwrap();
        assert_eq!(json, r#"{"event":"remove_all_markers"}"#);
    }

    #[test]
    fn test_huge_durations_saturate() {
        let display = RecordingDisplay::new();
        display.set_countdown(Duration::MAX, false);
        display.set_freeze(3, Some(Duration::from_millis(250)));

        assert_eq!(
            display.events(),
            vec![
                DisplayEvent::Countdown {
                    remaining_millis: u64::MAX,
                    warn: false
                },
                DisplayEvent::Freeze {
                    player: 3,
                    remaining_millis: Some(250)
                },
            ]
        );
    }

    #[test]
    fn test_log_display_does_not_panic() {
        let display = LogDisplay;
        display.place_card(Card(1), 0);
        display.set_countdown(Duration::from_secs(3), true);
        display.set_freeze(0, None);
        display.announce_winners(&[0, 1]);
    }
}
