//! The table grid: slot to card mapping and per-slot marker owners.

use std::collections::{BTreeSet, HashMap};

use super::errors::{TableError, TableResult};
use crate::game::entities::{Card, PlayerId, Slot};

/// Grid state. Pure data; callers are expected to hold the table lock.
///
/// Invariants:
/// - a card occupies at most one slot
/// - a slot carries markers only while it holds a card
#[derive(Debug, Clone)]
pub struct Grid {
    slot_to_card: Vec<Option<Card>>,
    card_to_slot: HashMap<Card, Slot>,
    markers: Vec<BTreeSet<PlayerId>>,
}

impl Grid {
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            slot_to_card: vec![None; size],
            card_to_slot: HashMap::with_capacity(size),
            markers: vec![BTreeSet::new(); size],
        }
    }

    pub fn size(&self) -> usize {
        self.slot_to_card.len()
    }

    pub fn card_at(&self, slot: Slot) -> Option<Card> {
        self.slot_to_card.get(slot).copied().flatten()
    }

    pub fn slot_of(&self, card: Card) -> Option<Slot> {
        self.card_to_slot.get(&card).copied()
    }

    pub fn is_empty_slot(&self, slot: Slot) -> bool {
        self.card_at(slot).is_none()
    }

    pub fn count_cards(&self) -> usize {
        self.card_to_slot.len()
    }

    /// Cards on the table, in slot order
    pub fn cards(&self) -> Vec<Card> {
        self.slot_to_card.iter().flatten().copied().collect()
    }

    pub fn empty_slots(&self) -> Vec<Slot> {
        (0..self.size()).filter(|&s| self.is_empty_slot(s)).collect()
    }

    pub fn occupied_slots(&self) -> Vec<Slot> {
        (0..self.size()).filter(|&s| !self.is_empty_slot(s)).collect()
    }

    /// Owners of the markers on a slot (empty for out-of-range slots)
    pub fn markers_at(&self, slot: Slot) -> BTreeSet<PlayerId> {
        self.markers.get(slot).cloned().unwrap_or_default()
    }

    pub fn has_marker(&self, player: PlayerId, slot: Slot) -> bool {
        self.markers
            .get(slot)
            .is_some_and(|owners| owners.contains(&player))
    }

    pub fn count_markers(&self) -> usize {
        self.markers.iter().map(BTreeSet::len).sum()
    }

    /// Put a card on an empty slot.
    ///
    /// # Errors
    ///
    /// Fails if the slot is out of range or occupied, or the card is
    /// already on the table.
    pub fn place_card(&mut self, card: Card, slot: Slot) -> TableResult<()> {
        self.check_slot(slot)?;
        if let Some(existing) = self.slot_to_card[slot] {
            return Err(TableError::SlotOccupied { slot, card: existing });
        }
        if let Some(at) = self.card_to_slot.get(&card) {
            return Err(TableError::CardOnTable { card, slot: *at });
        }

        self.slot_to_card[slot] = Some(card);
        self.card_to_slot.insert(card, slot);
        Ok(())
    }

    /// Take the card off a slot, dropping every marker placed on it.
    /// Returns the card and the players whose markers were dropped.
    ///
    /// # Errors
    ///
    /// Fails if the slot is out of range or empty.
    pub fn remove_card(&mut self, slot: Slot) -> TableResult<(Card, BTreeSet<PlayerId>)> {
        self.check_slot(slot)?;
        let card = self.slot_to_card[slot]
            .take()
            .ok_or(TableError::SlotEmpty(slot))?;
        self.card_to_slot.remove(&card);
        let owners = std::mem::take(&mut self.markers[slot]);
        Ok((card, owners))
    }

    /// # Errors
    ///
    /// Fails if the slot is empty or the player already has a marker there.
    pub fn place_marker(&mut self, player: PlayerId, slot: Slot) -> TableResult<()> {
        self.check_slot(slot)?;
        if self.slot_to_card[slot].is_none() {
            return Err(TableError::SlotEmpty(slot));
        }
        if !self.markers[slot].insert(player) {
            return Err(TableError::MarkerPresent { player, slot });
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Fails if the player has no marker on the slot.
    pub fn remove_marker(&mut self, player: PlayerId, slot: Slot) -> TableResult<()> {
        self.check_slot(slot)?;
        if !self.markers[slot].remove(&player) {
            return Err(TableError::MarkerMissing { player, slot });
        }
        Ok(())
    }

    /// Drop every marker on the table
    pub fn clear_markers(&mut self) {
        for owners in &mut self.markers {
            owners.clear();
        }
    }

    fn check_slot(&self, slot: Slot) -> TableResult<()> {
        if slot >= self.size() {
            return Err(TableError::SlotOutOfRange {
                slot,
                size: self.size(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_and_remove_card() {
        let mut grid = Grid::new(4);
        grid.place_card(Card(10), 2).unwrap();

        assert_eq!(grid.card_at(2), Some(Card(10)));
        assert_eq!(grid.slot_of(Card(10)), Some(2));
        assert_eq!(grid.count_cards(), 1);
        assert_eq!(grid.empty_slots(), vec![0, 1, 3]);

        let (card, owners) = grid.remove_card(2).unwrap();
        assert_eq!(card, Card(10));
        assert!(owners.is_empty());
        assert_eq!(grid.slot_of(Card(10)), None);
        assert_eq!(grid.count_cards(), 0);
    }

    #[test]
    fn test_place_card_on_occupied_slot() {
        let mut grid = Grid::new(4);
        grid.place_card(Card(1), 0).unwrap();
        let err = grid.place_card(Card(2), 0).unwrap_err();
        assert_eq!(
            err,
            TableError::SlotOccupied {
                slot: 0,
                card: Card(1)
            }
        );
    }

    #[test]
    fn test_same_card_twice() {
        let mut grid = Grid::new(4);
        grid.place_card(Card(1), 0).unwrap();
        let err = grid.place_card(Card(1), 3).unwrap_err();
        assert_eq!(err, TableError::CardOnTable { card: Card(1), slot: 0 });
    }

    #[test]
    fn test_remove_card_from_empty_slot() {
        let mut grid = Grid::new(4);
        assert_eq!(grid.remove_card(1).unwrap_err(), TableError::SlotEmpty(1));
    }

    #[test]
    fn test_slot_out_of_range() {
        let mut grid = Grid::new(4);
        let err = grid.place_card(Card(1), 4).unwrap_err();
        assert_eq!(err, TableError::SlotOutOfRange { slot: 4, size: 4 });
        assert_eq!(grid.card_at(9), None);
        assert!(!grid.has_marker(0, 9));
    }

    #[test]
    fn test_marker_requires_card() {
        let mut grid = Grid::new(4);
        assert_eq!(grid.place_marker(0, 1).unwrap_err(), TableError::SlotEmpty(1));
    }

    #[test]
    fn test_marker_twice_is_an_error() {
        let mut grid = Grid::new(4);
        grid.place_card(Card(5), 1).unwrap();
        grid.place_marker(0, 1).unwrap();
        assert_eq!(
            grid.place_marker(0, 1).unwrap_err(),
            TableError::MarkerPresent { player: 0, slot: 1 }
        );
        grid.remove_marker(0, 1).unwrap();
        assert_eq!(
            grid.remove_marker(0, 1).unwrap_err(),
            TableError::MarkerMissing { player: 0, slot: 1 }
        );
    }

    #[test]
    fn test_remove_card_clears_markers() {
        let mut grid = Grid::new(4);
        grid.place_card(Card(5), 1).unwrap();
        grid.place_marker(0, 1).unwrap();
        grid.place_marker(3, 1).unwrap();

        let (_, owners) = grid.remove_card(1).unwrap();
        assert_eq!(owners.into_iter().collect::<Vec<_>>(), vec![0, 3]);
        assert!(grid.markers_at(1).is_empty());
        assert_eq!(grid.count_markers(), 0);
    }

    #[test]
    fn test_clear_markers_keeps_cards() {
        let mut grid = Grid::new(3);
        grid.place_card(Card(0), 0).unwrap();
        grid.place_card(Card(1), 2).unwrap();
        grid.place_marker(1, 0).unwrap();
        grid.place_marker(1, 2).unwrap();

        grid.clear_markers();
        assert_eq!(grid.count_markers(), 0);
        assert_eq!(grid.cards(), vec![Card(0), Card(1)]);
        assert_eq!(grid.occupied_slots(), vec![0, 2]);
    }
}
