//! Error types for table module

use thiserror::Error;

use crate::game::entities::{Card, PlayerId, Slot};

/// Result type for grid operations
pub type TableResult<T> = Result<T, TableError>;

/// Illegal grid operations. Callers check the grid before mutating it,
/// so any of these reaching a log indicates a broken invariant.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("slot {slot} out of range (table has {size} slots)")]
    SlotOutOfRange { slot: Slot, size: usize },

    #[error("slot {slot} already holds card {card}")]
    SlotOccupied { slot: Slot, card: Card },

    #[error("slot {0} holds no card")]
    SlotEmpty(Slot),

    #[error("card {card} is already on the table at slot {slot}")]
    CardOnTable { card: Card, slot: Slot },

    #[error("player {player} already has a marker on slot {slot}")]
    MarkerPresent { player: PlayerId, slot: Slot },

    #[error("player {player} has no marker on slot {slot}")]
    MarkerMissing { player: PlayerId, slot: Slot },
}
