//! The shared table: a grid of cards guarded by a single lock.
//!
//! Every read and write of slot↔card and slot↔markers happens through a
//! [`TableGuard`], which is the only way to reach the grid. Players hold
//! the guard for one action, the dealer for a whole refresh pass.
//!
//! ## Lock order
//!
//! The table lock is always taken before any per-player lock, never the
//! other way round.

pub mod errors;
pub mod grid;

use std::{
    ops::Deref,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

pub use errors::{TableError, TableResult};
pub use grid::Grid;

use crate::{
    display::GameDisplay,
    game::entities::{Card, PlayerId, Slot},
};

/// The table shared by the dealer and every player
pub struct Table {
    grid: Mutex<Grid>,
    display: Arc<dyn GameDisplay>,
}

impl Table {
    pub fn new(size: usize, display: Arc<dyn GameDisplay>) -> Self {
        Self {
            grid: Mutex::new(Grid::new(size)),
            display,
        }
    }

    /// Acquire the table lock
    pub fn lock(&self) -> TableGuard<'_> {
        TableGuard {
            grid: self.grid.lock().unwrap_or_else(PoisonError::into_inner),
            display: self.display.as_ref(),
        }
    }

    /// Snapshot of the grid, taken under the lock
    pub fn snapshot(&self) -> Grid {
        self.lock().grid.clone()
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table").finish_non_exhaustive()
    }
}

/// Exclusive access to the grid. Reads go through `Deref`; mutations go
/// through the methods below so the display stays in sync.
pub struct TableGuard<'a> {
    grid: MutexGuard<'a, Grid>,
    display: &'a dyn GameDisplay,
}

impl TableGuard<'_> {
    pub fn place_card(&mut self, card: Card, slot: Slot) -> TableResult<()> {
        self.grid.place_card(card, slot)?;
        self.display.place_card(card, slot);
        Ok(())
    }

    /// Remove a card and every marker on its slot
    pub fn remove_card(&mut self, slot: Slot) -> TableResult<Card> {
        let (card, owners) = self.grid.remove_card(slot)?;
        if !owners.is_empty() {
            self.display.remove_markers_at(slot);
        }
        self.display.remove_card(slot);
        Ok(card)
    }

    pub fn place_marker(&mut self, player: PlayerId, slot: Slot) -> TableResult<()> {
        self.grid.place_marker(player, slot)?;
        self.display.place_marker(player, slot);
        Ok(())
    }

    pub fn remove_marker(&mut self, player: PlayerId, slot: Slot) -> TableResult<()> {
        self.grid.remove_marker(player, slot)?;
        self.display.remove_marker(player, slot);
        Ok(())
    }

    pub fn remove_all_markers(&mut self) {
        self.grid.clear_markers();
        self.display.remove_all_markers();
    }
}

impl Deref for TableGuard<'_> {
    type Target = Grid;

    fn deref(&self) -> &Self::Target {
        &self.grid
    }
}
