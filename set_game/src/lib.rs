//! # Set Game
//!
//! Coordination core for a real-time Set card table: one dealer thread and
//! one thread per player sharing a grid of cards.
//!
//! Players place markers on cards. A player that reaches K markers hands
//! them to the dealer through a FIFO request queue and blocks; the dealer
//! re-validates the markers against the live grid and answers with a
//! point, a penalty, or a stale release. Independently, the dealer runs a
//! countdown that sweeps and re-deals the whole grid when it expires.
//!
//! ## Core Modules
//!
//! - [`game`]: cards, verdicts, combination rules and configuration
//! - [`table`]: the shared grid behind its single lock
//! - [`player`]: the player state machine and synthetic input
//! - [`dealer`]: rounds, request validation and game lifecycle
//! - [`display`]: the display collaborator
//!
//! ## Example
//!
//! ```
//! use set_game::{Card, SetRules, find_combinations};
//!
//! let rules = SetRules::new(3, 2);
//! let cards: Vec<Card> = (0..9).map(Card).collect();
//!
//! // 3x3 grid of two features: rows, columns and diagonals
//! assert_eq!(find_combinations(&rules, &cards, 3, usize::MAX).len(), 12);
//! ```

/// Handles shared by every thread of a game.
pub mod context;
pub use context::GameContext;

/// Dealer thread, request queue and game lifecycle.
pub mod dealer;
pub use dealer::{
    Dealer, GameError, GameHandle, GameResult, GameSummary, Resolution, RoundPhase,
    ShutdownSignal, start,
};

/// Display collaborator and its stock implementations.
pub mod display;
pub use display::{DisplayEvent, GameDisplay, LogDisplay, NullDisplay, RecordingDisplay};

/// Cards, rules and configuration.
pub mod game;
pub use game::{
    Card, CombinationRules, ConfigError, ConfigResult, GameConfig, PlayerId, SetRules, Slot,
    Verdict, find_combinations, has_combination,
};

/// Player threads.
pub mod player;
pub use player::{ActionOutcome, Player, PlayerPhase};

/// Shared grid.
pub mod table;
pub use table::{Grid, Table, TableError, TableResult};
