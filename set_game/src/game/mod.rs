//! Card game vocabulary shared by the table, players and dealer.
//!
//! - Card and player identifiers, validation verdicts
//! - Combination rules (classic Set rules, pluggable predicate)
//! - Game configuration

pub mod config;
pub mod entities;
pub mod rules;

pub use config::{ConfigError, ConfigResult, GameConfig};
pub use entities::{Card, PlayerId, Slot, Verdict};
pub use rules::{CombinationRules, SetRules, find_combinations, has_combination};
