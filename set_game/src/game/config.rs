//! Game configuration models.

use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};
use thiserror::Error;

use super::rules::SetRules;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Game configuration. Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of slots on the table grid
    pub table_size: usize,

    /// Number of distinct cards in the deck
    pub deck_size: usize,

    /// Cards per combination, which is also the marker target per player
    pub feature_size: usize,

    /// Number of features encoded in each card
    pub feature_count: usize,

    /// Players whose input comes from the outside
    pub human_players: usize,

    /// Players driven by a synthetic input thread
    pub computer_players: usize,

    /// Pending slot selections a player may queue
    pub action_queue_capacity: usize,

    /// Round length before the table is reshuffled
    pub turn_timeout_millis: u64,

    /// Remaining time below which the countdown is shown in warning mode
    pub turn_timeout_warning_millis: u64,

    /// Freeze after scoring a point
    pub point_freeze_millis: u64,

    /// Freeze after a penalty
    pub penalty_freeze_millis: u64,

    /// Countdown refresh granularity outside the warning window
    pub display_tick_millis: u64,

    /// Countdown refresh granularity inside the warning window
    pub warning_tick_millis: u64,

    /// Pause between two synthetic key presses
    pub computer_think_millis: u64,

    /// Seed for the dealer's card draws; random when unset
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            table_size: 12,
            deck_size: 81,
            feature_size: 3,
            feature_count: 4,
            human_players: 0,
            computer_players: 2,
            action_queue_capacity: 3,
            turn_timeout_millis: 60_000,
            turn_timeout_warning_millis: 10_000,
            point_freeze_millis: 1_000,
            penalty_freeze_millis: 3_000,
            display_tick_millis: 1_000,
            warning_tick_millis: 10,
            computer_think_millis: 20,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Load a configuration from a JSON file. Missing fields take their
    /// default values.
    ///
    /// # Errors
    ///
    /// Returns error if the file can't be read, parsed, or fails validation
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns the first field that violates its constraints
    pub fn validate(&self) -> ConfigResult<()> {
        if self.feature_size == 0 {
            return Err(ConfigError::Invalid {
                field: "feature_size",
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.table_size < self.feature_size {
            return Err(ConfigError::Invalid {
                field: "table_size",
                reason: format!("Must hold at least {} cards", self.feature_size),
            });
        }

        if self.deck_size == 0 {
            return Err(ConfigError::Invalid {
                field: "deck_size",
                reason: "Must be greater than 0".to_string(),
            });
        }

        let capacity = SetRules::new(self.feature_size, self.feature_count).deck_capacity();
        if self.deck_size > capacity {
            return Err(ConfigError::Invalid {
                field: "deck_size",
                reason: format!(
                    "Must be at most {capacity} ({} features of size {})",
                    self.feature_count, self.feature_size
                ),
            });
        }

        if u32::try_from(self.deck_size).is_err() {
            return Err(ConfigError::Invalid {
                field: "deck_size",
                reason: format!("Must be at most {}", u32::MAX),
            });
        }

        if self.players() == 0 {
            return Err(ConfigError::Invalid {
                field: "human_players",
                reason: "At least one player is required".to_string(),
            });
        }

        if self.action_queue_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "action_queue_capacity",
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.turn_timeout_millis == 0 {
            return Err(ConfigError::Invalid {
                field: "turn_timeout_millis",
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.turn_timeout_warning_millis > self.turn_timeout_millis {
            return Err(ConfigError::Invalid {
                field: "turn_timeout_warning_millis",
                reason: format!(
                    "Must not exceed the turn timeout ({})",
                    self.turn_timeout_millis
                ),
            });
        }

        if self.display_tick_millis == 0 || self.warning_tick_millis == 0 {
            return Err(ConfigError::Invalid {
                field: "display_tick_millis",
                reason: "Countdown ticks must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Total number of players
    pub fn players(&self) -> usize {
        self.human_players + self.computer_players
    }

    /// Whether the player with this id is driven by a synthetic input thread.
    /// Humans take the lowest ids.
    pub fn is_human(&self, player: usize) -> bool {
        player < self.human_players
    }

    pub fn turn_timeout(&self) -> Duration {
        Duration::from_millis(self.turn_timeout_millis)
    }

    pub fn turn_timeout_warning(&self) -> Duration {
        Duration::from_millis(self.turn_timeout_warning_millis)
    }

    pub fn point_freeze(&self) -> Duration {
        Duration::from_millis(self.point_freeze_millis)
    }

    pub fn penalty_freeze(&self) -> Duration {
        Duration::from_millis(self.penalty_freeze_millis)
    }

    pub fn display_tick(&self) -> Duration {
        Duration::from_millis(self.display_tick_millis)
    }

    pub fn warning_tick(&self) -> Duration {
        Duration::from_millis(self.warning_tick_millis)
    }

    pub fn computer_think(&self) -> Duration {
        Duration::from_millis(self.computer_think_millis)
    }
}
