//! Console configuration management.
//!
//! Layers, lowest priority first: built-in defaults, an optional JSON
//! file, environment variables (a `.env` file is loaded beforehand), and
//! command-line overrides.

use set_game::GameConfig;
use std::path::{Path, PathBuf};

/// Command-line overrides, applied last
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_file: Option<PathBuf>,
    pub human_players: Option<usize>,
    pub computer_players: Option<usize>,
    pub seed: Option<u64>,
}

/// Load the game configuration from the environment
///
/// # Errors
///
/// Returns error if the configuration file can't be read, or if the
/// resulting configuration is invalid
pub fn load(overrides: &Overrides) -> Result<GameConfig, ConfigError> {
    let config_file = overrides
        .config_file
        .clone()
        .or_else(|| std::env::var("SET_CONFIG_FILE").ok().map(PathBuf::from));
    let base = match config_file {
        Some(path) => read_file(&path)?,
        None => GameConfig::default(),
    };

    let config = apply(base, overrides, |key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}

fn read_file(path: &Path) -> Result<GameConfig, ConfigError> {
    GameConfig::from_json_file(path).map_err(|source| ConfigError::File {
        path: path.to_path_buf(),
        source,
    })
}

/// Apply environment variables, read through `lookup`, then overrides
fn apply<F>(base: GameConfig, overrides: &Overrides, env: F) -> GameConfig
where
    F: Fn(&str) -> Option<String>,
{
    let config = GameConfig {
        table_size: parse_env_or(&env, "TABLE_SIZE", base.table_size),
        deck_size: parse_env_or(&env, "DECK_SIZE", base.deck_size),
        feature_size: parse_env_or(&env, "FEATURE_SIZE", base.feature_size),
        feature_count: parse_env_or(&env, "FEATURE_COUNT", base.feature_count),
        human_players: parse_env_or(&env, "HUMAN_PLAYERS", base.human_players),
        computer_players: parse_env_or(&env, "COMPUTER_PLAYERS", base.computer_players),
        action_queue_capacity: parse_env_or(
            &env,
            "ACTION_QUEUE_CAPACITY",
            base.action_queue_capacity,
        ),
        turn_timeout_millis: parse_env_or(&env, "TURN_TIMEOUT_MILLIS", base.turn_timeout_millis),
        turn_timeout_warning_millis: parse_env_or(
            &env,
            "TURN_TIMEOUT_WARNING_MILLIS",
            base.turn_timeout_warning_millis,
        ),
        point_freeze_millis: parse_env_or(&env, "POINT_FREEZE_MILLIS", base.point_freeze_millis),
        penalty_freeze_millis: parse_env_or(
            &env,
            "PENALTY_FREEZE_MILLIS",
            base.penalty_freeze_millis,
        ),
        display_tick_millis: parse_env_or(&env, "DISPLAY_TICK_MILLIS", base.display_tick_millis),
        warning_tick_millis: parse_env_or(&env, "WARNING_TICK_MILLIS", base.warning_tick_millis),
        computer_think_millis: parse_env_or(
            &env,
            "COMPUTER_THINK_MILLIS",
            base.computer_think_millis,
        ),
        seed: env("GAME_SEED").and_then(|v| v.parse().ok()).or(base.seed),
    };

    GameConfig {
        human_players: overrides.human_players.unwrap_or(config.human_players),
        computer_players: overrides.computer_players.unwrap_or(config.computer_players),
        seed: overrides.seed.or(config.seed),
        ..config
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load {}: {source}", .path.display())]
    File {
        path: PathBuf,
        source: set_game::ConfigError,
    },

    #[error(transparent)]
    Invalid(#[from] set_game::ConfigError),
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T, F>(env: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    env(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = apply(GameConfig::default(), &Overrides::default(), lookup(&[]));
        assert_eq!(config.table_size, 12);
        assert_eq!(config.computer_players, 2);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_environment_overrides_base() {
        let env = lookup(&[
            ("TABLE_SIZE", "15"),
            ("PENALTY_FREEZE_MILLIS", "500"),
            ("GAME_SEED", "42"),
        ]);
        let config = apply(GameConfig::default(), &Overrides::default(), env);
        assert_eq!(config.table_size, 15);
        assert_eq!(config.penalty_freeze_millis, 500);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.deck_size, 81);
    }

    #[test]
    fn test_unparsable_values_fall_back() {
        let env = lookup(&[("TABLE_SIZE", "twelve"), ("GAME_SEED", "-1")]);
        let config = apply(GameConfig::default(), &Overrides::default(), env);
        assert_eq!(config.table_size, 12);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_command_line_wins() {
        let env = lookup(&[("HUMAN_PLAYERS", "1"), ("COMPUTER_PLAYERS", "4")]);
        let overrides = Overrides {
            human_players: Some(2),
            seed: Some(9),
            ..Overrides::default()
        };
        let config = apply(GameConfig::default(), &overrides, env);
        assert_eq!(config.human_players, 2);
        assert_eq!(config.computer_players, 4);
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = read_file(Path::new("/nonexistent/set.json")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("/nonexistent/set.json"));
    }

    #[test]
    fn test_invalid_config_error_display() {
        let err = ConfigError::from(set_game::ConfigError::Invalid {
            field: "table_size",
            reason: "Must hold at least 3 cards".to_string(),
        });
        assert!(err.to_string().contains("table_size"));
    }
}
