//! Console Set table.
//!
//! Runs one game with human players typing `<player> <slot>` on stdin and
//! computer players pressing random slots. Table changes are logged.

mod config;
mod input;

use std::{path::PathBuf, sync::Arc};

use anyhow::Error;
use ctrlc::set_handler;
use log::info;
use pico_args::Arguments;
use set_game::{LogDisplay, SetRules};

const HELP: &str = "\
Play a game of Set in the terminal

USAGE:
  sg_console [OPTIONS]

OPTIONS:
  --config     PATH        JSON game configuration  [default: env SET_CONFIG_FILE or built-in]
  --humans     N           Number of human players  [default: env HUMAN_PLAYERS or 0]
  --computers  N           Number of computer players  [default: env COMPUTER_PLAYERS or 2]
  --seed       N           Seed for the dealer's shuffles  [default: env GAME_SEED or random]

FLAGS:
  -h, --help               Print help information

INPUT:
  Human players select a slot by typing `<player> <slot>`, e.g. `0 7`.

ENVIRONMENT:
  TABLE_SIZE, DECK_SIZE, FEATURE_SIZE, FEATURE_COUNT, ACTION_QUEUE_CAPACITY,
  TURN_TIMEOUT_MILLIS, TURN_TIMEOUT_WARNING_MILLIS, POINT_FREEZE_MILLIS,
  PENALTY_FREEZE_MILLIS, DISPLAY_TICK_MILLIS, WARNING_TICK_MILLIS,
  COMPUTER_THINK_MILLIS
  (A .env file in the working directory is loaded first)
";

fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let overrides = config::Overrides {
        config_file: pargs.opt_value_from_str::<_, PathBuf>("--config")?,
        human_players: pargs.opt_value_from_str("--humans")?,
        computer_players: pargs.opt_value_from_str("--computers")?,
        seed: pargs.opt_value_from_str("--seed")?,
    };

    env_logger::builder().format_target(false).init();

    let config = config::load(&overrides)?;
    info!(
        "Starting a game: {} human and {} computer player(s), {} slots, {} cards",
        config.human_players, config.computer_players, config.table_size, config.deck_size
    );

    let rules = SetRules::new(config.feature_size, config.feature_count);
    let humans = config.human_players;
    let handle = set_game::start(config, Arc::new(rules), Arc::new(LogDisplay))?;

    // Catching signals for exit.
    let signal = handle.shutdown_signal();
    set_handler(move || signal.trigger())?;

    if humans > 0 {
        input::spawn(handle.players().to_vec())?;
        info!("Type `<player> <slot>` to select a card. Press Ctrl+C to stop.");
    }

    let summary = handle.join()?;
    for (player, score) in summary.scores.iter().enumerate() {
        info!("Player {}: {} point(s)", player, score);
    }
    info!("Winner(s): {:?}", summary.winners);

    Ok(())
}
