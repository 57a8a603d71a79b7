//! Human input: `<player> <slot>` lines read from stdin.

use set_game::{Player, PlayerId, Slot};
use std::{
    io::{self, BufRead},
    sync::Arc,
    thread::{self, JoinHandle},
};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Expected `<player> <slot>`, got {0:?}")]
    Malformed(String),

    #[error("No player {0}")]
    UnknownPlayer(PlayerId),

    #[error("Player {0} is a computer player")]
    NotHuman(PlayerId),
}

/// Parse one input line into a player and a slot
pub fn parse_selection(line: &str) -> Result<(PlayerId, Slot), InputError> {
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(player), Some(slot), None) => match (player.parse(), slot.parse()) {
            (Ok(player), Ok(slot)) => Ok((player, slot)),
            _ => Err(InputError::Malformed(line.trim().to_string())),
        },
        _ => Err(InputError::Malformed(line.trim().to_string())),
    }
}

/// Route a selection to its player. Returns whether it was queued.
pub fn dispatch(players: &[Arc<Player>], line: &str) -> Result<bool, InputError> {
    let (id, slot) = parse_selection(line)?;
    let player = players.get(id).ok_or(InputError::UnknownPlayer(id))?;
    if !player.is_human() {
        return Err(InputError::NotHuman(id));
    }
    Ok(player.key_pressed(slot))
}

/// Read stdin on a background thread until EOF.
///
/// The thread is not joined: a pending read can't be interrupted, and the
/// process exits once the game is over.
pub fn spawn(players: Vec<Arc<Player>>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new().name("stdin".to_string()).spawn(move || {
        for line in io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    log::error!("Failed to read stdin: {}", e);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match dispatch(&players, &line) {
                Ok(true) => {}
                Ok(false) => log::debug!("Selection {:?} dropped", line.trim()),
                Err(e) => log::warn!("{}", e),
            }
        }
        log::debug!("stdin closed");
    })
}
