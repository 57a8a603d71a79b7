//! Starting a game on its own threads and talking to it from outside.

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};

use super::{
    Dealer, GameSummary,
    errors::{GameError, GameResult},
    requests::RequestQueue,
};
use crate::{
    context::GameContext,
    display::GameDisplay,
    game::{
        config::GameConfig,
        entities::{PlayerId, Slot},
        rules::CombinationRules,
    },
    player::Player,
};

/// Validate the configuration and start the dealer thread, which in turn
/// starts one thread per player.
pub fn start(
    config: GameConfig,
    rules: Arc<dyn CombinationRules>,
    display: Arc<dyn GameDisplay>,
) -> GameResult<GameHandle> {
    config.validate()?;

    let ctx = GameContext::new(config, display);
    let dealer = Dealer::new(ctx.clone(), rules);
    let players = dealer.players().to_vec();
    let thread = thread::Builder::new()
        .name("dealer".to_string())
        .spawn(move || dealer.run())?;

    Ok(GameHandle {
        ctx,
        players,
        thread: Some(thread),
    })
}

/// Cloneable stop request, usable from a signal handler
#[derive(Clone, Debug)]
pub struct ShutdownSignal(Arc<RequestQueue>);

impl ShutdownSignal {
    pub fn trigger(&self) {
        self.0.shutdown();
    }
}

/// Handle to a running game.
///
/// Dropping the handle without joining stops the game and waits for it.
#[derive(Debug)]
pub struct GameHandle {
    ctx: GameContext,
    players: Vec<Arc<Player>>,
    thread: Option<JoinHandle<GameResult<GameSummary>>>,
}

impl GameHandle {
    /// Forward a slot selection to a player. Returns whether it was queued.
    pub fn key_pressed(&self, player: PlayerId, slot: Slot) -> bool {
        self.players
            .get(player)
            .is_some_and(|p| p.key_pressed(slot))
    }

    pub fn players(&self) -> &[Arc<Player>] {
        &self.players
    }

    pub fn context(&self) -> &GameContext {
        &self.ctx
    }

    /// Ask the dealer to end the game after the current wake cycle
    pub fn shutdown(&self) {
        log::info!("Shutdown requested");
        self.ctx.requests.shutdown();
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        ShutdownSignal(self.ctx.requests.clone())
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the game to end and return the final standings
    pub fn join(mut self) -> GameResult<GameSummary> {
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| GameError::DealerPanicked)?,
            None => Err(GameError::DealerPanicked),
        }
    }
}

impl Drop for GameHandle {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            self.ctx.requests.shutdown();
            if thread.join().is_err() {
                log::error!("Dealer thread panicked");
            }
        }
    }
}
