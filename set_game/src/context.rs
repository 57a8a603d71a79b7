//! Handles shared by the dealer and every player thread.

use std::sync::Arc;

use crate::{
    dealer::{requests::RequestQueue, round::RoundState},
    display::GameDisplay,
    game::config::GameConfig,
    table::Table,
};

/// Everything a participant needs to reach the shared state
#[derive(Clone)]
pub struct GameContext {
    pub config: Arc<GameConfig>,
    pub table: Arc<Table>,
    pub round: Arc<RoundState>,
    pub requests: Arc<RequestQueue>,
    pub display: Arc<dyn GameDisplay>,
}

impl GameContext {
    pub fn new(config: GameConfig, display: Arc<dyn GameDisplay>) -> Self {
        let table = Arc::new(Table::new(config.table_size, display.clone()));
        Self {
            config: Arc::new(config),
            table,
            round: Arc::new(RoundState::new()),
            requests: Arc::new(RequestQueue::new()),
            display,
        }
    }
}

impl std::fmt::Debug for GameContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameContext")
            .field("config", &self.config)
            .field("round", &self.round.phase())
            .field("pending_requests", &self.requests.len())
            .finish_non_exhaustive()
    }
}
