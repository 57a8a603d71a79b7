//! The dealer: owns the deck and the countdown, and resolves requests.
//!
//! The dealer thread cycles through rounds:
//!
//! 1. **Dealing**: every empty slot receives a random card from the deck
//! 2. **Running**: the countdown runs; requests are resolved one per wake
//! 3. **Collecting**: the countdown expired (or the grid holds no
//!    combination); every card goes back into the deck
//!
//! Rounds repeat until no combination exists among the deck and the grid,
//! or until a shutdown is requested. The dealer then announces the
//! winners and terminates the players in reverse order.

pub mod errors;
pub mod handle;
pub mod requests;
pub mod round;

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Serialize;
use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

pub use errors::{GameError, GameResult};
pub use handle::{GameHandle, ShutdownSignal, start};
pub use requests::{Request, RequestQueue};
pub use round::{RoundPhase, RoundState};

use crate::{
    context::GameContext,
    game::{
        entities::{Card, PlayerId, Slot, Verdict},
        rules::{CombinationRules, has_combination},
    },
    player::Player,
};

/// How one request was resolved
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub player: PlayerId,
    pub verdict: Verdict,
    /// The submitter's markers at validation time
    pub slots: Vec<Slot>,
}

/// Final standings, returned once the game has ended
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    /// Score per player, indexed by player id
    pub scores: Vec<u32>,
    /// Every player holding the top score
    pub winners: Vec<PlayerId>,
}

/// Coordinator of a game
pub struct Dealer {
    ctx: GameContext,
    rules: Arc<dyn CombinationRules>,
    players: Vec<Arc<Player>>,
    deck: Vec<Card>,
    deadline: Instant,
    rng: StdRng,
    threads: Vec<Option<JoinHandle<()>>>,
}

impl Dealer {
    pub fn new(ctx: GameContext, rules: Arc<dyn CombinationRules>) -> Self {
        let config = ctx.config.clone();
        let players = (0..config.players())
            .map(|id| Arc::new(Player::new(id, config.is_human(id), ctx.clone())))
            .collect();
        let deck = (0u32..).take(config.deck_size).map(Card).collect();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            deadline: Instant::now() + config.turn_timeout(),
            ctx,
            rules,
            players,
            deck,
            rng,
            threads: Vec::new(),
        }
    }

    pub fn players(&self) -> &[Arc<Player>] {
        &self.players
    }

    /// Cards not on the table
    pub fn deck(&self) -> &[Card] {
        &self.deck
    }

    /// Dealer thread main loop
    pub fn run(mut self) -> GameResult<GameSummary> {
        log::info!(
            "Dealer starting: {} players, {} cards, {} slots",
            self.players.len(),
            self.deck.len(),
            self.ctx.config.table_size
        );
        self.spawn_players()?;

        while !self.should_finish() {
            self.deal_cards();
            self.update_timer_display(true);
            self.timer_loop();
            self.collect_cards();
        }

        {
            let _grid = self.ctx.table.lock();
            self.ctx.round.set(RoundPhase::Ending);
        }
        let summary = self.announce_winners();
        self.terminate_players();
        log::info!("Dealer terminated");
        Ok(summary)
    }

    /// Fill every empty slot with a random card from the deck.
    ///
    /// Selections queued while the grid was immutable are discarded.
    pub fn deal_cards(&mut self) {
        let mut grid = self.ctx.table.lock();
        let previous = self.ctx.round.set(RoundPhase::Dealing);

        let mut dealt = 0;
        for slot in grid.empty_slots() {
            if self.deck.is_empty() {
                break;
            }
            let index = self.rng.random_range(0..self.deck.len());
            let card = self.deck.swap_remove(index);
            match grid.place_card(card, slot) {
                Ok(()) => dealt += 1,
                Err(e) => {
                    log::error!("Dealer: failed to place {} on slot {}: {}", card, slot, e);
                    self.deck.push(card);
                }
            }
        }

        if previous != RoundPhase::Running {
            for player in &self.players {
                player.clear_actions();
            }
        }
        self.ctx.round.set(RoundPhase::Running);

        if dealt > 0 {
            log::debug!("Dealt {} cards, {} left in deck", dealt, self.deck.len());
        }
    }

    /// Sweep the table: drop every marker and queued selection, and put
    /// every card back into the deck. Requests still queued are released
    /// as stale.
    pub fn collect_cards(&mut self) {
        {
            let mut grid = self.ctx.table.lock();
            self.ctx.round.set(RoundPhase::Collecting);
            grid.remove_all_markers();
            for player in &self.players {
                player.reset_markers_and_actions();
            }
            for slot in grid.occupied_slots() {
                match grid.remove_card(slot) {
                    Ok(card) => self.deck.push(card),
                    Err(e) => log::error!("Dealer: failed to collect slot {}: {}", slot, e),
                }
            }
        }

        while let Some(request) = self.ctx.requests.pop() {
            if let Some(player) = self.players.get(request.player) {
                player.deliver(Verdict::Stale);
            }
        }
        log::debug!("Collected the table, {} cards in deck", self.deck.len());
    }

    /// Resolve the oldest pending request, if any.
    ///
    /// The submitter's markers are re-read under the table lock. Fewer
    /// than K markers left means another player took one of its cards
    /// first, and the request is released as stale.
    pub fn process_next_request(&mut self) -> Option<Resolution> {
        let request = self.ctx.requests.pop()?;
        let Some(player) = self.players.get(request.player).cloned() else {
            log::warn!("Dealer: request from unknown player {}", request.player);
            return None;
        };

        let target = self.ctx.config.feature_size;
        let (verdict, slots) = {
            let mut grid = self.ctx.table.lock();
            let mut markers = player.lock_markers();
            let slots = markers.clone();
            let cards: Option<Vec<Card>> = slots.iter().map(|&slot| grid.card_at(slot)).collect();

            match cards {
                Some(cards) if slots.len() == target => {
                    if self.rules.is_combination(&cards) {
                        markers.clear();
                        drop(markers);
                        for &slot in &slots {
                            if let Err(e) = grid.remove_card(slot) {
                                log::error!("Dealer: failed to remove slot {}: {}", slot, e);
                            }
                        }
                        for other in &self.players {
                            other.lock_markers().retain(|slot| !slots.contains(slot));
                        }
                        player.award_point();
                        player.enter_freeze(Verdict::Point);
                        (Verdict::Point, slots)
                    } else {
                        player.enter_freeze(Verdict::Penalty);
                        (Verdict::Penalty, slots)
                    }
                }
                _ => (Verdict::Stale, slots),
            }
        };

        if verdict == Verdict::Point {
            self.update_timer_display(true);
        }
        log::debug!(
            "Player {} request on {:?}: {} (waited {:?})",
            player.id(),
            slots,
            verdict,
            request.submitted_at.elapsed()
        );
        player.deliver(verdict);

        Some(Resolution {
            player: player.id(),
            verdict,
            slots,
        })
    }

    /// Whether the game is over: shutdown requested, or no combination
    /// left among the deck and the grid.
    pub fn should_finish(&self) -> bool {
        if self.ctx.requests.is_shut_down() {
            return true;
        }
        let mut cards = self.deck.clone();
        cards.extend(self.ctx.table.lock().cards());
        !has_combination(self.rules.as_ref(), &cards, self.ctx.config.feature_size)
    }

    fn grid_has_combination(&self) -> bool {
        let cards = self.ctx.table.lock().cards();
        has_combination(self.rules.as_ref(), &cards, self.ctx.config.feature_size)
    }

    /// Run the countdown until it expires, the grid runs out of
    /// combinations, or a shutdown is requested.
    fn timer_loop(&mut self) {
        while !self.ctx.requests.is_shut_down() && Instant::now() < self.deadline {
            self.sleep_until_woken_or_timeout();
            self.update_timer_display(false);
            self.process_next_request();
            self.deal_cards();
            if !self.grid_has_combination() {
                log::debug!("No combination left on the table, ending round early");
                break;
            }
        }
    }

    /// Wait for a request, at most until the next countdown update
    fn sleep_until_woken_or_timeout(&self) {
        let remaining = self.deadline.saturating_duration_since(Instant::now());
        let warning = self.ctx.config.turn_timeout_warning();
        let slice = if remaining <= warning {
            self.ctx.config.warning_tick()
        } else {
            self.ctx.config.display_tick().min(remaining - warning)
        };
        self.ctx.requests.wait(slice.min(remaining));
    }

    /// Publish the countdown, restarting it first if `reset` is set
    fn update_timer_display(&mut self, reset: bool) {
        if reset {
            self.deadline = Instant::now() + self.ctx.config.turn_timeout();
        }
        let remaining = self.deadline.saturating_duration_since(Instant::now());
        let warn = remaining <= self.ctx.config.turn_timeout_warning();
        self.ctx.display.set_countdown(round_up_to_tick(remaining, warn), warn);
    }

    fn spawn_players(&mut self) -> GameResult<()> {
        for player in self.players.clone() {
            let id = player.id();
            let spawned = thread::Builder::new()
                .name(format!("player-{id}"))
                .spawn(move || player.run());
            match spawned {
                Ok(handle) => self.threads.push(Some(handle)),
                Err(e) => {
                    log::error!("Dealer: failed to spawn player {}: {}", id, e);
                    self.terminate_players();
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }

    /// Stop the players, last one first, waiting for each thread to exit
    /// before signalling the next.
    fn terminate_players(&mut self) {
        for (id, player) in self.players.iter().enumerate().rev() {
            player.terminate();
            if let Some(handle) = self.threads.get_mut(id).and_then(Option::take) {
                if handle.join().is_err() {
                    log::error!("Player {} thread panicked", id);
                }
            }
        }
    }

    fn announce_winners(&self) -> GameSummary {
        let scores: Vec<u32> = self.players.iter().map(|p| p.score()).collect();
        let top = scores.iter().copied().max().unwrap_or(0);
        let winners: Vec<PlayerId> = scores
            .iter()
            .enumerate()
            .filter(|&(_, &score)| score == top)
            .map(|(id, _)| id)
            .collect();

        log::info!("Game over: scores {:?}, winners {:?}", scores, winners);
        self.ctx.display.announce_winners(&winners);
        GameSummary { scores, winners }
    }
}

impl std::fmt::Debug for Dealer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dealer")
            .field("players", &self.players)
            .field("deck", &self.deck.len())
            .field("round", &self.ctx.round.phase())
            .finish_non_exhaustive()
    }
}

/// Whole seconds outside the warning window, so the display doesn't
/// show "0" while almost a second remains.
fn round_up_to_tick(remaining: Duration, warn: bool) -> Duration {
    if warn || remaining.subsec_nanos() == 0 {
        remaining
    } else {
        Duration::from_secs(remaining.as_secs() + 1)
    }
}
