//! Player threads: marker placement, request submission and freezes.
//!
//! Each player runs on its own thread and owns two private structures:
//! its marker set and its queue of pending slot selections. The dealer
//! reads and trims both during validation and sweeps, always while it
//! holds the table lock.
//!
//! ## Locks
//!
//! - `markers`: taken after the table lock
//! - `actions` (+ `actions_changed`): taken after `markers`
//! - `verdict` (+ `verdict_ready`): never held together with another lock
//! - `stop` (+ `stopped`): only used for interruptible sleeps
//!
//! Every wait re-checks the terminate flag in its predicate, and
//! [`Player::terminate`] notifies each condition after setting the flag,
//! so a terminate request can't slip between a check and a wait.

mod synthetic;

use serde::Serialize;
use std::{
    collections::VecDeque,
    sync::{
        Arc, Condvar, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use crate::{
    context::GameContext,
    game::entities::{PlayerId, Slot, Verdict},
    table::TableResult,
};

/// Player state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum PlayerPhase {
    Idle = 0,
    Acting = 1,
    AwaitingValidation = 2,
    FrozenPenalty = 3,
    FrozenPoint = 4,
    Terminated = 5,
}

impl PlayerPhase {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Acting,
            2 => Self::AwaitingValidation,
            3 => Self::FrozenPenalty,
            4 => Self::FrozenPoint,
            _ => Self::Terminated,
        }
    }

    pub fn is_frozen(self) -> bool {
        matches!(self, Self::FrozenPenalty | Self::FrozenPoint)
    }
}

/// What one processed slot selection did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Nothing was queued
    Idle,
    /// The selection no longer applied (grid immutable, slot emptied,
    /// marker set full)
    Dropped(Slot),
    Placed(Slot),
    Removed(Slot),
    /// The marker placed on this slot completed the set; a request is due
    TargetReached(Slot),
}

/// A participant at the table
pub struct Player {
    id: PlayerId,
    human: bool,
    ctx: GameContext,
    score: AtomicU32,
    phase: AtomicU8,
    terminate: AtomicBool,
    markers: Mutex<Vec<Slot>>,
    actions: Mutex<VecDeque<Slot>>,
    actions_changed: Condvar,
    verdict: Mutex<Option<Verdict>>,
    verdict_ready: Condvar,
    stop: Mutex<bool>,
    stopped: Condvar,
}

impl Player {
    pub fn new(id: PlayerId, human: bool, ctx: GameContext) -> Self {
        let capacity = ctx.config.action_queue_capacity;
        let target = ctx.config.feature_size;
        Self {
            id,
            human,
            ctx,
            score: AtomicU32::new(0),
            phase: AtomicU8::new(PlayerPhase::Idle as u8),
            terminate: AtomicBool::new(false),
            markers: Mutex::new(Vec::with_capacity(target)),
            actions: Mutex::new(VecDeque::with_capacity(capacity)),
            actions_changed: Condvar::new(),
            verdict: Mutex::new(None),
            verdict_ready: Condvar::new(),
            stop: Mutex::new(false),
            stopped: Condvar::new(),
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn is_human(&self) -> bool {
        self.human
    }

    pub fn score(&self) -> u32 {
        self.score.load(Ordering::Acquire)
    }

    pub fn phase(&self) -> PlayerPhase {
        PlayerPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    pub fn is_terminated(&self) -> bool {
        self.terminate.load(Ordering::Acquire)
    }

    /// Slots currently marked by this player, in placement order
    pub fn markers(&self) -> Vec<Slot> {
        self.lock_markers().clone()
    }

    /// Slot selections waiting to be processed
    pub fn pending_actions(&self) -> Vec<Slot> {
        self.lock_actions().iter().copied().collect()
    }

    /// Input event: `slot` was selected by this player.
    ///
    /// The selection is queued unless the queue is full, the grid is not
    /// accepting actions, the slot holds no card, the player is frozen, or
    /// the marker set is full and the slot is not one of its markers.
    /// Returns whether the selection was queued.
    pub fn key_pressed(&self, slot: Slot) -> bool {
        if self.is_terminated() || self.phase().is_frozen() {
            return false;
        }

        let grid = self.ctx.table.lock();
        if !self.ctx.round.accepts_actions() || grid.is_empty_slot(slot) {
            return false;
        }
        // The dealer freezes a player under the table lock
        if self.phase().is_frozen() {
            return false;
        }

        let markers = self.lock_markers();
        let mut actions = self.lock_actions();
        if actions.len() >= self.ctx.config.action_queue_capacity {
            return false;
        }
        if markers.len() >= self.ctx.config.feature_size && !markers.contains(&slot) {
            return false;
        }

        actions.push_back(slot);
        drop(actions);
        self.actions_changed.notify_all();
        true
    }

    /// Process the oldest queued selection under the table lock: toggle
    /// the marker on that slot, placing only while below the target.
    pub fn take_action(&self) -> TableResult<ActionOutcome> {
        let mut grid = self.ctx.table.lock();
        let mut markers = self.lock_markers();
        let Some(slot) = self.pop_action() else {
            return Ok(ActionOutcome::Idle);
        };

        if !self.ctx.round.accepts_actions() {
            return Ok(ActionOutcome::Dropped(slot));
        }

        if markers.contains(&slot) {
            grid.remove_marker(self.id, slot)?;
            markers.retain(|&s| s != slot);
            return Ok(ActionOutcome::Removed(slot));
        }

        let target = self.ctx.config.feature_size;
        if markers.len() >= target || grid.is_empty_slot(slot) {
            return Ok(ActionOutcome::Dropped(slot));
        }

        grid.place_marker(self.id, slot)?;
        markers.push(slot);
        if markers.len() == target {
            Ok(ActionOutcome::TargetReached(slot))
        } else {
            Ok(ActionOutcome::Placed(slot))
        }
    }

    /// Hand this player's markers to the dealer for validation.
    /// Returns false if the dealer no longer accepts requests.
    pub fn submit_request(&self) -> bool {
        *self.lock_verdict() = None;
        self.set_phase(PlayerPhase::AwaitingValidation);
        self.ctx.requests.submit(self.id)
    }

    /// Block until the dealer resolves the request, or until terminated.
    pub fn await_verdict(&self) -> Option<Verdict> {
        let verdict = self.lock_verdict();
        let mut verdict = self
            .verdict_ready
            .wait_while(verdict, |v| v.is_none() && !self.is_terminated())
            .unwrap_or_else(PoisonError::into_inner);
        verdict.take()
    }

    /// Hold still for the freeze matching the verdict, publishing the
    /// remaining time once per second. Returns early when terminated.
    pub fn freeze(&self, verdict: Verdict) {
        let duration = match verdict {
            Verdict::Point => self.ctx.config.point_freeze(),
            Verdict::Penalty => self.ctx.config.penalty_freeze(),
            Verdict::Stale => return,
        };

        self.enter_freeze(verdict);
        let deadline = Instant::now() + duration;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() || self.is_terminated() {
                break;
            }
            self.ctx.display.set_freeze(self.id, Some(remaining));
            self.pause(until_next_second(remaining));
        }
        self.ctx.display.set_freeze(self.id, None);
        self.set_phase(PlayerPhase::Idle);
    }

    /// Ask the player thread (and its input thread) to exit, waking it
    /// from whatever it is blocked on.
    pub fn terminate(&self) {
        self.terminate.store(true, Ordering::Release);

        *self.stop.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.stopped.notify_all();

        drop(self.lock_actions());
        self.actions_changed.notify_all();

        drop(self.lock_verdict());
        self.verdict_ready.notify_all();
    }

    /// Player thread main loop
    pub fn run(self: Arc<Self>) {
        log::info!("Player {} starting", self.id);

        let input = if self.human {
            None
        } else {
            let player = self.clone();
            thread::Builder::new()
                .name(format!("computer-{}", self.id))
                .spawn(move || synthetic::run(player))
                .map_err(|e| log::error!("Player {}: failed to spawn input thread: {}", self.id, e))
                .ok()
        };

        while self.wait_for_action() {
            self.set_phase(PlayerPhase::Acting);
            match self.take_action() {
                Ok(ActionOutcome::TargetReached(slot)) => {
                    log::debug!("Player {} completed a set on slot {}", self.id, slot);
                    if self.submit_request() {
                        if let Some(verdict) = self.await_verdict() {
                            log::debug!("Player {} got {}", self.id, verdict);
                            if verdict.freezes() {
                                self.freeze(verdict);
                            }
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => log::error!("Player {}: error taking action: {}", self.id, e),
            }
            if !self.is_terminated() {
                self.set_phase(PlayerPhase::Idle);
            }
        }

        self.set_phase(PlayerPhase::Terminated);
        if let Some(input) = input {
            if input.join().is_err() {
                log::error!("Player {}: input thread panicked", self.id);
            }
        }
        log::info!("Player {} terminated", self.id);
    }

    /// Block until a selection is queued. False once terminated.
    fn wait_for_action(&self) -> bool {
        let actions = self.lock_actions();
        let _actions = self
            .actions_changed
            .wait_while(actions, |a| a.is_empty() && !self.is_terminated())
            .unwrap_or_else(PoisonError::into_inner);
        !self.is_terminated()
    }

    /// Block while the action queue is full, up to `timeout`.
    pub(crate) fn wait_for_room(&self, timeout: Duration) {
        let capacity = self.ctx.config.action_queue_capacity;
        let actions = self.lock_actions();
        let _actions = self
            .actions_changed
            .wait_timeout_while(actions, timeout, |a| {
                a.len() >= capacity && !self.is_terminated()
            })
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Sleep that ends early on terminate
    pub(crate) fn pause(&self, duration: Duration) {
        let stop = self.stop.lock().unwrap_or_else(PoisonError::into_inner);
        let _stop = self
            .stopped
            .wait_timeout_while(stop, duration, |stopped| !*stopped)
            .unwrap_or_else(PoisonError::into_inner);
    }

    pub(crate) fn table_size(&self) -> usize {
        self.ctx.config.table_size
    }

    pub(crate) fn think_time(&self) -> Duration {
        self.ctx.config.computer_think()
    }

    /// Switch to the frozen phase matching a point or a penalty. The
    /// dealer calls this under the table lock, before waking the player,
    /// so no selection slips in between the verdict and the freeze.
    pub(crate) fn enter_freeze(&self, verdict: Verdict) {
        match verdict {
            Verdict::Point => self.set_phase(PlayerPhase::FrozenPoint),
            Verdict::Penalty => self.set_phase(PlayerPhase::FrozenPenalty),
            Verdict::Stale => {}
        }
    }

    /// Deliver the dealer's decision and wake the player
    pub(crate) fn deliver(&self, verdict: Verdict) {
        self.enter_freeze(verdict);
        *self.lock_verdict() = Some(verdict);
        self.verdict_ready.notify_all();
    }

    /// Score a point. The caller holds the table lock.
    pub(crate) fn award_point(&self) -> u32 {
        let score = self.score.fetch_add(1, Ordering::AcqRel) + 1;
        self.clear_actions();
        self.ctx.display.set_score(self.id, score);
        score
    }

    /// Markers lock, for the dealer's validation pass. The caller holds
    /// the table lock.
    pub(crate) fn lock_markers(&self) -> MutexGuard<'_, Vec<Slot>> {
        self.markers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Forget markers and queued selections. The caller holds the table
    /// lock and clears the grid side itself.
    pub(crate) fn reset_markers_and_actions(&self) {
        self.lock_markers().clear();
        self.clear_actions();
    }

    pub(crate) fn clear_actions(&self) {
        self.lock_actions().clear();
        self.actions_changed.notify_all();
    }

    fn pop_action(&self) -> Option<Slot> {
        let slot = self.lock_actions().pop_front();
        if slot.is_some() {
            self.actions_changed.notify_all();
        }
        slot
    }

    fn set_phase(&self, phase: PlayerPhase) {
        self.phase.store(phase as u8, Ordering::Release);
    }

    fn lock_actions(&self) -> MutexGuard<'_, VecDeque<Slot>> {
        self.actions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_verdict(&self) -> MutexGuard<'_, Option<Verdict>> {
        self.verdict.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("id", &self.id)
            .field("human", &self.human)
            .field("score", &self.score())
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

/// Time until the countdown crosses the next whole second
fn until_next_second(remaining: Duration) -> Duration {
    let fraction = Duration::from_nanos(u64::from(remaining.subsec_nanos()));
    if fraction.is_zero() {
        remaining.min(Duration::from_secs(1))
    } else {
        fraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dealer::round::RoundPhase,
        display::NullDisplay,
        game::{config::GameConfig, entities::Card},
    };

    fn context() -> GameContext {
        context_with_freeze(200)
    }

    fn context_with_freeze(freeze_millis: u64) -> GameContext {
        let config = GameConfig {
            table_size: 6,
            human_players: 1,
            computer_players: 0,
            point_freeze_millis: freeze_millis,
            penalty_freeze_millis: freeze_millis,
            ..GameConfig::default()
        };
        let ctx = GameContext::new(config, Arc::new(NullDisplay));
        {
            let mut grid = ctx.table.lock();
            for slot in 0..5 {
                grid.place_card(Card(slot as u32), slot).unwrap();
            }
        }
        ctx.round.set(RoundPhase::Running);
        ctx
    }

    #[test]
    fn test_key_press_queues_slot() {
        let player = Player::new(0, true, context());
        assert!(player.key_pressed(1));
        assert_eq!(player.pending_actions(), vec![1]);
    }

    #[test]
    fn test_key_press_on_empty_slot_dropped() {
        let player = Player::new(0, true, context());
        // Slot 5 holds no card
        assert!(!player.key_pressed(5));
        assert!(player.pending_actions().is_empty());
    }

    #[test]
    fn test_key_press_dropped_when_queue_full() {
        let player = Player::new(0, true, context());
        assert!(player.key_pressed(0));
        assert!(player.key_pressed(1));
        assert!(player.key_pressed(2));
        assert!(!player.key_pressed(3));
        assert_eq!(player.pending_actions(), vec![0, 1, 2]);
    }

    #[test]
    fn test_key_press_dropped_while_grid_immutable() {
        let ctx = context();
        let player = Player::new(0, true, ctx.clone());
        ctx.round.set(RoundPhase::Collecting);
        assert!(!player.key_pressed(0));
    }

    #[test]
    fn test_toggle_marker() {
        let ctx = context();
        let player = Player::new(0, true, ctx.clone());

        player.key_pressed(2);
        assert_eq!(player.take_action().unwrap(), ActionOutcome::Placed(2));
        assert_eq!(player.markers(), vec![2]);
        assert!(ctx.table.lock().has_marker(0, 2));

        player.key_pressed(2);
        assert_eq!(player.take_action().unwrap(), ActionOutcome::Removed(2));
        assert!(player.markers().is_empty());
        assert!(!ctx.table.lock().has_marker(0, 2));
    }

    #[test]
    fn test_target_reached_on_third_marker() {
        let player = Player::new(0, true, context());
        for slot in [0, 1, 2] {
            player.key_pressed(slot);
        }
        assert_eq!(player.take_action().unwrap(), ActionOutcome::Placed(0));
        assert_eq!(player.take_action().unwrap(), ActionOutcome::Placed(1));
        assert_eq!(player.take_action().unwrap(), ActionOutcome::TargetReached(2));
        assert_eq!(player.take_action().unwrap(), ActionOutcome::Idle);
    }

    #[test]
    fn test_full_marker_set_only_accepts_own_slots() {
        let player = Player::new(0, true, context());
        for slot in [0, 1, 2] {
            player.key_pressed(slot);
            player.take_action().unwrap();
        }
        assert!(!player.key_pressed(3));
        assert!(player.key_pressed(1));
        assert_eq!(player.take_action().unwrap(), ActionOutcome::Removed(1));
        assert_eq!(player.markers(), vec![0, 2]);
    }

    #[test]
    fn test_queued_action_dropped_after_card_removed() {
        let ctx = context();
        let player = Player::new(0, true, ctx.clone());
        player.key_pressed(4);
        ctx.table.lock().remove_card(4).unwrap();
        assert_eq!(player.take_action().unwrap(), ActionOutcome::Dropped(4));
        assert!(player.markers().is_empty());
    }

    #[test]
    fn test_submit_and_deliver() {
        let ctx = context();
        let player = Player::new(0, true, ctx.clone());
        assert!(player.submit_request());
        assert_eq!(player.phase(), PlayerPhase::AwaitingValidation);
        assert_eq!(ctx.requests.pending_players(), vec![0]);

        player.deliver(Verdict::Penalty);
        assert_eq!(player.await_verdict(), Some(Verdict::Penalty));
    }

    #[test]
    fn test_submit_refused_after_shutdown() {
        let ctx = context();
        let player = Player::new(0, true, ctx.clone());
        ctx.requests.shutdown();
        assert!(!player.submit_request());
    }

    #[test]
    fn test_terminate_releases_verdict_wait() {
        let player = Arc::new(Player::new(0, true, context()));
        player.submit_request();

        let waiter = {
            let player = player.clone();
            thread::spawn(move || player.await_verdict())
        };
        thread::sleep(Duration::from_millis(20));
        player.terminate();

        assert_eq!(waiter.join().unwrap(), None);
    }

    #[test]
    fn test_freeze_drops_key_presses_then_recovers() {
        let player = Arc::new(Player::new(0, true, context()));
        let freezer = {
            let player = player.clone();
            thread::spawn(move || player.freeze(Verdict::Penalty))
        };
        thread::sleep(Duration::from_millis(5));
        assert!(player.phase().is_frozen());
        assert!(!player.key_pressed(0));

        freezer.join().unwrap();
        assert_eq!(player.phase(), PlayerPhase::Idle);
        assert!(player.key_pressed(0));
    }

    #[test]
    fn test_stale_verdict_does_not_freeze() {
        let player = Player::new(0, true, context());
        player.freeze(Verdict::Stale);
        assert_eq!(player.phase(), PlayerPhase::Idle);
    }

    #[test]
    fn test_award_point_clears_queue() {
        let player = Player::new(0, true, context());
        player.key_pressed(0);
        assert_eq!(player.award_point(), 1);
        assert_eq!(player.score(), 1);
        assert!(player.pending_actions().is_empty());
    }

    #[test]
    fn test_until_next_second() {
        assert_eq!(
            until_next_second(Duration::from_millis(2_300)),
            Duration::from_millis(300)
        );
        assert_eq!(
            until_next_second(Duration::from_secs(2)),
            Duration::from_secs(1)
        );
        assert_eq!(
            until_next_second(Duration::from_millis(40)),
            Duration::from_millis(40)
        );
    }

    #[test]
    fn test_run_exits_on_terminate() {
        let player = Arc::new(Player::new(0, true, context()));
        let handle = {
            let player = player.clone();
            thread::spawn(move || player.run())
        };
        thread::sleep(Duration::from_millis(20));
        player.terminate();
        handle.join().unwrap();
        assert_eq!(player.phase(), PlayerPhase::Terminated);
    }

    #[test]
    fn test_terminate_interrupts_freeze() {
        let player = Arc::new(Player::new(0, true, context_with_freeze(60_000)));
        let freezer = {
            let player = player.clone();
            thread::spawn(move || player.freeze(Verdict::Penalty))
        };
        thread::sleep(Duration::from_millis(20));
        assert_eq!(player.phase(), PlayerPhase::FrozenPenalty);

        let start = Instant::now();
        player.terminate();
        freezer.join().unwrap();
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_run_exits_while_awaiting_verdict() {
        let player = Arc::new(Player::new(0, true, context()));
        let handle = {
            let player = player.clone();
            thread::spawn(move || player.run())
        };
        for slot in [0, 1, 2] {
            assert!(player.key_pressed(slot));
        }

        // No dealer runs, so the request is never resolved
        let deadline = Instant::now() + Duration::from_secs(5);
        while player.phase() != PlayerPhase::AwaitingValidation && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(player.phase(), PlayerPhase::AwaitingValidation);

        player.terminate();
        handle.join().unwrap();
        assert_eq!(player.phase(), PlayerPhase::Terminated);
    }

    #[test]
    fn test_deliver_freezes_before_waking() {
        let player = Player::new(0, true, context());
        player.submit_request();
        player.deliver(Verdict::Point);

        // The player thread hasn't picked up the verdict yet
        assert_eq!(player.phase(), PlayerPhase::FrozenPoint);
        assert!(!player.key_pressed(3));
        assert!(player.pending_actions().is_empty());
    }

    #[test]
    fn test_stale_delivery_leaves_player_awaiting() {
        let player = Player::new(0, true, context());
        player.submit_request();
        player.deliver(Verdict::Stale);
        assert_eq!(player.phase(), PlayerPhase::AwaitingValidation);
        assert_eq!(player.await_verdict(), Some(Verdict::Stale));
    }
}
