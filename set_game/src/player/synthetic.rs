//! Key-press source for computer players.
//!
//! Presses a uniformly random slot, waits for room in the action queue
//! when it is full, and pauses between presses. Presses that land on an
//! empty slot, or while the player is frozen, are simply dropped by
//! [`Player::key_pressed`].

use rand::Rng;
use std::{sync::Arc, time::Duration};

use super::Player;

/// Upper bound on one wait for queue room, so terminate is noticed
const ROOM_WAIT: Duration = Duration::from_millis(100);

pub(super) fn run(player: Arc<Player>) {
    log::debug!("Computer input for player {} starting", player.id());
    let mut rng = rand::rng();
    let slots = player.table_size();
    let think = player.think_time();

    while !player.is_terminated() {
        player.wait_for_room(ROOM_WAIT);
        if player.is_terminated() {
            break;
        }
        let slot = rng.random_range(0..slots);
        if player.key_pressed(slot) {
            log::trace!("Computer player {} pressed slot {}", player.id(), slot);
        }
        player.pause(think);
    }

    log::debug!("Computer input for player {} stopped", player.id());
}
