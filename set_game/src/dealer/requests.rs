//! FIFO of validation requests, from many players to the one dealer.

use std::{
    collections::VecDeque,
    sync::{Condvar, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use crate::game::entities::PlayerId;

/// A player asking the dealer to check its markers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Request {
    pub player: PlayerId,
    pub submitted_at: Instant,
}

#[derive(Debug, Default)]
struct QueueState {
    pending: VecDeque<Request>,
    shutdown: bool,
}

/// Request queue plus the signal the dealer sleeps on.
///
/// The same signal carries shutdown, so a dealer waiting for work is
/// woken both by a submission and by a stop request.
#[derive(Debug, Default)]
pub struct RequestQueue {
    state: Mutex<QueueState>,
    wakeup: Condvar,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a request and wake the dealer. Returns false once the
    /// queue has been shut down.
    pub fn submit(&self, player: PlayerId) -> bool {
        let mut state = self.lock();
        if state.shutdown {
            return false;
        }
        state.pending.push_back(Request {
            player,
            submitted_at: Instant::now(),
        });
        drop(state);
        self.wakeup.notify_all();
        true
    }

    /// Oldest pending request
    pub fn pop(&self) -> Option<Request> {
        self.lock().pending.pop_front()
    }

    /// Block until a request is pending, the queue is shut down, or the
    /// timeout elapses. Returns true if there is work to do.
    pub fn wait(&self, timeout: Duration) -> bool {
        let state = self.lock();
        let (state, _) = self
            .wakeup
            .wait_timeout_while(state, timeout, |s| s.pending.is_empty() && !s.shutdown)
            .unwrap_or_else(PoisonError::into_inner);
        !state.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().pending.is_empty()
    }

    /// Players currently waiting, oldest first
    pub fn pending_players(&self) -> Vec<PlayerId> {
        self.lock().pending.iter().map(|r| r.player).collect()
    }

    /// Refuse new requests and wake the dealer
    pub fn shutdown(&self) {
        self.lock().shutdown = true;
        self.wakeup.notify_all();
    }

    pub fn is_shut_down(&self) -> bool {
        self.lock().shutdown
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
