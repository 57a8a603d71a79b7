//! Round phase shared between the dealer and the players.

use std::sync::atomic::{AtomicU8, Ordering};

/// Where the dealer is in its round cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RoundPhase {
    /// Filling empty slots from the deck
    Dealing = 0,
    /// Countdown active, requests are being resolved
    Running = 1,
    /// Every card is going back into the deck
    Collecting = 2,
    /// No combination left; winners are being announced
    Ending = 3,
}

impl RoundPhase {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Dealing,
            1 => Self::Running,
            2 => Self::Collecting,
            _ => Self::Ending,
        }
    }
}

impl std::fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoundPhase::Dealing => write!(f, "dealing"),
            RoundPhase::Running => write!(f, "running"),
            RoundPhase::Collecting => write!(f, "collecting"),
            RoundPhase::Ending => write!(f, "ending"),
        }
    }
}

/// Round phase cell. Written by the dealer only, and only while it holds
/// the table lock; players read it under the same lock.
#[derive(Debug)]
pub struct RoundState {
    phase: AtomicU8,
}

impl RoundState {
    pub fn new() -> Self {
        Self {
            phase: AtomicU8::new(RoundPhase::Dealing as u8),
        }
    }

    pub fn phase(&self) -> RoundPhase {
        RoundPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// Players may only touch the grid while the round is running.
    pub fn accepts_actions(&self) -> bool {
        self.phase() == RoundPhase::Running
    }

    /// Switch phase, returning the previous one
    pub(crate) fn set(&self, phase: RoundPhase) -> RoundPhase {
        RoundPhase::from_u8(self.phase.swap(phase as u8, Ordering::AcqRel))
    }
}

impl Default for RoundState {
    fn default() -> Self {
        Self::new()
    }
}
