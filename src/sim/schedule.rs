//! Scheduled events
//!
//! Delayed work (power-up respawn, power-up expiry, effect expiry) is queued
//! against the simulation clock instead of wall-clock timers. Every entry gets a
//! [`TimerToken`]; owners keep the token and cancel it when the state the timer
//! refers to is torn down.

use serde::{Deserialize, Serialize};

use super::state::Side;

/// Handle for cancelling a scheduled event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerToken(u64);

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerAction {
    SpawnPowerUp,
    ExpirePowerUp,
    ClearEffect(Side),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scheduled {
    pub token: TimerToken,
    pub due_ms: f64,
    pub action: TimerAction,
}

/// Pending events, fired in due-time order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    entries: Vec<Scheduled>,
    next_token: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `action` to fire once the clock reaches `due_ms`
    pub fn schedule(&mut self, due_ms: f64, action: TimerAction) -> TimerToken {
        self.next_token += 1;
        let token = TimerToken(self.next_token);
        self.entries.push(Scheduled {
            token,
            due_ms,
            action,
        });
        token
    }

    /// Cancel a pending event. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, token: TimerToken) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.token != token);
        self.entries.len() != before
    }

    /// Drop every pending event
    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    pub fn is_pending(&self, token: TimerToken) -> bool {
        self.entries.iter().any(|e| e.token == token)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return every event due at `now_ms`, earliest first
    ///
    /// Ties fire in scheduling order.
    pub fn pop_due(&mut self, now_ms: f64) -> Vec<Scheduled> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.entries.drain(..).partition(|e| e.due_ms <= now_ms);
        self.entries = pending;
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.token.cmp(&b.token)));
        due
    }

    /// Time at which the earliest pending event fires
    pub fn next_due(&self) -> Option<f64> {
        self.entries.iter().map(|e| e.due_ms).min_by(|a, b| a.total_cmp(b))
    }
}
