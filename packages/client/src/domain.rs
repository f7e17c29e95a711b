//! Domain logic for client-side operations.
//!
//! This module contains pure functions that implement business logic
//! without side effects, making them easy to test.

use std::time::Duration;

use crate::error::ClientError;

const INITIAL_RECONNECT_DELAY: Duration = Duration::from_secs(1);
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(30);

/// Where the client currently belongs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// In the waiting room, not yet paired
    Waiting,
    /// Paired into the room with this id
    InRoom(String),
}

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `consecutive_failures` - Failed sessions in a row, including the latest one
/// * `max_attempts` - The maximum number of consecutive failures tolerated
pub fn should_attempt_reconnect(consecutive_failures: u32, max_attempts: u32) -> bool {
    consecutive_failures < max_attempts
}

/// Delay before the next attempt: 1 s doubling per failure, capped at 30 s.
pub fn reconnect_delay(consecutive_failures: u32) -> Duration {
    let exponent = consecutive_failures.saturating_sub(1).min(16);
    INITIAL_RECONNECT_DELAY
        .saturating_mul(1u32 << exponent)
        .min(MAX_RECONNECT_DELAY)
}

/// Exponential backoff state across reconnect attempts
#[derive(Debug, Clone)]
pub struct Backoff {
    max_attempts: u32,
    failures: u32,
}

impl Backoff {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            failures: 0,
        }
    }

    /// Forget earlier failures after a session made progress
    pub fn reset(&mut self) {
        self.failures = 0;
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Record a failed session and return the delay before retrying.
    ///
    /// A session that had connected counts as a fresh start. Returns `None`
    /// once the consecutive failures reach the configured limit.
    pub fn next_delay(&mut self, error: &ClientError) -> Option<Duration> {
        if error.was_connected() {
            self.reset();
        }
        self.failures += 1;

        if should_attempt_reconnect(self.failures, self.max_attempts) {
            Some(reconnect_delay(self.failures))
        } else {
            None
        }
    }
}
