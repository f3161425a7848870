//! Bounded retry counter.

/// Tracks how many probe attempts remain in a bounded retry loop.
///
/// The counter starts at `max_attempts` and is decremented once per failed
/// probe; [`Attempt::is_limit_reached`] becomes true only when exactly zero
/// attempts remain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    max_attempts: u32,
    attempts_left: u32,
}

impl Attempt {
    /// Create a counter with the given attempt budget.
    #[must_use]
    pub const fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            attempts_left: max_attempts,
        }
    }

    /// Record one failed probe, consuming an attempt.
    ///
    /// Saturates at zero; recording further failures past the limit is safe.
    pub fn record_failure(&mut self) {
        self.attempts_left = self.attempts_left.saturating_sub(1);
    }

    /// Whether the attempt budget is exhausted.
    #[must_use]
    pub const fn is_limit_reached(&self) -> bool {
        self.attempts_left == 0
    }

    /// The configured attempt budget.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Attempts remaining before the limit.
    #[must_use]
    pub const fn attempts_left(&self) -> u32 {
        self.attempts_left
    }
}
