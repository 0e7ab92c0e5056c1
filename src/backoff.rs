//! Retry pacing for operations that can fail repeatedly, such as starting
//! an advertisement while the radio is busy.

/// Doubling delay between `initial_ms` and `max_ms`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Backoff {
    initial_ms: u64,
    max_ms: u64,
    next_ms: u64,
}

impl Backoff {
    pub const fn new(initial_ms: u64, max_ms: u64) -> Self {
        Self {
            initial_ms,
            max_ms,
            next_ms: initial_ms,
        }
    }

    /// Delay to wait before the next attempt. Never zero.
    pub fn next_delay_ms(&mut self) -> u64 {
        let delay = self.next_ms.clamp(1, self.max_ms.max(1));
        self.next_ms = delay.saturating_mul(2).min(self.max_ms.max(1));
        delay
    }

    /// Back to the initial delay after a success.
    pub fn reset(&mut self) {
        self.next_ms = self.initial_ms;
    }
}
