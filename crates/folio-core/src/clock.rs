#![forbid(unsafe_code)]

//! Monotonic time as seen by the state machines.

use core::time::Duration;

/// Source of monotonic time since an arbitrary host-defined origin.
pub trait MonotonicClock {
    /// Current monotonic time.
    fn now_mono(&self) -> Duration;
}

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Set current monotonic time.
    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }

    /// Advance monotonic time by `ms` milliseconds.
    pub fn advance_ms(&mut self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl MonotonicClock for DeterministicClock {
    fn now_mono(&self) -> Duration {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        assert_eq!(DeterministicClock::new().now_mono(), Duration::ZERO);
    }

    #[test]
    fn advance_accumulates() {
        let mut clock = DeterministicClock::new();
        clock.advance_ms(16);
        clock.advance(Duration::from_millis(4));
        assert_eq!(clock.now_mono(), Duration::from_millis(20));
    }

    #[test]
    fn advance_saturates() {
        let mut clock = DeterministicClock::new();
        clock.set(Duration::MAX);
        clock.advance_ms(1);
        assert_eq!(clock.now_mono(), Duration::MAX);
    }
}
