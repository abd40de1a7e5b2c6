//! [`Clock`] implementations.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::traits::Clock;

/// Wall-clock seconds since the Unix epoch that never move backwards.
///
/// If the system clock steps back, the last returned value is repeated
/// until real time catches up.
#[derive(Debug, Default)]
pub struct SystemClock {
    last: AtomicU64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        let wall = chrono::Utc::now().timestamp().max(0) as u64;
        let prev = self.last.fetch_max(wall, Ordering::AcqRel);
        prev.max(wall)
    }
}

/// Manually driven clock, e.g. a round counter or a test fixture.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    /// Move the clock forward by `by` ticks and return the new value.
    pub fn advance(&self, by: u64) -> u64 {
        self.now.fetch_add(by, Ordering::AcqRel).saturating_add(by)
    }

    /// Set the clock. Values below the current reading are ignored.
    pub fn set(&self, value: u64) {
        self.now.fetch_max(value, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
        assert!(a > 1_600_000_000, "expected a post-2020 timestamp, got {a}");
    }

    #[test]
    fn system_clock_holds_last_value_after_step_back() {
        let clock = SystemClock::new();
        clock.last.store(u64::MAX - 1, Ordering::Release);
        assert_eq!(clock.now(), u64::MAX - 1);
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(10);
        assert_eq!(clock.now(), 10);
        assert_eq!(clock.advance(5), 15);
        assert_eq!(clock.now(), 15);
    }

    #[test]
    fn manual_clock_never_goes_back() {
        let clock = ManualClock::new(10);
        clock.set(3);
        assert_eq!(clock.now(), 10);
        clock.set(42);
        assert_eq!(clock.now(), 42);
    }
}
