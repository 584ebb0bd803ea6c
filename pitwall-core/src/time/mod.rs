//! ## pitwall-core::time
//! **Millisecond clocks for sample timestamps**
//!
//! - `VirtualClock`: advanced explicitly by the simulation, fully deterministic
//! - `SystemClock`: wall-clock epoch milliseconds, never moving backwards

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of monotonic millisecond timestamps.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds.
    fn now_ms(&self) -> u64;

    /// Informs the clock that `ms` of simulated time have elapsed.
    ///
    /// Wall clocks ignore this; virtual clocks move forward by exactly `ms`.
    fn advance(&self, ms: u64);
}

/// A virtual clock that only moves when told to.
#[derive(Clone, Debug)]
pub struct VirtualClock {
    offset: Arc<AtomicU64>,
}

impl VirtualClock {
    /// Creates a clock starting at `start_ms`.
    pub fn new(start_ms: u64) -> Self {
        Self {
            offset: Arc::new(AtomicU64::new(start_ms)),
        }
    }
}

impl Clock for VirtualClock {
    #[inline]
    fn now_ms(&self) -> u64 {
        self.offset.load(Ordering::Acquire)
    }

    #[inline]
    fn advance(&self, ms: u64) {
        self.offset.fetch_add(ms, Ordering::Release);
    }
}

/// Epoch-millisecond wall clock, clamped so it never goes backwards.
#[derive(Clone, Debug, Default)]
pub struct SystemClock {
    last: Arc<AtomicU64>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        let wall = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let previous = self.last.fetch_max(wall, Ordering::AcqRel);
        previous.max(wall)
    }

    fn advance(&self, _ms: u64) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_clock_initial_value() {
        let clock = VirtualClock::new(100);
        assert_eq!(clock.now_ms(), 100);
    }

    #[test]
    fn virtual_clock_advance_is_shared() {
        let clock = VirtualClock::new(0);
        let handle = clock.clone();
        clock.advance(500);
        handle.advance(250);
        assert_eq!(clock.now_ms(), 750);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let mut last = clock.now_ms();
        for _ in 0..1_000 {
            let now = clock.now_ms();
            assert!(now >= last);
            last = now;
        }
        assert!(last > 1_600_000_000_000);
    }
}
