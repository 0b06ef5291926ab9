//! # Clock
//!
//! The sim reads time through the [`Clock`] trait so that the same control loop can run against
//! the wall clock or against a mocked clock which is set explicitly (for tests and for stepping
//! simulated time).

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A source of absolute time.
pub trait Clock: Send + Sync {
    /// Current absolute time in seconds.
    fn now_s(&self) -> f64;

    /// Advance the clock by the given number of seconds.
    ///
    /// Clocks which advance on their own ignore this.
    fn advance(&self, _dt_s: f64) {}

    fn mode(&self) -> ClockMode;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClockMode {
    /// Real time, seconds since the unix epoch
    Wall,

    /// Time is only changed by explicit `set_now` or `advance` calls
    Mock,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Reads the system clock.
#[derive(Debug, Default, Copy, Clone)]
pub struct WallClock;

/// A clock which only moves when told to.
///
/// The time is stored as the bit pattern of an `f64` so it can be shared between threads without
/// a lock.
#[derive(Debug)]
pub struct MockClock {
    now_bits: AtomicU64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Clock for WallClock {
    fn now_s(&self) -> f64 {
        util::time::datetime_to_seconds(&Utc::now())
    }

    fn mode(&self) -> ClockMode {
        ClockMode::Wall
    }
}

impl MockClock {
    pub fn new(now_s: f64) -> Self {
        Self {
            now_bits: AtomicU64::new(now_s.to_bits()),
        }
    }

    /// Set the current time.
    pub fn set_now(&self, now_s: f64) {
        self.now_bits.store(now_s.to_bits(), Ordering::SeqCst);
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Clock for MockClock {
    fn now_s(&self) -> f64 {
        f64::from_bits(self.now_bits.load(Ordering::SeqCst))
    }

    fn advance(&self, dt_s: f64) {
        // Only fails if the closure returns None, which it never does
        let _ = self
            .now_bits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |bits| {
                Some((f64::from_bits(bits) + dt_s).to_bits())
            });
    }

    fn mode(&self) -> ClockMode {
        ClockMode::Mock
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_mock_clock() {
        let clock = MockClock::default();
        assert_eq!(clock.now_s(), 0.0);
        assert_eq!(clock.mode(), ClockMode::Mock);

        clock.set_now(100.01);
        assert_eq!(clock.now_s(), 100.01);

        clock.advance(0.5);
        assert!((clock.now_s() - 100.51).abs() < 1e-9);
    }

    #[test]
    fn test_mock_clock_shared() {
        let clock = Arc::new(MockClock::new(5.0));
        let dyn_clock: Arc<dyn Clock> = clock.clone();

        clock.set_now(7.0);
        assert_eq!(dyn_clock.now_s(), 7.0);
    }

    #[test]
    fn test_wall_clock() {
        let clock = WallClock;
        let t0 = clock.now_s();

        // Sometime after 2020
        assert!(t0 > 1.5e9);

        // Advancing does nothing to a wall clock
        clock.advance(1000.0);
        assert!(clock.now_s() - t0 < 100.0);
    }
}
