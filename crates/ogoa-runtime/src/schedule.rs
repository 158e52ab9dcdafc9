//! Time sources and next-fire-time scheduling.
//!
//! Everything is measured as a [`Duration`] since the clock was created, so
//! the loop can be driven by a [`ManualClock`] in tests.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use ogoa_runtime::schedule::IntervalTimer;
//!
//! let mut timer = IntervalTimer::new(Duration::from_millis(200));
//! assert!(timer.poll(Duration::ZERO));
//! assert!(!timer.poll(Duration::from_millis(150)));
//! assert!(timer.poll(Duration::from_millis(230)));
//! // Rescheduled relative to when it actually fired.
//! assert_eq!(timer.next_fire(), Duration::from_millis(430));
//! ```

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Monotonic time source the harness loop runs on.
pub trait Clock {
    /// Time elapsed since the clock was created.
    fn now(&self) -> Duration;

    fn sleep(&self, d: Duration);
}

/// Wall-clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, d: Duration) {
        std::thread::sleep(d);
    }
}

/// Clock that only moves when told to; `sleep` advances it instantly.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, d: Duration) {
        self.now.set(self.now.get() + d);
    }

    pub fn set(&self, t: Duration) {
        self.now.set(t);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn sleep(&self, d: Duration) {
        self.advance(d);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Timers
// ─────────────────────────────────────────────────────────────────────────────

/// Periodic event scheduled by "next fire time".
///
/// Fires as soon as the clock reaches or passes the scheduled time, then
/// reschedules one interval after the moment it was polled.  A late poll
/// therefore delays later firings instead of producing a burst of catch-up
/// events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalTimer {
    interval: Duration,
    next: Duration,
}

impl IntervalTimer {
    /// First firing is at time zero.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: Duration::ZERO,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn next_fire(&self) -> Duration {
        self.next
    }

    /// `true` if the timer is due at `now`; rearms it when it is.
    pub fn poll(&mut self, now: Duration) -> bool {
        if now < self.next {
            return false;
        }
        self.next = now.saturating_add(self.interval);
        true
    }
}

/// Point in time after which the run stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Duration,
}

impl Deadline {
    pub fn after(start: Duration, run_for: Duration) -> Self {
        Self {
            at: start.saturating_add(run_for),
        }
    }

    pub fn at(&self) -> Duration {
        self.at
    }

    pub fn is_reached(&self, now: Duration) -> bool {
        now >= self.at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn timer_fires_immediately_then_every_interval() {
        let mut t = IntervalTimer::new(ms(1000));
        assert!(t.poll(ms(0)));
        assert!(!t.poll(ms(999)));
        assert!(t.poll(ms(1000)));
        assert_eq!(t.next_fire(), ms(2000));
    }

    #[test]
    fn late_poll_fires_once_and_reschedules_from_now() {
        let mut t = IntervalTimer::new(ms(200));
        assert!(t.poll(ms(0)));
        // Stalled for a long time: one firing, not five.
        assert!(t.poll(ms(1000)));
        assert!(!t.poll(ms(1100)));
        assert!(t.poll(ms(1200)));
    }

    #[test]
    fn huge_intervals_saturate_instead_of_overflowing() {
        let mut t = IntervalTimer::new(Duration::MAX);
        assert!(t.poll(ms(5)));
        assert_eq!(t.next_fire(), Duration::MAX);
        assert!(!t.poll(ms(10)));

        let d = Deadline::after(ms(1), Duration::MAX);
        assert_eq!(d.at(), Duration::MAX);
        assert!(!d.is_reached(Duration::from_secs(u64::MAX / 2)));
    }

    #[test]
    fn manual_clock_sleep_advances() {
        let clock = ManualClock::new();
        assert_eq!(clock.now(), Duration::ZERO);
        clock.sleep(ms(5));
        clock.advance(ms(10));
        assert_eq!(clock.now(), ms(15));
        clock.set(ms(3));
        assert_eq!(clock.now(), ms(3));
    }

    #[test]
    fn monotonic_clock_does_not_go_backwards() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn deadline_is_inclusive() {
        let d = Deadline::after(ms(100), ms(50));
        assert_eq!(d.at(), ms(150));
        assert!(!d.is_reached(ms(149)));
        assert!(d.is_reached(ms(150)));
    }
}
