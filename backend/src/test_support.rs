//! Test utilities for the gatekeeper crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

/// Clock whose current time only moves when a test advances it.
///
/// Lets TTL expiry be exercised without sleeping.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Create a clock frozen at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Create a clock frozen at a fixed, arbitrary instant.
    pub fn fixed() -> Self {
        Self::new(fixture_timestamp())
    }

    /// Move the clock forward.
    pub fn advance(&self, delta: Duration) {
        let delta = match TimeDelta::from_std(delta) {
            Ok(delta) => delta,
            Err(error) => panic!("failed to convert Duration to TimeDelta: {error}; delta={delta:?}"),
        };
        *self.lock_clock() += delta;
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Fixed instant used by fixture clocks.
pub fn fixture_timestamp() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0) {
        chrono::LocalResult::Single(timestamp) => timestamp,
        _ => panic!("fixture timestamp must be unambiguous"),
    }
}
