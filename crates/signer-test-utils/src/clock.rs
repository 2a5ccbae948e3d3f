//! Controllable time source.

use chrono::{DateTime, Duration, TimeZone, Utc};
use signer_service::clock::Clock;
use std::sync::Mutex;

/// 2018-12-28T10:14:00Z, a fixed instant for claims tests.
pub const TEST_EPOCH_SECONDS: i64 = 1_545_992_040;

/// The instant of [`TEST_EPOCH_SECONDS`].
pub fn test_now() -> DateTime<Utc> {
    Utc.timestamp_opt(TEST_EPOCH_SECONDS, 0).unwrap()
}

/// Clock that only moves when told to.
///
/// # Example
/// ```rust,ignore
/// let clock = Arc::new(FixedClock::at(test_now()));
/// let manager = KeyManager::new(store, clock.clone());
/// clock.advance(Duration::days(1)); // next get() rotates
/// ```
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::at(test_now())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
