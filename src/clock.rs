//! Time source abstraction
//!
//! The catalog stamps `created_at`/`updated_at` from an injected clock
//! rather than reading the global clock directly, so tests can run with
//! fixed times.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// A source of timestamps
pub trait Clock: Send {
    /// Current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time from the host
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A settable clock for tests
///
/// Returns the same instant until `advance`/`set` is called.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Create a clock frozen at the given instant
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    /// Move the clock forward
    pub fn advance(&self, duration: chrono::Duration) {
        *self.now.lock() += duration;
    }

    /// Set the clock to an absolute instant
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Allows a test to keep a handle on the clock it hands to the service
impl<C: Clock + Sync + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
