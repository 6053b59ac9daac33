//! Wall-clock access for expiry decisions.

use chrono::{DateTime, Utc};

/// Source of the current time.
///
/// Everything that compares token expiry against "now" goes through this
/// trait so tests can pin the clock.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Current time as Unix seconds, keeping the sub-second part.
    fn unix_now(&self) -> f64 {
        self.now().timestamp_micros() as f64 / 1_000_000.0
    }
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Create a clock frozen at the given Unix timestamp.
    /// Out-of-range timestamps fall back to the Unix epoch.
    pub fn at_unix(secs: i64) -> Self {
        Self(DateTime::from_timestamp(secs, 0).unwrap_or_default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
