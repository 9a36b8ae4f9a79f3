//! Wall-clock abstraction used to timestamp playback events.
//!
//! Autoplay timing does not go through this trait; it runs on the async
//! runtime's timer so tests can pause and advance time.

use chrono::{DateTime, Utc};

/// Source of event timestamps.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
