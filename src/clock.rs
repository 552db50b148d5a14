//! Clock

use jiff::Zoned;
use mockall::automock;

/// Source of the current time.
#[automock]
pub trait Clock: Send + Sync {
    /// Current time in the customer's time zone.
    fn now(&self) -> Zoned;
}

/// Reads the system clock in the system time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Zoned {
        Zoned::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone)]
pub struct FixedClock(Zoned);

impl FixedClock {
    /// Create a clock frozen at `now`.
    pub fn new(now: Zoned) -> Self {
        Self(now)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Zoned {
        self.0.clone()
    }
}
