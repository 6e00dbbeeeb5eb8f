//! Time source port.
//!
//! Lifecycle decisions (lapse checks, grant periods, claim staleness) read
//! the current time through this trait so tests can move time explicitly.

use crate::domain::foundation::Timestamp;

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
