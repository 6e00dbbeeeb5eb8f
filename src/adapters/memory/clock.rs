//! Clock whose time only moves when told to.

use std::sync::Mutex;

use crate::domain::foundation::Timestamp;
use crate::ports::Clock;

#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, now: Timestamp) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    pub fn advance_secs(&self, secs: i64) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = guard.add_secs(secs);
        }
    }

    pub fn advance_days(&self, days: i64) {
        self.advance_secs(days * 86_400);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
