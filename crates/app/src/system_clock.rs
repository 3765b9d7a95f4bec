//! Clock backed by the operating system.

use chrono::{Local, NaiveTime};

use circadia_domain::time::{self, Timestamp};

use crate::ports::Clock;

/// [`Clock`] reading UTC for timestamps and the local zone for time of day.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        time::now()
    }

    fn local_time(&self) -> NaiveTime {
        Local::now().time()
    }
}
