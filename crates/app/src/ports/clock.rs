//! Clock port — wall-clock time for targets and hold bookkeeping.

use chrono::NaiveTime;

use circadia_domain::time::Timestamp;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Absolute time, used to timestamp automation writes.
    fn now(&self) -> Timestamp;

    /// Local time of day, used to locate the night window and its ramps.
    fn local_time(&self) -> NaiveTime;
}

impl<T: Clock> Clock for std::sync::Arc<T> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }

    fn local_time(&self) -> NaiveTime {
        (**self).local_time()
    }
}
