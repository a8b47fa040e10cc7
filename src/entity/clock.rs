use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

/// Issues strictly increasing UTC timestamps for entity mutations.
///
/// Optimistic concurrency compares `updated_at` values, so two successful
/// writes must never carry the same instant. When the wall clock has not
/// moved past the previously issued value, the next one is bumped by a
/// microsecond.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> DateTime<Utc> {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        let mut now = Utc::now();
        if let Some(prev) = *last {
            if now <= prev {
                now = prev + Duration::microseconds(1);
            }
        }
        *last = Some(now);
        now
    }
}
