//! Recording a single activity for the current day.

use chrono::{NaiveDateTime, NaiveTime, Timelike};

use crate::error::{IntervalError, Result};
use crate::format::parse_clock;
use crate::store::ActivityStore;
use crate::types::{day_start, Activity};

/// Default bounds offered when tracking at `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackDefaults {
    /// End of the latest activity today, or midnight
    pub start: NaiveTime,
    /// The current second
    pub end: NaiveTime,
}

impl TrackDefaults {
    pub fn load<S: ActivityStore + ?Sized>(store: &S, now: NaiveDateTime) -> Result<Self> {
        let start = store
            .latest_activity(now.date())?
            .map(|activity| activity.end_time)
            .unwrap_or_else(day_start);
        let end = now.time().with_nanosecond(0).unwrap_or_else(|| now.time());
        Ok(Self { start, end })
    }

    /// Build today's activity from operator input; blank or unparseable
    /// times take the defaults.
    pub fn resolve(
        &self,
        now: NaiveDateTime,
        tag: String,
        start_input: &str,
        end_input: &str,
    ) -> std::result::Result<Activity, IntervalError> {
        let start = parse_clock(start_input).unwrap_or(self.start);
        let end = parse_clock(end_input).unwrap_or(self.end);
        Activity::new(now.date(), tag, start, end)
    }
}
