//! Core domain types for daytrack
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Activity** | A tagged time interval recorded against a calendar date |
//! | **Tag** | Free-text category label used for grouping and aggregation |
//! | **Day window** | The range a date must be fully accounted for |
//! | **Gap** | An uncovered sub-interval of a day window, computed on demand |
//!
//! Activities are the only persisted records. Windows, gaps and totals are
//! re-derived from storage every time they are needed.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::IntervalError;

/// Storage and display format for dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Storage and display format for times of day.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// First second of every day window.
pub fn day_start() -> NaiveTime {
    NaiveTime::MIN
}

/// Last representable second of a full day.
pub fn day_end() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}

// ============================================
// Activity
// ============================================

/// A tagged interval on a single calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub date: NaiveDate,
    pub tag: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl Activity {
    /// Build an activity, refusing empty or inverted intervals.
    pub fn new(
        date: NaiveDate,
        tag: impl Into<String>,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Result<Self, IntervalError> {
        if start_time >= end_time {
            return Err(IntervalError::Degenerate {
                start: start_time,
                end: end_time,
            });
        }
        Ok(Self {
            date,
            tag: tag.into(),
            start_time,
            end_time,
        })
    }

    /// Elapsed time between start and end.
    pub fn duration(&self) -> Duration {
        self.end_time.signed_duration_since(self.start_time)
    }
}

// ============================================
// Day window and gaps
// ============================================

/// The span of a date that must be accounted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl DayWindow {
    /// Window for `date` as seen at `now`.
    ///
    /// Past dates run to 23:59:59, today stops at the current second, and a
    /// future date has an empty window.
    pub fn for_date(date: NaiveDate, now: NaiveDateTime) -> Self {
        let today = now.date();
        let end = if date < today {
            day_end()
        } else if date == today {
            now.time().with_nanosecond(0).unwrap_or_else(|| now.time())
        } else {
            day_start()
        };

        Self {
            start: day_start(),
            end,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Unaccounted time `[start, end)` inside a day window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Gap {
    pub start: NaiveTime,
    pub end: NaiveTime,
    /// True when the gap runs to the end of the day window rather than up to
    /// the next recorded activity.
    pub trailing: bool,
}

impl Gap {
    pub fn span(&self) -> Duration {
        self.end.signed_duration_since(self.start)
    }

    /// Whether `[start, end)` lies entirely inside this gap.
    pub fn contains(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.start <= start && end <= self.end
    }
}

// ============================================
// Aggregation
// ============================================

/// Per-tag elapsed total as rendered by storage (`HH:MM:SS`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElapsedByTag {
    pub tag: String,
    pub elapsed: String,
}

/// Parsed total time for one tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagTotal {
    pub tag: String,
    #[serde(serialize_with = "serialize_seconds")]
    pub duration: Duration,
}

/// A tag's share of the available time across a date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagShare {
    pub tag: String,
    #[serde(serialize_with = "serialize_seconds", rename = "seconds")]
    pub duration: Duration,
    pub hours: f64,
    pub percentage: f64,
}

/// Ranked breakdown of time per tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeReport {
    /// Number of distinct dates in the range
    pub days: usize,
    /// Shares sorted by duration descending
    pub shares: Vec<TagShare>,
}

impl TimeReport {
    /// Hours theoretically available across the range.
    pub fn available_hours(&self) -> f64 {
        24.0 * self.days as f64
    }

    /// Sum of all shares. Reaches 100 only when the range is fully tracked
    /// without overlaps.
    pub fn tracked_percentage(&self) -> f64 {
        self.shares.iter().map(|s| s.percentage).sum()
    }
}

fn serialize_seconds<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_i64(duration.num_seconds())
}
