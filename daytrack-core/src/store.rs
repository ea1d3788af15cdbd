//! Storage seam consumed by the engines.

use chrono::NaiveDate;

use crate::error::Result;
use crate::types::{Activity, ElapsedByTag};

/// Read/append access to recorded activities.
///
/// Appends must be visible to the next read; the engines re-read before
/// every decision and keep no state between calls.
pub trait ActivityStore {
    /// All activities for `date`, ordered by start time ascending.
    fn activities_by_date(&self, date: NaiveDate) -> Result<Vec<Activity>>;

    /// The activity with the latest start time on `date`, if any.
    fn latest_activity(&self, date: NaiveDate) -> Result<Option<Activity>>;

    /// Persist a new activity. Overlap with existing records is not checked.
    fn append_activity(&self, activity: &Activity) -> Result<()>;

    /// Summed `end - start` per tag over `dates`, as `HH:MM:SS` text.
    fn tag_totals(&self, dates: &[NaiveDate]) -> Result<Vec<ElapsedByTag>>;

    /// Every tag ever recorded, in no particular order.
    fn distinct_tags(&self) -> Result<Vec<String>>;
}
