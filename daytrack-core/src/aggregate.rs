//! Per-tag time breakdown over a range of dates.
//!
//! Storage sums `end - start` per tag and hands back `HH:MM:SS` text. This
//! module parses that text, ranks tags by total time and expresses each total
//! as a share of the hours theoretically available in the range (24 per
//! date). Shares are not normalised against each other: untracked time keeps
//! the sum under 100, overlapping records can push it over.

use chrono::{Duration, NaiveDate};

use crate::error::{Error, Result};
use crate::store::ActivityStore;
use crate::types::{TagShare, TagTotal, TimeReport};

/// Parse storage-computed elapsed time (`H+:MM:SS`, hours unbounded).
///
/// Anything other than three integer components is a data-integrity problem
/// and fails the whole aggregation.
pub fn parse_elapsed(text: &str) -> Result<Duration> {
    let format_error = || Error::DurationFormat {
        text: text.to_string(),
    };

    let parts: Vec<&str> = text.trim().split(':').collect();
    if parts.len() != 3 {
        return Err(format_error());
    }

    let mut values = [0i64; 3];
    for (value, part) in values.iter_mut().zip(&parts) {
        *value = part.parse().map_err(|_| format_error())?;
    }
    let [hours, minutes, seconds] = values;

    Ok(Duration::hours(hours) + Duration::minutes(minutes) + Duration::seconds(seconds))
}

/// `100 * hours / (24 * days)`.
pub fn percentage_of_days(duration: Duration, days: usize) -> f64 {
    if days == 0 {
        return 0.0;
    }
    let hours = duration.num_seconds() as f64 / 3600.0;
    100.0 * hours / (24.0 * days as f64)
}

/// Sort totals by duration descending, keeping source order for ties.
pub fn rank(mut totals: Vec<TagTotal>) -> Vec<TagTotal> {
    totals.sort_by(|a, b| b.duration.cmp(&a.duration));
    totals
}

/// Builds [`TimeReport`]s from an [`ActivityStore`].
pub struct DurationAggregator<'a, S: ActivityStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: ActivityStore + ?Sized> DurationAggregator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Ranked, percentage-annotated totals for `dates`.
    ///
    /// Repeated dates are counted once.
    pub fn aggregate(&self, dates: &[NaiveDate]) -> Result<TimeReport> {
        let mut distinct: Vec<NaiveDate> = Vec::with_capacity(dates.len());
        for date in dates {
            if !distinct.contains(date) {
                distinct.push(*date);
            }
        }
        if distinct.is_empty() {
            return Err(Error::EmptyDateRange);
        }

        let totals = self
            .store
            .tag_totals(&distinct)?
            .into_iter()
            .map(|row| {
                Ok(TagTotal {
                    duration: parse_elapsed(&row.elapsed)?,
                    tag: row.tag,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let days = distinct.len();
        let shares: Vec<TagShare> = rank(totals)
            .into_iter()
            .map(|total| TagShare {
                hours: total.duration.num_seconds() as f64 / 3600.0,
                percentage: percentage_of_days(total.duration, days),
                duration: total.duration,
                tag: total.tag,
            })
            .collect();

        let report = TimeReport { days, shares };
        tracing::info!(
            days,
            tags = report.shares.len(),
            tracked_percentage = report.tracked_percentage(),
            "Aggregated tag durations"
        );

        Ok(report)
    }
}
