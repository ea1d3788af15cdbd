//! Date selection for commands that span one or more days.

use chrono::{Days, NaiveDate};

use crate::error::{Error, Result};
use crate::types::DATE_FORMAT;

/// Longest range a selection may span (about ten years).
pub const MAX_DAYS: u32 = 3660;

/// Which dates a command should look at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateSelection {
    /// An explicit date wins over `days`
    pub date: Option<NaiveDate>,
    /// Today plus the preceding `days - 1` days
    pub days: u32,
}

impl DateSelection {
    /// Resolve to concrete dates, newest first.
    ///
    /// Fails when `days` exceeds [`MAX_DAYS`] or reaches before the earliest
    /// representable date.
    pub fn resolve(&self, today: NaiveDate) -> Result<Vec<NaiveDate>> {
        if let Some(date) = self.date {
            return Ok(vec![date]);
        }
        if self.days == 0 {
            return Ok(vec![today]);
        }
        if self.days > MAX_DAYS {
            return Err(Error::InvalidDate(format!(
                "{} days requested, at most {} allowed",
                self.days, MAX_DAYS
            )));
        }

        // The oldest date bounds every other one.
        today
            .checked_sub_days(Days::new(u64::from(self.days - 1)))
            .ok_or_else(|| {
                Error::InvalidDate(format!("{} days before {} is out of range", self.days, today))
            })?;

        (0..self.days)
            .map(|offset| {
                today
                    .checked_sub_days(Days::new(u64::from(offset)))
                    .ok_or_else(|| Error::InvalidDate(format!("{} days before {}", offset, today)))
            })
            .collect()
    }
}

/// Parse a date argument in `YYYYMMDD` or `YYYY-MM-DD` form.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(input, DATE_FORMAT))
        .map_err(|_| {
            Error::InvalidDate(format!("{:?} (expected YYYYMMDD or YYYY-MM-DD)", input))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_default_selection_is_today() {
        let today = d(2024, 3, 10);
        assert_eq!(DateSelection::default().resolve(today).unwrap(), vec![today]);
    }

    #[test]
    fn test_days_walks_backwards_across_month_boundary() {
        let selection = DateSelection {
            date: None,
            days: 3,
        };
        assert_eq!(
            selection.resolve(d(2024, 3, 1)).unwrap(),
            vec![d(2024, 3, 1), d(2024, 2, 29), d(2024, 2, 28)]
        );
    }

    #[test]
    fn test_explicit_date_wins() {
        let selection = DateSelection {
            date: Some(d(2023, 12, 25)),
            days: 7,
        };
        assert_eq!(
            selection.resolve(d(2024, 3, 1)).unwrap(),
            vec![d(2023, 12, 25)]
        );
    }

    #[test]
    fn test_huge_day_counts_are_errors_not_panics() {
        for days in [MAX_DAYS + 1, 100_000_000, u32::MAX] {
            let selection = DateSelection { date: None, days };
            assert!(matches!(
                selection.resolve(d(2024, 1, 15)),
                Err(Error::InvalidDate(_))
            ));
        }

        let widest = DateSelection {
            date: None,
            days: MAX_DAYS,
        };
        let dates = widest.resolve(d(2024, 1, 15)).unwrap();
        assert_eq!(dates.len(), MAX_DAYS as usize);
        assert_eq!(dates[0], d(2024, 1, 15));
    }

    #[test]
    fn test_range_before_earliest_date_is_an_error() {
        let selection = DateSelection { date: None, days: 2 };
        assert!(matches!(
            selection.resolve(NaiveDate::MIN),
            Err(Error::InvalidDate(_))
        ));
    }

    #[test]
    fn test_parse_date_forms() {
        assert_eq!(parse_date("20240115").unwrap(), d(2024, 1, 15));
        assert_eq!(parse_date("2024-01-15").unwrap(), d(2024, 1, 15));
        assert!(matches!(parse_date("15/01/2024"), Err(Error::InvalidDate(_))));
        assert!(parse_date("20240230").is_err());
    }
}
