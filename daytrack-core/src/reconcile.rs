//! Gap reconciliation
//!
//! Drives a date towards full coverage of its [`DayWindow`]. Each round
//! re-reads every activity for the date, finds the first uncovered span and
//! asks a [`FillPrompter`] how to cover it. Nothing derived (cursor, gaps) is
//! carried between rounds; the only state is what storage holds.
//!
//! Termination: a fill is only persisted when it is non-empty and intersects
//! the gap it was offered for, so every round strictly shrinks the uncovered
//! part of a finite window.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{IntervalError, Result};
use crate::format::parse_clock;
use crate::store::ActivityStore;
use crate::tags::{choose_tag, sorted_tags};
use crate::types::{Activity, DayWindow, Gap};

/// Find the earliest uncovered span of `window`.
///
/// `activities` must be ordered by start time. The scan stops at the first
/// gap. The cursor only moves forward, so a record nested inside an earlier
/// one cannot reopen time that is already covered.
pub fn find_first_gap(activities: &[Activity], window: DayWindow) -> Option<Gap> {
    let mut cursor = window.start;

    for activity in activities {
        if cursor >= window.end {
            return None;
        }
        if activity.start_time > cursor {
            return Some(Gap {
                start: cursor,
                end: activity.start_time.min(window.end),
                trailing: activity.start_time >= window.end,
            });
        }
        cursor = cursor.max(activity.end_time);
    }

    (cursor < window.end).then_some(Gap {
        start: cursor,
        end: window.end,
        trailing: true,
    })
}

/// Raw operator answer for one gap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillAnswer {
    /// Tag index, name, prefix or blank
    pub tag: String,
    /// Optional `START-END` override, blank to take the whole gap
    pub times: String,
}

impl FillAnswer {
    pub fn new(tag: impl Into<String>, times: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            times: times.into(),
        }
    }
}

/// Interactive source of fills.
pub trait FillPrompter {
    /// Ask how to cover `gap`. `tags` are the known tags in display order.
    fn answer(&mut self, date: NaiveDate, gap: &Gap, tags: &[String]) -> Result<FillAnswer>;

    /// A fill built from the last answer was refused; the same gap will be
    /// offered again.
    fn rejected(&mut self, _gap: &Gap, _reason: &IntervalError) {}
}

/// Explicit bounds typed by the operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeOverride {
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
}

impl TimeOverride {
    /// Parse `START-END`, `START-`, `-END` or a lone `END`.
    ///
    /// Unparseable parts are dropped so the gap's own bound is used instead.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.is_empty() {
            return Self::default();
        }

        let (start, end) = match input.split_once('-') {
            Some((start, end)) => (start.trim(), end.trim()),
            None => ("", input),
        };

        Self {
            start: parse_part(start, "start"),
            end: parse_part(end, "end"),
        }
    }

    pub fn is_explicit(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// Apply to `gap`, filling unset bounds from the gap itself.
    pub fn bounds(&self, gap: &Gap) -> (NaiveTime, NaiveTime) {
        (self.start.unwrap_or(gap.start), self.end.unwrap_or(gap.end))
    }
}

fn parse_part(part: &str, which: &str) -> Option<NaiveTime> {
    if part.is_empty() {
        return None;
    }
    let parsed = parse_clock(part);
    if parsed.is_none() {
        tracing::warn!(input = part, bound = which, "Ignoring unparseable fill time");
    }
    parsed
}

/// Build the activity for a fill, refusing anything not contained in `gap`.
pub fn resolve_fill(
    date: NaiveDate,
    gap: &Gap,
    tag: String,
    times: TimeOverride,
) -> std::result::Result<Activity, IntervalError> {
    let (start, end) = times.bounds(gap);
    let activity = Activity::new(date, tag, start, end)?;
    if !gap.contains(start, end) {
        return Err(IntervalError::OutsideGap {
            start,
            end,
            gap_start: gap.start,
            gap_end: gap.end,
        });
    }
    Ok(activity)
}

/// Settings threaded into every reconciliation.
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// Tag used for a blank tag answer
    pub default_tag: String,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            default_tag: "play".to_string(),
        }
    }
}

/// What a reconciliation did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Activities appended, in order
    pub fills: Vec<Activity>,
    /// Fills whose bounds the operator typed explicitly
    pub edited: usize,
    /// Answers refused and re-prompted
    pub rejected: usize,
}

/// Interactive loop that covers a date's window with activities.
pub struct GapReconciler<'a, S: ActivityStore + ?Sized> {
    store: &'a S,
    config: ReconcileConfig,
}

impl<'a, S: ActivityStore + ?Sized> GapReconciler<'a, S> {
    pub fn new(store: &'a S, config: ReconcileConfig) -> Self {
        Self { store, config }
    }

    /// First gap of `date` as seen at `now`, read fresh from storage.
    pub fn first_gap(&self, date: NaiveDate, now: NaiveDateTime) -> Result<Option<Gap>> {
        let activities = self.store.activities_by_date(date)?;
        Ok(find_first_gap(&activities, DayWindow::for_date(date, now)))
    }

    /// Prompt until `date` has no uncovered time left in its window.
    ///
    /// Storage errors abort immediately; refused answers are reported to the
    /// prompter and the gap is offered again.
    pub fn reconcile(
        &self,
        date: NaiveDate,
        now: NaiveDateTime,
        prompter: &mut dyn FillPrompter,
    ) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::default();

        while let Some(gap) = self.first_gap(date, now)? {
            tracing::debug!(
                %date,
                start = %gap.start,
                end = %gap.end,
                trailing = gap.trailing,
                "Gap detected"
            );

            let tags = sorted_tags(self.store.distinct_tags()?);
            let answer = prompter.answer(date, &gap, &tags)?;
            let tag = choose_tag(&answer.tag, &tags, &self.config.default_tag);
            let times = TimeOverride::parse(&answer.times);

            let activity = match resolve_fill(date, &gap, tag, times) {
                Ok(activity) => activity,
                Err(reason) => {
                    tracing::warn!(%date, %reason, "Fill rejected");
                    report.rejected += 1;
                    prompter.rejected(&gap, &reason);
                    continue;
                }
            };

            self.store.append_activity(&activity)?;
            tracing::info!(
                %date,
                tag = %activity.tag,
                start = %activity.start_time,
                end = %activity.end_time,
                edited = times.is_explicit(),
                "Gap filled"
            );

            if times.is_explicit() {
                report.edited += 1;
            }
            report.fills.push(activity);
        }

        tracing::info!(
            %date,
            fills = report.fills.len(),
            edited = report.edited,
            "Day fully covered"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use std::collections::VecDeque;

    fn t(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn past_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 20)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn full_window() -> DayWindow {
        DayWindow::for_date(date(), past_now())
    }

    fn act(tag: &str, start: NaiveTime, end: NaiveTime) -> Activity {
        Activity::new(date(), tag, start, end).unwrap()
    }

    fn test_db(activities: &[Activity]) -> Database {
        crate::logging::init_test();
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        for activity in activities {
            db.append_activity(activity).unwrap();
        }
        db
    }

    /// Replays canned answers and records every gap it was shown.
    struct Scripted {
        answers: VecDeque<FillAnswer>,
        offered: Vec<Gap>,
        rejections: Vec<IntervalError>,
    }

    impl Scripted {
        fn new(answers: Vec<FillAnswer>) -> Self {
            Self {
                answers: answers.into(),
                offered: Vec::new(),
                rejections: Vec::new(),
            }
        }
    }

    impl FillPrompter for Scripted {
        fn answer(&mut self, _date: NaiveDate, gap: &Gap, _tags: &[String]) -> Result<FillAnswer> {
            self.offered.push(*gap);
            Ok(self
                .answers
                .pop_front()
                .unwrap_or_else(|| panic!("unexpected prompt for {:?}", gap)))
        }

        fn rejected(&mut self, _gap: &Gap, reason: &IntervalError) {
            self.rejections.push(reason.clone());
        }
    }

    #[test]
    fn test_empty_day_is_one_trailing_gap() {
        let gap = find_first_gap(&[], full_window()).unwrap();
        assert_eq!(gap.start, t(0, 0, 0));
        assert_eq!(gap.end, t(23, 59, 59));
        assert!(gap.trailing);
    }

    #[test]
    fn test_scan_stops_at_first_gap() {
        let activities = vec![
            act("sleep", t(0, 0, 0), t(7, 0, 0)),
            act("work", t(9, 0, 0), t(10, 0, 0)),
            act("play", t(12, 0, 0), t(13, 0, 0)),
        ];
        let gap = find_first_gap(&activities, full_window()).unwrap();
        assert_eq!((gap.start, gap.end), (t(7, 0, 0), t(9, 0, 0)));
        assert!(!gap.trailing);
    }

    #[test]
    fn test_detection_is_idempotent() {
        let activities = vec![act("work", t(9, 0, 0), t(10, 0, 0))];
        let first = find_first_gap(&activities, full_window());
        let second = find_first_gap(&activities, full_window());
        assert_eq!(first, second);
    }

    #[test]
    fn test_nested_activity_does_not_move_cursor_back() {
        let activities = vec![
            act("sleep", t(0, 0, 0), t(12, 0, 0)),
            act("nap", t(10, 0, 0), t(11, 0, 0)),
            act("work", t(13, 0, 0), t(23, 59, 59)),
        ];
        let gap = find_first_gap(&activities, full_window()).unwrap();
        assert_eq!((gap.start, gap.end), (t(12, 0, 0), t(13, 0, 0)));
    }

    #[test]
    fn test_fully_covered_day_has_no_gap() {
        let activities = vec![
            act("sleep", t(0, 0, 0), t(8, 0, 0)),
            act("work", t(8, 0, 0), t(23, 59, 59)),
        ];
        assert_eq!(find_first_gap(&activities, full_window()), None);
    }

    #[test]
    fn test_today_window_clips_future_activity() {
        let now = date().and_hms_opt(10, 0, 0).unwrap();
        let window = DayWindow::for_date(date(), now);
        let activities = vec![
            act("sleep", t(0, 0, 0), t(8, 0, 0)),
            act("later", t(15, 0, 0), t(16, 0, 0)),
        ];
        let gap = find_first_gap(&activities, window).unwrap();
        assert_eq!((gap.start, gap.end), (t(8, 0, 0), t(10, 0, 0)));
        assert!(gap.trailing);

        let covered = vec![act("sleep", t(0, 0, 0), t(11, 0, 0))];
        assert_eq!(find_first_gap(&covered, window), None);
    }

    #[test]
    fn test_time_override_parsing() {
        assert_eq!(TimeOverride::parse(""), TimeOverride::default());
        assert_eq!(
            TimeOverride::parse("0900-1030"),
            TimeOverride {
                start: Some(t(9, 0, 0)),
                end: Some(t(10, 30, 0)),
            }
        );
        assert_eq!(
            TimeOverride::parse("-10:30"),
            TimeOverride {
                start: None,
                end: Some(t(10, 30, 0)),
            }
        );
        assert_eq!(
            TimeOverride::parse("0900-"),
            TimeOverride {
                start: Some(t(9, 0, 0)),
                end: None,
            }
        );
        // a single value is an end time
        assert_eq!(TimeOverride::parse("1030").end, Some(t(10, 30, 0)));
        // garbage falls back to defaults and is not an edit
        assert!(!TimeOverride::parse("soon-ish").is_explicit());
    }

    #[test]
    fn test_resolve_fill_rejections() {
        let gap = Gap {
            start: t(9, 0, 0),
            end: t(12, 0, 0),
            trailing: false,
        };
        let inverted = TimeOverride {
            start: None,
            end: Some(t(8, 0, 0)),
        };
        assert!(matches!(
            resolve_fill(date(), &gap, "work".into(), inverted),
            Err(IntervalError::Degenerate { .. })
        ));

        let zero = TimeOverride {
            start: None,
            end: Some(t(9, 0, 0)),
        };
        assert!(matches!(
            resolve_fill(date(), &gap, "work".into(), zero),
            Err(IntervalError::Degenerate { .. })
        ));

        let elsewhere = TimeOverride {
            start: Some(t(13, 0, 0)),
            end: Some(t(14, 0, 0)),
        };
        assert!(matches!(
            resolve_fill(date(), &gap, "work".into(), elsewhere),
            Err(IntervalError::OutsideGap { .. })
        ));

        // sharing a second with the gap is not enough
        for (start, end) in [
            (t(8, 0, 0), t(9, 30, 0)),
            (t(11, 0, 0), t(12, 0, 1)),
            (t(8, 0, 0), t(13, 0, 0)),
        ] {
            let partial = TimeOverride {
                start: Some(start),
                end: Some(end),
            };
            assert!(matches!(
                resolve_fill(date(), &gap, "work".into(), partial),
                Err(IntervalError::OutsideGap { .. })
            ));
        }

        let inner = TimeOverride {
            start: Some(t(9, 30, 0)),
            end: Some(t(11, 0, 0)),
        };
        let inside = resolve_fill(date(), &gap, "work".into(), inner).unwrap();
        assert_eq!((inside.start_time, inside.end_time), (t(9, 30, 0), t(11, 0, 0)));

        let whole = resolve_fill(date(), &gap, "work".into(), TimeOverride::default()).unwrap();
        assert_eq!((whole.start_time, whole.end_time), (t(9, 0, 0), t(12, 0, 0)));
    }

    #[test]
    fn test_covered_day_never_prompts() {
        let db = test_db(&[act("all", t(0, 0, 0), t(23, 59, 59))]);
        let mut prompter = Scripted::new(vec![]);

        let report = GapReconciler::new(&db, ReconcileConfig::default())
            .reconcile(date(), past_now(), &mut prompter)
            .unwrap();

        assert!(report.fills.is_empty());
        assert!(prompter.offered.is_empty());
    }

    #[test]
    fn test_default_answers_fill_both_gaps() {
        let db = test_db(&[act("work", t(9, 0, 0), t(10, 0, 0))]);
        let mut prompter = Scripted::new(vec![FillAnswer::default(), FillAnswer::default()]);

        let report = GapReconciler::new(&db, ReconcileConfig::default())
            .reconcile(date(), past_now(), &mut prompter)
            .unwrap();

        assert_eq!(
            report.fills,
            vec![
                act("play", t(0, 0, 0), t(9, 0, 0)),
                act("play", t(10, 0, 0), t(23, 59, 59)),
            ]
        );
        assert_eq!(report.edited, 0);
        assert_eq!(db.activities_by_date(date()).unwrap().len(), 3);
    }

    #[test]
    fn test_partial_end_time_leaves_shorter_trailing_gap() {
        let db = test_db(&[act("sleep", t(0, 0, 0), t(8, 0, 0))]);
        let mut prompter = Scripted::new(vec![
            FillAnswer::new("work", "1200"),
            FillAnswer::new("", ""),
        ]);

        let report = GapReconciler::new(
            &db,
            ReconcileConfig {
                default_tag: "idle".to_string(),
            },
        )
        .reconcile(date(), past_now(), &mut prompter)
        .unwrap();

        assert_eq!(prompter.offered.len(), 2);
        assert_eq!(
            (prompter.offered[0].start, prompter.offered[0].end),
            (t(8, 0, 0), t(23, 59, 59))
        );
        assert_eq!(
            (prompter.offered[1].start, prompter.offered[1].end),
            (t(12, 0, 0), t(23, 59, 59))
        );
        assert_eq!(report.edited, 1);
        assert_eq!(report.fills[1].tag, "idle");
    }

    #[test]
    fn test_degenerate_answer_is_reprompted_not_persisted() {
        let db = test_db(&[act("work", t(0, 0, 0), t(20, 0, 0))]);
        let mut prompter = Scripted::new(vec![
            FillAnswer::new("work", "2000-2000"),
            FillAnswer::new("work", "1000-1100"),
            FillAnswer::new("1", ""),
        ]);

        let report = GapReconciler::new(&db, ReconcileConfig::default())
            .reconcile(date(), past_now(), &mut prompter)
            .unwrap();

        assert_eq!(report.rejected, 2);
        assert_eq!(prompter.rejections.len(), 2);
        assert_eq!(report.fills, vec![act("work", t(20, 0, 0), t(23, 59, 59))]);
        assert!(prompter.offered.iter().all(|g| g.start == t(20, 0, 0)));
    }

    #[test]
    fn test_fill_spilling_into_recorded_time_is_rejected() {
        let db = test_db(&[act("work", t(9, 0, 0), t(10, 0, 0))]);
        let mut prompter = Scripted::new(vec![
            // gap is 00:00-09:00, this would run to 12:00 over "work"
            FillAnswer::new("play", "-1200"),
            FillAnswer::new("play", "0800-0930"),
            FillAnswer::default(),
            FillAnswer::default(),
        ]);

        let report = GapReconciler::new(&db, ReconcileConfig::default())
            .reconcile(date(), past_now(), &mut prompter)
            .unwrap();

        assert_eq!(report.rejected, 2);
        assert!(prompter
            .rejections
            .iter()
            .all(|r| matches!(r, IntervalError::OutsideGap { .. })));
        assert_eq!(
            db.activities_by_date(date()).unwrap(),
            vec![
                act("play", t(0, 0, 0), t(9, 0, 0)),
                act("work", t(9, 0, 0), t(10, 0, 0)),
                act("play", t(10, 0, 0), t(23, 59, 59)),
            ]
        );
    }

    #[test]
    fn test_fill_past_now_is_rejected_today() {
        let now = date().and_hms_opt(10, 0, 0).unwrap();
        let db = test_db(&[act("sleep", t(0, 0, 0), t(8, 0, 0))]);
        let mut prompter = Scripted::new(vec![
            FillAnswer::new("work", "-1100"),
            FillAnswer::default(),
        ]);

        let report = GapReconciler::new(&db, ReconcileConfig::default())
            .reconcile(date(), now, &mut prompter)
            .unwrap();

        assert_eq!(report.rejected, 1);
        assert_eq!(report.fills, vec![act("play", t(8, 0, 0), t(10, 0, 0))]);
    }

    #[test]
    fn test_prompter_error_aborts() {
        struct Closed;
        impl FillPrompter for Closed {
            fn answer(&mut self, _: NaiveDate, _: &Gap, _: &[String]) -> Result<FillAnswer> {
                Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into())
            }
        }

        let db = test_db(&[]);
        let result =
            GapReconciler::new(&db, ReconcileConfig::default()).reconcile(date(), past_now(), &mut Closed);
        assert!(result.is_err());
        assert!(db.activities_by_date(date()).unwrap().is_empty());
    }
}
