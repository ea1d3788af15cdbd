//! Text and JSON output for timelines and tag reports.

use anyhow::Result;
use chrono::NaiveDate;
use daytrack_core::format::{format_hms, format_time};
use daytrack_core::{Activity, TimeReport, DATE_FORMAT};

/// Width of the percentage bar in cells.
const BAR_WIDTH: usize = 20;

pub fn print_timeline(date: NaiveDate, activities: &[Activity]) {
    println!("Activities for {}", date.format(DATE_FORMAT));
    for line in timeline_lines(activities) {
        println!("{}", line);
    }
}

fn timeline_lines(activities: &[Activity]) -> Vec<String> {
    let mut lines = Vec::with_capacity(activities.len() + 1);
    lines.push(format!(
        "{:<10} {:<20}  {:<10} {:<10} {:<10}",
        "Date", "Tags", "Start Time", "End Time", "Duration"
    ));
    for activity in activities {
        lines.push(format!(
            "{:<10} {:<20}  {:<10} {:<10} {:<10}",
            activity.date.format(DATE_FORMAT).to_string(),
            activity.tag,
            format_time(activity.start_time),
            format_time(activity.end_time),
            format_hms(activity.duration())
        ));
    }
    lines
}

pub fn print_report(report: &TimeReport) {
    for line in report_lines(report) {
        println!("{}", line);
    }
}

fn report_lines(report: &TimeReport) -> Vec<String> {
    let tag_width = report
        .shares
        .iter()
        .map(|share| share.tag.chars().count())
        .max()
        .unwrap_or(0);

    report
        .shares
        .iter()
        .map(|share| {
            format!(
                "{:<width$} {:5.2} hours ({:4.1}%){}",
                share.tag,
                share.hours,
                share.percentage,
                progress_bar(share.percentage / 100.0),
                width = tag_width
            )
        })
        .collect()
}

/// Filled/empty bar followed by a truncated integer percentage.
pub fn progress_bar(progress: f64) -> String {
    let filled = ((progress * BAR_WIDTH as f64) as usize).min(BAR_WIDTH);
    format!(
        "{}{} {}%",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH - filled),
        (progress * 100.0) as i64
    )
}

pub fn print_report_json(dates: &[NaiveDate], report: &TimeReport) -> Result<()> {
    let output = serde_json::json!({
        "dates": dates
            .iter()
            .map(|d| d.format(DATE_FORMAT).to_string())
            .collect::<Vec<_>>(),
        "available_hours": report.available_hours(),
        "tracked_percentage": report.tracked_percentage(),
        "tags": report.shares,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
