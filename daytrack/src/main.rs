//! daytrack - personal day-timeline reconstructor
//!
//! Records tagged activity intervals per date, fills the gaps in a day
//! interactively, and reports how time was split between tags.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Database: $XDG_DATA_HOME/daytrack/daytrack.db (~/.local/share/daytrack/daytrack.db)
//! - Logs: $XDG_STATE_HOME/daytrack/daytrack.log.<date> (~/.local/state/daytrack/)
//! - Config: $XDG_CONFIG_HOME/daytrack/config.toml (~/.config/daytrack/config.toml)

mod prompt;
mod render;

use std::io;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use daytrack_core::dates::parse_date;
use daytrack_core::tags::{choose_tag, sorted_tags};
use daytrack_core::track::TrackDefaults;
use daytrack_core::{
    ActivityStore, Config, Database, DateSelection, DurationAggregator, GapReconciler,
    ReconcileConfig,
};

use crate::prompt::TerminalPrompter;

#[derive(Parser)]
#[command(name = "daytrack")]
#[command(about = "Account for every hour of your day")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record an activity for today
    Track,

    /// View the timeline over a date range
    Timeline(RangeArgs),

    /// View the share of time spent per tag over a date range
    Percent {
        #[command(flatten)]
        range: RangeArgs,

        /// Output format: text (default) or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Fill every gap in a day's timeline
    Fill {
        /// Date in YYYYMMDD format (default today)
        #[arg(short, long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },
}

#[derive(Args)]
struct RangeArgs {
    /// Number of days ending today (default: just today)
    #[arg(short = 'n', long, default_value_t = 0)]
    days: u32,

    /// Date in YYYYMMDD format (default today)
    #[arg(short, long, value_parser = parse_date_arg)]
    date: Option<NaiveDate>,
}

impl RangeArgs {
    fn selection(&self) -> DateSelection {
        DateSelection {
            date: self.date,
            days: self.days,
        }
    }
}

fn parse_date_arg(input: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(input).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load().context("failed to load configuration")?;

    let _log_guard =
        daytrack_core::logging::init(&config.logging).context("failed to initialize logging")?;

    let db_path = config.resolved_database_path();
    tracing::info!(path = %db_path.display(), "Opening database");

    let db = Database::open(&db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;

    let today = Local::now().date_naive();

    match cli.command {
        Command::Track => track(&db, &config),
        Command::Timeline(range) => {
            let dates = range.selection().resolve(today)?;
            print_timelines(&db, &dates)
        }
        Command::Percent { range, format } => {
            let dates = range.selection().resolve(today)?;
            let report = DurationAggregator::new(&db)
                .aggregate(&dates)
                .context("failed to aggregate durations")?;
            if format == "json" {
                render::print_report_json(&dates, &report)
            } else {
                render::print_report(&report);
                Ok(())
            }
        }
        Command::Fill { date } => fill(&db, &config, date.unwrap_or(today)),
    }
}

fn print_timelines(db: &Database, dates: &[NaiveDate]) -> Result<()> {
    for date in dates {
        let activities = db
            .activities_by_date(*date)
            .with_context(|| format!("failed to load activities for {}", date))?;
        render::print_timeline(*date, &activities);
    }
    Ok(())
}

fn fill(db: &Database, config: &Config, date: NaiveDate) -> Result<()> {
    print_timelines(db, &[date])?;

    let reconciler = GapReconciler::new(
        db,
        ReconcileConfig {
            default_tag: config.tags.default.clone(),
        },
    );
    let stdin = io::stdin();
    let mut prompter = TerminalPrompter::new(stdin.lock(), io::stdout());

    let report = reconciler
        .reconcile(date, Local::now().naive_local(), &mut prompter)
        .with_context(|| format!("failed to fill gaps for {}", date))?;

    if report.fills.is_empty() {
        println!("\n{} is fully accounted for.", date);
    } else {
        println!(
            "\nAdded {} activit{} ({} with custom times).\n",
            report.fills.len(),
            if report.fills.len() == 1 { "y" } else { "ies" },
            report.edited
        );
    }

    print_timelines(db, &[date])
}

fn track(db: &Database, config: &Config) -> Result<()> {
    let now = Local::now().naive_local();
    let defaults = TrackDefaults::load(db, now).context("failed to load latest activity")?;
    let tags = sorted_tags(db.distinct_tags().context("failed to load tags")?);

    let stdin = io::stdin();
    let mut prompter = TerminalPrompter::new(stdin.lock(), io::stdout());

    let tag_input = prompter.ask_tag(&tags)?;
    let tag = choose_tag(&tag_input, &tags, &config.tags.default);

    let activity = loop {
        let (start, end) = prompter.ask_track_times(&defaults)?;
        match defaults.resolve(now, tag.clone(), &start, &end) {
            Ok(activity) => break activity,
            Err(reason) => prompter.say(&format!("Invalid interval: {}", reason))?,
        }
    };

    db.append_activity(&activity)
        .context("failed to record activity")?;
    tracing::info!(
        tag = %activity.tag,
        start = %activity.start_time,
        end = %activity.end_time,
        "Activity tracked"
    );

    print_timelines(db, &[now.date()])
}
