//! Database repository layer
//!
//! Provides the query and insert operations behind [`ActivityStore`].

use crate::error::{Error, Result};
use crate::store::ActivityStore;
use crate::types::{Activity, ElapsedByTag, DATE_FORMAT, TIME_FORMAT};
use chrono::{NaiveDate, NaiveTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Activity columns exactly as stored.
struct ActivityRow {
    date: String,
    tag: String,
    start_time: String,
    end_time: String,
}

/// Database handle (single connection)
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn();
        super::schema::run_migrations(&conn)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // Statements autocommit, so a panic elsewhere cannot leave a half-applied write.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_row(row: &Row) -> rusqlite::Result<ActivityRow> {
        Ok(ActivityRow {
            date: row.get("date")?,
            tag: row.get("tag")?,
            start_time: row.get("start_time")?,
            end_time: row.get("end_time")?,
        })
    }

    fn row_to_activity(row: ActivityRow) -> Result<Activity> {
        let date = NaiveDate::parse_from_str(&row.date, DATE_FORMAT).map_err(|_| {
            Error::StoredValue {
                column: "date",
                value: row.date.clone(),
            }
        })?;
        let start_time = parse_stored_time("start_time", &row.start_time)?;
        let end_time = parse_stored_time("end_time", &row.end_time)?;

        // Stored records are taken as-is, even inverted ones.
        Ok(Activity {
            date,
            tag: row.tag,
            start_time,
            end_time,
        })
    }
}

fn parse_stored_time(column: &'static str, value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, TIME_FORMAT).map_err(|_| Error::StoredValue {
        column,
        value: value.to_string(),
    })
}

fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

impl ActivityStore for Database {
    fn activities_by_date(&self, date: NaiveDate) -> Result<Vec<Activity>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            r#"
            SELECT date, tag, start_time, end_time FROM activities
            WHERE date = ?
            ORDER BY start_time ASC, id ASC
            "#,
        )?;
        let rows = stmt
            .query_map([date_key(date)], Self::read_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter().map(Self::row_to_activity).collect()
    }

    fn latest_activity(&self, date: NaiveDate) -> Result<Option<Activity>> {
        let conn = self.conn();
        let row = conn
            .query_row(
                r#"
                SELECT date, tag, start_time, end_time FROM activities
                WHERE date = ?
                ORDER BY start_time DESC, id DESC
                LIMIT 1
                "#,
                [date_key(date)],
                Self::read_row,
            )
            .optional()?;

        row.map(Self::row_to_activity).transpose()
    }

    fn append_activity(&self, activity: &Activity) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            r#"
            INSERT INTO activities (date, tag, start_time, end_time, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                date_key(activity.date),
                activity.tag,
                activity.start_time.format(TIME_FORMAT).to_string(),
                activity.end_time.format(TIME_FORMAT).to_string(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        tracing::debug!(
            date = %activity.date,
            tag = %activity.tag,
            start = %activity.start_time,
            end = %activity.end_time,
            "Activity appended"
        );
        Ok(())
    }

    fn tag_totals(&self, dates: &[NaiveDate]) -> Result<Vec<ElapsedByTag>> {
        if dates.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; dates.len()].join(", ");
        let sql = format!(
            r#"
            SELECT tag,
                   printf('%02d:%02d:%02d', total / 3600, (total % 3600) / 60, total % 60) AS elapsed
            FROM (
                SELECT tag,
                       SUM(CAST(strftime('%s', end_time) AS INTEGER)
                           - CAST(strftime('%s', start_time) AS INTEGER)) AS total
                FROM activities
                WHERE date IN ({})
                GROUP BY tag
            )
            ORDER BY tag
            "#,
            placeholders
        );

        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let totals = stmt
            .query_map(params_from_iter(dates.iter().map(|d| date_key(*d))), |row| {
                Ok(ElapsedByTag {
                    tag: row.get("tag")?,
                    elapsed: row.get("elapsed")?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(totals)
    }

    fn distinct_tags(&self) -> Result<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT DISTINCT tag FROM activities")?;
        let tags = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(tags)
    }
}
