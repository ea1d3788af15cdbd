//! Error types for daytrack-core

use chrono::NaiveTime;
use thiserror::Error;

/// Main error type for the daytrack-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Aggregated duration text from storage was not `HH:MM:SS`
    #[error("invalid duration format: {text:?} (expected HH:MM:SS)")]
    DurationFormat { text: String },

    /// An aggregation was requested over no dates
    #[error("at least one date is required")]
    EmptyDateRange,

    /// An interval that cannot be recorded
    #[error("invalid interval: {0}")]
    InvalidInterval(#[from] IntervalError),

    /// Date argument could not be understood
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// A stored column is not in its canonical text format
    #[error("malformed stored {column}: {value:?}")]
    StoredValue { column: &'static str, value: String },
}

/// Why a proposed interval was refused.
///
/// These are recoverable: the reconciler reports them to the prompter and asks again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntervalError {
    /// Zero-length or inverted interval
    #[error("{start} - {end} is empty or inverted")]
    Degenerate { start: NaiveTime, end: NaiveTime },

    /// Interval reaches outside the gap it was meant to fill
    #[error("{start} - {end} is not within the gap {gap_start} - {gap_end}")]
    OutsideGap {
        start: NaiveTime,
        end: NaiveTime,
        gap_start: NaiveTime,
        gap_end: NaiveTime,
    },
}

/// Result type alias for daytrack-core
pub type Result<T> = std::result::Result<T, Error>;
