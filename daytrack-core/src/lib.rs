//! # daytrack-core
//!
//! Core library for daytrack - a personal day-timeline reconstructor.
//!
//! This library provides:
//! - Domain types for activities, day windows and gaps
//! - SQLite storage behind the [`ActivityStore`] trait
//! - [`GapReconciler`]: interactive loop that covers a date with activities
//! - [`DurationAggregator`]: ranked per-tag totals as a share of available time
//! - Configuration management and logging infrastructure
//!
//! Both engines re-read storage before every decision; nothing derived from
//! activities is cached between calls.
//!
//! ## Example
//!
//! ```rust,no_run
//! use daytrack_core::{Config, Database, DurationAggregator};
//!
//! let config = Config::load().expect("failed to load config");
//! let db = Database::open(&config.resolved_database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//!
//! let today = chrono::Local::now().date_naive();
//! let report = DurationAggregator::new(&db).aggregate(&[today]).expect("aggregation failed");
//! println!("{:.1}% of today tracked", report.tracked_percentage());
//! ```

// Re-export commonly used items at the crate root
pub use aggregate::DurationAggregator;
pub use config::Config;
pub use dates::DateSelection;
pub use db::Database;
pub use error::{Error, IntervalError, Result};
pub use reconcile::{FillAnswer, FillPrompter, GapReconciler, ReconcileConfig, ReconcileReport};
pub use store::ActivityStore;
pub use types::*;

// Public modules
pub mod aggregate;
pub mod config;
pub mod dates;
pub mod db;
pub mod error;
pub mod format;
pub mod logging;
pub mod reconcile;
pub mod store;
pub mod tags;
pub mod track;
pub mod types;
