//! Database layer for daytrack
//!
//! This module provides the storage layer using SQLite with:
//! - Schema migrations
//! - Repository implementing [`crate::store::ActivityStore`]

pub mod repo;
pub mod schema;

pub use repo::Database;
