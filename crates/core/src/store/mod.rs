//! SQLite-backed persisted store for MGNREGA metric records.
//!
//! This module provides the durable tier of the freshness-resolution chain
//! using SQLite with async access via tokio-rusqlite. It supports:
//!
//! - Idempotent upserts keyed on (state, district, fiscal year, month)
//! - Point lookups ordered by recency
//! - Per-year SUM/MAX/AVG aggregates for the historical series
//! - Automatic schema migrations and WAL mode for concurrent access

pub mod connection;
pub mod migrations;
pub mod records;
pub mod series;

pub use crate::Error;

pub use connection::MetricsDb;
pub use records::MetricRecord;
pub use series::YearlyAggregate;
