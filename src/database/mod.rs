//! # Database Layer
//!
//! Connection management for the embedded SQLite store. The schema ships
//! inside the crate (`migrations/0001_init.sql`) and is applied at connect
//! time; there is no external migration step to run.
//!
//! Every timestamp in the schema is Unix seconds, and every query that
//! evaluates a freshness window takes `now` as an explicit bind parameter;
//! expiry is decided at read time, never by a background sweeper.

use chrono::Utc;

pub mod connection;

pub use connection::Database;

/// Current wall-clock time as Unix seconds, the `now` every queue
/// operation takes explicitly. Tests skip this and pass fixed values;
/// production callers sample it once per request and thread it through,
/// so one poll sees one consistent instant.
pub fn now_unix() -> i64 {
    Utc::now().timestamp()
}
