#![allow(clippy::doc_markdown)] // Allow technical terms like SQLite, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Shotqueue
//!
//! Request matching and lease engine for a distributed screenshot
//! service: independent "factory" machines poll for "render URL X in
//! browser Y" jobs, and this crate decides which job each poll gets.
//!
//! ## Overview
//!
//! Work arrives as request groups (one website, one expiry deadline)
//! holding per-browser requests. Factories poll with a structured
//! predicate describing the browser they are offering; the matcher
//! hands back the oldest pending request that fits, excluded by
//! neither a live lease (someone is on it) nor a live failure record
//! (someone just burned it). Both exclusions are pure time windows
//! evaluated at query time, so a crashed factory never needs recovery:
//! its lease simply lapses after `lock_timeout` and the request flows
//! back into the pool.
//!
//! Alongside the poll path sit two read-only views: a per-group status
//! with heuristic wait estimates, and an admin overview of pending
//! demand versus advertised factory capacity.
//!
//! ## Module Organization
//!
//! - [`models`] - Catalog and queue rows (platforms, factories,
//!   browsers, request groups, requests, leases, failures)
//! - [`dispatch`] - The matcher and the lease manager
//! - [`services`] - Poll/report, wait estimation, load overview
//! - [`database`] - SQLite connection handling and the time model
//! - [`config`] - Timeout windows and failure scope
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shotqueue::config::QueueConfig;
//! use shotqueue::database::{now_unix, Database};
//! use shotqueue::dispatch::MatchPredicate;
//! use shotqueue::services::{PollService, WorkerProfile};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = QueueConfig::default();
//! let database = Database::connect(&config.database_url).await?;
//!
//! let polls = PollService::new(database.pool().clone(), config);
//! let profile = WorkerProfile {
//!     factory_id: 1,
//!     predicate: MatchPredicate::new(1, 1, 3, 5),
//!     queue_estimate: Some(90),
//! };
//!
//! match polls.poll(&profile, now_unix()).await? {
//!     Some(claimed) => println!("render {} in {}", claimed.website, claimed.browser_group),
//!     None => println!("queue empty for this browser"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency Model
//!
//! There is no scheduler loop. Every poll is an independent query
//! against shared storage, and mutual exclusion is soft: a lease is an
//! inserted row, not a lock. [`PollService::poll`] claims atomically
//! (selection and lease insert in one statement); the original
//! find-then-acquire handshake survives as
//! [`RequestMatcher::find_next`] plus [`LeaseManager::acquire`] for
//! callers that need the two-step form, accepting its small race
//! window.
//!
//! [`PollService::poll`]: services::PollService::poll
//! [`RequestMatcher::find_next`]: dispatch::RequestMatcher::find_next
//! [`LeaseManager::acquire`]: dispatch::LeaseManager::acquire

pub mod config;
pub mod constants;
pub mod database;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;

pub use config::{FailureScope, QueueConfig};
pub use database::{now_unix, Database};
pub use dispatch::{Capabilities, LeaseManager, MatchPredicate, MatchedRequest, RequestMatcher};
pub use error::{QueueError, Result};
pub use logging::init_logging;
pub use services::{
    GroupStatus, Overview, OverviewRow, PollService, QueueEstimate, QueueEstimator, ReportOutcome,
    WorkReport, WorkerProfile,
};
