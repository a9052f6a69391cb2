//! Client- and factory-facing services composed from the models and
//! the dispatch layer.

pub mod estimator;
pub mod overview;
pub mod poll;

pub use estimator::{estimate_wait, GroupStatus, QueueEstimate, QueueEstimator, StatusEntry};
pub use overview::{Overview, OverviewRow};
pub use poll::{PollService, ReportOutcome, WorkReport, WorkerProfile};
